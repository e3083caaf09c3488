pub mod client;
pub mod frame_source;
mod game_frame;
mod game_render_state_wgpu;
mod game_update_state;
pub mod pixel_buffer;
pub mod streaming_surface;

pub use client::*;
pub use game_render_state_wgpu::*;
pub use game_update_state::*;
