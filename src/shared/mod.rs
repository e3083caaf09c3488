pub mod actor;
pub mod camera;
pub mod collision;
pub mod tile;
pub mod tile_grid;

pub use actor::*;
pub use camera::*;
pub use collision::*;
pub use tile::*;
pub use tile_grid::*;

// Screen.
pub const SCREEN_WIDTH: i32 = 640;
pub const SCREEN_HEIGHT: i32 = 480;

// World.
pub const LEVEL_WIDTH: i32 = 1280;
pub const LEVEL_HEIGHT: i32 = 960;

// Tiles.
pub const TILE_WIDTH: i32 = 80;
pub const TILE_HEIGHT: i32 = 80;

// Actor.
pub const ACTOR_WIDTH: i32 = 20;
pub const ACTOR_HEIGHT: i32 = 20;
pub const ACTOR_SPEED: f32 = 640.;
