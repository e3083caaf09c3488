use crate::assets::{self, AssetLoadError};
use crate::client::{Client, GameRenderStateWgpu, GameUpdateState, RenderAssets, RenderError};
use crate::config::{AppConfig, ConfigError};
use crate::window::{EventLoop, Window};
use thiserror::Error;
use tracing::info;
use winit::error::{EventLoopError, OsError};

#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[source] EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[source] OsError),
    #[error("failed to create render surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible graphics adapter")]
    NoAdapter,
    #[error("failed to open graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("render surface reports no formats")]
    NoSurfaceFormat,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Init(#[from] InitError),
    #[error(transparent)]
    Assets(#[from] AssetLoadError),
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
}

pub struct ClientApp;

impl ClientApp {
    pub fn launch(config: AppConfig) -> Result<(), AppError> {
        info!(
            mode = ?config.mode,
            collision = ?config.collision,
            assets = %config.assets.display(),
            vsync = config.vsync,
            "starting"
        );

        // Assets. Everything loads before the window opens; any failure ends startup.
        let mode = config.mode;
        let tile_grid = match mode.has_tile_grid() {
            true => Some(assets::load_tile_grid(&config.assets)?),
            false => None,
        };
        let frame_source = match mode.has_stream() {
            true => Some(assets::load_frames(&config.assets)?),
            false => None,
        };
        let stream_size = frame_source.as_ref().map(|source| source.frame_size());

        // World. On any later failure it is dropped grid first, then frames.
        let update_state = GameUpdateState::new(
            mode,
            config.collision,
            (config.window_width as i32, config.window_height as i32),
            tile_grid,
            frame_source,
        );
        let render_assets = RenderAssets {
            tile_sheet: match mode.has_tile_grid() {
                true => Some(assets::load_image(&config.assets.join(assets::TILE_SHEET_FILE))?),
                false => None,
            },
            actor_sprite: match mode.has_actor() {
                true => Some(assets::load_image(&config.assets.join(assets::ACTOR_SPRITE_FILE))?),
                false => None,
            },
            stream_size,
        };

        // Window.
        let mut event_loop = EventLoop::new().map_err(InitError::EventLoop)?;
        let window = Window::new(
            &event_loop,
            &config.window_title,
            config.window_width,
            config.window_height,
        )
        .map_err(InitError::Window)?;

        // Client.
        let render_state = GameRenderStateWgpu::new(&window, config.vsync, render_assets)?;
        let mut client = Client::new(update_state, render_state, config.max_frame_delta);

        loop {
            // Poll events.
            let input_events = event_loop.poll();

            // Update client.
            if client.update_once(input_events)? {
                break;
            }
        }

        info!("shutting down");
        Ok(())
    }
}
