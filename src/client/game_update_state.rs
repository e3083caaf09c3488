use crate::client::frame_source::FrameSource;
use crate::client::game_frame::*;
use crate::config::WorldMode;
use crate::shared::*;
use crate::window::InputEvent;
use tracing::{debug, trace, warn};

pub struct GameUpdateState {
    // Misc.
    mode: WorldMode,
    response: CollisionResponse,

    // World. The grid is declared ahead of the frames so it is released first.
    tile_grid: Option<TileGrid>,
    room: Rect,
    actor: Option<Actor>,

    // Viewport.
    camera: Camera,

    // Stream.
    frame_source: Option<FrameSource>,
}

impl GameUpdateState {
    pub fn new(
        mode: WorldMode,
        response: CollisionResponse,
        viewport: (i32, i32),
        tile_grid: Option<TileGrid>,
        frame_source: Option<FrameSource>,
    ) -> Self {
        let (viewport_w, viewport_h) = viewport;
        if mode.has_tile_grid() && tile_grid.is_none() {
            warn!(?mode, "no tile grid supplied, drawing without tiles");
        }
        let tile_grid = tile_grid.filter(|_| mode.has_tile_grid());

        let actor = mode.has_actor().then(|| Actor::new(0., 0.));
        if let (Some(actor), Some(grid)) = (&actor, &tile_grid) {
            let (x, y) = actor.bounds().center();
            if grid.tile_at(x, y).is_some_and(|tile| tile.is_blocking()) {
                warn!(x, y, "actor spawns inside a wall");
            }
        }

        Self {
            mode,
            response,

            tile_grid,
            room: Rect::new(0, 0, viewport_w, viewport_h),
            actor,

            camera: match mode.has_camera() {
                true => Camera::new(viewport_w, viewport_h),
                false => Camera::fixed(Rect::new(0, 0, viewport_w, viewport_h)),
            },

            frame_source: frame_source.filter(|_| mode.has_stream()),
        }
    }

    pub fn mode(&self) -> WorldMode {
        self.mode
    }

    /// Applies input. Returns true once the player asked to quit.
    pub fn prestep<'a>(&mut self, input_events: impl Iterator<Item = &'a InputEvent>) -> bool {
        for &event in input_events {
            match event {
                InputEvent::WindowClose => return true,
                InputEvent::Focused(false) => {
                    debug!("focus lost, releasing held keys");
                    if let Some(actor) = &mut self.actor {
                        actor.release_all();
                    }
                }
                InputEvent::Focused(true) | InputEvent::WindowResize { .. } => {}
                InputEvent::KeyboardInput {
                    direction,
                    press_state,
                } => {
                    if let Some(actor) = &mut self.actor {
                        actor.handle_input(direction, press_state);
                        trace!(?direction, ?press_state, velocity = ?actor.velocity(), "key");
                    }
                }
            }
        }

        false
    }

    pub fn step(&mut self, ft: f32) {
        let Some(actor) = &mut self.actor else {
            return;
        };

        let movement = match &self.tile_grid {
            Some(grid) => Movement::Tiled {
                grid,
                response: self.response,
            },
            None => Movement::OpenRoom { bounds: self.room },
        };
        actor.integrate(movement, ft);

        if let (true, Some(grid)) = (self.mode.has_camera(), &self.tile_grid) {
            let world = grid.world_bounds();
            self.camera.update(&actor.bounds(), world.w, world.h);
        }
    }

    pub fn poststep(&mut self) -> GameFrame<'_> {
        let viewport = self.camera.rect;

        let tiles = match &self.tile_grid {
            Some(grid) => grid
                .visible_tiles(&viewport)
                .map(|tile| TileSprite {
                    dst: self.camera.to_screen(&tile.bounds),
                    kind: tile.kind,
                })
                .collect(),
            None => Vec::new(),
        };

        let actor = self
            .actor
            .as_ref()
            .map(|actor| self.camera.to_screen(&actor.bounds()));

        // Centered on screen, regardless of the camera.
        let (screen_w, screen_h) = (viewport.w, viewport.h);
        let stream = self.frame_source.as_mut().map(|source| {
            let pixels = source.advance();
            let (w, h) = (pixels.width as i32, pixels.height as i32);
            StreamSprite {
                dst: Rect::new((screen_w - w) / 2, (screen_h - h) / 2, w, h),
                pixels,
            }
        });

        GameFrame {
            viewport,
            tiles,
            actor,
            stream,
        }
    }
}
