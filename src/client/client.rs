use crate::client::{GameRenderStateWgpu, GameUpdateState, RenderError};
use crate::time::*;
use crate::window::InputEvent;
use std::time::Duration;
use tracing::{debug, info};

const DIAGNOSTIC_FRAMES: u64 = 60 * 5;

/// Teardown follows field order: `update_state` drops its tile grid and then its frame
/// buffers, and only then does `render_state` release the streaming surface. Keep the
/// update fields above the render fields.
pub struct Client {
    // Update.
    step_timer: Timer,
    max_frame_delta: f32,
    update_state: GameUpdateState,

    // Render.
    render_state: GameRenderStateWgpu,

    // Diagnostic.
    acc_n: u64,
    prestep_acc: u64,
    step_acc: u64,
    poststep_acc: u64,
    render_acc: u64,
}

impl Client {
    pub fn new(
        update_state: GameUpdateState,
        render_state: GameRenderStateWgpu,
        max_frame_delta: Duration,
    ) -> Self {
        let mut step_timer = Timer::new();
        step_timer.start();

        Self {
            step_timer,
            max_frame_delta: max_frame_delta.as_secs_f32(),
            update_state,

            render_state,

            acc_n: 0,
            prestep_acc: 0,
            step_acc: 0,
            poststep_acc: 0,
            render_acc: 0,
        }
    }

    fn handle_events(&mut self, events: &[InputEvent]) {
        for event in events {
            match *event {
                InputEvent::WindowResize { width, height } => {
                    self.render_state.resize((width, height));
                }
                // Time spent unfocused must not turn into one huge step.
                InputEvent::Focused(false) => {
                    debug!("pausing step timer");
                    self.step_timer.pause();
                }
                InputEvent::Focused(true) => {
                    debug!("resuming step timer");
                    self.step_timer.unpause();
                }
                _ => {}
            }
        }
    }

    /// Runs one frame. Returns true once the game should end.
    pub fn update_once(&mut self, input_events: Vec<InputEvent>) -> Result<bool, RenderError> {
        self.handle_events(&input_events);

        // Prestep.
        let ts = timestamp_as_usecs();
        if self.update_state.prestep(input_events.iter()) {
            self.step_timer.stop();
            return Ok(true);
        }
        self.prestep_acc += timestamp_as_usecs() - ts;

        // Step.
        let ts = timestamp_as_usecs();
        if self.step_timer.is_paused() {
            self.update_state.step(0.);
        } else {
            let dt = clamp_step(self.step_timer.secs(), self.max_frame_delta);
            self.update_state.step(dt);
            self.step_timer.start();
        }
        self.step_acc += timestamp_as_usecs() - ts;

        // Poststep.
        let ts = timestamp_as_usecs();
        let game_frame = self.update_state.poststep();
        self.poststep_acc += timestamp_as_usecs() - ts;

        // Render.
        let ts = timestamp_as_usecs();
        self.render_state.render(game_frame)?;
        self.render_acc += timestamp_as_usecs() - ts;

        self.acc_n += 1;
        if self.acc_n > DIAGNOSTIC_FRAMES {
            let avg_ms = |acc: u64| (acc / self.acc_n) as f32 * 0.001;
            info!(
                frame_ms = avg_ms(self.prestep_acc + self.step_acc + self.poststep_acc + self.render_acc),
                prestep_ms = avg_ms(self.prestep_acc),
                step_ms = avg_ms(self.step_acc),
                poststep_ms = avg_ms(self.poststep_acc),
                render_ms = avg_ms(self.render_acc),
                mode = ?self.update_state.mode(),
                "frame timings"
            );
            self.prestep_acc = 0;
            self.step_acc = 0;
            self.poststep_acc = 0;
            self.render_acc = 0;
            self.acc_n = 0;
        }

        Ok(false)
    }
}

/// Elapsed seconds since the last step, capped so a stall cannot tunnel the actor.
fn clamp_step(elapsed: f32, max_frame_delta: f32) -> f32 {
    elapsed.clamp(0., max_frame_delta)
}
