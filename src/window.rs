use crate::shared::Direction;
use std::sync::Arc;
use std::time::Duration;
use winit::dpi::PhysicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::WindowBuilder;

pub struct EventLoop {
    event_loop: winit::event_loop::EventLoop<()>,
}

impl EventLoop {
    pub fn new() -> Result<Self, EventLoopError> {
        Ok(Self {
            event_loop: winit::event_loop::EventLoop::new()?,
        })
    }

    /// Drains pending window events without blocking.
    pub fn poll(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let status = self
            .event_loop
            .pump_events(Some(Duration::ZERO), |event, _| match event {
                Event::WindowEvent { event, .. } => events.extend(translate(event)),
                _ => {}
            });

        if let PumpStatus::Exit(_) = status {
            events.push(InputEvent::WindowClose);
        }
        events
    }
}

pub struct Window {
    pub window: Arc<winit::window::Window>,
}

impl Window {
    pub fn new(event_loop: &EventLoop, title: &str, w: u32, h: u32) -> Result<Self, OsError> {
        let window = WindowBuilder::new()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(w, h))
            .with_resizable(false)
            .build(&event_loop.event_loop)?;

        Ok(Self {
            window: Arc::new(window),
        })
    }

    pub fn size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }
}

fn translate(event: WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::CloseRequested | WindowEvent::Destroyed => Some(InputEvent::WindowClose),
        WindowEvent::Resized(size) => Some(InputEvent::WindowResize {
            width: size.width,
            height: size.height,
        }),
        WindowEvent::Focused(focused) => Some(InputEvent::Focused(focused)),
        WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(code),
                    state,
                    repeat,
                    ..
                },
            ..
        } => {
            let direction = direction_for(code)?;
            let press_state = match (state, repeat) {
                (ElementState::Released, _) => PressState::Up,
                (ElementState::Pressed, false) => PressState::Down,
                (ElementState::Pressed, true) => PressState::DownRepeat,
            };
            Some(InputEvent::KeyboardInput {
                direction,
                press_state,
            })
        }
        _ => None,
    }
}

fn direction_for(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::ArrowUp | KeyCode::KeyW => Some(Direction::Up),
        KeyCode::ArrowDown | KeyCode::KeyS => Some(Direction::Down),
        KeyCode::ArrowLeft | KeyCode::KeyA => Some(Direction::Left),
        KeyCode::ArrowRight | KeyCode::KeyD => Some(Direction::Right),
        _ => None,
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PressState {
    Up,
    Down,
    DownRepeat,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InputEvent {
    KeyboardInput {
        direction: Direction,
        press_state: PressState,
    },
    WindowResize {
        width: u32,
        height: u32,
    },
    Focused(bool),
    WindowClose,
}
