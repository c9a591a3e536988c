//! Chart window: owns the winit event loop and turns window events into
//! resize/redraw signals. Close and Escape end the loop.

use anyhow::Result;
use std::sync::Arc;
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowBuilder},
};

/// Window configuration.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial width
    pub width: u32,
    /// Initial height
    pub height: u32,
    /// Enable VSync
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "barscape".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

/// What the viewer has to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSignal {
    /// Client area changed to `(width, height)` pixels.
    Resized((u32, u32)),
    /// The window wants a new frame.
    Redraw,
}

#[derive(Debug, PartialEq, Eq)]
enum Action {
    Exit,
    Signal(WindowSignal),
}

fn action_for(event: &WindowEvent) -> Option<Action> {
    match event {
        WindowEvent::CloseRequested => Some(Action::Exit),
        WindowEvent::KeyboardInput { event, .. }
            if event.state == ElementState::Pressed
                && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
        {
            Some(Action::Exit)
        }
        WindowEvent::Resized(size) => Some(Action::Signal(WindowSignal::Resized((
            size.width,
            size.height,
        )))),
        WindowEvent::RedrawRequested => Some(Action::Signal(WindowSignal::Redraw)),
        _ => None,
    }
}

/// A resizable window plus the event loop that drives it.
pub struct ChartWindow {
    window: Arc<Window>,
    event_loop: EventLoop<()>,
}

impl ChartWindow {
    /// Open a window described by `config`.
    pub fn open(config: &WindowConfig) -> Result<Self> {
        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(config.title.as_str())
            .with_inner_size(PhysicalSize::new(config.width.max(1), config.height.max(1)))
            .with_resizable(true)
            .build(&event_loop)?;
        tracing::debug!(width = config.width, height = config.height, "window opened");

        Ok(Self {
            window: Arc::new(window),
            event_loop,
        })
    }

    /// Shared handle for creating a GPU surface.
    pub fn window(&self) -> Arc<Window> {
        self.window.clone()
    }

    /// Current client area in pixels.
    pub fn size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    /// Pump events until the window is closed or `handler` fails.
    ///
    /// A redraw is requested every time the loop goes idle and after every
    /// resize, so the handler sees a steady stream of [`WindowSignal::Redraw`].
    pub fn run<F>(self, mut handler: F) -> Result<()>
    where
        F: FnMut(WindowSignal) -> Result<()>,
    {
        let window = self.window;
        let mut failure = None;

        self.event_loop.run(|event, elwt| match event {
            Event::WindowEvent { event, .. } => match action_for(&event) {
                Some(Action::Exit) => {
                    tracing::info!("window closing");
                    elwt.exit();
                }
                Some(Action::Signal(signal)) => {
                    if let Err(err) = handler(signal) {
                        failure = Some(err);
                        elwt.exit();
                    } else if matches!(signal, WindowSignal::Resized(_)) {
                        window.request_redraw();
                    }
                }
                None => {}
            },
            Event::AboutToWait => window.request_redraw(),
            _ => {}
        })?;

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_ends_the_loop() {
        assert_eq!(action_for(&WindowEvent::CloseRequested), Some(Action::Exit));
    }

    #[test]
    fn resize_and_redraw_become_signals() {
        assert_eq!(
            action_for(&WindowEvent::Resized(PhysicalSize::new(800, 600))),
            Some(Action::Signal(WindowSignal::Resized((800, 600))))
        );
        assert_eq!(
            action_for(&WindowEvent::RedrawRequested),
            Some(Action::Signal(WindowSignal::Redraw))
        );
    }

    #[test]
    fn unrelated_events_are_ignored() {
        assert_eq!(action_for(&WindowEvent::Focused(true)), None);
        assert_eq!(action_for(&WindowEvent::Moved(Default::default())), None);
    }
}
