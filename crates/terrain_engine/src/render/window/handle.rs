//! Application-facing window handle

use crate::core::config::WindowConfig;
use crate::input::{InputEvent, InputSnapshot};
use crate::render::opengl::{GlWindow, GlowDevice, WindowResult};

use super::backend::WindowBackend;

/// Window the viewer draws into
///
/// Wraps the backend so the application never touches GLFW directly. The
/// handle must outlive every GPU object created through the device returned
/// by [`WindowHandle::open`].
pub struct WindowHandle {
    backend: Box<dyn WindowBackend>,
}

impl WindowHandle {
    /// Open a window, make its context current and wrap the context in a device
    pub fn open(config: &WindowConfig) -> WindowResult<(Self, GlowDevice)> {
        let mut window = GlWindow::new(config)?;
        let device = GlowDevice::new(window.load_gl())?;
        Ok((Self { backend: Box::new(window) }, device))
    }

    /// Whether the loop should stop
    pub fn should_close(&self) -> bool {
        self.backend.should_close()
    }

    /// Ask the loop to stop after this frame
    pub fn request_close(&mut self) {
        self.backend.set_should_close(true);
    }

    /// Events since the previous call
    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        self.backend.poll_events()
    }

    /// Current cursor and movement key state
    pub fn input_snapshot(&self) -> InputSnapshot {
        self.backend.input_snapshot()
    }

    /// Drawable size in pixels
    pub fn framebuffer_size(&self) -> (u32, u32) {
        self.backend.framebuffer_size()
    }

    /// Replace the title bar text
    pub fn set_title(&mut self, title: &str) {
        self.backend.set_title(title);
    }

    /// Capture or release the mouse cursor
    pub fn set_cursor_captured(&mut self, captured: bool) {
        self.backend.set_cursor_captured(captured);
    }

    /// Present the frame
    pub fn swap_buffers(&mut self) {
        self.backend.swap_buffers();
    }
}
