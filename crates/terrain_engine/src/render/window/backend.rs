//! Window backend trait
//!
//! What the frame loop needs from a window, kept free of GLFW types so the
//! input and render modules never see them.

use crate::input::{InputEvent, InputSnapshot};

/// Window operations used by [`WindowHandle`](super::WindowHandle)
///
/// All calls happen on the main thread; implementations need not be `Send`.
pub(crate) trait WindowBackend {
    /// User or application asked the window to close
    fn should_close(&self) -> bool;

    /// Request (or cancel) closing
    fn set_should_close(&mut self, should_close: bool);

    /// Pump the platform queue and return the events the viewer handles
    fn poll_events(&mut self) -> Vec<InputEvent>;

    /// Cursor position and held movement keys, sampled now
    fn input_snapshot(&self) -> InputSnapshot;

    /// Drawable size in pixels
    fn framebuffer_size(&self) -> (u32, u32);

    /// Title bar text
    fn set_title(&mut self, title: &str);

    /// Hide and lock the cursor (`true`) or release it
    fn set_cursor_captured(&mut self, captured: bool);

    /// Present the back buffer
    fn swap_buffers(&mut self);
}
