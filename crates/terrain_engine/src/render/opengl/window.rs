//! Window management using GLFW
//!
//! Creates an OpenGL 4.5 core, forward-compatible context and translates
//! GLFW events into [`InputEvent`]s.

use glfw::{Action, Context, CursorMode, Key, WindowEvent};
use thiserror::Error;

use crate::core::config::WindowConfig;
use crate::input::{InputEvent, InputSnapshot, KeyAction, KeyCode, MovementKeys};
use crate::render::api::DeviceError;
use crate::render::window::backend::WindowBackend;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW could not start
    #[error("GLFW initialization failed: {0}")]
    InitializationFailed(String),

    /// No window or context with the requested version
    #[error("Window creation failed ({width}x{height}, OpenGL {major}.{minor} core)")]
    CreationFailed {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Requested major version
        major: u32,
        /// Requested minor version
        minor: u32,
    },

    /// The context was created but cannot run the renderer
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;

/// Requested context version
pub const GL_VERSION: (u32, u32) = (4, 5);

/// GLFW window with a current OpenGL context
pub struct GlWindow {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, WindowEvent)>,
}

impl GlWindow {
    /// Open the window and make its context current.
    ///
    /// The cursor starts disabled (captured) and keys are sticky, so a
    /// press between two polls is still seen by the next key query.
    pub fn new(config: &WindowConfig) -> WindowResult<Self> {
        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|e| WindowError::InitializationFailed(format!("{:?}", e)))?;

        let (major, minor) = GL_VERSION;
        glfw.window_hint(glfw::WindowHint::ContextVersion(major, minor));
        glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core));
        glfw.window_hint(glfw::WindowHint::Resizable(true));

        let (mut window, events) = glfw
            .create_window(config.width, config.height, &config.title, glfw::WindowMode::Windowed)
            .ok_or(WindowError::CreationFailed {
                width: config.width,
                height: config.height,
                major,
                minor,
            })?;

        window.make_current();
        window.set_key_polling(true);
        window.set_close_polling(true);
        window.set_framebuffer_size_polling(true);
        window.set_sticky_keys(true);
        window.set_cursor_mode(CursorMode::Disabled);
        glfw.set_swap_interval(glfw::SwapInterval::Sync(1));

        log::info!("Created {}x{} window with OpenGL {}.{} core context", config.width, config.height, major, minor);

        Ok(Self { glfw, window, events })
    }

    /// Load GL function pointers from the current context
    pub fn load_gl(&mut self) -> glow::Context {
        let window = &mut self.window;
        // SAFETY: the context was made current in `new` and stays current
        // on this thread for the lifetime of the window.
        unsafe { glow::Context::from_loader_function(|name| window.get_proc_address(name) as *const _) }
    }

    fn key_down(&self, key: Key) -> bool {
        matches!(self.window.get_key(key), Action::Press | Action::Repeat)
    }
}

impl WindowBackend for GlWindow {
    fn should_close(&self) -> bool {
        self.window.should_close()
    }

    fn set_should_close(&mut self, should_close: bool) {
        self.window.set_should_close(should_close);
    }

    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.glfw.poll_events();
        glfw::flush_messages(&self.events)
            .filter_map(|(_, event)| translate_event(&event))
            .collect()
    }

    fn input_snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            cursor: self.window.get_cursor_pos(),
            movement: MovementKeys {
                forward: self.key_down(Key::Up),
                backward: self.key_down(Key::Down),
                right: self.key_down(Key::Right),
                left: self.key_down(Key::Left),
                up: self.key_down(Key::PageUp),
                down: self.key_down(Key::PageDown),
            },
        }
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_framebuffer_size();
        (width.max(0) as u32, height.max(0) as u32)
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    fn set_cursor_captured(&mut self, captured: bool) {
        self.window.set_cursor_mode(if captured { CursorMode::Disabled } else { CursorMode::Normal });
    }

    fn swap_buffers(&mut self) {
        self.window.swap_buffers();
    }
}

/// Map a GLFW event onto the events the viewer handles
pub fn translate_event(event: &WindowEvent) -> Option<InputEvent> {
    match *event {
        WindowEvent::Key(key, _, action, _) => Some(InputEvent::Key {
            key: translate_key(key),
            action: translate_action(action),
        }),
        WindowEvent::FramebufferSize(width, height) => Some(InputEvent::FramebufferResized {
            width: width.max(0) as u32,
            height: height.max(0) as u32,
        }),
        WindowEvent::Close => Some(InputEvent::CloseRequested),
        _ => None,
    }
}

fn translate_key(key: Key) -> KeyCode {
    match key {
        Key::Escape => KeyCode::Escape,
        Key::Space => KeyCode::Space,
        Key::Tab => KeyCode::Tab,
        Key::R => KeyCode::R,
        Key::W => KeyCode::W,
        Key::S => KeyCode::S,
        Key::A => KeyCode::A,
        Key::D => KeyCode::D,
        Key::T => KeyCode::T,
        Key::G => KeyCode::G,
        Key::Up => KeyCode::Up,
        Key::Down => KeyCode::Down,
        Key::Left => KeyCode::Left,
        Key::Right => KeyCode::Right,
        Key::PageUp => KeyCode::PageUp,
        Key::PageDown => KeyCode::PageDown,
        _ => KeyCode::Other,
    }
}

fn translate_action(action: Action) -> KeyAction {
    match action {
        Action::Press => KeyAction::Press,
        Action::Repeat => KeyAction::Repeat,
        Action::Release => KeyAction::Release,
    }
}
