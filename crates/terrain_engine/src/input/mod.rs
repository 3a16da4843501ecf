//! Keyboard and pointer input
//!
//! Window events are translated into backend-neutral [`InputEvent`]s by the
//! window layer. [`InputHandler`] turns key events into scene edits and
//! application requests, and drives the fly camera from the per-frame
//! [`InputSnapshot`] of held keys and cursor position.

use crate::foundation::math::Vec3;
use crate::core::config::CameraConfig;
use crate::render::primitives::Camera;
use crate::scene::{LightAxis, SceneState, Turn};

/// Keys the viewer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Quit
    Escape,
    /// Toggle wireframe
    Space,
    /// Toggle cursor capture
    Tab,
    /// Reload shaders
    R,
    /// Light about +X
    W,
    /// Light about -X
    S,
    /// Light about +Z
    A,
    /// Light about -Z
    D,
    /// Raise terrain
    T,
    /// Lower terrain
    G,
    /// Move forward
    Up,
    /// Move back
    Down,
    /// Strafe left
    Left,
    /// Strafe right
    Right,
    /// Move up
    PageUp,
    /// Move down
    PageDown,
    /// Anything else
    Other,
}

/// Key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Key went down
    Press,
    /// Key held long enough to auto-repeat
    Repeat,
    /// Key went up
    Release,
}

/// Window input events
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Keyboard transition
    Key {
        /// Key
        key: KeyCode,
        /// Transition
        action: KeyAction,
    },
    /// Framebuffer size changed (pixels)
    FramebufferResized {
        /// New width
        width: u32,
        /// New height
        height: u32,
    },
    /// The window close button was pressed
    CloseRequested,
}

/// A key binding resolved to an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Leave the frame loop
    Quit,
    /// Flip the terrain fill mode
    ToggleWireframe,
    /// Rebuild shader programs from disk
    ReloadShaders,
    /// Grab or release the cursor
    ToggleCursorCapture,
    /// Rotate the light one step
    RotateLight(LightAxis, Turn),
    /// Height scale up one step
    RaiseHeightScale,
    /// Height scale down one step
    LowerHeightScale,
}

impl Command {
    /// Resolve a key transition.
    ///
    /// Toggles fire on press only; light and height keys also fire on
    /// auto-repeat so holding them keeps adjusting.
    pub fn from_key(key: KeyCode, action: KeyAction) -> Option<Self> {
        let pressed = action == KeyAction::Press;
        let held = pressed || action == KeyAction::Repeat;

        match key {
            KeyCode::Escape if pressed => Some(Self::Quit),
            KeyCode::Space if pressed => Some(Self::ToggleWireframe),
            KeyCode::R if pressed => Some(Self::ReloadShaders),
            KeyCode::Tab if pressed => Some(Self::ToggleCursorCapture),
            KeyCode::W if held => Some(Self::RotateLight(LightAxis::X, Turn::Forward)),
            KeyCode::S if held => Some(Self::RotateLight(LightAxis::X, Turn::Back)),
            KeyCode::A if held => Some(Self::RotateLight(LightAxis::Z, Turn::Forward)),
            KeyCode::D if held => Some(Self::RotateLight(LightAxis::Z, Turn::Back)),
            KeyCode::T if held => Some(Self::RaiseHeightScale),
            KeyCode::G if held => Some(Self::LowerHeightScale),
            _ => None,
        }
    }
}

/// Requests the handler cannot satisfy on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    /// Close the window and leave the loop
    Quit,
    /// Rebuild shader programs
    ReloadShaders,
    /// Set cursor capture to the given state
    CaptureCursor(bool),
    /// Resize the viewport and camera aspect
    Resized {
        /// Framebuffer width
        width: u32,
        /// Framebuffer height
        height: u32,
    },
}

/// Movement keys currently held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MovementKeys {
    /// Arrow up
    pub forward: bool,
    /// Arrow down
    pub backward: bool,
    /// Arrow right
    pub right: bool,
    /// Arrow left
    pub left: bool,
    /// Page up
    pub up: bool,
    /// Page down
    pub down: bool,
}

impl MovementKeys {
    /// Sum of the held directions in the camera basis (not normalised)
    pub fn direction(&self, camera: &Camera) -> Vec3 {
        let axis = |positive: bool, negative: bool| -> f32 {
            f32::from(u8::from(positive)) - f32::from(u8::from(negative))
        };
        camera.forward() * axis(self.forward, self.backward)
            + camera.right() * axis(self.right, self.left)
            + camera.up() * axis(self.up, self.down)
    }
}

/// Polled input for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSnapshot {
    /// Cursor position in screen coordinates
    pub cursor: (f64, f64),
    /// Held movement keys
    pub movement: MovementKeys,
}

/// Cursor movement since the previous frame
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    last: Option<(f64, f64)>,
}

impl PointerTracker {
    /// Delta from the last sample; the first sample after a reset is zero
    pub fn delta(&mut self, position: (f64, f64)) -> (f64, f64) {
        let delta = match self.last {
            Some((x, y)) => (position.0 - x, position.1 - y),
            None => (0.0, 0.0),
        };
        self.last = Some(position);
        delta
    }

    /// Forget the last sample
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Applies pointer and movement input to the camera
#[derive(Debug, Clone)]
pub struct CameraController {
    speed: f32,
    sensitivity: f32,
    captured: bool,
    pointer: PointerTracker,
}

impl CameraController {
    /// Controller with the configured speed and sensitivity; starts captured
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            speed: config.speed,
            sensitivity: config.mouse_sensitivity,
            captured: true,
            pointer: PointerTracker::default(),
        }
    }

    /// Whether pointer movement turns the camera
    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Change capture; the first pointer delta after re-capture is dropped
    pub fn set_captured(&mut self, captured: bool) {
        if captured && !self.captured {
            self.pointer.reset();
        }
        self.captured = captured;
    }

    /// Turn and move the camera for a frame of `dt` seconds
    pub fn update(&mut self, camera: &mut Camera, input: &InputSnapshot, dt: f32) {
        if self.captured {
            let (dx, dy) = self.pointer.delta(input.cursor);
            camera.rotate(-self.sensitivity * dx as f32, -self.sensitivity * dy as f32);
        }

        let direction = input.movement.direction(camera);
        camera.translate(direction * self.speed * dt);

        log::trace!(
            "Camera at {:?}, yaw {:.3}, pitch {:.3}",
            camera.position,
            camera.yaw(),
            camera.pitch()
        );
    }
}

/// Single writer of camera and scene state
#[derive(Debug, Clone)]
pub struct InputHandler {
    controller: CameraController,
}

impl InputHandler {
    /// Handler for the given camera constants
    pub fn new(camera: &CameraConfig) -> Self {
        Self {
            controller: CameraController::from_config(camera),
        }
    }

    /// Camera controller
    pub fn controller(&self) -> &CameraController {
        &self.controller
    }

    /// Apply one window event.
    ///
    /// Scene edits happen here; anything involving the window or GPU is
    /// returned as an [`AppAction`].
    pub fn handle_event(&mut self, event: &InputEvent, scene: &mut SceneState) -> Option<AppAction> {
        match *event {
            InputEvent::CloseRequested => Some(AppAction::Quit),
            InputEvent::FramebufferResized { width, height } => Some(AppAction::Resized { width, height }),
            InputEvent::Key { key, action } => {
                let command = Command::from_key(key, action)?;
                self.apply(command, scene)
            }
        }
    }

    fn apply(&mut self, command: Command, scene: &mut SceneState) -> Option<AppAction> {
        match command {
            Command::Quit => return Some(AppAction::Quit),
            Command::ReloadShaders => return Some(AppAction::ReloadShaders),
            Command::ToggleCursorCapture => {
                let captured = !self.controller.is_captured();
                self.controller.set_captured(captured);
                return Some(AppAction::CaptureCursor(captured));
            }
            Command::ToggleWireframe => scene.toggle_wireframe(),
            Command::RotateLight(axis, turn) => scene.rotate_light(axis, turn),
            Command::RaiseHeightScale => scene.raise_height_scale(),
            Command::LowerHeightScale => scene.lower_height_scale(),
        }
        None
    }

    /// Per-frame camera update
    pub fn update_camera(&mut self, camera: &mut Camera, input: &InputSnapshot, dt: f32) {
        self.controller.update(camera, input, dt);
    }
}
