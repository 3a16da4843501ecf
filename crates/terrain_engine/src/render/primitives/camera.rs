//! # Fly Camera
//!
//! Yaw/pitch camera used by the terrain viewer. Orientation is stored as two
//! angles rather than a target point so pointer movement maps directly onto
//! rotation and pitch can be clamped short of the poles.
//!
//! ## Conventions
//! - Right-handed, Y-up world space
//! - `yaw = 0` looks down +Z, `yaw = π` looks down -Z
//! - Positive pitch looks up
//! - Matrices follow OpenGL clip space (depth in `[-1, 1]`)

use crate::core::config::CameraConfig;
use crate::foundation::math::{constants, utils, Mat4, Mat4Ext, Vec3};

/// Pitch limit in degrees
pub const PITCH_LIMIT_DEGREES: f32 = 89.0;

/// Matrices derived from the camera once per frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMatrices {
    /// World to view
    pub view: Mat4,
    /// View to clip
    pub projection: Mat4,
    /// `projection * view`
    pub view_projection: Mat4,
    /// `projection * view * model`, with an identity model
    pub mvp: Mat4,
    /// `view * model`, with an identity model
    pub model_view: Mat4,
    /// View with its translation removed, for the skybox
    pub skybox_view: Mat4,
    /// Camera position in world space
    pub camera_position: Vec3,
}

/// Perspective fly camera
#[derive(Debug, Clone)]
pub struct Camera {
    /// Position in world space
    pub position: Vec3,
    yaw: f32,
    pitch: f32,
    fov: f32,
    aspect: f32,
    near: f32,
    far: f32,
}

impl Camera {
    /// Create a camera looking along `yaw`/`pitch` (radians)
    pub fn new(position: Vec3, yaw: f32, pitch: f32, fov_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            yaw,
            pitch: clamp_pitch(pitch),
            fov: utils::deg_to_rad(fov_degrees),
            aspect: 16.0 / 9.0,
            near,
            far,
        }
    }

    /// Camera at the configured starting pose
    pub fn from_config(config: &CameraConfig) -> Self {
        let [x, y, z] = config.position;
        Self::new(Vec3::new(x, y, z), config.yaw, config.pitch, config.fov_degrees, config.near, config.far)
    }

    /// Horizontal angle in radians
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Vertical angle in radians
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in radians
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Width / height of the framebuffer
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Unit view direction
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        )
    }

    /// Unit right vector, always horizontal
    pub fn right(&self) -> Vec3 {
        let angle = self.yaw - constants::HALF_PI;
        Vec3::new(angle.sin(), 0.0, angle.cos())
    }

    /// Camera up vector (`right × forward`)
    pub fn up(&self) -> Vec3 {
        self.right().cross(&self.forward())
    }

    /// Turn by the given angles; pitch stays within ±89°
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = clamp_pitch(self.pitch + delta_pitch);
    }

    /// Move by a world-space offset
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Update the aspect ratio from a framebuffer size.
    ///
    /// Zero-sized framebuffers (minimised windows) keep the previous ratio.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let aspect = width as f32 / height as f32;
        if (self.aspect - aspect).abs() > 0.01 {
            log::info!("Camera aspect ratio changed: {:.3} -> {:.3}", self.aspect, aspect);
        }
        self.aspect = aspect;
    }

    /// World to view transform
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.position + self.forward(), self.up())
    }

    /// View to clip transform
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov, self.aspect, self.near, self.far)
    }

    /// Every matrix the frame needs
    pub fn frame_matrices(&self) -> FrameMatrices {
        let view = self.view_matrix();
        let projection = self.projection_matrix();
        let view_projection = projection * view;
        let model = Mat4::identity();

        FrameMatrices {
            skybox_view: view.strip_translation(),
            mvp: view_projection * model,
            model_view: view * model,
            view,
            projection,
            view_projection,
            camera_position: self.position,
        }
    }
}

fn clamp_pitch(pitch: f32) -> f32 {
    let limit = utils::deg_to_rad(PITCH_LIMIT_DEGREES);
    pitch.clamp(-limit, limit)
}
