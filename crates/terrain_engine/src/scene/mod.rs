//! Scene parameters the user edits at runtime
//!
//! The directional light, the heightmap displacement multiplier and the
//! wireframe flag. The input handler is the only writer; the frame renderer
//! reads them once per frame.

use crate::core::config::SceneConfig;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// Axis the light rotates about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightAxis {
    /// World X
    X,
    /// World Z
    Z,
}

/// Rotation sense of one light step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// `+step`
    Forward,
    /// `360° - step`
    Back,
}

/// Light, height scale and fill mode
#[derive(Debug, Clone, PartialEq)]
pub struct SceneState {
    light_direction: Vec3,
    height_scale: f32,
    wireframe: bool,
    light_step_degrees: f32,
    height_scale_step: f32,
}

impl SceneState {
    /// Initial state from config
    pub fn from_config(config: &SceneConfig) -> Self {
        let [x, y, z] = config.light_direction;
        Self {
            light_direction: Vec3::new(x, y, z),
            height_scale: config.height_scale.max(0.0),
            wireframe: false,
            light_step_degrees: config.light_step_degrees,
            height_scale_step: config.height_scale_step,
        }
    }

    /// Directional light vector, as uploaded to `lightPos`
    pub fn light_direction(&self) -> Vec3 {
        self.light_direction
    }

    /// Heightmap displacement multiplier (never negative)
    pub fn height_scale(&self) -> f32 {
        self.height_scale
    }

    /// Whether the terrain is drawn as lines
    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    /// Rotate the light one step about `axis`.
    ///
    /// Stepping back rotates by the complement of the step, so one step
    /// forward followed by one back returns the original vector.
    pub fn rotate_light(&mut self, axis: LightAxis, turn: Turn) {
        let degrees = match turn {
            Turn::Forward => self.light_step_degrees,
            Turn::Back => 360.0 - self.light_step_degrees,
        };
        let angle = utils::deg_to_rad(degrees);
        let rotation = match axis {
            LightAxis::X => Mat4::rotation_x(angle),
            LightAxis::Z => Mat4::rotation_z(angle),
        };
        self.light_direction = rotation.transform_vector(&self.light_direction);
        log::debug!("Light direction: {:?}", self.light_direction);
    }

    /// Increase the height scale by one step
    pub fn raise_height_scale(&mut self) {
        self.height_scale += self.height_scale_step;
        log::debug!("Height scale: {:.2}", self.height_scale);
    }

    /// Decrease the height scale by one step, stopping at zero
    pub fn lower_height_scale(&mut self) {
        self.height_scale = (self.height_scale - self.height_scale_step).max(0.0);
        log::debug!("Height scale: {:.2}", self.height_scale);
    }

    /// Flip between filled and wireframe terrain
    pub fn toggle_wireframe(&mut self) {
        self.wireframe = !self.wireframe;
        log::info!("Wireframe {}", if self.wireframe { "on" } else { "off" });
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::from_config(&SceneConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn height_scale_steps() {
        let mut scene = SceneState::default();
        for _ in 0..5 {
            scene.raise_height_scale();
        }
        for _ in 0..3 {
            scene.lower_height_scale();
        }
        assert_relative_eq!(scene.height_scale(), 1.2, epsilon = 1e-5);
    }

    #[test]
    fn height_scale_never_negative() {
        let mut scene = SceneState::default();
        for _ in 0..25 {
            scene.lower_height_scale();
        }
        assert_eq!(scene.height_scale(), 0.0);
        scene.raise_height_scale();
        assert_relative_eq!(scene.height_scale(), 0.1, epsilon = 1e-6);
    }

    #[test]
    fn forward_then_back_restores_light() {
        for axis in [LightAxis::X, LightAxis::Z] {
            let mut scene = SceneState::default();
            let original = scene.light_direction();
            scene.rotate_light(axis, Turn::Forward);
            assert!((scene.light_direction() - original).norm() > 1e-3);
            scene.rotate_light(axis, Turn::Back);
            assert_relative_eq!(scene.light_direction(), original, epsilon = 1e-5);
        }
    }

    #[test]
    fn rotation_about_x_keeps_x_component() {
        let mut scene = SceneState::default();
        scene.rotate_light(LightAxis::X, Turn::Forward);
        let light = scene.light_direction();
        assert_relative_eq!(light.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(light.norm(), Vec3::new(0.0, -0.5, -0.5).norm(), epsilon = 1e-6);
    }

    #[test]
    fn wireframe_parity() {
        let mut scene = SceneState::default();
        for _ in 0..4 {
            scene.toggle_wireframe();
        }
        assert!(!scene.wireframe());
        scene.toggle_wireframe();
        assert!(scene.wireframe());
    }
}
