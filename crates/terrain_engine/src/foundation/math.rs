//! Math utilities and types
//!
//! Provides the fundamental math types used by the camera, the scene light and
//! the frame renderer. All matrices follow OpenGL conventions: right-handed view
//! space, camera looking down -Z, clip-space depth in [-1, 1].

pub use nalgebra::{Matrix3, Matrix4, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }
}

/// Extension trait for Mat4 with the transforms the renderer needs
pub trait Mat4Ext {
    /// Create a rotation matrix around the X axis
    fn rotation_x(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Z axis
    fn rotation_z(angle: f32) -> Mat4;

    /// Create an OpenGL perspective projection matrix (depth mapped to [-1, 1])
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;

    /// Keep only the rotation part of a transform.
    ///
    /// The upper-left 3x3 block is copied into an identity 4x4, dropping the
    /// translation column. Used for the skybox so the cube stays centred on
    /// the camera.
    fn strip_translation(&self) -> Mat4;

    /// Column-major array layout expected by `glUniformMatrix4fv`
    fn to_column_array(&self) -> [f32; 16];
}

impl Mat4Ext for Mat4 {
    fn rotation_x(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), angle)
    }

    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }

    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_perspective(aspect, fov_y, near, far)
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &up)
    }

    fn strip_translation(&self) -> Mat4 {
        let rotation: Mat3 = self.fixed_view::<3, 3>(0, 0).into_owned();
        rotation.to_homogeneous()
    }

    fn to_column_array(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(self.as_slice());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn strip_translation_keeps_rotation_only() {
        let view = Mat4::look_at(
            Vec3::new(3.0, 2.0, 5.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::y(),
        );
        let stripped = view.strip_translation();

        assert_relative_eq!(stripped[(0, 3)], 0.0);
        assert_relative_eq!(stripped[(1, 3)], 0.0);
        assert_relative_eq!(stripped[(2, 3)], 0.0);
        assert_relative_eq!(stripped[(3, 3)], 1.0);
        for row in 0..3 {
            for col in 0..3 {
                assert_relative_eq!(stripped[(row, col)], view[(row, col)]);
            }
        }
    }

    #[test]
    fn perspective_maps_near_plane_to_minus_one() {
        let projection = Mat4::perspective(utils::deg_to_rad(45.0), 16.0 / 9.0, 0.1, 100.0);
        let clip = projection * nalgebra::Vector4::new(0.0, 0.0, -0.1, 1.0);
        assert_relative_eq!(clip.z / clip.w, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn column_array_is_column_major() {
        let translation = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
        let columns = translation.to_column_array();
        assert_eq!(&columns[12..15], &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn degrees_convert_to_radians() {
        assert_relative_eq!(utils::deg_to_rad(180.0), constants::PI);
        assert_relative_eq!(utils::deg_to_rad(90.0), constants::HALF_PI);
        assert_relative_eq!(utils::deg_to_rad(-45.0), -constants::PI / 4.0);
    }
}
