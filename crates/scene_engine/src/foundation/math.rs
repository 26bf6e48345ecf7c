//! Math utilities and types
//!
//! Thin layer over nalgebra providing the vector, matrix and quaternion types
//! used by components and the camera, plus the projection constructors the
//! camera cache is built from.

pub use nalgebra::{
    Vector3, Vector4,
    Matrix4,
    Quaternion,
    Unit,
    Isometry3,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Rigid transform (rotation + translation)
pub type Iso3 = Isometry3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Below this length a vector is treated as zero
    pub const EPSILON: f32 = 1e-6;
}

/// Math utility functions
pub mod utils {
    use super::*;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Build a rotation of `angle_degrees` around `axis`
    ///
    /// Returns `None` when the axis has (near) zero length.
    pub fn axis_angle(axis: &Vec3, angle_degrees: f32) -> Option<Quat> {
        Unit::try_new(*axis, constants::EPSILON)
            .map(|axis| Quat::from_axis_angle(&axis, deg_to_rad(angle_degrees)))
    }

    /// Normalize a vector, leaving zero-length vectors untouched
    pub fn normalize_or_zero(v: &Vec3) -> Vec3 {
        v.try_normalize(constants::EPSILON).unwrap_or_else(Vec3::zeros)
    }
}

/// Extension trait for Mat4 with the projection constructors
///
/// All matrices follow the right-handed, column-vector OpenGL convention:
/// the camera looks down view-space -Z and clip-space depth spans [-1, 1].
pub trait Mat4Ext {
    /// Create a perspective projection matrix (`fov_y` in radians)
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create an orthographic projection matrix from the box bounds
    fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let tan_half_fovy = (fov_y * 0.5).tan();

        // P = [1/(a·t)  0     0            0          ]
        //     [0        1/t   0            0          ]
        //     [0        0     (f+n)/(n-f)  2fn/(n-f)  ]
        //     [0        0     -1           0          ]
        let mut result = Mat4::zeros();
        result[(0, 0)] = 1.0 / (aspect * tan_half_fovy);
        result[(1, 1)] = 1.0 / tan_half_fovy;
        result[(2, 2)] = (far + near) / (near - far);
        result[(2, 3)] = (2.0 * far * near) / (near - far);
        result[(3, 2)] = -1.0;
        result
    }

    fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        let width = right - left;
        let height = top - bottom;
        let depth = far - near;

        Mat4::new(
            2.0 / width, 0.0, 0.0, -(right + left) / width,
            0.0, 2.0 / height, 0.0, -(top + bottom) / height,
            0.0, 0.0, -2.0 / depth, -(far + near) / depth,
            0.0, 0.0, 0.0, 1.0,
        )
    }
}
