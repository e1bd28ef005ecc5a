//! This module contains the math utils that mainly comes from `cgmath`.

pub use cgmath::*;

pub mod color;
pub use self::color::Color;

pub mod projection;
pub use self::projection::Projection;

/// A plane in the form `normal.dot(p) + d = 0`, used by user clip planes.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub normal: Vector3<f32>,
    pub d: f32,
}

impl Plane {
    pub fn new(normal: Vector3<f32>, d: f32) -> Self {
        Plane { normal, d }
    }

    /// Returns the equation coefficients `[a, b, c, d]`.
    pub fn coefficients(&self) -> [f64; 4] {
        [
            f64::from(self.normal.x),
            f64::from(self.normal.y),
            f64::from(self.normal.z),
            f64::from(self.d),
        ]
    }
}

/// Matrix that maps clip-space `[-1, 1]` coordinates into image space `[0, 1]`,
/// with the y axis flipped.
pub fn clip_space_to_image_space() -> Matrix4<f32> {
    Matrix4::new(
        0.5, 0.0, 0.0, 0.0, //
        0.0, -0.5, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.5, 0.5, 0.0, 1.0,
    )
}

/// Returns the inverse of `m`, or identity if `m` is singular.
#[inline]
pub fn invert_or_identity(m: Matrix4<f32>) -> Matrix4<f32> {
    m.invert().unwrap_or_else(Matrix4::identity)
}

pub mod prelude {
    pub use super::{Color, Plane, Projection};
    pub use cgmath::prelude::*;
    pub use cgmath::{Deg, Matrix3, Matrix4, Point3, Quaternion, Rad, Vector3, Vector4};
}
