//! A device through which the player views the world.

use crate::math::prelude::*;

/// A `Camera` is a device through which the player views the world. The
/// render system only cares about its transforms and clip distances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    position: Point3<f32>,
    rotation: Quaternion<f32>,
    projection: Projection,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            position: Point3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            projection: Projection::perspective(Deg(60.0), 1.0, 0.1, 1000.0),
        }
    }
}

impl Camera {
    pub fn new(projection: Projection) -> Self {
        Camera {
            projection,
            ..Default::default()
        }
    }

    #[inline]
    pub fn set_position(&mut self, position: Point3<f32>) {
        self.position = position;
    }

    #[inline]
    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    #[inline]
    pub fn set_rotation(&mut self, rotation: Quaternion<f32>) {
        self.rotation = rotation;
    }

    #[inline]
    pub fn rotation(&self) -> Quaternion<f32> {
        self.rotation
    }

    #[inline]
    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
    }

    #[inline]
    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection.to_matrix()
    }

    /// Gets the world-to-view transform.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        let rotation = Matrix4::from(self.rotation.conjugate());
        let translation = Matrix4::from_translation(-self.position.to_vec());
        rotation * translation
    }

    /// The direction the camera looks at, in world space.
    pub fn direction(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(-Vector3::unit_z())
    }

    pub fn up(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(Vector3::unit_y())
    }

    pub fn right(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(Vector3::unit_x())
    }

    #[inline]
    pub fn near(&self) -> f32 {
        self.projection.near()
    }

    #[inline]
    pub fn far(&self) -> f32 {
        self.projection.far()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn view() {
        let mut camera = Camera::default();
        camera.set_position(Point3::new(0.0, 0.0, 5.0));

        let v = camera.view_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((v.z + 5.0).abs() < 1e-5);

        let d = camera.direction();
        assert!((d.z + 1.0).abs() < 1e-5);
    }
}
