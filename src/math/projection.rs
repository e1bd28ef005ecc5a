use cgmath::{Matrix4, Rad};

/// Projections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    /// Orthographic projection.
    Ortho {
        /// The width of orthographic window.
        width: f32,
        /// The height of orthographic window.
        height: f32,
        /// The near clip plane.
        near: f32,
        /// The far clip plane.
        far: f32,
    },

    /// Perspective projection.
    Perspective {
        /// Field of view in vertical.
        fovy: Rad<f32>,
        /// The aspect of width / height.
        aspect: f32,
        /// The near clip plane.
        near: f32,
        /// The far clip plane.
        far: f32,
    },
}

impl Projection {
    pub fn ortho(width: f32, height: f32, near: f32, far: f32) -> Self {
        Projection::Ortho {
            width,
            height,
            near,
            far,
        }
    }

    pub fn perspective<T: Into<Rad<f32>>>(fovy: T, aspect: f32, near: f32, far: f32) -> Self {
        Projection::Perspective {
            fovy: fovy.into(),
            aspect,
            near,
            far,
        }
    }

    /// Returns true if the clip planes and extents describe a non-degenerate volume.
    pub fn is_valid(&self) -> bool {
        match *self {
            Projection::Perspective {
                fovy,
                aspect,
                near,
                far,
            } => {
                fovy.0 > 0.0
                    && fovy.0 < ::std::f32::consts::PI
                    && aspect > 0.0
                    && near > 0.0
                    && far > near
            }
            Projection::Ortho {
                width,
                height,
                near,
                far,
            } => width > 0.0 && height > 0.0 && far > near,
        }
    }

    #[inline]
    pub fn near(&self) -> f32 {
        match *self {
            Projection::Ortho { near, .. } | Projection::Perspective { near, .. } => near,
        }
    }

    #[inline]
    pub fn far(&self) -> f32 {
        match *self {
            Projection::Ortho { far, .. } | Projection::Perspective { far, .. } => far,
        }
    }

    /// Gets the projection matrix in the right-handed OpenGL convention.
    pub fn to_matrix(&self) -> Matrix4<f32> {
        match *self {
            Projection::Ortho {
                width,
                height,
                near,
                far,
            } => {
                let (hw, hh) = (width * 0.5, height * 0.5);
                cgmath::ortho(-hw, hw, -hh, hh, near, far)
            }
            Projection::Perspective {
                fovy,
                aspect,
                near,
                far,
            } => cgmath::perspective(fovy, aspect, near, far),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use cgmath::{Deg, Vector4};

    #[test]
    fn validate() {
        assert!(Projection::perspective(Deg(60.0), 1.0, 0.1, 100.0).is_valid());
        assert!(!Projection::perspective(Deg(60.0), 1.0, 10.0, 1.0).is_valid());
        assert!(!Projection::ortho(0.0, 1.0, 0.1, 1.0).is_valid());
    }

    #[test]
    fn ortho() {
        let m = Projection::ortho(4.0, 2.0, 1.0, 3.0).to_matrix();
        let v = m * Vector4::new(2.0, 1.0, -1.0, 1.0);
        assert!((v.x - 1.0).abs() < 1e-5);
        assert!((v.y - 1.0).abs() < 1e-5);
        assert!((v.z + 1.0).abs() < 1e-5);
    }
}
