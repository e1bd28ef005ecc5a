use crate::math::prelude::*;

/// Enumeration for all light sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightType {
    /// Point light sources give off light equally in all directions.
    Point,
    /// Directional lights simulate parallel light beams from a distant source.
    Directional,
    /// Spotlights simulate a cone of light from a source.
    Spotlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub ty: LightType,
    pub diffuse: Color,
    pub specular: Color,
    /// World space position, ignored by directional lights.
    pub position: Vector3<f32>,
    /// World space direction, ignored by point lights.
    pub direction: Vector3<f32>,
    pub range: f32,
    pub attenuation_constant: f32,
    pub attenuation_linear: f32,
    pub attenuation_quadratic: f32,
    /// Inner and outer cone angles of a spotlight.
    pub spot_inner: Deg<f32>,
    pub spot_outer: Deg<f32>,
    pub spot_falloff: f32,
    pub power_scale: f32,
}

impl Default for Light {
    fn default() -> Self {
        Light {
            ty: LightType::Point,
            diffuse: Color::white(),
            specular: Color::black(),
            position: Vector3::new(0.0, 0.0, 0.0),
            direction: Vector3::new(0.0, 0.0, 1.0),
            range: 100_000.0,
            attenuation_constant: 1.0,
            attenuation_linear: 0.0,
            attenuation_quadratic: 0.0,
            spot_inner: Deg(30.0),
            spot_outer: Deg(40.0),
            spot_falloff: 1.0,
            power_scale: 1.0,
        }
    }
}

impl Light {
    /// A black light at the origin, used in place of lights that are not set.
    pub fn blank() -> Self {
        Light {
            diffuse: Color::black(),
            specular: Color::black(),
            attenuation_constant: 0.0,
            range: 0.0,
            ..Default::default()
        }
    }

    pub fn directional(direction: Vector3<f32>) -> Self {
        Light {
            ty: LightType::Directional,
            direction,
            ..Default::default()
        }
    }

    pub fn point(position: Vector3<f32>) -> Self {
        Light {
            ty: LightType::Point,
            position,
            ..Default::default()
        }
    }

    /// Gets the homogeneous form of this light, `w = 0` for directional lights
    /// (pointing towards the light) and `w = 1` for positional ones.
    pub fn as_4d_vector(&self) -> Vector4<f32> {
        match self.ty {
            LightType::Directional => {
                let d = -self.direction;
                Vector4::new(d.x, d.y, d.z, 0.0)
            }
            _ => self.position.extend(1.0),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn homogeneous() {
        let l = Light::directional(Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(l.as_4d_vector(), Vector4::new(0.0, 1.0, 0.0, 0.0));

        let l = Light::point(Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(l.as_4d_vector(), Vector4::new(1.0, 2.0, 3.0, 1.0));
    }
}
