use smallvec::SmallVec;

use crate::math::prelude::*;
use crate::scene::Frustum;
use crate::video::resource::texture::TextureHandle;
use crate::video::types::*;

/// Environment mapping variants.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnvMapType {
    /// Sphere mapping of a curved reflection.
    Curved,
    /// Planar reflection, cube mapping when available.
    Planar,
    /// Reflection vector based cube mapping.
    Reflection,
    /// Normal vector based cube mapping.
    Normal,
}

/// Effects that derive the texture coordinates of a unit.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TextureEffect {
    EnvironmentMap(EnvMapType),
    /// Projects the texture from a frustum, e.g. a spotlight.
    ProjectiveTexture(Frustum),
}

/// One texture layer of a pass, and how it blends with the layers before it.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureUnitState {
    name: String,
    texture: Option<TextureHandle>,
    texture_type: TextureType,
    coord_set: usize,
    addressing: UVWAddressing,
    min_filter: FilterOptions,
    mag_filter: FilterOptions,
    mip_filter: FilterOptions,
    anisotropy: f32,
    color_blend: LayerBlendModeEx,
    alpha_blend: LayerBlendModeEx,
    color_blend_fallback: (SceneBlendFactor, SceneBlendFactor),
    effects: SmallVec<[TextureEffect; 2]>,
    texture_matrix: Matrix4<f32>,
    border_color: Color,
}

impl TextureUnitState {
    pub fn new<T: Into<String>>(name: T) -> Self {
        TextureUnitState {
            name: name.into(),
            texture: None,
            texture_type: TextureType::TwoD,
            coord_set: 0,
            addressing: UVWAddressing::default(),
            min_filter: FilterOptions::Linear,
            mag_filter: FilterOptions::Linear,
            mip_filter: FilterOptions::Point,
            anisotropy: 1.0,
            color_blend: LayerBlendModeEx::new(LayerBlendType::Color),
            alpha_blend: LayerBlendModeEx::new(LayerBlendType::Alpha),
            color_blend_fallback: (SceneBlendFactor::DestColor, SceneBlendFactor::Zero),
            effects: SmallVec::new(),
            texture_matrix: Matrix4::identity(),
            border_color: Color::black(),
        }
    }

    /// The name of the texture this unit samples.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_texture<T: Into<String>>(&mut self, name: T, ty: TextureType) {
        self.name = name.into();
        self.texture_type = ty;
        self.texture = None;
    }

    /// The loaded texture, if it has been resolved.
    #[inline]
    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    pub fn set_texture_handle(&mut self, handle: Option<TextureHandle>) {
        self.texture = handle;
    }

    #[inline]
    pub fn texture_type(&self) -> TextureType {
        self.texture_type
    }

    /// Returns true if this unit samples a cube map.
    #[inline]
    pub fn is_cubic(&self) -> bool {
        self.texture_type == TextureType::CubeMap
    }

    #[inline]
    pub fn is_3d(&self) -> bool {
        self.texture_type == TextureType::ThreeD
    }

    #[inline]
    pub fn coord_set(&self) -> usize {
        self.coord_set
    }

    pub fn set_coord_set(&mut self, index: usize) {
        self.coord_set = index;
    }

    #[inline]
    pub fn addressing(&self) -> UVWAddressing {
        self.addressing
    }

    pub fn set_addressing(&mut self, addressing: UVWAddressing) {
        self.addressing = addressing;
    }

    pub fn filtering(&self, ft: FilterType) -> FilterOptions {
        match ft {
            FilterType::Min => self.min_filter,
            FilterType::Mag => self.mag_filter,
            FilterType::Mip => self.mip_filter,
        }
    }

    pub fn set_filtering(&mut self, ft: FilterType, filter: FilterOptions) {
        match ft {
            FilterType::Min => self.min_filter = filter,
            FilterType::Mag => self.mag_filter = filter,
            FilterType::Mip => self.mip_filter = filter,
        }
    }

    #[inline]
    pub fn anisotropy(&self) -> f32 {
        self.anisotropy
    }

    pub fn set_anisotropy(&mut self, anisotropy: f32) {
        self.anisotropy = anisotropy;
    }

    #[inline]
    pub fn color_blend(&self) -> &LayerBlendModeEx {
        &self.color_blend
    }

    #[inline]
    pub fn alpha_blend(&self) -> &LayerBlendModeEx {
        &self.alpha_blend
    }

    /// Sets a simple color operation, and the scene blend that approximates it
    /// when this unit has to be rendered in a separate pass.
    pub fn set_color_operation(&mut self, op: LayerBlendOperation) {
        self.color_blend = LayerBlendModeEx::from_operation(LayerBlendType::Color, op);

        let ty = match op {
            LayerBlendOperation::Replace => SceneBlendType::Replace,
            LayerBlendOperation::Add => SceneBlendType::Add,
            LayerBlendOperation::Modulate => SceneBlendType::Modulate,
            LayerBlendOperation::AlphaBlend => SceneBlendType::TransparentAlpha,
        };

        self.color_blend_fallback = ty.factors();
    }

    /// Sets a full color combine operation. The fallback scene blend is left
    /// untouched and should be set with `set_color_blend_fallback`.
    pub fn set_color_blend_mode(&mut self, mode: LayerBlendModeEx) {
        self.color_blend = LayerBlendModeEx {
            blend_type: LayerBlendType::Color,
            ..mode
        };
    }

    pub fn set_alpha_blend_mode(&mut self, mode: LayerBlendModeEx) {
        self.alpha_blend = LayerBlendModeEx {
            blend_type: LayerBlendType::Alpha,
            ..mode
        };
    }

    #[inline]
    pub fn color_blend_fallback(&self) -> (SceneBlendFactor, SceneBlendFactor) {
        self.color_blend_fallback
    }

    pub fn set_color_blend_fallback(&mut self, src: SceneBlendFactor, dst: SceneBlendFactor) {
        self.color_blend_fallback = (src, dst);
    }

    /// Enables or disables environment mapping. Other effects are kept.
    pub fn set_environment_map(&mut self, enabled: bool, ty: EnvMapType) {
        self.effects.retain(|v| !matches_env_map(v));

        if enabled {
            self.effects.push(TextureEffect::EnvironmentMap(ty));
        }
    }

    /// Enables projective texturing from `frustum`, or disables it with `None`.
    pub fn set_projective_texturing(&mut self, frustum: Option<Frustum>) {
        self.effects.retain(|v| matches_env_map(v));

        if let Some(frustum) = frustum {
            self.effects.push(TextureEffect::ProjectiveTexture(frustum));
        }
    }

    #[inline]
    pub fn effects(&self) -> &[TextureEffect] {
        &self.effects
    }

    /// How the render system should generate coordinates for this unit, and
    /// the projector required by projective texturing.
    pub fn coord_calculation(&self) -> (TexCoordCalcMethod, Option<&Frustum>) {
        let mut method = TexCoordCalcMethod::None;
        let mut projector = None;

        for v in self.effects.iter() {
            match *v {
                TextureEffect::EnvironmentMap(ty) => {
                    method = match ty {
                        EnvMapType::Curved => TexCoordCalcMethod::EnvironmentMap,
                        EnvMapType::Planar => TexCoordCalcMethod::EnvironmentMapPlanar,
                        EnvMapType::Reflection => TexCoordCalcMethod::EnvironmentMapReflection,
                        EnvMapType::Normal => TexCoordCalcMethod::EnvironmentMapNormal,
                    };
                }
                TextureEffect::ProjectiveTexture(ref frustum) => {
                    method = TexCoordCalcMethod::ProjectiveTexture;
                    projector = Some(frustum);
                }
            }
        }

        (method, projector)
    }

    #[inline]
    pub fn texture_matrix(&self) -> Matrix4<f32> {
        self.texture_matrix
    }

    pub fn set_texture_matrix(&mut self, m: Matrix4<f32>) {
        self.texture_matrix = m;
    }

    #[inline]
    pub fn border_color(&self) -> Color {
        self.border_color
    }

    pub fn set_border_color(&mut self, color: Color) {
        self.border_color = color;
    }
}

fn matches_env_map(effect: &TextureEffect) -> bool {
    match *effect {
        TextureEffect::EnvironmentMap(_) => true,
        _ => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn color_operation() {
        let mut unit = TextureUnitState::new("brick.png");
        unit.set_color_operation(LayerBlendOperation::Add);
        assert_eq!(unit.color_blend().operation, LayerBlendOperationEx::Add);
        assert_eq!(
            unit.color_blend_fallback(),
            (SceneBlendFactor::One, SceneBlendFactor::One)
        );

        unit.set_color_operation(LayerBlendOperation::AlphaBlend);
        assert_eq!(
            unit.color_blend_fallback(),
            (SceneBlendFactor::SourceAlpha, SceneBlendFactor::OneMinusSourceAlpha)
        );
    }

    #[test]
    fn effects() {
        let mut unit = TextureUnitState::new("sky.png");
        assert_eq!(unit.coord_calculation().0, TexCoordCalcMethod::None);

        unit.set_environment_map(true, EnvMapType::Reflection);
        assert_eq!(
            unit.coord_calculation().0,
            TexCoordCalcMethod::EnvironmentMapReflection
        );

        unit.set_environment_map(true, EnvMapType::Curved);
        assert_eq!(unit.effects().len(), 1);

        unit.set_environment_map(false, EnvMapType::Curved);
        assert!(unit.effects().is_empty());
    }
}
