use crate::math::prelude::*;
use crate::video::driver::SurfaceColors;
use crate::video::types::*;

/// Shadow of the state of one texture unit.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureUnitShadow {
    pub ty: Option<TextureType>,
    /// Driver name of the bound texture, 0 if none.
    pub texture: u32,
    pub addressing: Option<UVWAddressing>,
    pub min_filter: FilterOptions,
    pub mip_filter: FilterOptions,
    pub anisotropy: Option<f32>,
    pub color_blend: Option<LayerBlendModeEx>,
    pub alpha_blend: Option<LayerBlendModeEx>,
    pub coord_set: usize,
    pub coord_calc: TexCoordCalcMethod,
    /// Extra texture matrix required by the coordinate generation mode.
    pub auto_matrix: Option<Matrix4<f32>>,
}

impl Default for TextureUnitShadow {
    fn default() -> Self {
        TextureUnitShadow {
            ty: None,
            texture: 0,
            addressing: None,
            min_filter: FilterOptions::Linear,
            mip_filter: FilterOptions::Point,
            anisotropy: None,
            color_blend: None,
            alpha_blend: None,
            coord_set: 0,
            coord_calc: TexCoordCalcMethod::None,
            auto_matrix: None,
        }
    }
}

/// Scene blending as it was last applied. Factors and operations are equal for
/// color and alpha unless set separately.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SceneBlend {
    pub src: SceneBlendFactor,
    pub dst: SceneBlendFactor,
    pub src_alpha: SceneBlendFactor,
    pub dst_alpha: SceneBlendFactor,
    pub op: SceneBlendOperation,
    pub alpha_op: SceneBlendOperation,
}

impl SceneBlend {
    pub fn new(src: SceneBlendFactor, dst: SceneBlendFactor, op: SceneBlendOperation) -> Self {
        SceneBlend {
            src,
            dst,
            src_alpha: src,
            dst_alpha: dst,
            op,
            alpha_op: op,
        }
    }

    /// Returns true if the source simply replaces the destination.
    pub fn is_replace(&self) -> bool {
        self.src == SceneBlendFactor::One
            && self.dst == SceneBlendFactor::Zero
            && self.src_alpha == SceneBlendFactor::One
            && self.dst_alpha == SceneBlendFactor::Zero
    }
}

/// The state the driver is believed to be in. Every setter of the render
/// system writes through this shadow and skips driver calls that would not
/// change anything.
#[derive(Debug, Clone)]
pub struct ShadowState {
    pub units: Vec<TextureUnitShadow>,
    pub scene_blend: Option<SceneBlend>,
    pub depth_check: bool,
    pub depth_write: bool,
    pub depth_func: CompareFunction,
    pub depth_bias: (f32, f32),
    pub color_write: [bool; 4],
    pub stencil_check: bool,
    pub stencil_mask: u32,
    pub culling: CullingMode,
    pub polygon_mode: PolygonMode,
    pub shading: ShadeOptions,
    pub normalise_normals: bool,
    pub lighting: bool,
    pub ambient: Color,
    pub enabled_lights: usize,
    pub surface: Option<SurfaceColors>,
    pub fog: FogMode,
    pub alpha_to_coverage: bool,
    pub clip_planes: usize,
    pub world: Matrix4<f32>,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
}

impl ShadowState {
    pub fn new(num_units: usize) -> Self {
        ShadowState {
            units: vec![TextureUnitShadow::default(); num_units],
            scene_blend: None,
            depth_check: true,
            depth_write: true,
            depth_func: CompareFunction::LessEqual,
            depth_bias: (0.0, 0.0),
            color_write: [true; 4],
            stencil_check: false,
            stencil_mask: 0xFFFF_FFFF,
            culling: CullingMode::None,
            polygon_mode: PolygonMode::Solid,
            shading: ShadeOptions::Gouraud,
            normalise_normals: false,
            lighting: false,
            ambient: Color::black(),
            enabled_lights: 0,
            surface: None,
            fog: FogMode::None,
            alpha_to_coverage: false,
            clip_planes: 0,
            world: Matrix4::identity(),
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
        }
    }
}
