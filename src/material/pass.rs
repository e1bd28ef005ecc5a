use std::sync::Arc;

use crate::errors::*;
use crate::math::prelude::*;
use crate::scene::LightType;
use crate::video::program::{GpuProgram, GpuProgramParametersPtr};
use crate::video::types::*;

use super::texture_unit::TextureUnitState;

/// A program used by a pass, with the constants the pass binds to it. The
/// parameters are shared between clones of the pass.
#[derive(Debug, Clone)]
pub struct GpuProgramUsage {
    pub program: Arc<GpuProgram>,
    pub params: GpuProgramParametersPtr,
}

impl GpuProgramUsage {
    pub fn new(program: Arc<GpuProgram>, params: GpuProgramParametersPtr) -> Self {
        GpuProgramUsage { program, params }
    }
}

/// One draw submission worth of fixed-function or programmable state.
#[derive(Debug, Clone)]
pub struct Pass {
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub emissive: Color,
    pub shininess: f32,
    pub tracking: TrackVertexColor,

    pub lighting: bool,
    /// Renders this pass once for every light affecting the object.
    pub iterate_per_light: bool,
    /// Restricts per-light iteration to one type of light.
    pub only_light_type: Option<LightType>,
    pub max_lights: usize,
    pub start_light: usize,

    pub src_blend: SceneBlendFactor,
    pub dst_blend: SceneBlendFactor,
    pub src_blend_alpha: SceneBlendFactor,
    pub dst_blend_alpha: SceneBlendFactor,
    pub separate_blend: bool,
    pub blend_operation: SceneBlendOperation,
    pub alpha_blend_operation: SceneBlendOperation,

    pub depth_check: bool,
    pub depth_write: bool,
    pub depth_func: CompareFunction,
    pub depth_bias: (f32, f32),
    pub color_write: bool,

    pub alpha_reject_func: CompareFunction,
    pub alpha_reject_value: u8,
    pub alpha_to_coverage: bool,

    pub culling: CullingMode,
    pub shading: ShadeOptions,
    pub polygon_mode: PolygonMode,
    pub normalise_normals: bool,
    /// Overrides the fog of the scene.
    pub fog_override: Option<FogParams>,
    pub point_size: f32,

    texture_units: Vec<TextureUnitState>,
    vertex_program: Option<GpuProgramUsage>,
    fragment_program: Option<GpuProgramUsage>,
    geometry_program: Option<GpuProgramUsage>,
}

impl Default for Pass {
    fn default() -> Self {
        Pass {
            ambient: Color::white(),
            diffuse: Color::white(),
            specular: Color::black(),
            emissive: Color::black(),
            shininess: 0.0,
            tracking: TrackVertexColor::default(),

            lighting: true,
            iterate_per_light: false,
            only_light_type: None,
            max_lights: 8,
            start_light: 0,

            src_blend: SceneBlendFactor::One,
            dst_blend: SceneBlendFactor::Zero,
            src_blend_alpha: SceneBlendFactor::One,
            dst_blend_alpha: SceneBlendFactor::Zero,
            separate_blend: false,
            blend_operation: SceneBlendOperation::Add,
            alpha_blend_operation: SceneBlendOperation::Add,

            depth_check: true,
            depth_write: true,
            depth_func: CompareFunction::LessEqual,
            depth_bias: (0.0, 0.0),
            color_write: true,

            alpha_reject_func: CompareFunction::AlwaysPass,
            alpha_reject_value: 0,
            alpha_to_coverage: false,

            culling: CullingMode::Clockwise,
            shading: ShadeOptions::Gouraud,
            polygon_mode: PolygonMode::Solid,
            normalise_normals: false,
            fog_override: None,
            point_size: 1.0,

            texture_units: Vec::new(),
            vertex_program: None,
            fragment_program: None,
            geometry_program: None,
        }
    }
}

impl Pass {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn set_scene_blending(&mut self, src: SceneBlendFactor, dst: SceneBlendFactor) {
        self.src_blend = src;
        self.dst_blend = dst;
        self.src_blend_alpha = src;
        self.dst_blend_alpha = dst;
        self.separate_blend = false;
    }

    pub fn set_scene_blending_type(&mut self, ty: SceneBlendType) {
        let (src, dst) = ty.factors();
        self.set_scene_blending(src, dst);
    }

    pub fn set_separate_scene_blending(
        &mut self,
        src: SceneBlendFactor,
        dst: SceneBlendFactor,
        src_alpha: SceneBlendFactor,
        dst_alpha: SceneBlendFactor,
    ) {
        self.src_blend = src;
        self.dst_blend = dst;
        self.src_blend_alpha = src_alpha;
        self.dst_blend_alpha = dst_alpha;
        self.separate_blend = true;
    }

    /// Returns true if this pass does not contribute any lighting besides the
    /// ambient and emissive colors.
    pub fn is_ambient_only(&self) -> bool {
        !self.lighting
            || !self.color_write
            || (self.diffuse.is_black() && self.specular.is_black())
    }

    /// Returns true if the result of this pass depends on the frame contents.
    pub fn is_transparent(&self) -> bool {
        let reads_dest = |v: SceneBlendFactor| match v {
            SceneBlendFactor::DestColor
            | SceneBlendFactor::OneMinusDestColor
            | SceneBlendFactor::DestAlpha
            | SceneBlendFactor::OneMinusDestAlpha => true,
            _ => false,
        };

        !(self.dst_blend == SceneBlendFactor::Zero && !reads_dest(self.src_blend))
    }

    pub fn create_texture_unit<T: Into<String>>(&mut self, name: T) -> &mut TextureUnitState {
        self.texture_units.push(TextureUnitState::new(name));
        let last = self.texture_units.len() - 1;
        &mut self.texture_units[last]
    }

    pub fn add_texture_unit(&mut self, unit: TextureUnitState) {
        self.texture_units.push(unit);
    }

    #[inline]
    pub fn texture_unit(&self, index: usize) -> Option<&TextureUnitState> {
        self.texture_units.get(index)
    }

    #[inline]
    pub fn texture_unit_mut(&mut self, index: usize) -> Option<&mut TextureUnitState> {
        self.texture_units.get_mut(index)
    }

    #[inline]
    pub fn texture_units(&self) -> &[TextureUnitState] {
        &self.texture_units
    }

    pub fn remove_texture_unit(&mut self, index: usize) -> Option<TextureUnitState> {
        if index < self.texture_units.len() {
            Some(self.texture_units.remove(index))
        } else {
            None
        }
    }

    pub fn remove_all_texture_units(&mut self) {
        self.texture_units.clear();
    }

    #[inline]
    pub fn num_texture_units(&self) -> usize {
        self.texture_units.len()
    }

    #[inline]
    pub fn vertex_program(&self) -> Option<&GpuProgramUsage> {
        self.vertex_program.as_ref()
    }

    pub fn set_vertex_program(&mut self, usage: Option<GpuProgramUsage>) {
        self.vertex_program = usage;
    }

    #[inline]
    pub fn fragment_program(&self) -> Option<&GpuProgramUsage> {
        self.fragment_program.as_ref()
    }

    pub fn set_fragment_program(&mut self, usage: Option<GpuProgramUsage>) {
        self.fragment_program = usage;
    }

    #[inline]
    pub fn geometry_program(&self) -> Option<&GpuProgramUsage> {
        self.geometry_program.as_ref()
    }

    pub fn set_geometry_program(&mut self, usage: Option<GpuProgramUsage>) {
        self.geometry_program = usage;
    }

    #[inline]
    pub fn has_vertex_program(&self) -> bool {
        self.vertex_program.is_some()
    }

    #[inline]
    pub fn has_fragment_program(&self) -> bool {
        self.fragment_program.is_some()
    }

    #[inline]
    pub fn has_geometry_program(&self) -> bool {
        self.geometry_program.is_some()
    }

    /// Returns true if any stage of this pass runs a program.
    #[inline]
    pub fn is_programmable(&self) -> bool {
        self.has_vertex_program() || self.has_fragment_program() || self.has_geometry_program()
    }

    /// Moves every texture unit beyond the first `num_units` into a new pass,
    /// which approximates the multitexture blend with the scene blend
    /// fallback of its first unit.
    ///
    /// Returns `None` if this pass already fits. Passes with fragment programs
    /// can not be split.
    pub fn split(&mut self, num_units: usize) -> Result<Option<Pass>> {
        if self.has_fragment_program() {
            return Err(Error::InvalidConfiguration(
                "passes with fragment programs can not be split".to_owned(),
            ));
        }

        if self.texture_units.len() <= num_units {
            return Ok(None);
        }

        let units = self.texture_units.split_off(num_units);
        let (src, dst) = units[0].color_blend_fallback();

        let mut pass = Pass::new();
        pass.set_scene_blending(src, dst);
        pass.texture_units = units;

        Ok(Some(pass))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ambient_only() {
        let mut pass = Pass::new();
        assert!(!pass.is_ambient_only());

        pass.diffuse = Color::black();
        assert!(pass.is_ambient_only());

        pass.diffuse = Color::white();
        pass.lighting = false;
        assert!(pass.is_ambient_only());
    }

    #[test]
    fn transparency() {
        let mut pass = Pass::new();
        assert!(!pass.is_transparent());

        pass.set_scene_blending_type(SceneBlendType::TransparentAlpha);
        assert!(pass.is_transparent());

        pass.set_scene_blending_type(SceneBlendType::Modulate);
        assert!(pass.is_transparent());

        pass.set_scene_blending_type(SceneBlendType::Replace);
        assert!(!pass.is_transparent());
    }

    #[test]
    fn split() {
        let mut pass = Pass::new();
        for i in 0..3 {
            pass.create_texture_unit(format!("layer{}.png", i));
        }

        pass.texture_unit_mut(2)
            .unwrap()
            .set_color_operation(LayerBlendOperation::Add);

        assert!(pass.split(3).unwrap().is_none());

        let rest = pass.split(2).unwrap().unwrap();
        assert_eq!(pass.num_texture_units(), 2);
        assert_eq!(rest.num_texture_units(), 1);
        assert_eq!(rest.texture_unit(0).unwrap().name(), "layer2.png");
        assert_eq!(rest.src_blend, SceneBlendFactor::One);
        assert_eq!(rest.dst_blend, SceneBlendFactor::One);
    }
}
