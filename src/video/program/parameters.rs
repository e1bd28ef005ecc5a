//! Constant buffers of GPU programs.

use std::sync::{Arc, RwLock};

use crate::errors::*;
use crate::math::prelude::*;
use crate::utils::hash::FastHashMap;

use super::auto::{AutoConstantData, AutoConstantEntry, AutoConstantType};
use super::data_source::AutoParamDataSource;

/// A 4-wide float constant slot.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct FloatConstantEntry {
    pub val: [f32; 4],
    pub is_set: bool,
}

/// A 4-wide int constant slot.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct IntConstantEntry {
    pub val: [i32; 4],
    pub is_set: bool,
}

/// Name to slot index definitions of a loaded program.
pub type GpuNamedConstants = FastHashMap<String, usize>;

/// Parameters shared by every pass that uses the same program.
pub type GpuProgramParametersPtr = Arc<RwLock<GpuProgramParameters>>;

/// Float and int constants of a GPU program, plus the auto constants that are
/// refreshed from an `AutoParamDataSource`.
///
/// Index `i` always names the same slot. Writing past the end grows the lists
/// and never touches lower slots.
#[derive(Debug, Default, Clone)]
pub struct GpuProgramParameters {
    floats: Vec<FloatConstantEntry>,
    ints: Vec<IntConstantEntry>,
    autos: Vec<AutoConstantEntry>,
    named: GpuNamedConstants,
    auto_add_param_name: bool,
    pass_iteration_index: Option<usize>,
}

impl GpuProgramParameters {
    pub fn new() -> Self {
        GpuProgramParameters::default()
    }

    #[inline]
    pub fn into_shared(self) -> GpuProgramParametersPtr {
        Arc::new(RwLock::new(self))
    }

    pub fn set_constant_vec4(&mut self, index: usize, v: Vector4<f32>) {
        self.set_constant_slot(index, [v.x, v.y, v.z, v.w]);
    }

    pub fn set_constant_vec3(&mut self, index: usize, v: Vector3<f32>) {
        self.set_constant_slot(index, [v.x, v.y, v.z, 1.0]);
    }

    pub fn set_constant_color(&mut self, index: usize, v: Color) {
        self.set_constant_slot(index, [v.r, v.g, v.b, v.a]);
    }

    /// Sets `x` of the slot with `index`, zeroing the rest.
    pub fn set_constant_f32(&mut self, index: usize, v: f32) {
        self.set_constant_slot(index, [v, 0.0, 0.0, 0.0]);
    }

    /// Sets consecutive floats, spanning as many slots as needed. The last
    /// slot is padded with zeros.
    pub fn set_constant_floats(&mut self, index: usize, values: &[f32]) {
        for (i, chunk) in values.chunks(4).enumerate() {
            let mut slot = [0.0; 4];
            slot[..chunk.len()].copy_from_slice(chunk);
            self.set_constant_slot(index + i, slot);
        }
    }

    /// Sets a matrix as 4 consecutive slots, one per row.
    pub fn set_constant_matrix(&mut self, index: usize, m: Matrix4<f32>) {
        for r in 0..4 {
            self.set_constant_vec4(index + r, m.row(r));
        }
    }

    pub fn set_constant_matrices(&mut self, index: usize, matrices: &[Matrix4<f32>]) {
        for (i, m) in matrices.iter().enumerate() {
            self.set_constant_matrix(index + i * 4, *m);
        }
    }

    /// Sets `x` of the int slot with `index`, zeroing the rest.
    pub fn set_int_constant(&mut self, index: usize, v: i32) {
        self.set_int_slot(index, [v, 0, 0, 0]);
    }

    pub fn set_int_constants(&mut self, index: usize, values: &[i32]) {
        for (i, chunk) in values.chunks(4).enumerate() {
            let mut slot = [0; 4];
            slot[..chunk.len()].copy_from_slice(chunk);
            self.set_int_slot(index + i, slot);
        }
    }

    #[inline]
    pub fn float_constant(&self, index: usize) -> Option<&FloatConstantEntry> {
        self.floats.get(index)
    }

    #[inline]
    pub fn int_constant(&self, index: usize) -> Option<&IntConstantEntry> {
        self.ints.get(index)
    }

    #[inline]
    pub fn float_constant_count(&self) -> usize {
        self.floats.len()
    }

    #[inline]
    pub fn int_constant_count(&self) -> usize {
        self.ints.len()
    }

    /// Iterates over the float slots that have been set.
    pub fn float_constants(&self) -> impl Iterator<Item = (usize, &FloatConstantEntry)> {
        self.floats.iter().enumerate().filter(|(_, v)| v.is_set)
    }

    /// Iterates over the int slots that have been set.
    pub fn int_constants(&self) -> impl Iterator<Item = (usize, &IntConstantEntry)> {
        self.ints.iter().enumerate().filter(|(_, v)| v.is_set)
    }

    /// Creates a slot for every unknown name when enabled.
    #[inline]
    pub fn set_auto_add_param_name(&mut self, enable: bool) {
        self.auto_add_param_name = enable;
    }

    #[inline]
    pub fn auto_add_param_name(&self) -> bool {
        self.auto_add_param_name
    }

    /// Installs the named constant definitions of a loaded program.
    pub fn set_named_constants(&mut self, named: GpuNamedConstants) {
        self.named = named;
    }

    pub fn map_param_name_to_index<T: Into<String>>(&mut self, name: T, index: usize) {
        self.named.insert(name.into(), index);
    }

    /// Gets the slot index of `name`. Unknown names are given the next free
    /// slot if auto adding is enabled.
    pub fn param_index(&mut self, name: &str) -> Result<usize> {
        if let Some(&index) = self.named.get(name) {
            return Ok(index);
        }

        if !self.auto_add_param_name {
            return Err(Error::NamedParameterUndefined(name.to_owned()));
        }

        let index = self.floats.len();
        self.floats.push(FloatConstantEntry::default());
        self.named.insert(name.to_owned(), index);
        Ok(index)
    }

    pub fn name_by_index(&self, index: usize) -> Option<&str> {
        self.named
            .iter()
            .find(|(_, v)| **v == index)
            .map(|(k, _)| k.as_str())
    }

    pub fn set_named_constant_vec4(&mut self, name: &str, v: Vector4<f32>) -> Result<()> {
        let index = self.param_index(name)?;
        self.set_constant_vec4(index, v);
        Ok(())
    }

    pub fn set_named_constant_color(&mut self, name: &str, v: Color) -> Result<()> {
        let index = self.param_index(name)?;
        self.set_constant_color(index, v);
        Ok(())
    }

    pub fn set_named_constant_f32(&mut self, name: &str, v: f32) -> Result<()> {
        let index = self.param_index(name)?;
        self.set_constant_f32(index, v);
        Ok(())
    }

    pub fn set_named_constant_matrix(&mut self, name: &str, m: Matrix4<f32>) -> Result<()> {
        let index = self.param_index(name)?;
        self.set_constant_matrix(index, m);
        Ok(())
    }

    pub fn set_named_int_constant(&mut self, name: &str, v: i32) -> Result<()> {
        let index = self.param_index(name)?;
        self.set_int_constant(index, v);
        Ok(())
    }

    /// Binds the slot with `index` to an auto constant with an index as extra data.
    pub fn set_auto_constant(&mut self, index: usize, ty: AutoConstantType, extra: usize) {
        self.push_auto_constant(index, ty, AutoConstantData::Int(extra));
    }

    /// Binds the slot with `index` to an auto constant with a real extra data.
    pub fn set_auto_constant_real(&mut self, index: usize, ty: AutoConstantType, extra: f32) {
        self.push_auto_constant(index, ty, AutoConstantData::Real(extra));
    }

    pub fn set_named_auto_constant(
        &mut self,
        name: &str,
        ty: AutoConstantType,
        extra: usize,
    ) -> Result<()> {
        let index = self.param_index(name)?;
        self.set_auto_constant(index, ty, extra);
        Ok(())
    }

    pub fn clear_auto_constants(&mut self) {
        self.autos.clear();
        self.pass_iteration_index = None;
    }

    #[inline]
    pub fn has_auto_constants(&self) -> bool {
        !self.autos.is_empty()
    }

    #[inline]
    pub fn auto_constants(&self) -> &[AutoConstantEntry] {
        &self.autos
    }

    /// Resolves every auto constant that doesn't depend on the lights.
    pub fn update_auto_params_no_lights(&mut self, source: &mut AutoParamDataSource) {
        if self.autos.is_empty() {
            return;
        }

        self.pass_iteration_index = None;
        let autos = self.autos.clone();

        for entry in autos {
            let i = entry.index;
            match entry.ty {
                AutoConstantType::WorldMatrix => {
                    self.set_constant_matrix(i, source.world_matrix());
                }
                AutoConstantType::InverseWorldMatrix => {
                    self.set_constant_matrix(i, source.inverse_world_matrix());
                }
                AutoConstantType::InverseTransposeWorldMatrix => {
                    self.set_constant_matrix(i, source.inverse_transpose_world_matrix());
                }
                AutoConstantType::WorldMatrixArray => {
                    self.set_constant_matrices(i, source.world_matrix_array());
                }
                AutoConstantType::WorldMatrixArray3x4 => {
                    let mut index = i;
                    for m in source.world_matrix_array() {
                        for r in 0..3 {
                            let row = m.row(r);
                            self.set_constant_slot(index, [row.x, row.y, row.z, row.w]);
                            index += 1;
                        }
                    }
                }
                AutoConstantType::ViewMatrix => {
                    self.set_constant_matrix(i, source.view_matrix());
                }
                AutoConstantType::InverseViewMatrix => {
                    self.set_constant_matrix(i, source.inverse_view_matrix());
                }
                AutoConstantType::InverseTransposeViewMatrix => {
                    self.set_constant_matrix(i, source.inverse_transpose_view_matrix());
                }
                AutoConstantType::ProjectionMatrix => {
                    self.set_constant_matrix(i, source.projection_matrix());
                }
                AutoConstantType::ViewProjMatrix => {
                    self.set_constant_matrix(i, source.view_proj_matrix());
                }
                AutoConstantType::WorldViewMatrix => {
                    self.set_constant_matrix(i, source.world_view_matrix());
                }
                AutoConstantType::InverseWorldViewMatrix => {
                    self.set_constant_matrix(i, source.inverse_world_view_matrix());
                }
                AutoConstantType::InverseTransposeWorldViewMatrix => {
                    self.set_constant_matrix(i, source.inverse_transpose_world_view_matrix());
                }
                AutoConstantType::WorldViewProjMatrix => {
                    self.set_constant_matrix(i, source.world_view_proj_matrix());
                }
                AutoConstantType::RenderTargetFlipping => {
                    let v = if source.render_target_flipping() { -1 } else { 1 };
                    self.set_int_constant(i, v);
                }
                AutoConstantType::FogParams => {
                    self.set_constant_vec4(i, source.fog_params());
                }
                AutoConstantType::FogColor => {
                    self.set_constant_color(i, source.fog().color);
                }
                AutoConstantType::AmbientLightColor => {
                    self.set_constant_color(i, source.ambient_light());
                }
                AutoConstantType::LightCount => {
                    self.set_constant_f32(i, source.light_count() as f32);
                }
                AutoConstantType::CameraPosition => {
                    self.set_constant_vec4(i, source.camera_position());
                }
                AutoConstantType::CameraPositionObjectSpace => {
                    self.set_constant_vec4(i, source.camera_position_object_space());
                }
                AutoConstantType::TextureViewProjMatrix => {
                    let m = source.texture_view_proj_matrix(entry.data.index());
                    self.set_constant_matrix(i, m);
                }
                AutoConstantType::TextureWorldViewProjMatrix => {
                    let m = source.texture_world_view_proj_matrix(entry.data.index());
                    self.set_constant_matrix(i, m);
                }
                AutoConstantType::ViewDirection => {
                    self.set_constant_vec4(i, source.view_direction());
                }
                AutoConstantType::ViewSideVector => {
                    self.set_constant_vec4(i, source.view_side_vector());
                }
                AutoConstantType::ViewUpVector => {
                    self.set_constant_vec4(i, source.view_up_vector());
                }
                AutoConstantType::NearClipDistance => {
                    self.set_constant_f32(i, source.near_clip_distance());
                }
                AutoConstantType::FarClipDistance => {
                    self.set_constant_f32(i, source.far_clip_distance());
                }
                AutoConstantType::Time => {
                    self.set_constant_f32(i, source.time() * entry.data.real());
                }
                AutoConstantType::Time0X => {
                    self.set_constant_f32(i, modulo(source.time(), entry.data.real()));
                }
                AutoConstantType::Time01 => {
                    self.set_constant_f32(i, modulo(source.time(), 1.0));
                }
                AutoConstantType::SinTime0X => {
                    let v = modulo(source.time(), entry.data.real()).sin();
                    self.set_constant_f32(i, v);
                }
                AutoConstantType::PassNumber => {
                    self.set_int_constant(i, source.pass_number());
                }
                AutoConstantType::PassIterationNumber => {
                    self.set_constant_f32(i, 0.0);
                    self.pass_iteration_index = Some(i);
                }
                AutoConstantType::TextureSize => {
                    self.set_constant_vec4(i, source.texture_size(entry.data.index()));
                }
                AutoConstantType::InverseTextureSize => {
                    let v = source.inverse_texture_size(entry.data.index());
                    self.set_constant_vec4(i, v);
                }
                AutoConstantType::Custom => {
                    if let Some(v) = source.custom_parameter(entry.data.index()) {
                        self.set_constant_vec4(i, v);
                    }
                }
                _ => {}
            }
        }
    }

    /// Resolves every auto constant that depends on the lights, plus the world
    /// matrix and the pass iteration number.
    pub fn update_auto_params_lights_only(&mut self, source: &mut AutoParamDataSource) {
        if self.autos.is_empty() {
            return;
        }

        self.pass_iteration_index = None;
        let autos = self.autos.clone();

        for entry in autos {
            let i = entry.index;
            let light = *source.light(entry.data.index());

            match entry.ty {
                AutoConstantType::LightDiffuseColor => {
                    self.set_constant_color(i, light.diffuse);
                }
                AutoConstantType::LightSpecularColor => {
                    self.set_constant_color(i, light.specular);
                }
                AutoConstantType::LightPosition => {
                    self.set_constant_vec4(i, light.as_4d_vector());
                }
                AutoConstantType::LightDirection => {
                    self.set_constant_vec3(i, light.direction);
                }
                AutoConstantType::LightPositionObjectSpace => {
                    let v = source.inverse_world_matrix() * light.as_4d_vector();
                    self.set_constant_vec4(i, v);
                }
                AutoConstantType::LightDirectionObjectSpace => {
                    let v = source.inverse_world_matrix() * light.direction.extend(0.0);
                    let v = v.truncate();
                    let v = if v.magnitude2() > 0.0 { v.normalize() } else { v };
                    self.set_constant_vec3(i, v);
                }
                AutoConstantType::LightDistanceObjectSpace => {
                    let v = source.inverse_world_matrix() * light.position.extend(1.0);
                    self.set_constant_f32(i, v.truncate().magnitude());
                }
                AutoConstantType::LightAttenuation => {
                    self.set_constant_floats(
                        i,
                        &[
                            light.range,
                            light.attenuation_constant,
                            light.attenuation_linear,
                            light.attenuation_quadratic,
                        ],
                    );
                }
                AutoConstantType::LightPowerScale => {
                    self.set_constant_f32(i, light.power_scale);
                }
                AutoConstantType::LightCount => {
                    self.set_constant_f32(i, source.light_count() as f32);
                }
                AutoConstantType::WorldMatrix => {
                    self.set_constant_matrix(i, source.world_matrix());
                }
                AutoConstantType::PassIterationNumber => {
                    self.set_constant_f32(i, 0.0);
                    self.pass_iteration_index = Some(i);
                }
                _ => {}
            }
        }
    }

    /// Returns true if a pass iteration number constant was resolved.
    #[inline]
    pub fn has_pass_iteration_number(&self) -> bool {
        self.pass_iteration_index.is_some()
    }

    /// Increments the pass iteration number constant, if any.
    pub fn inc_pass_iteration_number(&mut self) {
        if let Some(index) = self.pass_iteration_index {
            if let Some(v) = self.floats.get_mut(index) {
                v.val[0] += 1.0;
            }
        }
    }

    /// Copies every constant and auto constant of `other`.
    pub fn copy_constants_from(&mut self, other: &GpuProgramParameters) {
        self.floats = other.floats.clone();
        self.ints = other.ints.clone();
        self.autos = other.autos.clone();
        self.named = other.named.clone();
        self.pass_iteration_index = other.pass_iteration_index;
    }

    fn push_auto_constant(&mut self, index: usize, ty: AutoConstantType, data: AutoConstantData) {
        self.autos.retain(|v| v.index != index || v.ty.is_int() != ty.is_int());
        self.autos.push(AutoConstantEntry { ty, index, data });

        let end = index + ty.slots();
        if ty.is_int() {
            if self.ints.len() < end {
                self.ints.resize(end, IntConstantEntry::default());
            }
        } else if self.floats.len() < end {
            self.floats.resize(end, FloatConstantEntry::default());
        }
    }

    fn set_constant_slot(&mut self, index: usize, val: [f32; 4]) {
        if self.floats.len() <= index {
            self.floats.resize(index + 1, FloatConstantEntry::default());
        }

        self.floats[index] = FloatConstantEntry { val, is_set: true };
    }

    fn set_int_slot(&mut self, index: usize, val: [i32; 4]) {
        if self.ints.len() <= index {
            self.ints.resize(index + 1, IntConstantEntry::default());
        }

        self.ints[index] = IntConstantEntry { val, is_set: true };
    }
}

#[inline]
fn modulo(v: f32, m: f32) -> f32 {
    if m == 0.0 {
        0.0
    } else {
        v % m
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn named() {
        let mut params = GpuProgramParameters::new();
        assert!(params.param_index("diffuse").is_err());

        params.set_auto_add_param_name(true);
        params.set_constant_f32(2, 1.0);
        assert_eq!(params.param_index("diffuse").unwrap(), 3);
        assert_eq!(params.param_index("diffuse").unwrap(), 3);
        assert_eq!(params.name_by_index(3), Some("diffuse"));

        params
            .set_named_constant_color("diffuse", Color::red())
            .unwrap();
        assert_eq!(params.float_constant(3).unwrap().val, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn floats() {
        let mut params = GpuProgramParameters::new();
        params.set_constant_floats(1, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(params.float_constant_count(), 3);
        assert!(!params.float_constant(0).unwrap().is_set);
        assert_eq!(params.float_constant(2).unwrap().val, [5.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn pass_iteration() {
        let mut params = GpuProgramParameters::new();
        params.set_auto_constant(0, AutoConstantType::PassIterationNumber, 0);

        let mut source = AutoParamDataSource::new();
        params.update_auto_params_no_lights(&mut source);
        assert!(params.has_pass_iteration_number());

        params.inc_pass_iteration_number();
        params.inc_pass_iteration_number();
        assert_eq!(params.float_constant(0).unwrap().val[0], 2.0);
    }
}
