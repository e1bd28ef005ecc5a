//! Lazily computed values for resolving auto constants.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::math;
use crate::math::prelude::*;
use crate::scene::{Camera, Frustum, Light, Renderable};
use crate::video::types::FogParams;

const WORLD: u32 = 1;
const VIEW: u32 = 1 << 1;
const PROJECTION: u32 = 1 << 2;
const WORLD_VIEW: u32 = 1 << 3;
const VIEW_PROJ: u32 = 1 << 4;
const WORLD_VIEW_PROJ: u32 = 1 << 5;
const INVERSE_WORLD: u32 = 1 << 6;
const INVERSE_VIEW: u32 = 1 << 7;
const INVERSE_WORLD_VIEW: u32 = 1 << 8;
const INVERSE_TRANSPOSE_WORLD: u32 = 1 << 9;
const INVERSE_TRANSPOSE_WORLD_VIEW: u32 = 1 << 10;
const INVERSE_TRANSPOSE_VIEW: u32 = 1 << 11;
const CAMERA_OBJECT_SPACE: u32 = 1 << 12;

const WORLD_DEPENDENT: u32 = WORLD
    | WORLD_VIEW
    | WORLD_VIEW_PROJ
    | INVERSE_WORLD
    | INVERSE_WORLD_VIEW
    | INVERSE_TRANSPOSE_WORLD
    | INVERSE_TRANSPOSE_WORLD_VIEW
    | CAMERA_OBJECT_SPACE;

const CAMERA_DEPENDENT: u32 = VIEW
    | PROJECTION
    | WORLD_VIEW
    | VIEW_PROJ
    | WORLD_VIEW_PROJ
    | INVERSE_VIEW
    | INVERSE_WORLD_VIEW
    | INVERSE_TRANSPOSE_WORLD_VIEW
    | INVERSE_TRANSPOSE_VIEW
    | CAMERA_OBJECT_SPACE;

#[derive(Debug, Copy, Clone)]
struct Cached {
    world: Matrix4<f32>,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    world_view: Matrix4<f32>,
    view_proj: Matrix4<f32>,
    world_view_proj: Matrix4<f32>,
    inverse_world: Matrix4<f32>,
    inverse_view: Matrix4<f32>,
    inverse_world_view: Matrix4<f32>,
    inverse_transpose_world: Matrix4<f32>,
    inverse_transpose_world_view: Matrix4<f32>,
    inverse_transpose_view: Matrix4<f32>,
    camera_position_object_space: Vector4<f32>,
}

impl Default for Cached {
    fn default() -> Self {
        let m = Matrix4::identity();
        Cached {
            world: m,
            view: m,
            projection: m,
            world_view: m,
            view_proj: m,
            world_view_proj: m,
            inverse_world: m,
            inverse_view: m,
            inverse_world_view: m,
            inverse_transpose_world: m,
            inverse_transpose_world_view: m,
            inverse_transpose_view: m,
            camera_position_object_space: Vector4::new(0.0, 0.0, 0.0, 1.0),
        }
    }
}

/// The source of every value an auto constant can be bound to.
///
/// Setting the renderable dirties every world-derived value and setting the
/// camera dirties every view-derived value. Getters recompute iff their value
/// is dirty.
pub struct AutoParamDataSource {
    renderable: Option<Arc<dyn Renderable>>,
    world_matrices: SmallVec<[Matrix4<f32>; 1]>,
    camera: Option<Camera>,
    projectors: Vec<Option<Frustum>>,
    texture_view_proj: Vec<Option<Matrix4<f32>>>,
    texture_world_view_proj: Vec<Option<Matrix4<f32>>>,
    texture_sizes: Vec<(u32, u32, u32)>,
    lights: Vec<Light>,
    blank_light: Light,
    ambient: Color,
    fog: FogParams,
    time: f32,
    pass_number: i32,
    flipping: bool,
    dirty: u32,
    cached: Cached,
}

impl Default for AutoParamDataSource {
    fn default() -> Self {
        AutoParamDataSource::new()
    }
}

impl AutoParamDataSource {
    pub fn new() -> Self {
        AutoParamDataSource {
            renderable: None,
            world_matrices: SmallVec::new(),
            camera: None,
            projectors: Vec::new(),
            texture_view_proj: Vec::new(),
            texture_world_view_proj: Vec::new(),
            texture_sizes: Vec::new(),
            lights: Vec::new(),
            blank_light: Light::blank(),
            ambient: Color::black(),
            fog: FogParams::default(),
            time: 0.0,
            pass_number: 0,
            flipping: false,
            dirty: !0,
            cached: Cached::default(),
        }
    }

    /// Sets the renderable whose values are resolved next.
    pub fn set_current_renderable(&mut self, renderable: Arc<dyn Renderable>) {
        self.world_matrices = renderable.world_transforms();
        self.renderable = Some(renderable);
        self.dirty |= WORLD_DEPENDENT;

        for v in &mut self.texture_world_view_proj {
            *v = None;
        }
    }

    #[inline]
    pub fn current_renderable(&self) -> Option<&Arc<dyn Renderable>> {
        self.renderable.as_ref()
    }

    pub fn set_current_camera(&mut self, camera: &Camera) {
        self.camera = Some(*camera);
        self.dirty |= CAMERA_DEPENDENT;
    }

    #[inline]
    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    /// Sets the projector used by projective texturing with `index`.
    pub fn set_texture_projector(&mut self, index: usize, frustum: Option<Frustum>) {
        if self.projectors.len() <= index {
            self.projectors.resize(index + 1, None);
            self.texture_view_proj.resize(index + 1, None);
            self.texture_world_view_proj.resize(index + 1, None);
        }

        self.projectors[index] = frustum;
        self.texture_view_proj[index] = None;
        self.texture_world_view_proj[index] = None;
    }

    pub fn set_current_lights(&mut self, lights: &[Light]) {
        self.lights.clear();
        self.lights.extend_from_slice(lights);
    }

    /// Gets the light with `index`, or a blank light if there isn't one.
    pub fn light(&self, index: usize) -> &Light {
        self.lights.get(index).unwrap_or(&self.blank_light)
    }

    #[inline]
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    #[inline]
    pub fn set_ambient_light(&mut self, color: Color) {
        self.ambient = color;
    }

    #[inline]
    pub fn ambient_light(&self) -> Color {
        self.ambient
    }

    #[inline]
    pub fn set_fog(&mut self, fog: FogParams) {
        self.fog = fog;
    }

    #[inline]
    pub fn fog(&self) -> FogParams {
        self.fog
    }

    /// Gets the fog `(density, start, end, 1 / (end - start))`.
    pub fn fog_params(&self) -> Vector4<f32> {
        let range = self.fog.end - self.fog.start;
        let scale = if range != 0.0 { 1.0 / range } else { 0.0 };
        Vector4::new(self.fog.density, self.fog.start, self.fog.end, scale)
    }

    #[inline]
    pub fn set_time(&mut self, time: f32) {
        self.time = time;
    }

    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[inline]
    pub fn set_pass_number(&mut self, n: i32) {
        self.pass_number = n;
    }

    #[inline]
    pub fn inc_pass_number(&mut self) {
        self.pass_number += 1;
    }

    #[inline]
    pub fn pass_number(&self) -> i32 {
        self.pass_number
    }

    /// Sets whether the current render target requires flipping. Dirties the
    /// projection-derived values.
    pub fn set_render_target_flipping(&mut self, flipping: bool) {
        if self.flipping != flipping {
            self.flipping = flipping;
            self.dirty |= PROJECTION | VIEW_PROJ | WORLD_VIEW_PROJ;
        }
    }

    #[inline]
    pub fn render_target_flipping(&self) -> bool {
        self.flipping
    }

    pub fn set_texture_size(&mut self, unit: usize, width: u32, height: u32, depth: u32) {
        if self.texture_sizes.len() <= unit {
            self.texture_sizes.resize(unit + 1, (1, 1, 1));
        }

        self.texture_sizes[unit] = (width, height, depth);
    }

    pub fn texture_size(&self, unit: usize) -> Vector4<f32> {
        let (w, h, d) = self.texture_sizes.get(unit).cloned().unwrap_or((1, 1, 1));
        Vector4::new(w as f32, h as f32, d as f32, 1.0)
    }

    pub fn inverse_texture_size(&self, unit: usize) -> Vector4<f32> {
        let v = self.texture_size(unit);
        Vector4::new(1.0 / v.x.max(1.0), 1.0 / v.y.max(1.0), 1.0 / v.z.max(1.0), 1.0)
    }

    /// Gets the custom parameter of the current renderable.
    pub fn custom_parameter(&self, index: usize) -> Option<Vector4<f32>> {
        self.renderable
            .as_ref()
            .and_then(|v| v.custom_parameter(index))
    }

    #[inline]
    pub fn world_matrix_array(&self) -> &[Matrix4<f32>] {
        &self.world_matrices
    }

    pub fn world_matrix(&mut self) -> Matrix4<f32> {
        if self.take(WORLD) {
            self.cached.world = self
                .world_matrices
                .first()
                .cloned()
                .unwrap_or_else(Matrix4::identity);
        }

        self.cached.world
    }

    pub fn view_matrix(&mut self) -> Matrix4<f32> {
        if self.take(VIEW) {
            self.cached.view = self
                .camera
                .map(|v| v.view_matrix())
                .unwrap_or_else(Matrix4::identity);
        }

        self.cached.view
    }

    pub fn projection_matrix(&mut self) -> Matrix4<f32> {
        if self.take(PROJECTION) {
            let mut m = self
                .camera
                .map(|v| v.projection_matrix())
                .unwrap_or_else(Matrix4::identity);

            if self.flipping {
                m.x.y = -m.x.y;
                m.y.y = -m.y.y;
                m.z.y = -m.z.y;
                m.w.y = -m.w.y;
            }

            self.cached.projection = m;
        }

        self.cached.projection
    }

    pub fn world_view_matrix(&mut self) -> Matrix4<f32> {
        if self.take(WORLD_VIEW) {
            self.cached.world_view = self.view_matrix() * self.world_matrix();
        }

        self.cached.world_view
    }

    pub fn view_proj_matrix(&mut self) -> Matrix4<f32> {
        if self.take(VIEW_PROJ) {
            self.cached.view_proj = self.projection_matrix() * self.view_matrix();
        }

        self.cached.view_proj
    }

    pub fn world_view_proj_matrix(&mut self) -> Matrix4<f32> {
        if self.take(WORLD_VIEW_PROJ) {
            self.cached.world_view_proj = self.projection_matrix() * self.world_view_matrix();
        }

        self.cached.world_view_proj
    }

    pub fn inverse_world_matrix(&mut self) -> Matrix4<f32> {
        if self.take(INVERSE_WORLD) {
            self.cached.inverse_world = math::invert_or_identity(self.world_matrix());
        }

        self.cached.inverse_world
    }

    pub fn inverse_view_matrix(&mut self) -> Matrix4<f32> {
        if self.take(INVERSE_VIEW) {
            self.cached.inverse_view = math::invert_or_identity(self.view_matrix());
        }

        self.cached.inverse_view
    }

    pub fn inverse_world_view_matrix(&mut self) -> Matrix4<f32> {
        if self.take(INVERSE_WORLD_VIEW) {
            self.cached.inverse_world_view = math::invert_or_identity(self.world_view_matrix());
        }

        self.cached.inverse_world_view
    }

    pub fn inverse_transpose_world_matrix(&mut self) -> Matrix4<f32> {
        if self.take(INVERSE_TRANSPOSE_WORLD) {
            self.cached.inverse_transpose_world = self.inverse_world_matrix().transpose();
        }

        self.cached.inverse_transpose_world
    }

    pub fn inverse_transpose_world_view_matrix(&mut self) -> Matrix4<f32> {
        if self.take(INVERSE_TRANSPOSE_WORLD_VIEW) {
            self.cached.inverse_transpose_world_view =
                self.inverse_world_view_matrix().transpose();
        }

        self.cached.inverse_transpose_world_view
    }

    pub fn inverse_transpose_view_matrix(&mut self) -> Matrix4<f32> {
        if self.take(INVERSE_TRANSPOSE_VIEW) {
            self.cached.inverse_transpose_view = self.inverse_view_matrix().transpose();
        }

        self.cached.inverse_transpose_view
    }

    /// Gets the camera position in world space, `w = 1`.
    pub fn camera_position(&self) -> Vector4<f32> {
        self.camera
            .map(|v| v.position().to_vec().extend(1.0))
            .unwrap_or_else(|| Vector4::new(0.0, 0.0, 0.0, 1.0))
    }

    pub fn camera_position_object_space(&mut self) -> Vector4<f32> {
        if self.take(CAMERA_OBJECT_SPACE) {
            self.cached.camera_position_object_space =
                self.inverse_world_matrix() * self.camera_position();
        }

        self.cached.camera_position_object_space
    }

    pub fn view_direction(&self) -> Vector4<f32> {
        self.camera
            .map(|v| v.direction().extend(1.0))
            .unwrap_or_else(|| Vector4::new(0.0, 0.0, -1.0, 1.0))
    }

    pub fn view_side_vector(&self) -> Vector4<f32> {
        self.camera
            .map(|v| v.right().extend(1.0))
            .unwrap_or_else(|| Vector4::new(1.0, 0.0, 0.0, 1.0))
    }

    pub fn view_up_vector(&self) -> Vector4<f32> {
        self.camera
            .map(|v| v.up().extend(1.0))
            .unwrap_or_else(|| Vector4::new(0.0, 1.0, 0.0, 1.0))
    }

    pub fn near_clip_distance(&self) -> f32 {
        self.camera.map(|v| v.near()).unwrap_or(0.0)
    }

    pub fn far_clip_distance(&self) -> f32 {
        self.camera.map(|v| v.far()).unwrap_or(0.0)
    }

    /// Gets the matrix that maps world space into the image space of the
    /// projector with `index`.
    pub fn texture_view_proj_matrix(&mut self, index: usize) -> Matrix4<f32> {
        if let Some(v) = self.texture_view_proj.get(index).and_then(|v| *v) {
            return v;
        }

        let m = match self.projectors.get(index).and_then(|v| *v) {
            Some(frustum) => {
                math::clip_space_to_image_space()
                    * frustum.projection_matrix()
                    * frustum.view_matrix()
            }
            None => Matrix4::identity(),
        };

        if index < self.texture_view_proj.len() {
            self.texture_view_proj[index] = Some(m);
        }

        m
    }

    pub fn texture_world_view_proj_matrix(&mut self, index: usize) -> Matrix4<f32> {
        if let Some(v) = self.texture_world_view_proj.get(index).and_then(|v| *v) {
            return v;
        }

        let m = self.texture_view_proj_matrix(index) * self.world_matrix();
        if index < self.texture_world_view_proj.len() {
            self.texture_world_view_proj[index] = Some(m);
        }

        m
    }

    #[inline]
    fn take(&mut self, flag: u32) -> bool {
        let dirty = (self.dirty & flag) != 0;
        self.dirty &= !flag;
        dirty
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct Translated(Vector3<f32>);

    impl Renderable for Translated {
        fn world_transforms(&self) -> SmallVec<[Matrix4<f32>; 1]> {
            let mut v = SmallVec::new();
            v.push(Matrix4::from_translation(self.0));
            v
        }
    }

    #[test]
    fn world() {
        let mut source = AutoParamDataSource::new();
        assert_eq!(source.world_matrix(), Matrix4::identity());

        source.set_current_renderable(Arc::new(Translated(Vector3::new(1.0, 2.0, 3.0))));
        let w = source.world_matrix();
        assert_eq!(w.w, Vector4::new(1.0, 2.0, 3.0, 1.0));

        let iw = source.inverse_world_matrix();
        assert_eq!(iw.w, Vector4::new(-1.0, -2.0, -3.0, 1.0));

        source.set_current_renderable(Arc::new(Translated(Vector3::new(0.0, 0.0, 0.0))));
        assert_eq!(source.inverse_world_matrix(), Matrix4::identity());
    }

    #[test]
    fn lights() {
        let mut source = AutoParamDataSource::new();
        source.set_current_lights(&[Light::point(Vector3::new(1.0, 0.0, 0.0))]);
        assert_eq!(source.light_count(), 1);
        assert_eq!(source.light(0).position, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(source.light(3).diffuse, Color::black());
    }

    #[test]
    fn flipping() {
        let mut source = AutoParamDataSource::new();
        source.set_current_camera(&Camera::default());

        let p = source.projection_matrix();
        source.set_render_target_flipping(true);
        let f = source.projection_matrix();
        assert_eq!(f.y.y, -p.y.y);
        assert_eq!(f.x.x, p.x.x);
    }
}
