use crate::errors::*;
use crate::math::prelude::*;
use crate::scene::{Light, LightType};
use crate::video::capabilities::Capability;
use crate::video::driver::{self, Cap, Command, LightSetup, MatrixMode, SurfaceColors};
use crate::video::types::*;

use super::{RenderSystem, SceneBlend};

impl RenderSystem {
    /// Sets how subsequent renders are combined with the frame contents.
    /// Blending is disabled for `(One, Zero)`.
    pub fn set_scene_blending(
        &mut self,
        src: SceneBlendFactor,
        dst: SceneBlendFactor,
        op: SceneBlendOperation,
    ) -> Result<()> {
        let blend = SceneBlend::new(src, dst, op);
        if self.state.scene_blend == Some(blend) {
            return Ok(());
        }

        if src == SceneBlendFactor::One && dst == SceneBlendFactor::Zero {
            self.driver.apply(Command::Disable(Cap::Blend));
        } else {
            self.driver.apply(Command::Enable(Cap::Blend));
            self.driver.apply(Command::BlendFunc(src, dst));
        }

        if self.caps.has(Capability::AdvancedBlendOperations) {
            self.driver.apply(Command::BlendEquation(op));
        }

        self.state.scene_blend = Some(blend);
        Ok(())
    }

    /// Like `set_scene_blending`, with separate factors and operations for the
    /// alpha channel.
    pub fn set_separate_scene_blending(
        &mut self,
        src: SceneBlendFactor,
        dst: SceneBlendFactor,
        src_alpha: SceneBlendFactor,
        dst_alpha: SceneBlendFactor,
        op: SceneBlendOperation,
        alpha_op: SceneBlendOperation,
    ) -> Result<()> {
        let blend = SceneBlend {
            src,
            dst,
            src_alpha,
            dst_alpha,
            op,
            alpha_op,
        };

        if self.state.scene_blend == Some(blend) {
            return Ok(());
        }

        let separate = src != src_alpha || dst != dst_alpha || op != alpha_op;
        if separate && !self.caps.has(Capability::SeparateSceneBlending) {
            return Err(Error::CapabilityMissing(
                "separate scene blending".to_owned(),
            ));
        }

        if blend.is_replace() {
            self.driver.apply(Command::Disable(Cap::Blend));
        } else {
            self.driver.apply(Command::Enable(Cap::Blend));
            self.driver
                .apply(Command::BlendFuncSeparate(src, dst, src_alpha, dst_alpha));
        }

        if self.caps.has(Capability::AdvancedBlendOperations) {
            self.driver
                .apply(Command::BlendEquationSeparate(op, alpha_op));
        }

        self.state.scene_blend = Some(blend);
        Ok(())
    }

    pub fn set_stencil_check_enabled(&mut self, enabled: bool) {
        if self.state.stencil_check == enabled {
            return;
        }

        if enabled {
            self.driver.apply(Command::Enable(Cap::StencilTest));
        } else {
            self.driver.apply(Command::Disable(Cap::StencilTest));
        }

        self.state.stencil_check = enabled;
    }

    /// Sets the stencil test and operations. With `two_sided` the back faces
    /// use the inverted increment and decrement operations, so that shadow
    /// volumes can be rendered in a single pass.
    pub fn set_stencil_buffer_params(
        &mut self,
        func: CompareFunction,
        reference: i32,
        mask: u32,
        fail: StencilOperation,
        depth_fail: StencilOperation,
        pass: StencilOperation,
        two_sided: bool,
    ) -> Result<()> {
        let has_two_sided = self.caps.has(Capability::TwoSidedStencil);

        if two_sided {
            if !has_two_sided {
                return Err(Error::CapabilityMissing(
                    "two-sided stencil".to_owned(),
                ));
            }

            // Counter-clockwise faces are always the front faces, flipped
            // targets reverse the winding.
            let flip = self.flipping();
            self.driver.apply(Command::Enable(Cap::StencilTwoSide));

            self.driver.apply(Command::ActiveStencilFace(Face::Back));
            self.driver.apply(Command::StencilMask(mask));
            self.driver
                .apply(Command::StencilFunc(func, reference, mask));
            self.driver.apply(Command::StencilOp(
                stencil_op(fail, !flip),
                stencil_op(depth_fail, !flip),
                stencil_op(pass, !flip),
            ));

            self.driver.apply(Command::ActiveStencilFace(Face::Front));
            self.driver.apply(Command::StencilMask(mask));
            self.driver
                .apply(Command::StencilFunc(func, reference, mask));
            self.driver.apply(Command::StencilOp(
                stencil_op(fail, flip),
                stencil_op(depth_fail, flip),
                stencil_op(pass, flip),
            ));
        } else {
            if has_two_sided {
                self.driver.apply(Command::Disable(Cap::StencilTwoSide));
            }

            self.driver.apply(Command::StencilMask(mask));
            self.driver
                .apply(Command::StencilFunc(func, reference, mask));
            self.driver
                .apply(Command::StencilOp(fail, depth_fail, pass));
        }

        self.state.stencil_mask = mask;
        Ok(())
    }

    pub fn set_depth_buffer_params(&mut self, check: bool, write: bool, func: CompareFunction) {
        self.set_depth_check(check);
        self.set_depth_write(write);
        self.set_depth_function(func);
    }

    pub fn set_depth_check(&mut self, enabled: bool) {
        if self.state.depth_check == enabled {
            return;
        }

        if enabled {
            self.driver.apply(Command::Enable(Cap::DepthTest));
        } else {
            self.driver.apply(Command::Disable(Cap::DepthTest));
        }

        self.state.depth_check = enabled;
    }

    pub fn set_depth_write(&mut self, enabled: bool) {
        if self.state.depth_write == enabled {
            return;
        }

        self.driver.apply(Command::DepthMask(enabled));
        self.state.depth_write = enabled;
    }

    pub fn set_depth_function(&mut self, func: CompareFunction) {
        if self.state.depth_func == func {
            return;
        }

        self.driver.apply(Command::DepthFunc(func));
        self.state.depth_func = func;
    }

    /// Offsets the depth of subsequent polygons, used to render decals on top
    /// of coplanar geometry.
    pub fn set_depth_bias(&mut self, constant: f32, slope_scale: f32) {
        if self.state.depth_bias == (constant, slope_scale) {
            return;
        }

        if constant != 0.0 || slope_scale != 0.0 {
            self.driver.apply(Command::Enable(Cap::PolygonOffsetFill));
            self.driver
                .apply(Command::PolygonOffset(-slope_scale, -constant));
        } else {
            self.driver.apply(Command::Disable(Cap::PolygonOffsetFill));
        }

        self.state.depth_bias = (constant, slope_scale);
    }

    pub fn set_color_buffer_write_enabled(&mut self, r: bool, g: bool, b: bool, a: bool) {
        if self.state.color_write == [r, g, b, a] {
            return;
        }

        self.driver.apply(Command::ColorMask(r, g, b, a));
        self.state.color_write = [r, g, b, a];
    }

    /// Sets which faces are culled. Clockwise faces are back faces, unless the
    /// winding is flipped by the active target or by configuration.
    pub fn set_culling_mode(&mut self, mode: CullingMode) {
        let face = match mode {
            CullingMode::None => {
                self.driver.apply(Command::Disable(Cap::CullFace));
                self.state.culling = mode;
                return;
            }
            CullingMode::Clockwise if self.flipping() => Face::Front,
            CullingMode::Clockwise => Face::Back,
            CullingMode::CounterClockwise if self.flipping() => Face::Back,
            CullingMode::CounterClockwise => Face::Front,
        };

        self.driver.apply(Command::Enable(Cap::CullFace));
        self.driver.apply(Command::CullFace(face));
        self.state.culling = mode;
    }

    /// Sets the alpha test. Alpha to coverage is only used while the alpha
    /// test always passes.
    pub fn set_alpha_reject_settings(
        &mut self,
        func: CompareFunction,
        value: u8,
        alpha_to_coverage: bool,
    ) {
        let mut a2c = false;

        if func != CompareFunction::AlwaysPass {
            self.driver.apply(Command::Enable(Cap::AlphaTest));
        } else {
            self.driver.apply(Command::Disable(Cap::AlphaTest));
            a2c = alpha_to_coverage;
        }

        self.driver
            .apply(Command::AlphaFunc(func, f32::from(value) / 255.0));

        if a2c != self.state.alpha_to_coverage && self.caps.has(Capability::Multisample) {
            if a2c {
                self.driver.apply(Command::Enable(Cap::AlphaToCoverage));
            } else {
                self.driver.apply(Command::Disable(Cap::AlphaToCoverage));
            }

            self.state.alpha_to_coverage = a2c;
        }
    }

    pub fn set_polygon_mode(&mut self, mode: PolygonMode) {
        if self.state.polygon_mode == mode {
            return;
        }

        self.driver.apply(Command::PolygonMode(mode));
        self.state.polygon_mode = mode;
    }

    pub fn set_shading_mode(&mut self, shading: ShadeOptions) {
        if self.state.shading == shading {
            return;
        }

        self.driver.apply(Command::ShadeModel(shading));
        self.state.shading = shading;
    }

    pub fn set_normalise_normals(&mut self, enabled: bool) {
        if self.state.normalise_normals == enabled {
            return;
        }

        if enabled {
            self.driver.apply(Command::Enable(Cap::Normalize));
        } else {
            self.driver.apply(Command::Disable(Cap::Normalize));
        }

        self.state.normalise_normals = enabled;
    }

    pub fn set_lighting_enabled(&mut self, enabled: bool) {
        if self.state.lighting == enabled {
            return;
        }

        if enabled {
            self.driver.apply(Command::Enable(Cap::Lighting));
        } else {
            self.driver.apply(Command::Disable(Cap::Lighting));
        }

        self.state.lighting = enabled;
    }

    pub fn set_ambient_light(&mut self, color: Color) {
        if self.state.ambient == color {
            return;
        }

        self.driver.apply(Command::LightModelAmbient(color));
        self.state.ambient = color;
    }

    /// Sets up the first `limit` lights of `lights`, and disables the lights
    /// that were enabled by the previous call but are not used anymore.
    pub fn use_lights(&mut self, lights: &[Light], limit: usize) -> Result<()> {
        // Lights are specified in world space.
        self.driver
            .apply(Command::LoadMatrix(MatrixMode::ModelView, self.state.view));

        let num = lights.len().min(limit).min(self.caps.max_lights);
        for (i, light) in lights.iter().take(num).enumerate() {
            self.driver.apply(Command::SetupLight(i, light_setup(light)));
            self.driver.apply(Command::Enable(Cap::Light(i)));
        }

        for i in num..self.state.enabled_lights {
            self.driver.apply(Command::Disable(Cap::Light(i)));
        }

        self.state.enabled_lights = num;

        let modelview = self.state.view * self.state.world;
        self.driver
            .apply(Command::LoadMatrix(MatrixMode::ModelView, modelview));

        driver::check(self.driver.as_ref())
    }

    /// Sets the fixed-function material colors.
    pub fn set_surface_params(
        &mut self,
        ambient: Color,
        diffuse: Color,
        specular: Color,
        emissive: Color,
        shininess: f32,
        tracking: TrackVertexColor,
    ) {
        let surface = SurfaceColors {
            ambient,
            diffuse,
            specular,
            emissive,
            shininess,
            tracking,
        };

        if self.state.surface == Some(surface) {
            return;
        }

        if tracking == TrackVertexColor::default() {
            self.driver.apply(Command::Disable(Cap::ColorMaterial));
        } else {
            self.driver.apply(Command::Enable(Cap::ColorMaterial));
        }

        self.driver.apply(Command::Material(surface));
        self.state.surface = Some(surface);
    }

    /// Sets the size of points. Attenuated sizes are given relative to the
    /// height of the active viewport, a `max_size` of 0 means unbounded.
    pub fn set_point_parameters(
        &mut self,
        size: f32,
        attenuation: bool,
        constant: f32,
        linear: f32,
        quadratic: f32,
        min_size: f32,
        max_size: f32,
    ) {
        let max_size = if max_size == 0.0 {
            std::f32::INFINITY
        } else {
            max_size
        };

        let cmd = if attenuation {
            let h = self.viewport_height as f32;
            let correction = 0.005;

            Command::PointParameters {
                size: size * h,
                attenuation: [constant, linear * correction, quadratic * correction],
                min_size: min_size * h,
                max_size: max_size * h,
            }
        } else {
            Command::PointParameters {
                size,
                attenuation: [1.0, 0.0, 0.0],
                min_size,
                max_size,
            }
        };

        self.driver.apply(cmd);
    }

    /// Renders points as textured quads.
    pub fn set_point_sprites_enabled(&mut self, enabled: bool) {
        if !self.caps.has(Capability::PointSprites) {
            return;
        }

        if enabled {
            self.driver.apply(Command::Enable(Cap::PointSprite));
        } else {
            self.driver.apply(Command::Disable(Cap::PointSprite));
        }
    }

    pub fn set_fog(&mut self, mode: FogMode, color: Color, density: f32, start: f32, end: f32) {
        if mode == FogMode::None {
            if self.state.fog != FogMode::None {
                self.driver.apply(Command::Disable(Cap::Fog));
                self.state.fog = FogMode::None;
            }

            return;
        }

        self.driver.apply(Command::Enable(Cap::Fog));
        self.driver.apply(Command::Fog(FogParams {
            mode,
            color,
            density,
            start,
            end,
        }));

        self.state.fog = mode;
    }

    pub fn set_world_matrix(&mut self, m: Matrix4<f32>) {
        self.state.world = m;
        self.load_modelview();
    }

    pub fn set_view_matrix(&mut self, m: Matrix4<f32>) {
        self.state.view = m;
        self.load_modelview();
    }

    /// Sets the projection matrix. Targets that store images upside down get
    /// the y axis inverted.
    pub fn set_projection_matrix(&mut self, m: Matrix4<f32>) {
        self.state.projection = m;

        let mut m = m;
        if self.requires_flipping() {
            m.x.y = -m.x.y;
            m.y.y = -m.y.y;
            m.z.y = -m.z.y;
            m.w.y = -m.w.y;
        }

        self.driver
            .apply(Command::LoadMatrix(MatrixMode::Projection, m));
    }

    /// Sets user clip planes in world space. Planes left over from the previous
    /// call are disabled.
    pub fn set_clip_planes(&mut self, planes: &[Plane]) -> Result<()> {
        if planes.len() > self.caps.max_clip_planes {
            return Err(Error::CapabilityMissing(format!(
                "{} user clip planes, the hardware supports {}",
                planes.len(),
                self.caps.max_clip_planes
            )));
        }

        self.driver
            .apply(Command::LoadMatrix(MatrixMode::ModelView, self.state.view));

        for (i, plane) in planes.iter().enumerate() {
            self.driver
                .apply(Command::ClipPlane(i, plane.coefficients()));
            self.driver.apply(Command::Enable(Cap::ClipPlane(i)));
        }

        for i in planes.len()..self.state.clip_planes {
            self.driver.apply(Command::Disable(Cap::ClipPlane(i)));
        }

        self.state.clip_planes = planes.len();
        self.load_modelview();

        driver::check(self.driver.as_ref())
    }

    /// Restricts rendering to a rectangle with the upper-left corner as origin.
    pub fn set_scissor_test(&mut self, enabled: bool, left: i32, top: i32, right: i32, bottom: i32) {
        if !enabled {
            self.driver.apply(Command::Disable(Cap::ScissorTest));
            return;
        }

        let (w, h) = (right - left, bottom - top);
        let y = if self.requires_flipping() {
            top
        } else {
            self.target_height() - bottom
        };

        self.driver.apply(Command::Enable(Cap::ScissorTest));
        self.driver.apply(Command::Scissor(left, y, w, h));
    }

    fn load_modelview(&self) {
        let m = self.state.view * self.state.world;
        self.driver
            .apply(Command::LoadMatrix(MatrixMode::ModelView, m));
    }
}

fn stencil_op(op: StencilOperation, invert: bool) -> StencilOperation {
    if invert {
        op.inverted()
    } else {
        op
    }
}

fn light_setup(light: &Light) -> LightSetup {
    let spot_cutoff = match light.ty {
        LightType::Spotlight => light.spot_outer.0 * 0.5,
        _ => 180.0,
    };

    LightSetup {
        diffuse: light.diffuse,
        specular: light.specular,
        ambient: Color::black(),
        position: light.as_4d_vector(),
        spot_direction: light.direction,
        spot_cutoff,
        spot_exponent: light.spot_falloff,
        attenuation: [
            light.attenuation_constant,
            light.attenuation_linear,
            light.attenuation_quadratic,
        ],
    }
}
