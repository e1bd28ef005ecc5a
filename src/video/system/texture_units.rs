use crate::errors::*;
use crate::material::TextureUnitState;
use crate::math::prelude::*;
use crate::math::clip_space_to_image_space;
use crate::scene::Frustum;
use crate::video::capabilities::Capability;
use crate::video::driver::{self, Cap, Command, MatrixMode, TexParam};
use crate::video::resource::texture::TextureHandle;
use crate::video::types::*;

use super::RenderSystem;

const EYE_PLANES: [(TexCoordAxis, [f32; 4]); 4] = [
    (TexCoordAxis::S, [1.0, 0.0, 0.0, 0.0]),
    (TexCoordAxis::T, [0.0, 1.0, 0.0, 0.0]),
    (TexCoordAxis::R, [0.0, 0.0, 1.0, 0.0]),
    (TexCoordAxis::Q, [0.0, 0.0, 0.0, 1.0]),
];

impl RenderSystem {
    /// Binds `texture` to `unit`, or the warning texture if it is unknown. Units
    /// the hardware does not have are ignored.
    pub fn set_texture(
        &mut self,
        unit: usize,
        enabled: bool,
        texture: Option<TextureHandle>,
    ) -> Result<()> {
        if unit >= self.state.units.len() {
            return Ok(());
        }

        let fixed = unit < self.caps.fixed_function_texture_units;
        let last = self.state.units[unit].ty;

        self.driver.apply(Command::ActiveTexture(unit));

        if enabled {
            let (ty, id) = match texture.and_then(|v| self.textures.get(v)) {
                Some(v) => (v.texture_type(), v.id()),
                None => (TextureType::TwoD, self.textures.warning_texture_id()),
            };

            if fixed {
                if let Some(last) = last {
                    if last != ty {
                        self.driver.apply(Command::Disable(Cap::Texture(last)));
                    }
                }

                self.driver.apply(Command::Enable(Cap::Texture(ty)));
            }

            self.driver.apply(Command::BindTexture(ty, id));

            let shadow = &mut self.state.units[unit];
            if shadow.texture != id {
                shadow.addressing = None;
                shadow.anisotropy = None;
            }

            shadow.ty = Some(ty);
            shadow.texture = id;
        } else {
            if fixed {
                if let Some(last) = last {
                    self.driver.apply(Command::Disable(Cap::Texture(last)));
                }

                self.driver.apply(Command::TexEnvMode(TexEnvMode::Modulate));
            }

            self.driver.apply(Command::BindTexture(TextureType::TwoD, 0));

            let shadow = &mut self.state.units[unit];
            shadow.ty = None;
            shadow.texture = 0;
            shadow.addressing = None;
            shadow.anisotropy = None;
        }

        self.driver.apply(Command::ActiveTexture(0));
        Ok(())
    }

    /// Unbinds every texture unit starting with `start`.
    pub fn disable_texture_units_from(&mut self, start: usize) -> Result<()> {
        for i in start..self.state.units.len() {
            if self.state.units[i].ty.is_some() {
                self.set_texture(i, false, None)?;
            }
        }

        Ok(())
    }

    pub fn set_texture_addressing_mode(&mut self, unit: usize, uvw: UVWAddressing) -> Result<()> {
        let ty = match self.unit_type(unit) {
            Some(ty) => ty,
            None => return Ok(()),
        };

        if self.state.units[unit].addressing == Some(uvw) {
            return Ok(());
        }

        self.driver.apply(Command::ActiveTexture(unit));
        self.driver.apply(Command::TexParameter(ty, TexParam::WrapS(uvw.u)));
        self.driver.apply(Command::TexParameter(ty, TexParam::WrapT(uvw.v)));
        self.driver.apply(Command::TexParameter(ty, TexParam::WrapR(uvw.w)));
        self.driver.apply(Command::ActiveTexture(0));

        self.state.units[unit].addressing = Some(uvw);
        Ok(())
    }

    /// Sets one of the filters of `unit`. Minification and mip filters are
    /// combined into a single driver parameter.
    pub fn set_texture_unit_filtering(
        &mut self,
        unit: usize,
        ft: FilterType,
        filter: FilterOptions,
    ) -> Result<()> {
        let ty = match self.unit_type(unit) {
            Some(ty) => ty,
            None => return Ok(()),
        };

        self.driver.apply(Command::ActiveTexture(unit));

        match ft {
            FilterType::Min | FilterType::Mip => {
                let shadow = &mut self.state.units[unit];
                if ft == FilterType::Min {
                    shadow.min_filter = filter;
                } else {
                    shadow.mip_filter = filter;
                }

                let param = TexParam::MinFilter(shadow.min_filter, shadow.mip_filter);
                self.driver.apply(Command::TexParameter(ty, param));
            }
            FilterType::Mag => {
                let filter = match filter {
                    FilterOptions::Anisotropic | FilterOptions::Linear => FilterOptions::Linear,
                    FilterOptions::Point | FilterOptions::None => FilterOptions::Point,
                };

                self.driver
                    .apply(Command::TexParameter(ty, TexParam::MagFilter(filter)));
            }
        }

        self.driver.apply(Command::ActiveTexture(0));
        Ok(())
    }

    /// Sets the maximum anisotropy of `unit`, clamped to what the hardware
    /// supports.
    pub fn set_texture_layer_anisotropy(&mut self, unit: usize, anisotropy: f32) -> Result<()> {
        if !self.caps.has(Capability::Anisotropy) {
            return Ok(());
        }

        let ty = match self.unit_type(unit) {
            Some(ty) => ty,
            None => return Ok(()),
        };

        let anisotropy = anisotropy.min(self.caps.max_anisotropy).max(1.0);
        if self.state.units[unit].anisotropy == Some(anisotropy) {
            return Ok(());
        }

        self.driver.apply(Command::ActiveTexture(unit));
        self.driver
            .apply(Command::TexParameter(ty, TexParam::MaxAnisotropy(anisotropy)));
        self.driver.apply(Command::ActiveTexture(0));

        self.state.units[unit].anisotropy = Some(anisotropy);
        Ok(())
    }

    /// Sets how the color or alpha of `unit` combines with the previous units.
    pub fn set_texture_blend_mode(&mut self, unit: usize, mode: &LayerBlendModeEx) -> Result<()> {
        if mode.operation == LayerBlendOperationEx::DotProduct && !self.caps.has(Capability::Dot3)
        {
            return Err(Error::CapabilityMissing("Dot3 texture blending".to_owned()));
        }

        if unit >= self.caps.fixed_function_texture_units || unit >= self.state.units.len() {
            return Ok(());
        }

        let shadow = &mut self.state.units[unit];
        let last = match mode.blend_type {
            LayerBlendType::Color => &mut shadow.color_blend,
            LayerBlendType::Alpha => &mut shadow.alpha_blend,
        };

        if *last == Some(*mode) && shadow.coord_calc == TexCoordCalcMethod::None {
            return Ok(());
        }

        *last = Some(*mode);

        self.driver.apply(Command::ActiveTexture(unit));
        self.driver.apply(Command::TexEnvMode(TexEnvMode::Combine));
        self.driver.apply(Command::TexEnvCombine(*mode));
        self.driver.apply(Command::ActiveTexture(0));
        Ok(())
    }

    /// Sets the vertex texture coordinate set `unit` reads from.
    pub fn set_texture_coord_set(&mut self, unit: usize, index: usize) {
        if let Some(shadow) = self.state.units.get_mut(unit) {
            shadow.coord_set = index;
        }
    }

    /// Configures automatic texture coordinate generation of `unit`. Some
    /// methods also compute an extra texture matrix that `set_texture_matrix`
    /// multiplies in.
    pub fn set_texture_coord_calculation(
        &mut self,
        unit: usize,
        method: TexCoordCalcMethod,
        frustum: Option<&Frustum>,
    ) -> Result<()> {
        if unit >= self.state.units.len() {
            return Ok(());
        }

        self.state.units[unit].auto_matrix = None;

        if method == TexCoordCalcMethod::None
            && self.state.units[unit].coord_calc == TexCoordCalcMethod::None
        {
            return Ok(());
        }

        let projector = match (method, frustum) {
            (TexCoordCalcMethod::ProjectiveTexture, Some(frustum)) => {
                Some(frustum.projection_matrix() * frustum.view_matrix())
            }
            (TexCoordCalcMethod::ProjectiveTexture, None) => {
                return Err(Error::InvalidConfiguration(
                    "projective texturing requires a frustum".to_owned(),
                ));
            }
            _ => None,
        };

        self.state.units[unit].coord_calc = method;
        self.driver.apply(Command::ActiveTexture(unit));

        let auto = match method {
            TexCoordCalcMethod::None => {
                self.tex_gen(TexGenMode::SphereMap, [false; 4], false);
                None
            }
            TexCoordCalcMethod::EnvironmentMap => {
                self.tex_gen(TexGenMode::SphereMap, [true, true, false, false], true);

                // Flips the sphere map vertically.
                Some(Matrix4::from_nonuniform_scale(1.0, -1.0, 1.0))
            }
            TexCoordCalcMethod::EnvironmentMapPlanar => {
                if self.caps.check_min_version("1.3") {
                    self.tex_gen(TexGenMode::ReflectionMap, [true, true, true, false], true);
                } else {
                    self.tex_gen(TexGenMode::SphereMap, [true, true, false, false], true);
                }

                None
            }
            TexCoordCalcMethod::EnvironmentMapReflection => {
                self.tex_gen(TexGenMode::ReflectionMap, [true, true, true, false], true);

                // Inverse of the modelview rotation, with z inverted before
                // rotating.
                let m = self.state.view * self.state.world;
                Some(Matrix4::new(
                    m.x.x, m.y.x, -m.z.x, 0.0, //
                    m.x.y, m.y.y, -m.z.y, 0.0, //
                    m.x.z, m.y.z, -m.z.z, 0.0, //
                    0.0, 0.0, 0.0, 1.0,
                ))
            }
            TexCoordCalcMethod::EnvironmentMapNormal => {
                self.tex_gen(TexGenMode::NormalMap, [true, true, true, false], true);
                None
            }
            TexCoordCalcMethod::ProjectiveTexture => {
                for &(axis, plane) in EYE_PLANES.iter() {
                    self.driver
                        .apply(Command::TexGenMode(axis, TexGenMode::EyeLinear));
                    self.driver.apply(Command::TexGenPlane(axis, plane));
                    self.driver.apply(Command::Enable(Cap::TexGen(axis)));
                }

                projector.map(|v| clip_space_to_image_space() * v * self.state.world)
            }
        };

        self.state.units[unit].auto_matrix = auto;
        self.driver.apply(Command::ActiveTexture(0));
        Ok(())
    }

    /// Loads the texture matrix of `unit`, followed by the automatic matrix of
    /// the coordinate generation mode.
    pub fn set_texture_matrix(&mut self, unit: usize, xform: Matrix4<f32>) -> Result<()> {
        let auto = match self.state.units.get(unit) {
            Some(shadow) => shadow.auto_matrix,
            None => return Ok(()),
        };

        let m = match auto {
            Some(auto) => xform * auto,
            None => xform,
        };

        self.driver.apply(Command::ActiveTexture(unit));
        self.driver.apply(Command::LoadMatrix(MatrixMode::Texture, m));
        self.driver.apply(Command::ActiveTexture(0));
        driver::check(self.driver.as_ref())
    }

    pub fn set_texture_border_color(&mut self, unit: usize, color: Color) -> Result<()> {
        let ty = match self.unit_type(unit) {
            Some(ty) => ty,
            None => return Ok(()),
        };

        self.driver.apply(Command::ActiveTexture(unit));
        self.driver
            .apply(Command::TexParameter(ty, TexParam::BorderColor(color)));
        self.driver.apply(Command::ActiveTexture(0));
        Ok(())
    }

    /// Applies every setting of a texture layer to `unit`.
    pub fn set_texture_unit_settings(
        &mut self,
        unit: usize,
        layer: &TextureUnitState,
    ) -> Result<()> {
        self.set_texture(unit, true, layer.texture())?;
        self.set_texture_coord_set(unit, layer.coord_set());

        for &ft in &[FilterType::Min, FilterType::Mag, FilterType::Mip] {
            self.set_texture_unit_filtering(unit, ft, layer.filtering(ft))?;
        }

        self.set_texture_layer_anisotropy(unit, layer.anisotropy())?;
        self.set_texture_blend_mode(unit, layer.color_blend())?;
        self.set_texture_blend_mode(unit, layer.alpha_blend())?;
        self.set_texture_addressing_mode(unit, layer.addressing())?;
        self.set_texture_border_color(unit, layer.border_color())?;

        let (method, frustum) = layer.coord_calculation();
        self.set_texture_coord_calculation(unit, method, frustum)?;
        self.set_texture_matrix(unit, layer.texture_matrix())
    }

    /// The shadow of `unit`, if the hardware has it.
    #[inline]
    pub fn texture_unit(&self, unit: usize) -> Option<&super::TextureUnitShadow> {
        self.state.units.get(unit)
    }

    fn unit_type(&self, unit: usize) -> Option<TextureType> {
        self.state.units.get(unit).and_then(|v| v.ty)
    }

    fn tex_gen(&self, mode: TexGenMode, enabled: [bool; 4], apply_mode: bool) {
        for (i, &(axis, _)) in EYE_PLANES.iter().enumerate() {
            if enabled[i] {
                if apply_mode {
                    self.driver.apply(Command::TexGenMode(axis, mode));
                }

                self.driver.apply(Command::Enable(Cap::TexGen(axis)));
            } else {
                self.driver.apply(Command::Disable(Cap::TexGen(axis)));
            }
        }
    }
}
