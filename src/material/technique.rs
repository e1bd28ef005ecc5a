use crate::errors::*;
use crate::video::capabilities::{Capabilities, Capability};
use crate::video::types::LayerBlendOperationEx;

use super::illumination::{self, IlluminationPass};
use super::pass::Pass;

/// The scheme techniques belong to unless told otherwise.
pub const DEFAULT_SCHEME: &str = "Default";

/// One complete way of rendering a material. Techniques of a material are
/// ordered by preference, and the first one the hardware supports is used.
#[derive(Debug, Clone)]
pub struct Technique {
    name: String,
    passes: Vec<Pass>,
    supported: bool,
    lod_index: usize,
    scheme: String,
    illumination: Option<Vec<IlluminationPass>>,
}

impl Default for Technique {
    fn default() -> Self {
        Technique {
            name: String::new(),
            passes: Vec::new(),
            supported: false,
            lod_index: 0,
            scheme: DEFAULT_SCHEME.to_owned(),
            illumination: None,
        }
    }
}

impl Technique {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name<T: Into<String>>(&mut self, name: T) {
        self.name = name.into();
    }

    /// Returns true if the last compilation found this technique usable.
    #[inline]
    pub fn is_supported(&self) -> bool {
        self.supported
    }

    #[inline]
    pub fn lod_index(&self) -> usize {
        self.lod_index
    }

    pub fn set_lod_index(&mut self, index: usize) {
        self.lod_index = index;
    }

    #[inline]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn set_scheme<T: Into<String>>(&mut self, scheme: T) {
        self.scheme = scheme.into();
    }

    pub fn create_pass(&mut self) -> &mut Pass {
        self.illumination = None;
        self.passes.push(Pass::new());
        let last = self.passes.len() - 1;
        &mut self.passes[last]
    }

    pub fn add_pass(&mut self, pass: Pass) {
        self.illumination = None;
        self.passes.push(pass);
    }

    #[inline]
    pub fn pass(&self, index: usize) -> Option<&Pass> {
        self.passes.get(index)
    }

    /// Mutable access to a pass. The illumination passes are rebuilt on
    /// next use.
    pub fn pass_mut(&mut self, index: usize) -> Option<&mut Pass> {
        self.illumination = None;
        self.passes.get_mut(index)
    }

    #[inline]
    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    #[inline]
    pub fn num_passes(&self) -> usize {
        self.passes.len()
    }

    pub fn remove_pass(&mut self, index: usize) -> Option<Pass> {
        if index < self.passes.len() {
            self.illumination = None;
            Some(self.passes.remove(index))
        } else {
            None
        }
    }

    pub fn remove_all_passes(&mut self) {
        self.illumination = None;
        self.passes.clear();
    }

    /// Returns true if the technique blends with the contents of the frame.
    pub fn is_transparent(&self) -> bool {
        self.passes
            .first()
            .map(|v| v.is_transparent())
            .unwrap_or(false)
    }

    /// Checks this technique against the hardware capabilities. Fixed-function
    /// passes with more texture units than the hardware has are split into
    /// several passes if `auto_manage` is set.
    ///
    /// Leaves the technique unsupported and returns the reason on failure.
    pub fn compile(&mut self, caps: &Capabilities, auto_manage: bool) -> Result<()> {
        self.supported = false;
        self.illumination = None;

        let mut i = 0;
        while i < self.passes.len() {
            let num_units = self.passes[i].num_texture_units();

            if self.passes[i].has_fragment_program() {
                if num_units > caps.num_texture_units {
                    return Err(Error::CapabilityMissing(format!(
                        "{} texture units in pass {}",
                        num_units, i
                    )));
                }
            } else {
                let limit = caps.fixed_function_texture_units;
                if num_units > limit {
                    if !auto_manage {
                        return Err(Error::CapabilityMissing(format!(
                            "{} texture units in pass {}",
                            num_units, i
                        )));
                    }

                    if self.passes[i].has_vertex_program() {
                        return Err(Error::InvalidConfiguration(format!(
                            "pass {} uses a vertex program and can not be split",
                            i
                        )));
                    }
                }
            }

            Self::check_texture_units(&self.passes[i], caps)?;
            Self::check_programs(&self.passes[i], caps)?;

            if !self.passes[i].has_fragment_program() {
                let limit = caps.fixed_function_texture_units;
                if let Some(pass) = self.passes[i].split(limit)? {
                    debug!(
                        "Splits pass {} of technique '{}' into {} texture units.",
                        i, self.name, limit
                    );

                    self.passes.insert(i + 1, pass);
                }
            }

            i += 1;
        }

        self.supported = true;
        self.compile_illumination_passes();
        Ok(())
    }

    /// The passes of this technique decomposed into the ambient, per-light and
    /// decal stages. Transparent techniques are not decomposed.
    pub fn illumination_passes(&mut self) -> &[IlluminationPass] {
        if self.illumination.is_none() {
            self.compile_illumination_passes();
        }

        self.illumination
            .as_ref()
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn compile_illumination_passes(&mut self) {
        let passes = if self.is_transparent() {
            Vec::new()
        } else {
            illumination::compile(&self.passes)
        };

        self.illumination = Some(passes);
    }

    fn check_texture_units(pass: &Pass, caps: &Capabilities) -> Result<()> {
        for unit in pass.texture_units() {
            if unit.is_cubic() && !caps.has(Capability::CubeMapping) {
                return Err(Error::CapabilityMissing("cube mapping".to_owned()));
            }

            if unit.is_3d() && !caps.has(Capability::Texture3D) {
                return Err(Error::CapabilityMissing("3D textures".to_owned()));
            }

            if unit.color_blend().operation == LayerBlendOperationEx::DotProduct
                && !caps.has(Capability::Dot3)
            {
                return Err(Error::CapabilityMissing("dot3 blending".to_owned()));
            }
        }

        Ok(())
    }

    fn check_programs(pass: &Pass, caps: &Capabilities) -> Result<()> {
        let programs = [
            pass.vertex_program(),
            pass.fragment_program(),
            pass.geometry_program(),
        ];

        for usage in programs.iter().filter_map(|v| *v) {
            if !usage.program.is_supported(caps) {
                return Err(Error::CapabilityMissing(format!(
                    "program '{}' with syntax {}",
                    usage.program.name(),
                    usage.program.syntax()
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::video::driver::{HeadlessDriver, Limit};
    use crate::video::types::{SceneBlendType, TextureType};

    fn capabilities(units: i32) -> Capabilities {
        let driver = HeadlessDriver::new()
            .with_version("1.2")
            .with_extensions(&["GL_ARB_multitexture"])
            .with_limit(Limit::MaxTextureUnits, units);

        Capabilities::probe(&driver).unwrap()
    }

    #[test]
    fn split_passes() {
        let caps = capabilities(2);

        let mut technique = Technique::new();
        {
            let pass = technique.create_pass();
            for i in 0..5 {
                pass.create_texture_unit(format!("layer{}.png", i));
            }
        }

        technique.compile(&caps, true).unwrap();
        assert!(technique.is_supported());
        assert_eq!(technique.num_passes(), 3);
        assert_eq!(technique.pass(0).unwrap().num_texture_units(), 2);
        assert_eq!(technique.pass(1).unwrap().num_texture_units(), 2);
        assert_eq!(technique.pass(2).unwrap().num_texture_units(), 1);
        assert_eq!(
            technique.pass(2).unwrap().texture_unit(0).unwrap().name(),
            "layer4.png"
        );
    }

    #[test]
    fn manual_texture_units() {
        let caps = capabilities(2);

        let mut technique = Technique::new();
        {
            let pass = technique.create_pass();
            for i in 0..3 {
                pass.create_texture_unit(format!("layer{}.png", i));
            }
        }

        assert!(technique.compile(&caps, false).is_err());
        assert!(!technique.is_supported());
        assert_eq!(technique.num_passes(), 1);
    }

    #[test]
    fn cube_mapping() {
        let caps = capabilities(4);

        let mut technique = Technique::new();
        technique
            .create_pass()
            .create_texture_unit("sky.png")
            .set_texture("sky.png", TextureType::CubeMap);

        assert!(technique.compile(&caps, true).is_err());
        assert!(!technique.is_supported());
    }

    #[test]
    fn transparent() {
        let caps = capabilities(4);

        let mut technique = Technique::new();
        technique
            .create_pass()
            .set_scene_blending_type(SceneBlendType::TransparentAlpha);

        technique.compile(&caps, true).unwrap();
        assert!(technique.is_transparent());
        assert!(technique.illumination_passes().is_empty());

        technique
            .pass_mut(0)
            .unwrap()
            .set_scene_blending_type(SceneBlendType::Replace);
        assert!(!technique.illumination_passes().is_empty());
    }
}
