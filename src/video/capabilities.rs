use std::cmp;
use std::fmt;

use crate::errors::*;
use crate::video::driver::{Driver, Limit};

/// Describes a version.
///
/// A version can only be compared to another version if they belong to the same API.
/// For example, both `Version::GL(3, 0) >= Version::ES(3, 0)` and `Version::ES(3, 0) >=
/// Version::GL(3, 0)` return `false`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Version {
    /// Regular OpenGL.
    GL(u8, u8),
    /// OpenGL embedded system.
    ES(u8, u8),
}

impl PartialOrd for Version {
    #[inline]
    fn partial_cmp(&self, other: &Version) -> Option<cmp::Ordering> {
        let (es1, major1, minor1) = match *self {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        let (es2, major2, minor2) = match *other {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        if es1 != es2 {
            None
        } else {
            match major1.cmp(&major2) {
                cmp::Ordering::Equal => Some(minor1.cmp(&minor2)),
                v => Some(v),
            }
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Version::GL(major, minor) => write!(f, "OpenGL {}.{}", major, minor),
            Version::ES(major, minor) => write!(f, "OpenGL ES {}.{}", major, minor),
        }
    }
}

impl Version {
    /// Parses a version string like `2.1.0 NVIDIA 390.77` or `OpenGL ES 2.0`.
    pub fn parse(desc: &str) -> Result<Version> {
        let (es, desc) = if desc.starts_with("OpenGL ES ") {
            (true, &desc[10..])
        } else if desc.starts_with("OpenGL ES-") {
            (true, &desc[13..])
        } else {
            (false, desc)
        };

        let desc = desc
            .split(' ')
            .next()
            .ok_or_else(|| Error::Driver(format!("Version '{}' is unformatted.", desc)))?;

        let mut iter = desc.split('.');
        let major = Version::parse_component(iter.next(), desc)?;
        let minor = Version::parse_component(iter.next(), desc)?;

        if es {
            Ok(Version::ES(major, minor))
        } else {
            Ok(Version::GL(major, minor))
        }
    }

    fn parse_component(v: Option<&str>, desc: &str) -> Result<u8> {
        v.and_then(|v| v.parse().ok())
            .ok_or_else(|| Error::Driver(format!("Version '{}' is unformatted.", desc)))
    }
}

macro_rules! extensions {
    ($($string:expr => $field:ident,)+) => {
        /// Contains data about the list of extensions.
        #[derive(Debug, Clone, Copy, Default)]
        pub struct Extensions {
            $(
                pub $field: bool,
            )+
        }

        impl Extensions {
            /// Gets the names of every extension the render system cares about.
            pub fn names() -> &'static [&'static str] {
                &[$($string,)+]
            }

            pub fn parse<T: AsRef<str>>(strings: &[T]) -> Extensions {
                let mut extensions = Extensions::default();

                for extension in strings {
                    match extension.as_ref() {
                        $(
                            $string => extensions.$field = true,
                        )+
                        _ => ()
                    }
                }

                extensions
            }
        }
    }
}

extensions! {
    "GL_ARB_multitexture" => gl_arb_multitexture,
    "GL_ARB_texture_cube_map" => gl_arb_texture_cube_map,
    "GL_EXT_texture3D" => gl_ext_texture3d,
    "GL_ARB_texture_env_combine" => gl_arb_texture_env_combine,
    "GL_ARB_texture_env_dot3" => gl_arb_texture_env_dot3,
    "GL_EXT_stencil_two_side" => gl_ext_stencil_two_side,
    "GL_EXT_stencil_wrap" => gl_ext_stencil_wrap,
    "GL_ARB_vertex_buffer_object" => gl_arb_vertex_buffer_object,
    "GL_EXT_framebuffer_object" => gl_ext_framebuffer_object,
    "GL_ARB_draw_buffers" => gl_arb_draw_buffers,
    "GL_ATI_draw_buffers" => gl_ati_draw_buffers,
    "GL_ARB_vertex_program" => gl_arb_vertex_program,
    "GL_ARB_fragment_program" => gl_arb_fragment_program,
    "GL_ARB_shader_objects" => gl_arb_shader_objects,
    "GL_ARB_vertex_shader" => gl_arb_vertex_shader,
    "GL_ARB_fragment_shader" => gl_arb_fragment_shader,
    "GL_EXT_texture_compression_s3tc" => gl_ext_texture_compression_s3tc,
    "GL_EXT_texture_filter_anisotropic" => gl_ext_texture_filter_anisotropic,
    "GL_EXT_blend_func_separate" => gl_ext_blend_func_separate,
    "GL_EXT_blend_equation_separate" => gl_ext_blend_equation_separate,
    "GL_EXT_framebuffer_sRGB" => gl_ext_framebuffer_srgb,
    "GL_ARB_multisample" => gl_arb_multisample,
    "GL_ARB_point_sprite" => gl_arb_point_sprite,
    "GL_ARB_point_parameters" => gl_arb_point_parameters,
}

/// Hardware features the render system and the material compiler query.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    CubeMapping,
    Texture3D,
    Dot3,
    TwoSidedStencil,
    StencilWrap,
    VertexBuffer,
    FrameBufferObject,
    ArbDrawBuffers,
    AtiDrawBuffers,
    VertexProgram,
    FragmentProgram,
    Glsl,
    TextureCompressionDxt,
    Anisotropy,
    SeparateSceneBlending,
    AdvancedBlendOperations,
    HardwareGamma,
    Multisample,
    PointSprites,
    PointExtendedParameters,
    UserClipPlanes,
    ScissorTest,
}

/// Represents the capabilities of the hardware.
///
/// Contrary to the render state, these values never change after probing.
#[derive(Debug, Clone)]
pub struct Capabilities {
    /// Returns a version or release number.
    pub version: Version,
    /// The company responsible for this GL implementation.
    pub vendor: String,
    /// The name of the renderer.
    pub renderer: String,
    /// The list of OpenGL extensions support by this implementation.
    pub extensions: Extensions,
    /// Total number of texture units, including those only reachable from programs.
    pub num_texture_units: usize,
    /// Number of texture units the fixed-function pipeline can address.
    pub fixed_function_texture_units: usize,
    pub max_lights: usize,
    pub max_clip_planes: usize,
    pub stencil_bits: u32,
    /// Maximum number of simultaneous color attachments.
    pub max_color_attachments: usize,
    /// Float4 constants available to vertex programs.
    pub vertex_float_constants: usize,
    /// Float4 constants available to fragment programs.
    pub fragment_float_constants: usize,
    pub max_anisotropy: f32,
    /// Program syntax codes like `arbvp1`, `arbfp1` and `glsl`.
    pub syntax_codes: Vec<String>,
    raw_extensions: Vec<String>,
}

impl Capabilities {
    /// Probes the hardware behind `driver`.
    pub fn probe(driver: &dyn Driver) -> Result<Capabilities> {
        let version = Version::parse(&driver.version())?;
        let raw_extensions = driver.extensions();
        let extensions = Extensions::parse(&raw_extensions);

        let glsl = extensions.gl_arb_shader_objects
            && extensions.gl_arb_vertex_shader
            && extensions.gl_arb_fragment_shader;

        let fixed_function_texture_units = if extensions.gl_arb_multitexture {
            cmp::max(driver.get_integer(Limit::MaxTextureUnits), 1) as usize
        } else {
            1
        };

        let num_texture_units = if extensions.gl_arb_fragment_program || glsl {
            cmp::max(
                fixed_function_texture_units,
                driver.get_integer(Limit::MaxTextureImageUnits).max(0) as usize,
            )
        } else {
            fixed_function_texture_units
        };

        let mut syntax_codes = Vec::new();
        if extensions.gl_arb_vertex_program {
            syntax_codes.push("arbvp1".to_owned());
        }

        if extensions.gl_arb_fragment_program {
            syntax_codes.push("arbfp1".to_owned());
        }

        if glsl {
            syntax_codes.push("glsl".to_owned());
        }

        let max_anisotropy = if extensions.gl_ext_texture_filter_anisotropic {
            driver.get_integer(Limit::MaxTextureMaxAnisotropy).max(1) as f32
        } else {
            1.0
        };

        let max_color_attachments = if extensions.gl_arb_draw_buffers
            || extensions.gl_ati_draw_buffers
        {
            driver.get_integer(Limit::MaxDrawBuffers).max(1) as usize
        } else {
            1
        };

        Ok(Capabilities {
            version,
            vendor: driver.vendor(),
            renderer: driver.renderer(),
            extensions,
            num_texture_units,
            fixed_function_texture_units,
            max_lights: driver.get_integer(Limit::MaxLights).max(0) as usize,
            max_clip_planes: driver.get_integer(Limit::MaxClipPlanes).max(0) as usize,
            stencil_bits: driver.get_integer(Limit::StencilBits).max(0) as u32,
            max_color_attachments: cmp::min(
                max_color_attachments,
                driver.get_integer(Limit::MaxColorAttachments).max(1) as usize,
            ),
            vertex_float_constants: (driver.get_integer(Limit::MaxVertexUniformComponents) / 4)
                .max(0) as usize,
            fragment_float_constants: (driver.get_integer(Limit::MaxFragmentUniformComponents)
                / 4)
            .max(0) as usize,
            max_anisotropy,
            syntax_codes,
            raw_extensions,
        })
    }

    /// Returns true if the driver reports the extension `name`.
    pub fn check_extension(&self, name: &str) -> bool {
        self.raw_extensions.iter().any(|v| v == name)
    }

    /// Returns true if the version of the driver is at least `version`, e.g. `"1.3"`.
    pub fn check_min_version(&self, version: &str) -> bool {
        match Version::parse(version) {
            Ok(Version::GL(major, minor)) => self.version >= Version::GL(major, minor),
            Ok(Version::ES(major, minor)) => self.version >= Version::ES(major, minor),
            Err(_) => false,
        }
    }

    pub fn is_syntax_supported(&self, syntax: &str) -> bool {
        self.syntax_codes.iter().any(|v| v == syntax)
    }

    pub fn has(&self, cap: Capability) -> bool {
        let ext = &self.extensions;
        let gl = |major, minor| self.version >= Version::GL(major, minor);

        match cap {
            Capability::CubeMapping => ext.gl_arb_texture_cube_map || gl(1, 3),
            Capability::Texture3D => ext.gl_ext_texture3d || gl(1, 2),
            Capability::Dot3 => ext.gl_arb_texture_env_dot3 || gl(1, 3),
            Capability::TwoSidedStencil => ext.gl_ext_stencil_two_side || gl(2, 0),
            Capability::StencilWrap => ext.gl_ext_stencil_wrap || gl(1, 4),
            Capability::VertexBuffer => ext.gl_arb_vertex_buffer_object || gl(1, 5),
            Capability::FrameBufferObject => ext.gl_ext_framebuffer_object,
            Capability::ArbDrawBuffers => ext.gl_arb_draw_buffers || gl(2, 0),
            Capability::AtiDrawBuffers => ext.gl_ati_draw_buffers,
            Capability::VertexProgram => self.is_syntax_supported("arbvp1"),
            Capability::FragmentProgram => self.is_syntax_supported("arbfp1"),
            Capability::Glsl => self.is_syntax_supported("glsl"),
            Capability::TextureCompressionDxt => ext.gl_ext_texture_compression_s3tc,
            Capability::Anisotropy => ext.gl_ext_texture_filter_anisotropic,
            Capability::SeparateSceneBlending => ext.gl_ext_blend_func_separate || gl(1, 4),
            Capability::AdvancedBlendOperations => {
                ext.gl_ext_blend_equation_separate || gl(2, 0)
            }
            Capability::HardwareGamma => ext.gl_ext_framebuffer_srgb,
            Capability::Multisample => ext.gl_arb_multisample || gl(1, 3),
            Capability::PointSprites => ext.gl_arb_point_sprite || gl(2, 0),
            Capability::PointExtendedParameters => ext.gl_arb_point_parameters || gl(1, 4),
            Capability::UserClipPlanes => self.max_clip_planes > 0,
            Capability::ScissorTest => true,
        }
    }

    /// Writes the probed hardware description into the log.
    pub fn log(&self) {
        info!("RenderSystem capabilities");
        info!("  version: {}", self.version);
        info!("  vendor: {}", self.vendor);
        info!("  renderer: {}", self.renderer);
        info!("  extensions: {:?}", self.raw_extensions);
        info!(
            "  texture units: {} (fixed-function {})",
            self.num_texture_units, self.fixed_function_texture_units
        );
        info!("  lights: {}", self.max_lights);
        info!("  clip planes: {}", self.max_clip_planes);
        info!("  stencil bits: {}", self.stencil_bits);
        info!("  color attachments: {}", self.max_color_attachments);
        info!(
            "  float constants: vertex {}, fragment {}",
            self.vertex_float_constants, self.fragment_float_constants
        );
        info!("  program profiles: {:?}", self.syntax_codes);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::video::driver::HeadlessDriver;

    #[test]
    fn version() {
        assert_eq!(
            Version::parse("2.1.0 NVIDIA 390.77").unwrap(),
            Version::GL(2, 1)
        );
        assert_eq!(Version::parse("OpenGL ES 2.0").unwrap(), Version::ES(2, 0));
        assert!(Version::parse("unknown").is_err());

        assert!(Version::GL(2, 1) > Version::GL(1, 5));
        assert!(!(Version::GL(3, 0) >= Version::ES(3, 0)));
        assert!(!(Version::ES(3, 0) >= Version::GL(3, 0)));
    }

    #[test]
    fn probe() {
        let driver = HeadlessDriver::new()
            .with_version("1.2")
            .with_extensions(&["GL_ARB_multitexture", "GL_ARB_vertex_program"])
            .with_limit(Limit::MaxTextureUnits, 2);

        let caps = Capabilities::probe(&driver).unwrap();
        assert_eq!(caps.num_texture_units, 2);
        assert_eq!(caps.fixed_function_texture_units, 2);
        assert!(caps.check_extension("GL_ARB_multitexture"));
        assert!(!caps.check_min_version("1.3"));
        assert!(caps.check_min_version("1.2"));
        assert!(!caps.has(Capability::CubeMapping));
        assert!(!caps.has(Capability::TwoSidedStencil));
        assert!(caps.is_syntax_supported("arbvp1"));
        assert!(!caps.is_syntax_supported("glsl"));
    }
}
