//! The boundary between the render system and the native graphics API. Every
//! state mutation goes through `Driver::apply` as a `Command`, which keeps the
//! tracker testable against the in-memory `HeadlessDriver`.

pub mod command;
pub mod headless;

pub use self::command::{Cap, ClientArray, Command, LightSetup, MatrixMode, SurfaceColors, TexParam};
pub use self::headless::{Call, HeadlessDriver};

use std::fmt;

use crate::errors::*;
use crate::video::types::{CubeFace, GpuProgramType, TextureType};

/// Opaque identity of a rendering context owned by the graphics-support layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContextHandle(pub u32);

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ContextHandle({})", self.0)
    }
}

/// Settings of the primary window surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowDesc {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Requests a gamma-correct (sRGB) default framebuffer.
    pub hardware_gamma: bool,
    pub vsync: bool,
}

impl Default for WindowDesc {
    fn default() -> Self {
        WindowDesc {
            title: "pigment".to_owned(),
            width: 640,
            height: 480,
            hardware_gamma: false,
            vsync: false,
        }
    }
}

/// Kinds of driver objects that are created and deleted by name.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Texture,
    Buffer,
    Framebuffer,
    Renderbuffer,
    /// Assembly programs, one object per shader stage.
    ArbProgram,
    /// Linked GLSL program objects.
    GlslProgram,
}

/// Numeric limits queried from the driver.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Limit {
    MaxTextureUnits,
    MaxTextureImageUnits,
    MaxLights,
    MaxClipPlanes,
    StencilBits,
    MaxColorAttachments,
    MaxDrawBuffers,
    MaxVertexUniformComponents,
    MaxFragmentUniformComponents,
    MaxTextureMaxAnisotropy,
    MaxTextureSize,
}

/// Errors reported by `Driver::get_error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    InvalidEnum,
    InvalidValue,
    InvalidOperation,
    InvalidFramebufferOperation,
    OutOfMemory,
    Unknown(String),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DriverError::InvalidEnum => {
                write!(f, "An unacceptable value is specified for an enumerated argument.")
            }
            DriverError::InvalidValue => write!(f, "A numeric argument is out of range."),
            DriverError::InvalidOperation => write!(
                f,
                "The specified operation is not allowed in the current state."
            ),
            DriverError::InvalidFramebufferOperation => write!(
                f,
                "The command is trying to render to or read from the framebuffer while the \
                 currently bound framebuffer is not framebuffer complete."
            ),
            DriverError::OutOfMemory => {
                write!(f, "There is not enough memory left to execute the command.")
            }
            DriverError::Unknown(ref v) => write!(f, "Oops, {}", v),
        }
    }
}

/// Result of a framebuffer completeness query.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FramebufferStatus {
    Complete,
    Unsupported,
    IncompleteAttachment,
    IncompleteMissingAttachment,
    IncompleteDimensions,
    IncompleteFormats,
    IncompleteDrawBuffer,
    IncompleteReadBuffer,
}

/// Diagnostics of the last program load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramError {
    pub line: i32,
    pub column: i32,
    pub message: String,
}

/// Describes a read-back from driver memory.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DownloadSource {
    Buffer {
        id: u32,
        offset: usize,
        len: usize,
    },
    /// A whole image level of a texture.
    Texture {
        ty: TextureType,
        id: u32,
        face: CubeFace,
        level: u32,
        len: usize,
    },
}

/// The native graphics API as seen by the render system.
///
/// Calls are blocking and may fail silently, the "last error" must be polled with
/// `get_error` after risky operations.
pub trait Driver: Send + Sync {
    fn version(&self) -> String;

    fn vendor(&self) -> String;

    fn renderer(&self) -> String;

    fn extensions(&self) -> Vec<String>;

    fn get_integer(&self, limit: Limit) -> i32;

    /// Polls and clears the last error.
    fn get_error(&self) -> Option<DriverError>;

    /// Generates a new object name.
    fn create(&self, kind: ObjectKind) -> u32;

    fn delete(&self, kind: ObjectKind, id: u32) -> Result<()>;

    /// Applies a state-changing call.
    fn apply(&self, cmd: Command);

    /// Checks the completeness of the currently bound framebuffer.
    fn check_framebuffer_status(&self) -> FramebufferStatus;

    /// Loads the source of a program object, `program_error` must be polled afterwards.
    fn load_program(&self, ty: GpuProgramType, id: u32, source: &str);

    fn program_error(&self) -> Option<ProgramError>;

    fn download(&self, src: DownloadSource) -> Result<Vec<u8>>;

    /// Creates the primary window and its context.
    fn create_window(&self, desc: &WindowDesc) -> Result<ContextHandle>;

    /// Creates a new context sharing the object namespace of `main`.
    fn create_shared_context(&self, main: ContextHandle) -> Result<ContextHandle>;

    fn make_current(&self, ctx: ContextHandle);

    fn end_current(&self, ctx: ContextHandle);

    fn destroy_context(&self, ctx: ContextHandle) -> Result<()>;

    /// Stops the graphics-support layer.
    fn stop(&self);
}

impl fmt::Debug for dyn Driver {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Driver({})", self.renderer())
    }
}

/// Polls the last error of `driver`.
pub fn check(driver: &dyn Driver) -> Result<()> {
    match driver.get_error() {
        None => Ok(()),
        Some(err) => Err(Error::Driver(format!("{}", err))),
    }
}
