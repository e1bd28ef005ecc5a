//! The render state tracker and everything it binds.
//!
//! `RenderSystem` is the single owner of the driver state. It keeps a shadow of
//! that state and only issues the driver commands required to transition into
//! the state of the next draw call. Driver objects are created and recycled by
//! the managers in `resource`, programs and their constants live in `program`.

pub mod capabilities;
pub mod config;
pub mod driver;
pub mod program;
pub mod resource;
pub mod system;
pub mod types;
pub mod viewport;

pub mod prelude {
    pub use super::capabilities::{Capabilities, Capability, Version};
    pub use super::config::RenderSystemParams;
    pub use super::driver::{ContextHandle, Driver, HeadlessDriver, WindowDesc};
    pub use super::program::{GpuProgram, GpuProgramManager, GpuProgramParameters};
    pub use super::resource::prelude::*;
    pub use super::system::RenderSystem;
    pub use super::types::*;
    pub use super::viewport::Viewport;
}
