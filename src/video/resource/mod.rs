//! Driver objects whose lifetime the render system manages: contexts, render
//! targets and their framebuffer objects, pooled render buffers, textures and
//! hardware buffers.
//!
//! Every resource deletes its driver object on drop. Deletion failures are
//! logged and swallowed, the context may already be gone during shutdown.

pub mod context;
pub mod frame_buffer;
pub mod hardware_buffer;
pub mod pixel_buffer;
pub mod render_buffer;
pub mod render_target;
pub mod texture;

pub mod prelude {
    pub use super::context::GLContext;
    pub use super::frame_buffer::FrameBufferObject;
    pub use super::hardware_buffer::{
        HardwareBuffer, HardwareBufferHandle, HardwareBufferKind, HardwareBufferManager,
        IndexData, RenderOperation,
    };
    pub use super::pixel_buffer::{HardwarePixelBuffer, PixelBox, PixelBufferDesc};
    pub use super::render_buffer::{DepthStencilMode, RenderBufferPool, SurfaceDesc, SurfaceSource};
    pub use super::render_target::{
        RenderTarget, RenderTargetHandle, RenderTargetKind, RenderTargetManager,
    };
    pub use super::texture::{Texture, TextureDesc, TextureHandle, TextureManager};
}
