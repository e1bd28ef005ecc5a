//! Pooled render buffers shared as depth and stencil attachments.

use std::sync::Arc;

use crate::errors::*;
use crate::utils::hash::FastHashMap;
use crate::video::driver::{Command, Driver, ObjectKind};
use crate::video::types::*;

/// Where the pixels of an attachment live.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SurfaceSource {
    /// An image of a texture.
    Texture {
        ty: TextureType,
        id: u32,
        face: CubeFace,
        level: u32,
    },
    /// A render buffer, which can only be used as an attachment.
    RenderBuffer { id: u32 },
}

/// A surface bound to a framebuffer attachment point.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SurfaceDesc {
    pub source: SurfaceSource,
    pub format: RenderBufferFormat,
    pub width: u32,
    pub height: u32,
    /// Slice of a 3D texture.
    pub zoffset: u32,
}

/// A depth/stencil format pair. A packed depth format implies stencil, the
/// stencil format is `None` then.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepthStencilMode {
    pub depth: Option<DepthFormat>,
    pub stencil: Option<StencilFormat>,
}

impl DepthStencilMode {
    pub fn new(depth: Option<DepthFormat>, stencil: Option<StencilFormat>) -> Self {
        DepthStencilMode { depth, stencil }
    }

    #[inline]
    pub fn is_packed(&self) -> bool {
        self.depth == Some(DepthFormat::Depth24Stencil8)
    }

    /// Gets how desirable this mode is, higher is better.
    pub fn score(&self) -> u32 {
        let mut score = 0;

        if self.stencil.is_some() {
            score += 1000;
        }

        if let Some(depth) = self.depth {
            score += 2000;

            if depth.bits() == 24 {
                score += 500;
            }

            if self.is_packed() {
                score += 5000;
            }

            score += depth.bits();
        }

        if let Some(stencil) = self.stencil {
            score += stencil.bits();
        }

        score
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct RenderBufferKey {
    format: RenderBufferFormat,
    width: u32,
    height: u32,
}

#[derive(Debug, Copy, Clone)]
struct PooledRenderBuffer {
    id: u32,
    refs: usize,
}

/// The sole owner of shared render buffers. Buffers are keyed by format and
/// size, and freed once the last user releases them.
pub struct RenderBufferPool {
    driver: Arc<dyn Driver>,
    buffers: FastHashMap<RenderBufferKey, PooledRenderBuffer>,
    modes: FastHashMap<PixelFormat, Vec<DepthStencilMode>>,
    default_modes: Vec<DepthStencilMode>,
}

impl RenderBufferPool {
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        RenderBufferPool {
            driver,
            buffers: FastHashMap::default(),
            modes: FastHashMap::default(),
            default_modes: vec![
                DepthStencilMode::new(Some(DepthFormat::Depth24Stencil8), None),
                DepthStencilMode::new(Some(DepthFormat::Depth24), Some(StencilFormat::Stencil8)),
                DepthStencilMode::new(Some(DepthFormat::Depth16), None),
                DepthStencilMode::new(None, None),
            ],
        }
    }

    /// Sets the depth/stencil modes that work together with color `format`.
    pub fn set_format_modes(&mut self, format: PixelFormat, modes: Vec<DepthStencilMode>) {
        self.modes.insert(format, modes);
    }

    /// Sets the modes of every color format without an explicit entry.
    pub fn set_default_modes(&mut self, modes: Vec<DepthStencilMode>) {
        self.default_modes = modes;
    }

    /// Picks the most desirable depth/stencil mode for color `format`.
    pub fn best_depth_stencil(&self, format: PixelFormat) -> DepthStencilMode {
        let modes = self.modes.get(&format).unwrap_or(&self.default_modes);

        let mut best = DepthStencilMode::new(None, None);
        let mut best_score = 0;
        for mode in modes {
            let score = mode.score();
            if score > best_score {
                best = *mode;
                best_score = score;
            }
        }

        best
    }

    /// Requests a render buffer, sharing one with the same format and size if
    /// it exists.
    pub fn request(&mut self, format: RenderBufferFormat, width: u32, height: u32) -> SurfaceDesc {
        let key = RenderBufferKey {
            format,
            width,
            height,
        };

        let driver = &self.driver;
        let entry = self.buffers.entry(key).or_insert_with(|| {
            let id = driver.create(ObjectKind::Renderbuffer);
            driver.apply(Command::RenderbufferStorage {
                id,
                format,
                width,
                height,
            });

            debug!(
                "Created render buffer {} ({:?} {}x{}).",
                id, format, width, height
            );

            PooledRenderBuffer { id, refs: 0 }
        });

        entry.refs += 1;
        SurfaceDesc {
            source: SurfaceSource::RenderBuffer { id: entry.id },
            format,
            width,
            height,
            zoffset: 0,
        }
    }

    /// Adds a reference to a pooled buffer.
    pub fn retain(&mut self, surface: &SurfaceDesc) -> Result<()> {
        let key = Self::key(surface);
        match self.buffers.get_mut(&key) {
            Some(v) => {
                v.refs += 1;
                Ok(())
            }
            None => Err(Error::HandleInvalid(format!("{:?}", surface.source))),
        }
    }

    /// Drops a reference to a pooled buffer, deleting it once unused.
    pub fn release(&mut self, surface: &SurfaceDesc) {
        let key = Self::key(surface);
        let freed = match self.buffers.get_mut(&key) {
            Some(v) => {
                v.refs -= 1;
                v.refs == 0
            }
            None => {
                warn!("Released render buffer {:?} is not pooled.", surface.source);
                false
            }
        };

        if freed {
            if let Some(v) = self.buffers.remove(&key) {
                debug!("Deleted render buffer {}.", v.id);
                if let Err(err) = self.driver.delete(ObjectKind::Renderbuffer, v.id) {
                    warn!("Failed to delete render buffer {}. {}", v.id, err);
                }
            }
        }
    }

    /// Gets the number of users of the pooled buffer, 0 if it doesn't exist.
    pub fn ref_count(&self, surface: &SurfaceDesc) -> usize {
        self.buffers
            .get(&Self::key(surface))
            .map(|v| v.refs)
            .unwrap_or(0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    fn key(surface: &SurfaceDesc) -> RenderBufferKey {
        RenderBufferKey {
            format: surface.format,
            width: surface.width,
            height: surface.height,
        }
    }
}

impl Drop for RenderBufferPool {
    fn drop(&mut self) {
        if !self.buffers.is_empty() {
            warn!(
                "RenderBufferPool dropped, but {} render buffers were not released.",
                self.buffers.len()
            );
        }

        for (_, v) in self.buffers.drain() {
            if let Err(err) = self.driver.delete(ObjectKind::Renderbuffer, v.id) {
                warn!("Failed to delete render buffer {}. {}", v.id, err);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::video::driver::HeadlessDriver;

    #[test]
    fn score() {
        let packed = DepthStencilMode::new(Some(DepthFormat::Depth24Stencil8), None);
        let split = DepthStencilMode::new(Some(DepthFormat::Depth24), Some(StencilFormat::Stencil8));
        let depth = DepthStencilMode::new(Some(DepthFormat::Depth16), None);

        assert_eq!(packed.score(), 2000 + 500 + 5000 + 24);
        assert_eq!(split.score(), 1000 + 2000 + 500 + 24 + 8);
        assert!(split.score() > depth.score());
    }

    #[test]
    fn best() {
        let mut pool = RenderBufferPool::new(Arc::new(HeadlessDriver::new()));
        assert!(pool.best_depth_stencil(PixelFormat::A8R8G8B8).is_packed());

        pool.set_format_modes(
            PixelFormat::FloatR16,
            vec![
                DepthStencilMode::new(Some(DepthFormat::Depth16), None),
                DepthStencilMode::new(Some(DepthFormat::Depth32), None),
            ],
        );

        let mode = pool.best_depth_stencil(PixelFormat::FloatR16);
        assert_eq!(mode.depth, Some(DepthFormat::Depth32));

        pool.set_format_modes(PixelFormat::L8, Vec::new());
        assert_eq!(
            pool.best_depth_stencil(PixelFormat::L8),
            DepthStencilMode::new(None, None)
        );
    }
}
