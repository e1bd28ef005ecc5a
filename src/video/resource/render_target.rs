//! Windows and render textures the render system draws into.

use std::sync::Arc;

use crate::errors::*;
use crate::utils::object_pool::ObjectPool;
use crate::video::capabilities::Capabilities;
use crate::video::driver::{Command, ContextHandle, Driver, WindowDesc};
use crate::video::types::*;

use super::frame_buffer::FrameBufferObject;
use super::render_buffer::{RenderBufferPool, SurfaceDesc};
use super::texture::TextureHandle;

impl_handle!(RenderTargetHandle);

#[derive(Debug)]
pub enum RenderTargetKind {
    /// The default framebuffer of a window.
    Window,
    /// A single texture image rendered through a framebuffer object.
    RenderTexture {
        texture: TextureHandle,
        fbo: FrameBufferObject,
    },
    /// Several color surfaces written at once.
    MultiRenderTarget { fbo: FrameBufferObject },
}

#[derive(Debug)]
pub struct RenderTarget {
    name: String,
    context: ContextHandle,
    width: u32,
    height: u32,
    hardware_gamma: bool,
    kind: RenderTargetKind,
}

impl RenderTarget {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The context this target was created under.
    #[inline]
    pub fn context(&self) -> ContextHandle {
        self.context
    }

    pub fn width(&self) -> u32 {
        match self.fbo() {
            Some(fbo) if fbo.surface(0).is_some() => fbo.width(),
            _ => self.width,
        }
    }

    pub fn height(&self) -> u32 {
        match self.fbo() {
            Some(fbo) if fbo.surface(0).is_some() => fbo.height(),
            _ => self.height,
        }
    }

    /// Returns true if writes to this target should be gamma corrected.
    #[inline]
    pub fn is_hardware_gamma_enabled(&self) -> bool {
        self.hardware_gamma
    }

    pub fn set_hardware_gamma_enabled(&mut self, enabled: bool) {
        self.hardware_gamma = enabled;
    }

    /// Framebuffer objects store images upside down relative to windows.
    pub fn requires_flipping(&self) -> bool {
        match self.kind {
            RenderTargetKind::Window => false,
            _ => true,
        }
    }

    #[inline]
    pub fn kind(&self) -> &RenderTargetKind {
        &self.kind
    }

    pub fn fbo(&self) -> Option<&FrameBufferObject> {
        match self.kind {
            RenderTargetKind::Window => None,
            RenderTargetKind::RenderTexture { ref fbo, .. } => Some(fbo),
            RenderTargetKind::MultiRenderTarget { ref fbo } => Some(fbo),
        }
    }

    fn fbo_mut(&mut self) -> Option<&mut FrameBufferObject> {
        match self.kind {
            RenderTargetKind::Window => None,
            RenderTargetKind::RenderTexture { ref mut fbo, .. } => Some(fbo),
            RenderTargetKind::MultiRenderTarget { ref mut fbo } => Some(fbo),
        }
    }

    fn into_fbo(self) -> Option<FrameBufferObject> {
        match self.kind {
            RenderTargetKind::Window => None,
            RenderTargetKind::RenderTexture { fbo, .. } => Some(fbo),
            RenderTargetKind::MultiRenderTarget { fbo } => Some(fbo),
        }
    }
}

/// Owns every render target and the render buffers shared between them.
pub struct RenderTargetManager {
    driver: Arc<dyn Driver>,
    targets: ObjectPool<RenderTargetHandle, RenderTarget>,
    pool: RenderBufferPool,
    max_color_attachments: usize,
    depth_buffer_pool: bool,
}

impl RenderTargetManager {
    pub fn new(driver: Arc<dyn Driver>, caps: &Capabilities, depth_buffer_pool: bool) -> Self {
        RenderTargetManager {
            pool: RenderBufferPool::new(driver.clone()),
            driver,
            targets: ObjectPool::new(),
            max_color_attachments: caps.max_color_attachments.max(1),
            depth_buffer_pool,
        }
    }

    pub fn create_window<T: Into<String>>(
        &mut self,
        name: T,
        context: ContextHandle,
        desc: &WindowDesc,
    ) -> RenderTargetHandle {
        self.targets.create(RenderTarget {
            name: name.into(),
            context,
            width: desc.width,
            height: desc.height,
            hardware_gamma: desc.hardware_gamma,
            kind: RenderTargetKind::Window,
        })
    }

    /// Creates a target rendering into `surface` of `texture`.
    pub fn create_render_texture<T: Into<String>>(
        &mut self,
        name: T,
        context: ContextHandle,
        texture: TextureHandle,
        surface: SurfaceDesc,
        caps: &Capabilities,
    ) -> Result<RenderTargetHandle> {
        let mut fbo = FrameBufferObject::new(
            self.driver.clone(),
            context,
            self.max_color_attachments,
            self.depth_buffer_pool,
        );

        if let Err(err) = fbo.bind_surface(0, surface, &mut self.pool, caps) {
            fbo.dispose(&mut self.pool);
            return Err(err);
        }

        Ok(self.targets.create(RenderTarget {
            name: name.into(),
            context,
            width: surface.width,
            height: surface.height,
            hardware_gamma: false,
            kind: RenderTargetKind::RenderTexture { texture, fbo },
        }))
    }

    /// Creates a target without surfaces, they are bound later with
    /// `bind_surface`.
    pub fn create_multi_render_target<T: Into<String>>(
        &mut self,
        name: T,
        context: ContextHandle,
    ) -> RenderTargetHandle {
        let fbo = FrameBufferObject::new(
            self.driver.clone(),
            context,
            self.max_color_attachments,
            self.depth_buffer_pool,
        );

        self.targets.create(RenderTarget {
            name: name.into(),
            context,
            width: 0,
            height: 0,
            hardware_gamma: false,
            kind: RenderTargetKind::MultiRenderTarget { fbo },
        })
    }

    pub fn bind_surface(
        &mut self,
        handle: RenderTargetHandle,
        attachment: usize,
        surface: SurfaceDesc,
        caps: &Capabilities,
    ) -> Result<()> {
        let fbo = self
            .targets
            .get_mut(handle)
            .and_then(|v| v.fbo_mut())
            .ok_or_else(|| Error::HandleInvalid(format!("{}", handle)))?;

        fbo.bind_surface(attachment, surface, &mut self.pool, caps)
    }

    pub fn unbind_surface(
        &mut self,
        handle: RenderTargetHandle,
        attachment: usize,
        caps: &Capabilities,
    ) -> Result<()> {
        let fbo = self
            .targets
            .get_mut(handle)
            .and_then(|v| v.fbo_mut())
            .ok_or_else(|| Error::HandleInvalid(format!("{}", handle)))?;

        fbo.unbind_surface(attachment, &mut self.pool, caps)
    }

    #[inline]
    pub fn get(&self, handle: RenderTargetHandle) -> Option<&RenderTarget> {
        self.targets.get(handle)
    }

    #[inline]
    pub fn get_mut(&mut self, handle: RenderTargetHandle) -> Option<&mut RenderTarget> {
        self.targets.get_mut(handle)
    }

    /// Makes sure the depth buffers of `handle` exist and belong to `context`.
    /// Framebuffer objects created under another context are rebuilt.
    pub fn ensure_depth(
        &mut self,
        handle: RenderTargetHandle,
        context: ContextHandle,
        caps: &Capabilities,
    ) -> Result<()> {
        let target = self
            .targets
            .get_mut(handle)
            .ok_or_else(|| Error::HandleInvalid(format!("{}", handle)))?;

        let depth_buffer_pool = self.depth_buffer_pool;
        if let Some(fbo) = target.fbo_mut() {
            if fbo.context() != context {
                debug!("Rebuilding framebuffer {} under {}.", fbo.id(), context);
                fbo.rebuild(context, &mut self.pool, caps)?;
            } else if depth_buffer_pool && fbo.depth().is_none() && fbo.surface(0).is_some() {
                fbo.initialize(&mut self.pool, caps)?;
            }

            target.context = context;
        }

        Ok(())
    }

    /// Redirects rendering into the target.
    pub fn bind(&self, handle: RenderTargetHandle) {
        match self.targets.get(handle).and_then(|v| v.fbo()) {
            Some(fbo) => fbo.bind(),
            None => self.driver.apply(Command::BindFramebuffer(0)),
        }
    }

    /// Restores the default framebuffer after rendering into a framebuffer
    /// object.
    pub fn unbind(&self, handle: RenderTargetHandle) {
        if let Some(target) = self.targets.get(handle) {
            if target.fbo().is_some() {
                self.driver.apply(Command::BindFramebuffer(0));
            }
        }
    }

    pub fn delete(&mut self, handle: RenderTargetHandle) -> bool {
        match self.targets.free(handle) {
            Some(target) => {
                if let Some(fbo) = target.into_fbo() {
                    fbo.dispose(&mut self.pool);
                }

                true
            }
            None => false,
        }
    }

    pub fn delete_all(&mut self) {
        for target in self.targets.drain() {
            if let Some(fbo) = target.into_fbo() {
                fbo.dispose(&mut self.pool);
            }
        }
    }

    #[inline]
    pub fn pool(&self) -> &RenderBufferPool {
        &self.pool
    }

    #[inline]
    pub fn pool_mut(&mut self) -> &mut RenderBufferPool {
        &mut self.pool
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl Drop for RenderTargetManager {
    fn drop(&mut self) {
        self.delete_all();
    }
}
