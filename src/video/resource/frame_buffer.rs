//! Framebuffer objects used as render texture targets.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::errors::*;
use crate::video::capabilities::{Capabilities, Capability};
use crate::video::driver::{Command, ContextHandle, Driver, FramebufferStatus, ObjectKind};
use crate::video::types::*;

use super::render_buffer::{RenderBufferPool, SurfaceDesc, SurfaceSource};

/// A framebuffer object with up to `max_color_attachments` color surfaces, plus
/// depth and stencil buffers borrowed from a `RenderBufferPool`.
///
/// The pooled buffers must be handed back with `dispose`, dropping the object
/// only deletes the framebuffer itself.
#[derive(Debug)]
pub struct FrameBufferObject {
    driver: Arc<dyn Driver>,
    id: u32,
    context: ContextHandle,
    colors: SmallVec<[Option<SurfaceDesc>; 4]>,
    depth: Option<SurfaceDesc>,
    stencil: Option<SurfaceDesc>,
    use_depth_pool: bool,
}

impl FrameBufferObject {
    pub fn new(
        driver: Arc<dyn Driver>,
        context: ContextHandle,
        max_color_attachments: usize,
        use_depth_pool: bool,
    ) -> Self {
        let id = driver.create(ObjectKind::Framebuffer);
        let mut colors = SmallVec::new();
        colors.resize(max_color_attachments.max(1), None);

        FrameBufferObject {
            driver,
            id,
            context,
            colors,
            depth: None,
            stencil: None,
            use_depth_pool,
        }
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The context this framebuffer was created under.
    #[inline]
    pub fn context(&self) -> ContextHandle {
        self.context
    }

    #[inline]
    pub fn surface(&self, attachment: usize) -> Option<&SurfaceDesc> {
        self.colors.get(attachment).and_then(|v| v.as_ref())
    }

    #[inline]
    pub fn depth(&self) -> Option<&SurfaceDesc> {
        self.depth.as_ref()
    }

    #[inline]
    pub fn stencil(&self) -> Option<&SurfaceDesc> {
        self.stencil.as_ref()
    }

    pub fn width(&self) -> u32 {
        self.surface(0).map(|v| v.width).unwrap_or(0)
    }

    pub fn height(&self) -> u32 {
        self.surface(0).map(|v| v.height).unwrap_or(0)
    }

    pub fn format(&self) -> PixelFormat {
        match self.surface(0).map(|v| v.format) {
            Some(RenderBufferFormat::Color(format)) => format,
            _ => PixelFormat::Unknown,
        }
    }

    /// Binds `surface` to the color `attachment`, and re-initializes the
    /// framebuffer if attachment 0 is bound.
    pub fn bind_surface(
        &mut self,
        attachment: usize,
        surface: SurfaceDesc,
        pool: &mut RenderBufferPool,
        caps: &Capabilities,
    ) -> Result<()> {
        if attachment >= self.colors.len() {
            return Err(Error::InvalidConfiguration(format!(
                "attachment {} exceeds the {} supported color attachments",
                attachment,
                self.colors.len()
            )));
        }

        self.colors[attachment] = Some(surface);

        if self.colors[0].is_some() {
            self.initialize(pool, caps)
        } else {
            Ok(())
        }
    }

    pub fn unbind_surface(
        &mut self,
        attachment: usize,
        pool: &mut RenderBufferPool,
        caps: &Capabilities,
    ) -> Result<()> {
        if attachment < self.colors.len() {
            self.colors[attachment] = None;
        }

        if self.colors[0].is_some() {
            self.initialize(pool, caps)
        } else {
            Ok(())
        }
    }

    /// Validates the attachments, provisions depth and stencil buffers and
    /// checks the completeness of the framebuffer.
    pub fn initialize(&mut self, pool: &mut RenderBufferPool, caps: &Capabilities) -> Result<()> {
        let first = self.validate()?;

        self.release_depth_stencil(pool);
        self.driver.apply(Command::BindFramebuffer(self.id));

        for i in 0..self.colors.len() {
            match self.colors[i] {
                Some(surface) => self.attach(Attachment::Color(i), &surface),
                None => self
                    .driver
                    .apply(Command::FramebufferRenderbuffer(Attachment::Color(i), 0)),
            }
        }

        if self.use_depth_pool {
            let format = match first.format {
                RenderBufferFormat::Color(format) => format,
                _ => PixelFormat::Unknown,
            };

            let mode = pool.best_depth_stencil(format);

            if let Some(depth) = mode.depth {
                let surface = pool.request(RenderBufferFormat::Depth(depth), first.width, first.height);
                self.depth = Some(surface);

                if mode.is_packed() {
                    pool.retain(&surface)?;
                    self.stencil = Some(surface);
                }
            }

            if !mode.is_packed() {
                if let Some(stencil) = mode.stencil {
                    let format = RenderBufferFormat::Stencil(stencil);
                    self.stencil = Some(pool.request(format, first.width, first.height));
                }
            }
        }

        match self.depth {
            Some(surface) => self.attach(Attachment::Depth, &surface),
            None => self
                .driver
                .apply(Command::FramebufferRenderbuffer(Attachment::Depth, 0)),
        }

        match self.stencil {
            Some(surface) => self.attach(Attachment::Stencil, &surface),
            None => self
                .driver
                .apply(Command::FramebufferRenderbuffer(Attachment::Stencil, 0)),
        }

        let buffers: Vec<_> = self
            .colors
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|_| Attachment::Color(i)))
            .collect();

        let first_buffer = buffers.first().cloned().unwrap_or(Attachment::None);
        if caps.has(Capability::ArbDrawBuffers) {
            self.driver.apply(Command::DrawBuffers(buffers));
        } else if caps.has(Capability::AtiDrawBuffers) {
            self.driver.apply(Command::DrawBuffersAti(buffers));
        } else {
            self.driver.apply(Command::DrawBuffer(first_buffer));
        }

        self.driver.apply(Command::ReadBuffer(first_buffer));

        let status = self.driver.check_framebuffer_status();
        self.driver.apply(Command::BindFramebuffer(0));

        match status {
            FramebufferStatus::Complete => Ok(()),
            FramebufferStatus::Unsupported => Err(Error::UnsupportedFormat(format!(
                "all framebuffer formats with {:?} are unsupported",
                first.format
            ))),
            v => Err(Error::IncompleteFramebuffer(format!("{:?}", v))),
        }
    }

    /// Recreates the framebuffer under `context`, framebuffer objects are not
    /// shared between contexts.
    pub fn rebuild(
        &mut self,
        context: ContextHandle,
        pool: &mut RenderBufferPool,
        caps: &Capabilities,
    ) -> Result<()> {
        if let Err(err) = self.driver.delete(ObjectKind::Framebuffer, self.id) {
            warn!("Failed to delete framebuffer {}. {}", self.id, err);
        }

        self.id = self.driver.create(ObjectKind::Framebuffer);
        self.context = context;

        if self.colors[0].is_some() {
            self.initialize(pool, caps)
        } else {
            Ok(())
        }
    }

    pub fn bind(&self) {
        self.driver.apply(Command::BindFramebuffer(self.id));
    }

    /// Returns the pooled buffers and deletes the framebuffer.
    pub fn dispose(mut self, pool: &mut RenderBufferPool) {
        self.release_depth_stencil(pool);
    }

    fn validate(&self) -> Result<SurfaceDesc> {
        let first = self.colors[0].ok_or_else(|| {
            Error::InvalidConfiguration("attachment 0 must have a surface attached".to_owned())
        })?;

        for (i, v) in self.colors.iter().enumerate().skip(1) {
            if let Some(v) = v {
                if v.width != first.width || v.height != first.height {
                    return Err(Error::InvalidConfiguration(format!(
                        "attachment {} has incompatible size {}x{}, it must be of the same size \
                         as attachment 0, {}x{}",
                        i, v.width, v.height, first.width, first.height
                    )));
                }

                if v.format != first.format {
                    return Err(Error::InvalidConfiguration(format!(
                        "attachment {} has incompatible format {:?}, expected {:?}",
                        i, v.format, first.format
                    )));
                }
            }
        }

        Ok(first)
    }

    fn attach(&self, attachment: Attachment, surface: &SurfaceDesc) {
        match surface.source {
            SurfaceSource::Texture {
                ty,
                id,
                face,
                level,
            } => self.driver.apply(Command::FramebufferTexture {
                attachment,
                ty,
                face,
                id,
                level,
                zoffset: surface.zoffset,
            }),
            SurfaceSource::RenderBuffer { id } => {
                self.driver
                    .apply(Command::FramebufferRenderbuffer(attachment, id));
            }
        }
    }

    fn release_depth_stencil(&mut self, pool: &mut RenderBufferPool) {
        if let Some(v) = self.depth.take() {
            pool.release(&v);
        }

        if let Some(v) = self.stencil.take() {
            pool.release(&v);
        }
    }
}

impl Drop for FrameBufferObject {
    fn drop(&mut self) {
        if self.depth.is_some() || self.stencil.is_some() {
            warn!("Framebuffer {} dropped without releasing its depth buffers.", self.id);
        }

        if let Err(err) = self.driver.delete(ObjectKind::Framebuffer, self.id) {
            warn!("Failed to delete framebuffer {}. {}", self.id, err);
        }
    }
}
