extern crate pigment;

use std::sync::Arc;

use pigment::prelude::*;
use pigment::video::driver::{Call, ContextHandle, FramebufferStatus, ObjectKind};
use pigment::video::resource::render_buffer::SurfaceSource;

fn color_surface(id: u32, width: u32, height: u32) -> SurfaceDesc {
    SurfaceDesc {
        source: SurfaceSource::Texture {
            ty: TextureType::TwoD,
            id,
            face: CubeFace::PositiveX,
            level: 0,
        },
        format: RenderBufferFormat::Color(PixelFormat::A8R8G8B8),
        width,
        height,
        zoffset: 0,
    }
}

fn setup() -> (Arc<HeadlessDriver>, Capabilities, RenderBufferPool) {
    let driver = Arc::new(HeadlessDriver::new());
    let caps = Capabilities::probe(driver.as_ref()).unwrap();
    let pool = RenderBufferPool::new(driver.clone());
    (driver, caps, pool)
}

#[test]
fn mismatched_attachments() {
    let (driver, caps, mut pool) = setup();
    let mut fbo = FrameBufferObject::new(driver.clone(), ContextHandle(1), 4, true);

    fbo.bind_surface(0, color_surface(1, 256, 256), &mut pool, &caps)
        .unwrap();
    assert_eq!(fbo.width(), 256);
    assert!(fbo.depth().is_some());

    driver.clear_calls();
    let result = fbo.bind_surface(1, color_surface(2, 128, 128), &mut pool, &caps);

    match result {
        Err(Error::InvalidConfiguration(_)) => {}
        v => panic!("unexpected {:?}", v),
    }

    assert_eq!(
        driver.count_calls(|v| *v == Call::CheckFramebufferStatus),
        0
    );

    fbo.dispose(&mut pool);
    assert!(pool.is_empty());
}

#[test]
fn missing_first_attachment() {
    let (driver, caps, mut pool) = setup();
    let mut fbo = FrameBufferObject::new(driver.clone(), ContextHandle(1), 4, true);

    assert!(fbo.initialize(&mut pool, &caps).is_err());
    assert!(fbo
        .bind_surface(1, color_surface(2, 64, 64), &mut pool, &caps)
        .is_ok());
    assert!(fbo
        .bind_surface(4, color_surface(3, 64, 64), &mut pool, &caps)
        .is_err());

    fbo.dispose(&mut pool);
}

#[test]
fn incomplete_framebuffer() {
    let (driver, caps, mut pool) = setup();
    let mut fbo = FrameBufferObject::new(driver.clone(), ContextHandle(1), 4, true);

    driver.set_framebuffer_status(FramebufferStatus::IncompleteAttachment);
    match fbo.bind_surface(0, color_surface(1, 64, 64), &mut pool, &caps) {
        Err(Error::IncompleteFramebuffer(_)) => {}
        v => panic!("unexpected {:?}", v),
    }

    driver.set_framebuffer_status(FramebufferStatus::Unsupported);
    match fbo.initialize(&mut pool, &caps) {
        Err(Error::UnsupportedFormat(_)) => {}
        v => panic!("unexpected {:?}", v),
    }

    fbo.dispose(&mut pool);
    assert!(pool.is_empty());
}

#[test]
fn pooled_render_buffers() {
    let (driver, _, mut pool) = setup();
    let format = RenderBufferFormat::Depth(DepthFormat::Depth24);

    let a = pool.request(format, 512, 512);
    let b = pool.request(format, 512, 512);
    assert_eq!(a, b);
    assert_eq!(pool.len(), 1);
    assert_eq!(pool.ref_count(&a), 2);

    let other = pool.request(format, 256, 256);
    assert_ne!(a, other);
    assert_eq!(pool.len(), 2);

    let id = match a.source {
        SurfaceSource::RenderBuffer { id } => id,
        _ => unreachable!(),
    };

    pool.release(&a);
    assert_eq!(pool.ref_count(&a), 1);
    assert_eq!(
        driver.count_calls(|v| *v == Call::Delete(ObjectKind::Renderbuffer, id)),
        0
    );

    pool.release(&b);
    assert_eq!(pool.ref_count(&a), 0);
    assert_eq!(
        driver.count_calls(|v| *v == Call::Delete(ObjectKind::Renderbuffer, id)),
        1
    );

    pool.release(&other);
    assert!(pool.is_empty());
}

#[test]
fn best_depth_stencil() {
    let (_, _, mut pool) = setup();

    let packed = DepthStencilMode::new(Some(DepthFormat::Depth24Stencil8), None);
    assert_eq!(pool.best_depth_stencil(PixelFormat::A8R8G8B8), packed);

    let modes = vec![
        DepthStencilMode::new(Some(DepthFormat::Depth16), None),
        DepthStencilMode::new(Some(DepthFormat::Depth24), None),
    ];
    pool.set_format_modes(PixelFormat::FloatR16, modes);
    assert_eq!(
        pool.best_depth_stencil(PixelFormat::FloatR16),
        DepthStencilMode::new(Some(DepthFormat::Depth24), None)
    );

    pool.set_format_modes(PixelFormat::FloatR32, Vec::new());
    assert_eq!(
        pool.best_depth_stencil(PixelFormat::FloatR32),
        DepthStencilMode::new(None, None)
    );
}

#[test]
fn disposed_framebuffer_is_deleted() {
    let (driver, caps, mut pool) = setup();
    let mut fbo = FrameBufferObject::new(driver.clone(), ContextHandle(1), 2, false);
    fbo.bind_surface(0, color_surface(1, 32, 32), &mut pool, &caps)
        .unwrap();
    assert!(fbo.depth().is_none());

    let id = fbo.id();
    fbo.dispose(&mut pool);
    assert_eq!(
        driver.count_calls(|v| *v == Call::Delete(ObjectKind::Framebuffer, id)),
        1
    );
}
