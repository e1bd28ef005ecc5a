use std::sync::atomic::{AtomicUsize, Ordering};

use crate::video::resource::render_target::RenderTargetHandle;

static VIEWPORT_ID: AtomicUsize = AtomicUsize::new(1);

/// A rectangle of a render target, specified relative to the target size and
/// resolved into pixels with its upper-left corner as origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    id: usize,
    target: RenderTargetHandle,
    relative: [f32; 4],
    actual: [i32; 4],
    target_size: (u32, u32),
    updated: bool,
}

impl Viewport {
    /// Creates a viewport covering `[left, top, width, height]` of the target,
    /// in the range `[0, 1]`.
    pub fn new(
        target: RenderTargetHandle,
        target_size: (u32, u32),
        left: f32,
        top: f32,
        width: f32,
        height: f32,
    ) -> Self {
        let mut vp = Viewport {
            id: VIEWPORT_ID.fetch_add(1, Ordering::Relaxed),
            target,
            relative: [left, top, width, height],
            actual: [0; 4],
            target_size,
            updated: true,
        };

        vp.update_dimensions(target_size);
        vp
    }

    /// Identity shared by clones, used to detect viewport changes.
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn target(&self) -> RenderTargetHandle {
        self.target
    }

    pub fn set_dimensions(&mut self, left: f32, top: f32, width: f32, height: f32) {
        self.relative = [left, top, width, height];
        let size = self.target_size;
        self.update_dimensions(size);
    }

    /// Recomputes the pixel rectangle after the target was resized.
    pub fn update_dimensions(&mut self, target_size: (u32, u32)) {
        let (w, h) = (target_size.0 as f32, target_size.1 as f32);
        let [left, top, width, height] = self.relative;

        self.target_size = target_size;
        self.actual = [
            (left * w) as i32,
            (top * h) as i32,
            (width * w) as i32,
            (height * h) as i32,
        ];
        self.updated = true;
    }

    #[inline]
    pub fn actual_left(&self) -> i32 {
        self.actual[0]
    }

    #[inline]
    pub fn actual_top(&self) -> i32 {
        self.actual[1]
    }

    #[inline]
    pub fn actual_width(&self) -> i32 {
        self.actual[2]
    }

    #[inline]
    pub fn actual_height(&self) -> i32 {
        self.actual[3]
    }

    #[inline]
    pub fn is_updated(&self) -> bool {
        self.updated
    }

    #[inline]
    pub fn clear_updated(&mut self) {
        self.updated = false;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn dimensions() {
        let mut vp = Viewport::new(RenderTargetHandle::default(), (800, 600), 0.5, 0.0, 0.5, 1.0);
        assert_eq!(vp.actual_left(), 400);
        assert_eq!(vp.actual_height(), 600);
        assert!(vp.is_updated());

        vp.clear_updated();
        vp.update_dimensions((400, 300));
        assert_eq!(vp.actual_width(), 200);
        assert!(vp.is_updated());

        let other = Viewport::new(RenderTargetHandle::default(), (800, 600), 0.5, 0.0, 0.5, 1.0);
        assert!(vp.id() != other.id());
    }
}
