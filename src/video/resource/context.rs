use crate::video::driver::ContextHandle;

/// A rendering context, and whether its one-time state setup has run.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GLContext {
    pub handle: ContextHandle,
    pub initialized: bool,
}

impl GLContext {
    pub fn new(handle: ContextHandle) -> Self {
        GLContext {
            handle,
            initialized: false,
        }
    }
}
