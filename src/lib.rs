//! # What is This?
//!
//! A render-state layer for fixed-function OpenGL hardware. It is built from
//! three parts:
//!
//! 1. The `RenderSystem` in `video` tracks the pipeline state it has applied to
//! the driver, and skips every redundant state change. It binds textures, blend
//! modes, lights, programs and render targets, and issues draw calls.
//!
//! 2. The resource managers in `video::resource` own the lifetimes of the GPU
//! objects behind textures, hardware buffers, render buffers and frame buffers,
//! and share depth buffers between render targets of compatible sizes.
//!
//! 3. The `Material` compiler decides which techniques the hardware supports,
//! splits passes that sample more texture layers than the hardware can, and
//! decomposes passes into illumination stages for additive lighting.
//!
//! Every GL call goes through the `Driver` trait, so the whole layer runs
//! against the `HeadlessDriver` in tests.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;

extern crate cgmath;
extern crate rustc_hash;
extern crate serde_json;
extern crate smallvec;

#[macro_use]
pub mod utils;
pub mod errors;
pub mod material;
pub mod math;
pub mod prelude;
pub mod scene;
pub mod video;
