//! Materials describe how objects are rendered, as an ordered list of
//! techniques made of passes and texture layers.
//!
//! Compiling a material checks its techniques against the probed hardware
//! capabilities. Fixed-function passes that use more texture layers than the
//! hardware can sample at once are split into several passes blended into
//! each other, and every supported technique is decomposed into ambient,
//! per-light and decal stages for additive lighting.

pub mod illumination;
pub mod material;
pub mod pass;
pub mod technique;
pub mod texture_unit;

pub mod prelude {
    pub use super::illumination::{IlluminationPass, IlluminationStage};
    pub use super::material::Material;
    pub use super::pass::{GpuProgramUsage, Pass};
    pub use super::technique::{Technique, DEFAULT_SCHEME};
    pub use super::texture_unit::{EnvMapType, TextureEffect, TextureUnitState};
}

pub use self::prelude::*;
