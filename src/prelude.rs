pub use crate::errors::{Error, Result};
pub use crate::material::prelude::*;
pub use crate::math::prelude::*;
pub use crate::scene::{Camera, Frustum, Light, LightType, Renderable};
pub use crate::utils::prelude::*;
pub use crate::video::prelude::*;
