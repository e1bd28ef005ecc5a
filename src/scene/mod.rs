//! The slice of the scene layer the render system consumes: cameras, lights,
//! renderables and texture projectors.

pub mod camera;
pub use self::camera::Camera;

pub mod light;
pub use self::light::{Light, LightType};

pub mod renderable;
pub use self::renderable::{Frustum, Renderable};
