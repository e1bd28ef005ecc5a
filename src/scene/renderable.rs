use smallvec::SmallVec;

use crate::math::prelude::*;

/// The geometry-side collaborator the render system draws. Only transforms and
/// per-object custom shader parameters are visible here.
pub trait Renderable {
    /// World transforms of this object. Skinned objects may return more than one.
    fn world_transforms(&self) -> SmallVec<[Matrix4<f32>; 1]>;

    /// Custom parameter bound to the `Custom` auto constant with the same index.
    fn custom_parameter(&self, _index: usize) -> Option<Vector4<f32>> {
        None
    }

    /// True if the normals of this object should be re-normalised after
    /// transforming, e.g. when scaled.
    fn normalise_normals(&self) -> bool {
        false
    }
}

/// A projector made up of a projection and a view transform, used for
/// projective texturing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub projection: Projection,
    pub view: Matrix4<f32>,
}

impl Frustum {
    pub fn new(projection: Projection, view: Matrix4<f32>) -> Self {
        Frustum { projection, view }
    }

    #[inline]
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection.to_matrix()
    }

    #[inline]
    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view
    }
}
