//! Bindings from constant slots to values tracked by the engine.

/// Values a program constant can be bound to, refreshed every time the
/// parameters are updated from an `AutoParamDataSource`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AutoConstantType {
    /// The current world matrix.
    WorldMatrix,
    InverseWorldMatrix,
    InverseTransposeWorldMatrix,
    /// Every world matrix of the renderable, as full 4x4 matrices.
    WorldMatrixArray,
    /// Every world matrix of the renderable, as 3x4 matrices.
    WorldMatrixArray3x4,
    ViewMatrix,
    InverseViewMatrix,
    InverseTransposeViewMatrix,
    ProjectionMatrix,
    ViewProjMatrix,
    WorldViewMatrix,
    InverseWorldViewMatrix,
    InverseTransposeWorldViewMatrix,
    WorldViewProjMatrix,
    /// `-1` if the current render target requires flipping, `1` otherwise.
    RenderTargetFlipping,
    /// Fog `(density, start, end, 1 / (end - start))`.
    FogParams,
    FogColor,
    AmbientLightColor,
    LightDiffuseColor,
    LightSpecularColor,
    /// Light `(range, constant, linear, quadratic)` attenuation.
    LightAttenuation,
    LightPosition,
    LightDirection,
    LightPositionObjectSpace,
    LightDirectionObjectSpace,
    LightDistanceObjectSpace,
    LightPowerScale,
    /// Number of lights affecting the current renderable.
    LightCount,
    CameraPosition,
    CameraPositionObjectSpace,
    /// View-projection matrix of the texture projector with the given index.
    TextureViewProjMatrix,
    TextureWorldViewProjMatrix,
    ViewDirection,
    ViewSideVector,
    ViewUpVector,
    NearClipDistance,
    FarClipDistance,
    /// Elapsed time multiplied by the real extra data.
    Time,
    /// Elapsed time modulo the real extra data.
    Time0X,
    /// Elapsed time modulo one.
    Time01,
    SinTime0X,
    PassNumber,
    /// Number of the current iteration of a per-light pass.
    PassIterationNumber,
    /// Size of the texture bound to the unit with the given index.
    TextureSize,
    InverseTextureSize,
    /// Custom parameter of the renderable with the given index.
    Custom,
}

/// Extra data of an auto constant, either an index or a real value.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum AutoConstantData {
    Int(usize),
    Real(f32),
}

impl AutoConstantData {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            AutoConstantData::Int(v) => v,
            AutoConstantData::Real(v) => v as usize,
        }
    }

    #[inline]
    pub fn real(self) -> f32 {
        match self {
            AutoConstantData::Int(v) => v as f32,
            AutoConstantData::Real(v) => v,
        }
    }
}

/// A binding of one slot to an auto constant.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoConstantEntry {
    pub ty: AutoConstantType,
    /// Index of the first constant slot.
    pub index: usize,
    pub data: AutoConstantData,
}

impl AutoConstantType {
    /// Returns true if the value only depends on the lights of the renderable.
    pub fn is_light_dependent(self) -> bool {
        match self {
            AutoConstantType::LightDiffuseColor
            | AutoConstantType::LightSpecularColor
            | AutoConstantType::LightAttenuation
            | AutoConstantType::LightPosition
            | AutoConstantType::LightDirection
            | AutoConstantType::LightPositionObjectSpace
            | AutoConstantType::LightDirectionObjectSpace
            | AutoConstantType::LightDistanceObjectSpace
            | AutoConstantType::LightPowerScale
            | AutoConstantType::LightCount => true,
            _ => false,
        }
    }

    /// Returns true if the value is written to the int constants.
    pub fn is_int(self) -> bool {
        match self {
            AutoConstantType::RenderTargetFlipping | AutoConstantType::PassNumber => true,
            _ => false,
        }
    }

    /// Number of 4-wide slots one value occupies.
    pub fn slots(self) -> usize {
        match self {
            AutoConstantType::WorldMatrix
            | AutoConstantType::InverseWorldMatrix
            | AutoConstantType::InverseTransposeWorldMatrix
            | AutoConstantType::ViewMatrix
            | AutoConstantType::InverseViewMatrix
            | AutoConstantType::InverseTransposeViewMatrix
            | AutoConstantType::ProjectionMatrix
            | AutoConstantType::ViewProjMatrix
            | AutoConstantType::WorldViewMatrix
            | AutoConstantType::InverseWorldViewMatrix
            | AutoConstantType::InverseTransposeWorldViewMatrix
            | AutoConstantType::WorldViewProjMatrix
            | AutoConstantType::TextureViewProjMatrix
            | AutoConstantType::TextureWorldViewProjMatrix => 4,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn classify() {
        assert!(AutoConstantType::LightPosition.is_light_dependent());
        assert!(!AutoConstantType::WorldMatrix.is_light_dependent());
        assert!(AutoConstantType::PassNumber.is_int());
        assert_eq!(AutoConstantType::WorldViewProjMatrix.slots(), 4);
        assert_eq!(AutoConstantData::Real(2.0).index(), 2);
    }
}
