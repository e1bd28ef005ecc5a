//! Plain render-state vocabulary shared by the tracker, the driver commands and
//! the material compiler.

use crate::math::Color;

/// The kind of texture bound to a texture unit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureType {
    OneD,
    TwoD,
    ThreeD,
    CubeMap,
}

/// Blending factors for manually blending objects with the scene.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneBlendFactor {
    One,
    Zero,
    DestColor,
    SourceColor,
    OneMinusDestColor,
    OneMinusSourceColor,
    DestAlpha,
    SourceAlpha,
    OneMinusDestAlpha,
    OneMinusSourceAlpha,
}

/// Blending operations controls how objects are blended into the scene.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneBlendOperation {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

impl Default for SceneBlendOperation {
    fn default() -> Self {
        SceneBlendOperation::Add
    }
}

/// Common scene blend presets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneBlendType {
    /// Make the object transparent based on the final alpha values in the texture.
    TransparentAlpha,
    /// Make the object transparent based on the color values in the texture.
    TransparentColor,
    /// Add the texture values to the existing scene content.
    Add,
    /// Multiply the existing scene content by the texture values.
    Modulate,
    /// The default blend mode where source replaces destination.
    Replace,
}

impl SceneBlendType {
    /// Returns the `(source, dest)` factor pair of this preset.
    pub fn factors(self) -> (SceneBlendFactor, SceneBlendFactor) {
        use self::SceneBlendFactor::*;
        match self {
            SceneBlendType::TransparentAlpha => (SourceAlpha, OneMinusSourceAlpha),
            SceneBlendType::TransparentColor => (SourceColor, OneMinusSourceColor),
            SceneBlendType::Add => (One, One),
            SceneBlendType::Modulate => (DestColor, Zero),
            SceneBlendType::Replace => (One, Zero),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareFunction {
    AlwaysFail,
    AlwaysPass,
    Less,
    LessEqual,
    Equal,
    NotEqual,
    GreaterEqual,
    Greater,
}

/// Operations applied to the stencil buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StencilOperation {
    Keep,
    Zero,
    Replace,
    Increment,
    Decrement,
    IncrementWrap,
    DecrementWrap,
    Invert,
}

impl StencilOperation {
    /// Swaps increments and decrements, used for the back face of two-sided
    /// stencil where the winding is reversed.
    pub fn inverted(self) -> Self {
        match self {
            StencilOperation::Increment => StencilOperation::Decrement,
            StencilOperation::Decrement => StencilOperation::Increment,
            StencilOperation::IncrementWrap => StencilOperation::DecrementWrap,
            StencilOperation::DecrementWrap => StencilOperation::IncrementWrap,
            v => v,
        }
    }
}

/// Hardware culling modes based on vertex winding.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CullingMode {
    None,
    Clockwise,
    CounterClockwise,
}

/// Polygon faces as seen by the driver.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    Front,
    Back,
    FrontAndBack,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrontFaceOrder {
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShadeOptions {
    Flat,
    Gouraud,
    Phong,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolygonMode {
    Points,
    Wireframe,
    Solid,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FogMode {
    None,
    Exp,
    Exp2,
    Linear,
}

/// Fog settings of a pass or of the scene.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct FogParams {
    pub mode: FogMode,
    pub color: Color,
    pub density: f32,
    pub start: f32,
    pub end: f32,
}

impl Default for FogParams {
    fn default() -> Self {
        FogParams {
            mode: FogMode::None,
            color: Color::white(),
            density: 0.001,
            start: 0.0,
            end: 1.0,
        }
    }
}

/// Which material colors follow the vertex color.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackVertexColor {
    pub ambient: bool,
    pub diffuse: bool,
    pub specular: bool,
    pub emissive: bool,
}

/// Texture addressing modes, used when texture coordinates are outside the 0 to 1 range.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureAddressing {
    Wrap,
    Mirror,
    Clamp,
    Border,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UVWAddressing {
    pub u: TextureAddressing,
    pub v: TextureAddressing,
    pub w: TextureAddressing,
}

impl UVWAddressing {
    pub fn all(mode: TextureAddressing) -> Self {
        UVWAddressing {
            u: mode,
            v: mode,
            w: mode,
        }
    }
}

impl Default for UVWAddressing {
    fn default() -> Self {
        UVWAddressing::all(TextureAddressing::Wrap)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterType {
    Min,
    Mag,
    Mip,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOptions {
    None,
    Point,
    Linear,
    Anisotropic,
}

/// Texture coordinate axis names used by automatic generation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TexCoordAxis {
    S,
    T,
    R,
    Q,
}

/// Automatic texture coordinate generation modes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TexGenMode {
    SphereMap,
    ReflectionMap,
    NormalMap,
    EyeLinear,
}

/// How a texture unit derives its coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TexCoordCalcMethod {
    /// Use the texture coordinates of the vertices.
    None,
    /// Sphere environment mapping.
    EnvironmentMap,
    /// Planar environment mapping, cube mapping when available.
    EnvironmentMapPlanar,
    /// Reflection vector environment mapping.
    EnvironmentMapReflection,
    /// Normal vector environment mapping.
    EnvironmentMapNormal,
    /// Projective texturing from a frustum.
    ProjectiveTexture,
}

/// Fixed-function texture environment modes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TexEnvMode {
    Modulate,
    Replace,
    Add,
    Decal,
    Combine,
}

/// Whether a layer blend mode applies to the color or the alpha channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerBlendType {
    Color,
    Alpha,
}

/// Simple texture layer blending presets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerBlendOperation {
    /// Replace all color with texture with no adjustment.
    Replace,
    /// Add color components together.
    Add,
    /// Multiply color components together.
    Modulate,
    /// Blend based on texture alpha.
    AlphaBlend,
}

/// Full multitexture combine operations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerBlendOperationEx {
    Source1,
    Source2,
    Modulate,
    ModulateX2,
    ModulateX4,
    Add,
    AddSigned,
    AddSmooth,
    Subtract,
    BlendDiffuseAlpha,
    BlendTextureAlpha,
    BlendCurrentAlpha,
    BlendManual,
    DotProduct,
    BlendDiffuseColor,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerBlendSource {
    Current,
    Texture,
    Diffuse,
    Specular,
    Manual,
}

/// Full description of how a texture layer combines with the previous ones.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerBlendModeEx {
    pub blend_type: LayerBlendType,
    pub operation: LayerBlendOperationEx,
    pub source1: LayerBlendSource,
    pub source2: LayerBlendSource,
    pub color_arg1: Color,
    pub color_arg2: Color,
    pub alpha_arg1: f32,
    pub alpha_arg2: f32,
    pub blend_factor: f32,
}

impl LayerBlendModeEx {
    pub fn new(blend_type: LayerBlendType) -> Self {
        LayerBlendModeEx {
            blend_type,
            operation: LayerBlendOperationEx::Modulate,
            source1: LayerBlendSource::Texture,
            source2: LayerBlendSource::Current,
            color_arg1: Color::white(),
            color_arg2: Color::white(),
            alpha_arg1: 1.0,
            alpha_arg2: 1.0,
            blend_factor: 0.0,
        }
    }

    /// Translates a simple preset into the full combine description.
    pub fn from_operation(blend_type: LayerBlendType, op: LayerBlendOperation) -> Self {
        let mut mode = LayerBlendModeEx::new(blend_type);
        mode.operation = match op {
            LayerBlendOperation::Replace => LayerBlendOperationEx::Source1,
            LayerBlendOperation::Add => LayerBlendOperationEx::Add,
            LayerBlendOperation::Modulate => LayerBlendOperationEx::Modulate,
            LayerBlendOperation::AlphaBlend => LayerBlendOperationEx::BlendTextureAlpha,
        };
        mode
    }
}

/// Which buffers of the frame buffer to clear.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameBufferType {
    pub color: bool,
    pub depth: bool,
    pub stencil: bool,
}

impl FrameBufferType {
    pub fn all() -> Self {
        FrameBufferType {
            color: true,
            depth: true,
            stencil: true,
        }
    }
}

/// Types of GPU programs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GpuProgramType {
    Vertex,
    Fragment,
    Geometry,
}

impl GpuProgramType {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            GpuProgramType::Vertex => 0,
            GpuProgramType::Fragment => 1,
            GpuProgramType::Geometry => 2,
        }
    }
}

/// Primitive topology of a draw call.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationType {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
    TriangleFan,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexType {
    U16,
    U32,
}

impl IndexType {
    #[inline]
    pub fn stride(self) -> usize {
        match self {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

/// Meaning of one element of a vertex.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexElementSemantic {
    Position,
    Normal,
    /// Primary vertex color.
    Diffuse,
    /// Secondary vertex color.
    Specular,
    TexCoords,
    BlendWeights,
    BlendIndices,
    Tangent,
    Binormal,
}

impl VertexElementSemantic {
    /// Generic attribute slot for semantics without a fixed-function array.
    pub fn attribute_index(self) -> Option<usize> {
        match self {
            VertexElementSemantic::BlendWeights => Some(1),
            VertexElementSemantic::BlendIndices => Some(7),
            VertexElementSemantic::Tangent => Some(14),
            VertexElementSemantic::Binormal => Some(15),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexElementFormat {
    Float1,
    Float2,
    Float3,
    Float4,
    /// Four normalized bytes.
    Color,
}

impl VertexElementFormat {
    #[inline]
    pub fn components(self) -> usize {
        match self {
            VertexElementFormat::Float1 => 1,
            VertexElementFormat::Float2 => 2,
            VertexElementFormat::Float3 => 3,
            VertexElementFormat::Float4 | VertexElementFormat::Color => 4,
        }
    }

    #[inline]
    pub fn size(self) -> usize {
        match self {
            VertexElementFormat::Color => 4,
            _ => self.components() * 4,
        }
    }
}

/// One element of an interleaved vertex. `index` tells apart elements of the
/// same semantic, e.g. the texture coordinate sets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexElement {
    pub semantic: VertexElementSemantic,
    pub format: VertexElementFormat,
    pub offset: usize,
    pub index: usize,
}

impl VertexElement {
    pub fn new(
        semantic: VertexElementSemantic,
        format: VertexElementFormat,
        offset: usize,
        index: usize,
    ) -> Self {
        VertexElement {
            semantic,
            format,
            offset,
            index,
        }
    }
}

/// Usage hints of hardware buffers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BufferUsage {
    Static,
    Dynamic,
    WriteOnly,
    StaticWriteOnly,
    DynamicWriteOnly,
    DynamicWriteOnlyDiscardable,
}

impl BufferUsage {
    #[inline]
    pub fn is_static(self) -> bool {
        match self {
            BufferUsage::Static | BufferUsage::StaticWriteOnly => true,
            _ => false,
        }
    }

    #[inline]
    pub fn is_write_only(self) -> bool {
        match self {
            BufferUsage::WriteOnly
            | BufferUsage::StaticWriteOnly
            | BufferUsage::DynamicWriteOnly
            | BufferUsage::DynamicWriteOnlyDiscardable => true,
            _ => false,
        }
    }
}

/// Locking options of hardware buffers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockOptions {
    /// Normal read/write lock.
    Normal,
    /// Discards the entire buffer while locking.
    Discard,
    /// Lock the buffer for reading only.
    ReadOnly,
    /// Promises not to overwrite regions in use by the GPU.
    NoOverwrite,
}

/// Pixel formats of color surfaces.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    Unknown,
    L8,
    A8,
    R5G6B5,
    R8G8B8,
    A8R8G8B8,
    X8R8G8B8,
    A8B8G8R8,
    FloatR16,
    FloatR32,
    FloatR16G16B16A16,
    FloatR32G32B32A32,
}

impl PixelFormat {
    /// Number of bytes one pixel occupies.
    pub fn bytes(self) -> usize {
        match self {
            PixelFormat::Unknown => 0,
            PixelFormat::L8 | PixelFormat::A8 => 1,
            PixelFormat::R5G6B5 | PixelFormat::FloatR16 => 2,
            PixelFormat::R8G8B8 => 3,
            PixelFormat::A8R8G8B8
            | PixelFormat::X8R8G8B8
            | PixelFormat::A8B8G8R8
            | PixelFormat::FloatR32 => 4,
            PixelFormat::FloatR16G16B16A16 => 8,
            PixelFormat::FloatR32G32B32A32 => 16,
        }
    }
}

/// Depth formats a render buffer can be allocated with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepthFormat {
    Depth16,
    Depth24,
    Depth32,
    /// Packed depth and stencil in one buffer.
    Depth24Stencil8,
}

impl DepthFormat {
    pub fn bits(self) -> u32 {
        match self {
            DepthFormat::Depth16 => 16,
            DepthFormat::Depth24 | DepthFormat::Depth24Stencil8 => 24,
            DepthFormat::Depth32 => 32,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StencilFormat {
    Stencil1,
    Stencil4,
    Stencil8,
    Stencil16,
}

impl StencilFormat {
    pub fn bits(self) -> u32 {
        match self {
            StencilFormat::Stencil1 => 1,
            StencilFormat::Stencil4 => 4,
            StencilFormat::Stencil8 => 8,
            StencilFormat::Stencil16 => 16,
        }
    }
}

/// Internal format of a render buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenderBufferFormat {
    Color(PixelFormat),
    Depth(DepthFormat),
    Stencil(StencilFormat),
}

/// Framebuffer attachment points.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attachment {
    None,
    Color(usize),
    Depth,
    Stencil,
}

/// Faces of a cube map, or `PositiveX` for every other texture type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    pub fn from_index(index: usize) -> Self {
        match index {
            1 => CubeFace::NegativeX,
            2 => CubeFace::PositiveY,
            3 => CubeFace::NegativeY,
            4 => CubeFace::PositiveZ,
            5 => CubeFace::NegativeZ,
            _ => CubeFace::PositiveX,
        }
    }
}

/// A 3D box of pixels, `[left, right) x [top, bottom) x [front, back)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRegion {
    pub left: u32,
    pub top: u32,
    pub front: u32,
    pub right: u32,
    pub bottom: u32,
    pub back: u32,
}

impl PixelRegion {
    pub fn new(left: u32, top: u32, front: u32, right: u32, bottom: u32, back: u32) -> Self {
        PixelRegion {
            left,
            top,
            front,
            right,
            bottom,
            back,
        }
    }

    /// A 2D rectangle of one slice.
    pub fn rect(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        PixelRegion::new(left, top, 0, right, bottom, 1)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.back - self.front
    }

    /// Returns true if `other` lies entirely inside this region.
    pub fn contains(&self, other: &PixelRegion) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.front >= self.front
            && other.right <= self.right
            && other.bottom <= self.bottom
            && other.back <= self.back
            && other.left <= other.right
            && other.top <= other.bottom
            && other.front <= other.back
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn stencil_inversion() {
        assert_eq!(
            StencilOperation::Increment.inverted(),
            StencilOperation::Decrement
        );
        assert_eq!(
            StencilOperation::DecrementWrap.inverted(),
            StencilOperation::IncrementWrap
        );
        assert_eq!(StencilOperation::Keep.inverted(), StencilOperation::Keep);
    }

    #[test]
    fn region() {
        let full = PixelRegion::new(0, 0, 0, 8, 8, 1);
        assert!(full.contains(&PixelRegion::rect(2, 2, 4, 4)));
        assert!(!full.contains(&PixelRegion::rect(2, 2, 9, 4)));
        assert_eq!(PixelRegion::rect(2, 3, 4, 8).height(), 5);
    }
}
