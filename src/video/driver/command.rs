use crate::math::prelude::*;
use crate::video::types::*;

/// Server-side capabilities toggled with `Command::Enable` and `Command::Disable`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Cap {
    /// Fixed-function texturing of the active unit.
    Texture(TextureType),
    /// Automatic texture coordinate generation of the active unit.
    TexGen(TexCoordAxis),
    Light(usize),
    ClipPlane(usize),
    /// Assembly program execution of one shader stage.
    Program(GpuProgramType),
    Blend,
    DepthTest,
    StencilTest,
    StencilTwoSide,
    CullFace,
    ScissorTest,
    Lighting,
    ColorMaterial,
    Fog,
    AlphaTest,
    AlphaToCoverage,
    PolygonOffsetFill,
    Normalize,
    FramebufferSrgb,
    ColorSum,
    Dither,
    Multisample,
    PointSprite,
}

/// Fixed-function vertex arrays.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ClientArray {
    Vertex,
    Normal,
    Color,
    SecondaryColor,
    /// Texture coordinates of the client active unit.
    TexCoord,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MatrixMode {
    ModelView,
    Projection,
    Texture,
}

/// Fixed-function parameters of a single light source.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LightSetup {
    pub diffuse: Color,
    pub specular: Color,
    pub ambient: Color,
    /// Homogeneous position, `w = 0` for directional lights.
    pub position: Vector4<f32>,
    pub spot_direction: Vector3<f32>,
    /// Cone cutoff in degrees, `180` disables the spot cone.
    pub spot_cutoff: f32,
    pub spot_exponent: f32,
    pub attenuation: [f32; 3],
}

/// Fixed-function material colors of the front faces.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceColors {
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub emissive: Color,
    pub shininess: f32,
    pub tracking: TrackVertexColor,
}

/// Parameters of the texture bound to the active unit.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TexParam {
    WrapS(TextureAddressing),
    WrapT(TextureAddressing),
    WrapR(TextureAddressing),
    MinFilter(FilterOptions, FilterOptions),
    MagFilter(FilterOptions),
    MaxAnisotropy(f32),
    BorderColor(Color),
}

/// A state-changing driver call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Enable(Cap),
    Disable(Cap),

    ActiveTexture(usize),
    BindTexture(TextureType, u32),
    TexParameter(TextureType, TexParam),
    TexEnvMode(TexEnvMode),
    TexEnvCombine(LayerBlendModeEx),
    TexGenMode(TexCoordAxis, TexGenMode),
    TexGenPlane(TexCoordAxis, [f32; 4]),
    LoadMatrix(MatrixMode, Matrix4<f32>),

    BlendFunc(SceneBlendFactor, SceneBlendFactor),
    BlendFuncSeparate(
        SceneBlendFactor,
        SceneBlendFactor,
        SceneBlendFactor,
        SceneBlendFactor,
    ),
    BlendEquation(SceneBlendOperation),
    BlendEquationSeparate(SceneBlendOperation, SceneBlendOperation),
    AlphaFunc(CompareFunction, f32),
    DepthFunc(CompareFunction),
    DepthMask(bool),
    PolygonOffset(f32, f32),
    ColorMask(bool, bool, bool, bool),

    StencilMask(u32),
    StencilFunc(CompareFunction, i32, u32),
    StencilOp(StencilOperation, StencilOperation, StencilOperation),
    ActiveStencilFace(Face),

    FrontFace(FrontFaceOrder),
    CullFace(Face),
    Viewport(i32, i32, i32, i32),
    Scissor(i32, i32, i32, i32),
    PolygonMode(PolygonMode),
    ShadeModel(ShadeOptions),

    LightModelAmbient(Color),
    LightModelSeparateSpecular(bool),
    LightModelLocalViewer(bool),
    SetupLight(usize, LightSetup),
    Material(SurfaceColors),
    Fog(FogParams),
    ClipPlane(usize, [f64; 4]),
    PointParameters {
        size: f32,
        attenuation: [f32; 3],
        min_size: f32,
        max_size: f32,
    },

    BindFramebuffer(u32),
    FramebufferTexture {
        attachment: Attachment,
        ty: TextureType,
        face: CubeFace,
        id: u32,
        level: u32,
        zoffset: u32,
    },
    /// Attaches a render buffer, `id = 0` detaches.
    FramebufferRenderbuffer(Attachment, u32),
    RenderbufferStorage {
        id: u32,
        format: RenderBufferFormat,
        width: u32,
        height: u32,
    },
    DrawBuffers(Vec<Attachment>),
    DrawBuffersAti(Vec<Attachment>),
    DrawBuffer(Attachment),
    ReadBuffer(Attachment),

    /// Binds an assembly program, `id = 0` unbinds.
    BindProgram(GpuProgramType, u32),
    /// Uses a linked GLSL program, `id = 0` uses the fixed-function pipeline.
    UseProgram(u32),
    ProgramLocalParameter(GpuProgramType, usize, [f32; 4]),
    Uniform4f(usize, [f32; 4]),
    Uniform4i(usize, [i32; 4]),

    BindBuffer(u32),
    BufferData {
        id: u32,
        size: usize,
        usage: BufferUsage,
    },
    BufferSubData {
        id: u32,
        offset: usize,
        data: Vec<u8>,
    },
    TexImage {
        ty: TextureType,
        id: u32,
        face: CubeFace,
        level: u32,
        format: PixelFormat,
        width: u32,
        height: u32,
        depth: u32,
    },
    TexSubImage {
        ty: TextureType,
        id: u32,
        face: CubeFace,
        level: u32,
        region: PixelRegion,
        data: Vec<u8>,
    },

    /// Selects the unit that texture coordinate arrays are set up for.
    ClientActiveTexture(usize),
    EnableClientState(ClientArray),
    DisableClientState(ClientArray),
    /// Sources a fixed-function array from the bound vertex buffer.
    ArrayPointer {
        array: ClientArray,
        format: VertexElementFormat,
        stride: usize,
        offset: usize,
    },
    EnableVertexAttribArray(usize),
    DisableVertexAttribArray(usize),
    VertexAttribPointer {
        index: usize,
        format: VertexElementFormat,
        stride: usize,
        offset: usize,
    },

    DrawArrays(OperationType, usize, usize),
    DrawElements(OperationType, usize, IndexType, usize),
    ClearColor(Color),
    ClearDepth(f32),
    ClearStencil(i32),
    Clear(FrameBufferType),
}
