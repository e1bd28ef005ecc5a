extern crate env_logger;
extern crate pigment;

use std::sync::Arc;

use pigment::prelude::*;
use pigment::video::driver::{
    Call, Cap, ClientArray, Command, Driver, Limit, MatrixMode, ObjectKind, TexParam,
};

fn setup(driver: HeadlessDriver) -> (Arc<HeadlessDriver>, RenderSystem) {
    let _ = env_logger::try_init();

    let driver = Arc::new(driver);
    let rs = RenderSystem::new(
        driver.clone(),
        RenderSystemParams::default(),
        WindowDesc::default(),
    )
    .unwrap();

    driver.clear_calls();
    (driver, rs)
}

#[test]
fn scene_blending_is_shadowed() {
    let (driver, mut rs) = setup(HeadlessDriver::new());

    rs.set_scene_blending(
        SceneBlendFactor::One,
        SceneBlendFactor::Zero,
        SceneBlendOperation::Add,
    )
    .unwrap();
    assert_eq!(driver.count(&Command::Disable(Cap::Blend)), 0);

    let (src, dst) = SceneBlendType::TransparentAlpha.factors();
    rs.set_scene_blending(src, dst, SceneBlendOperation::Add)
        .unwrap();
    assert_eq!(driver.count(&Command::Enable(Cap::Blend)), 1);

    for _ in 0..2 {
        rs.set_scene_blending(
            SceneBlendFactor::One,
            SceneBlendFactor::Zero,
            SceneBlendOperation::Add,
        )
        .unwrap();
    }

    assert_eq!(driver.count(&Command::Disable(Cap::Blend)), 1);
}

#[test]
fn stencil_check_skips_unchanged() {
    let (driver, mut rs) = setup(HeadlessDriver::new());

    rs.set_stencil_check_enabled(true);
    rs.set_stencil_check_enabled(true);
    assert_eq!(driver.count(&Command::Enable(Cap::StencilTest)), 1);

    rs.set_stencil_check_enabled(false);
    rs.set_stencil_check_enabled(false);
    assert_eq!(driver.count(&Command::Disable(Cap::StencilTest)), 1);
}

#[test]
fn two_sided_stencil_requires_hardware() {
    let driver = HeadlessDriver::new()
        .with_version("1.4")
        .without_extension("GL_EXT_stencil_two_side");
    let (_, mut rs) = setup(driver);

    let result = rs.set_stencil_buffer_params(
        CompareFunction::AlwaysPass,
        0,
        0xFFFF_FFFF,
        StencilOperation::Keep,
        StencilOperation::Increment,
        StencilOperation::Keep,
        true,
    );

    match result {
        Err(Error::CapabilityMissing(_)) => {}
        v => panic!("unexpected {:?}", v),
    }
}

#[test]
fn two_sided_stencil_inverts_back_faces() {
    let (driver, mut rs) = setup(HeadlessDriver::new());

    rs.set_stencil_buffer_params(
        CompareFunction::AlwaysPass,
        0,
        0xFFFF_FFFF,
        StencilOperation::Keep,
        StencilOperation::Increment,
        StencilOperation::Keep,
        true,
    )
    .unwrap();

    assert_eq!(driver.count(&Command::Enable(Cap::StencilTwoSide)), 1);
    assert_eq!(
        driver.count(&Command::StencilOp(
            StencilOperation::Keep,
            StencilOperation::Decrement,
            StencilOperation::Keep,
        )),
        1
    );
    assert_eq!(
        driver.count(&Command::StencilOp(
            StencilOperation::Keep,
            StencilOperation::Increment,
            StencilOperation::Keep,
        )),
        1
    );
}

#[test]
fn clip_planes_beyond_hardware() {
    let driver = HeadlessDriver::new().with_limit(Limit::MaxClipPlanes, 2);
    let (_, mut rs) = setup(driver);

    let plane = Plane::new(Vector3::new(0.0, 1.0, 0.0), 0.0);
    assert!(rs.set_clip_planes(&[plane, plane]).is_ok());
    assert!(rs.set_clip_planes(&[plane, plane, plane]).is_err());
}

#[test]
fn context_switch_order() {
    let (driver, mut rs) = setup(HeadlessDriver::new());

    let program = rs
        .programs_mut()
        .load(
            "transform",
            GpuProgramType::Vertex,
            "arbvp1",
            "!!ARBvp1.0\nEND",
        )
        .unwrap();
    rs.bind_gpu_program(&program).unwrap();

    let main = rs.main_context().unwrap();
    let ctx = driver.create_shared_context(main).unwrap();
    driver.clear_calls();

    rs.switch_context(ctx).unwrap();
    assert_eq!(rs.current_context(), Some(ctx));
    assert_eq!(driver.current_context(), Some(ctx));

    let calls = driver.calls();
    let position = |call: &Call| calls.iter().position(|v| v == call).unwrap();

    let unbind = position(&Call::Command(Command::BindProgram(
        GpuProgramType::Vertex,
        0,
    )));
    let swap = position(&Call::MakeCurrent(ctx));
    let rebind = position(&Call::Command(Command::BindProgram(
        GpuProgramType::Vertex,
        program.id(),
    )));

    assert!(unbind < swap);
    assert!(swap < rebind);
    assert!(rs.is_gpu_program_bound(GpuProgramType::Vertex));
}

#[test]
fn unsupported_program() {
    let driver = HeadlessDriver::new().without_extension("GL_ARB_fragment_program");
    let (_, mut rs) = setup(driver);

    let program = rs
        .programs_mut()
        .load(
            "shade",
            GpuProgramType::Fragment,
            "arbfp1",
            "!!ARBfp1.0\nEND",
        )
        .unwrap();

    assert!(!program.is_supported(rs.capabilities()));
    assert!(rs.bind_gpu_program(&program).is_err());
    assert!(!rs.is_gpu_program_bound(GpuProgramType::Fragment));
}

#[test]
fn texture_units() {
    let (driver, mut rs) = setup(HeadlessDriver::new());

    let desc = TextureDesc::new_2d("brick.png", PixelFormat::A8R8G8B8, 64, 64);
    let texture = rs.textures_mut().create(desc).unwrap();
    let id = rs.textures().get(texture).unwrap().id();
    driver.clear_calls();

    rs.set_texture(0, true, Some(texture)).unwrap();
    assert_eq!(
        driver.count(&Command::BindTexture(TextureType::TwoD, id)),
        1
    );
    assert_eq!(rs.texture_unit(0).unwrap().texture, id);

    let uvw = UVWAddressing::all(TextureAddressing::Clamp);
    rs.set_texture_addressing_mode(0, uvw).unwrap();
    rs.set_texture_addressing_mode(0, uvw).unwrap();
    assert_eq!(
        driver.count_calls(|v| match *v {
            Call::Command(Command::TexParameter(_, TexParam::WrapS(_))) => true,
            _ => false,
        }),
        1
    );

    rs.set_texture(1, true, None).unwrap();
    let warning = rs.textures().warning_texture_id();
    assert_eq!(
        driver.count(&Command::BindTexture(TextureType::TwoD, warning)),
        1
    );

    rs.disable_texture_units_from(0).unwrap();
    assert!(rs.texture_unit(0).unwrap().ty.is_none());
    assert!(rs.texture_unit(1).unwrap().ty.is_none());
}

#[test]
fn texture_layer_settings() {
    let (driver, mut rs) = setup(HeadlessDriver::new());

    let mut layer = TextureUnitState::new("chrome.png");
    layer.set_environment_map(true, EnvMapType::Curved);
    layer.set_color_operation(LayerBlendOperation::Add);

    rs.set_texture_unit_settings(0, &layer).unwrap();
    assert_eq!(
        rs.texture_unit(0).unwrap().coord_calc,
        TexCoordCalcMethod::EnvironmentMap
    );
    assert!(driver.count_calls(|v| match *v {
        Call::Command(Command::LoadMatrix(MatrixMode::Texture, _)) => true,
        _ => false,
    }) > 0);
}

#[test]
fn render_texture_targets() {
    let (driver, mut rs) = setup(HeadlessDriver::new());

    let mut handles = Vec::new();
    for i in 0..2 {
        let desc = TextureDesc::new_2d(format!("rtt{}", i), PixelFormat::A8R8G8B8, 256, 256);
        let texture = rs.textures_mut().create(desc).unwrap();
        let target = rs
            .create_render_texture(format!("rtt{}", i), texture, CubeFace::PositiveX, 0)
            .unwrap();
        handles.push(target);
    }

    // Both targets share one pooled depth buffer.
    assert_eq!(rs.targets().pool().len(), 1);

    let fbo = rs.targets().get(handles[0]).unwrap().fbo().unwrap().id();
    rs.set_render_target(handles[0]).unwrap();
    assert_eq!(rs.active_render_target(), Some(handles[0]));
    assert!(driver.count(&Command::BindFramebuffer(fbo)) > 0);

    assert!(rs.targets_mut().delete(handles[0]));
    assert_eq!(rs.targets().pool().len(), 1);
    assert!(rs.targets_mut().delete(handles[1]));
    assert!(rs.targets().pool().is_empty());
}

#[test]
fn viewports() {
    let (driver, mut rs) = setup(HeadlessDriver::new());

    assert!(rs.begin_frame().is_err());

    let window = rs.primary_window();
    let mut vp = Viewport::new(window, (640, 480), 0.0, 0.0, 0.5, 0.5);
    rs.set_viewport(&mut vp).unwrap();
    rs.set_viewport(&mut vp).unwrap();

    // The window origin is the lower-left corner.
    assert_eq!(driver.count(&Command::Viewport(0, 240, 320, 240)), 1);
    assert!(rs.begin_frame().is_ok());
}

#[test]
fn projection_of_render_textures_is_flipped() {
    let (driver, mut rs) = setup(HeadlessDriver::new());

    let desc = TextureDesc::new_2d("mirror", PixelFormat::A8R8G8B8, 128, 128);
    let texture = rs.textures_mut().create(desc).unwrap();
    let target = rs
        .create_render_texture("mirror", texture, CubeFace::PositiveX, 0)
        .unwrap();

    rs.set_render_target(target).unwrap();
    driver.clear_calls();

    rs.set_projection_matrix(Matrix4::identity());

    let mut flipped = Matrix4::identity();
    flipped.y.y = -1.0;
    assert_eq!(
        driver.count(&Command::LoadMatrix(MatrixMode::Projection, flipped)),
        1
    );
}

#[test]
fn texture_type_switch() {
    let (driver, mut rs) = setup(HeadlessDriver::new());

    let flat = TextureDesc::new_2d("flat", PixelFormat::A8R8G8B8, 16, 16);
    let flat = rs.textures_mut().create(flat).unwrap();
    let cube = TextureDesc {
        ty: TextureType::CubeMap,
        ..TextureDesc::new_2d("sky", PixelFormat::A8R8G8B8, 16, 16)
    };
    let cube = rs.textures_mut().create(cube).unwrap();
    let id = rs.textures().get(cube).unwrap().id();

    rs.set_texture(0, true, Some(flat)).unwrap();
    driver.clear_calls();
    rs.set_texture(0, true, Some(cube)).unwrap();

    let calls = driver.calls();
    let position = |call: Command| {
        calls
            .iter()
            .position(|v| *v == Call::Command(call.clone()))
            .unwrap()
    };

    let disable = position(Command::Disable(Cap::Texture(TextureType::TwoD)));
    let enable = position(Command::Enable(Cap::Texture(TextureType::CubeMap)));
    let bind = position(Command::BindTexture(TextureType::CubeMap, id));
    assert!(disable < enable);
    assert!(enable < bind);
    assert_eq!(rs.texture_unit(0).unwrap().ty, Some(TextureType::CubeMap));
}

#[test]
fn reflection_texture_matrix() {
    let (driver, mut rs) = setup(HeadlessDriver::new());

    // Quarter turn around y, the x axis maps onto -z.
    let view = Matrix4::new(
        0.0, 0.0, -1.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    );
    rs.set_view_matrix(view);
    rs.set_world_matrix(Matrix4::from_translation(Vector3::new(5.0, 0.0, 0.0)));

    rs.set_texture_coord_calculation(0, TexCoordCalcMethod::EnvironmentMapReflection, None)
        .unwrap();
    rs.set_texture_matrix(0, Matrix4::identity()).unwrap();

    let expected = Matrix4::new(
        0.0, 0.0, -1.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        -1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    );
    assert_eq!(
        driver.count(&Command::LoadMatrix(MatrixMode::Texture, expected)),
        1
    );
}

#[test]
fn projective_texture_matrix() {
    let (driver, mut rs) = setup(HeadlessDriver::new());

    rs.set_world_matrix(Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0)));

    let frustum = Frustum::new(Projection::ortho(2.0, 2.0, -1.0, 1.0), Matrix4::identity());
    rs.set_texture_coord_calculation(0, TexCoordCalcMethod::ProjectiveTexture, Some(&frustum))
        .unwrap();
    rs.set_texture_matrix(0, Matrix4::identity()).unwrap();

    // Image space of the projector: scaled by a half, y flipped and shifted to [0, 1].
    let expected = Matrix4::new(
        0.5, 0.0, 0.0, 0.0, //
        0.0, -0.5, 0.0, 0.0, //
        0.0, 0.0, -1.0, 0.0, //
        1.0, -0.5, -3.0, 1.0,
    );
    assert_eq!(
        driver.count(&Command::LoadMatrix(MatrixMode::Texture, expected)),
        1
    );

    assert!(rs
        .set_texture_coord_calculation(0, TexCoordCalcMethod::ProjectiveTexture, None)
        .is_err());
}

#[test]
fn render_binds_vertex_declaration() {
    use pigment::video::types::VertexElementSemantic as Semantic;

    let driver = HeadlessDriver::new().with_limit(Limit::MaxTextureUnits, 2);
    let (driver, mut rs) = setup(driver);

    let vb = rs
        .buffers_mut()
        .create_vertex_buffer(28, 3, BufferUsage::StaticWriteOnly);
    let id = rs.buffers().get(vb).unwrap().id().unwrap();

    rs.set_texture_coord_set(1, 1);
    driver.clear_calls();

    let op = RenderOperation {
        operation_type: OperationType::TriangleList,
        vertex_buffer: vb,
        vertex_declaration: vec![
            VertexElement::new(Semantic::Position, VertexElementFormat::Float3, 0, 0),
            VertexElement::new(Semantic::TexCoords, VertexElementFormat::Float2, 12, 0),
            VertexElement::new(Semantic::TexCoords, VertexElementFormat::Float2, 20, 1),
            // Skipped without a vertex program.
            VertexElement::new(Semantic::Tangent, VertexElementFormat::Float3, 0, 0),
        ],
        vertex_start: 0,
        vertex_count: 3,
        indices: None,
    };
    rs.render(&op).unwrap();

    let texcoords = |offset| Command::ArrayPointer {
        array: ClientArray::TexCoord,
        format: VertexElementFormat::Float2,
        stride: 28,
        offset,
    };

    let commands: Vec<_> = driver
        .calls()
        .into_iter()
        .filter_map(|v| match v {
            Call::Command(cmd) => Some(cmd),
            _ => None,
        })
        .collect();

    assert_eq!(
        commands,
        vec![
            Command::BindBuffer(id),
            Command::ArrayPointer {
                array: ClientArray::Vertex,
                format: VertexElementFormat::Float3,
                stride: 28,
                offset: 0,
            },
            Command::EnableClientState(ClientArray::Vertex),
            Command::ClientActiveTexture(0),
            texcoords(12),
            Command::EnableClientState(ClientArray::TexCoord),
            Command::ClientActiveTexture(0),
            Command::ClientActiveTexture(1),
            texcoords(20),
            Command::EnableClientState(ClientArray::TexCoord),
            Command::ClientActiveTexture(0),
            Command::DrawArrays(OperationType::TriangleList, 0, 3),
            Command::DisableClientState(ClientArray::Vertex),
            Command::ClientActiveTexture(0),
            Command::DisableClientState(ClientArray::TexCoord),
            Command::ClientActiveTexture(1),
            Command::DisableClientState(ClientArray::TexCoord),
            Command::ClientActiveTexture(0),
        ]
    );
}

#[test]
fn shutdown_order() {
    let (driver, mut rs) = setup(HeadlessDriver::new());

    let program = rs
        .programs_mut()
        .load(
            "transform",
            GpuProgramType::Vertex,
            "arbvp1",
            "!!ARBvp1.0\nEND",
        )
        .unwrap();
    rs.bind_gpu_program(&program).unwrap();
    let program_id = program.id();
    drop(program);

    let vb = rs
        .buffers_mut()
        .create_vertex_buffer(12, 3, BufferUsage::Static);
    let buffer_id = rs.buffers().get(vb).unwrap().id().unwrap();

    let desc = TextureDesc::new_2d("rtt", PixelFormat::A8R8G8B8, 64, 64);
    let texture = rs.textures_mut().create(desc).unwrap();
    let texture_id = rs.textures().get(texture).unwrap().id();
    rs.create_render_texture("rtt", texture, CubeFace::PositiveX, 0)
        .unwrap();

    let ctx = rs.register_thread().unwrap();
    driver.clear_calls();
    rs.shutdown();

    let calls = driver.calls();
    let position = |call: Call| calls.iter().position(|v| *v == call).unwrap();

    let programs = position(Call::Delete(ObjectKind::ArbProgram, program_id));
    let buffers = position(Call::Delete(ObjectKind::Buffer, buffer_id));
    let render_buffers = calls
        .iter()
        .position(|v| match *v {
            Call::Delete(ObjectKind::Renderbuffer, _) => true,
            _ => false,
        })
        .unwrap();
    let contexts = position(Call::DestroyContext(ctx));
    let stop = position(Call::Stop);
    let textures = position(Call::Delete(ObjectKind::Texture, texture_id));

    assert!(programs < buffers);
    assert!(buffers < render_buffers);
    assert!(render_buffers < contexts);
    assert!(contexts < stop);
    assert!(stop < textures);
}

#[test]
fn shutdown() {
    let (driver, mut rs) = setup(HeadlessDriver::new());

    let ctx = rs.register_thread().unwrap();
    assert_eq!(rs.num_background_contexts(), 1);

    rs.shutdown();
    assert!(rs.main_context().is_none());
    assert_eq!(rs.num_background_contexts(), 0);
    assert_eq!(driver.count_calls(|v| *v == Call::DestroyContext(ctx)), 1);
    assert_eq!(driver.count_calls(|v| *v == Call::Stop), 1);

    rs.shutdown();
    assert_eq!(driver.count_calls(|v| *v == Call::Stop), 1);
}

#[test]
fn materials_follow_configuration() {
    let driver = Arc::new(HeadlessDriver::new().with_limit(Limit::MaxTextureUnits, 2));
    let mut params = RenderSystemParams::default();
    params.auto_manage_texture_units = false;
    let rs = RenderSystem::new(driver, params, WindowDesc::default()).unwrap();

    let mut material = Material::new("layers");
    {
        let pass = material.create_technique().create_pass();
        for i in 0..3 {
            pass.create_texture_unit(format!("layer{}.png", i));
        }
    }

    rs.compile_material(&mut material);
    assert_eq!(material.num_supported_techniques(), 0);
    assert_eq!(material.technique(0).unwrap().num_passes(), 1);
}
