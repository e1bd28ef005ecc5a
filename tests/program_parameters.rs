extern crate pigment;
extern crate rand;

use std::sync::Arc;

use rand::Rng;

use pigment::prelude::*;
use pigment::video::driver::Command;

#[test]
fn constant_slots() {
    let mut params = GpuProgramParameters::new();

    params.set_constant_vec4(2, Vector4::new(1.0, 2.0, 3.0, 4.0));
    let slot = params.float_constant(2).unwrap();
    assert_eq!(slot.val, [1.0, 2.0, 3.0, 4.0]);
    assert!(slot.is_set);
    assert!(!params.float_constant(0).unwrap().is_set);
    assert_eq!(params.float_constant_count(), 3);

    params.set_constant_f32(9, 5.0);
    assert_eq!(params.float_constant_count(), 10);
    assert_eq!(params.float_constant(2).unwrap().val, [1.0, 2.0, 3.0, 4.0]);
    assert!(params.float_constant(2).unwrap().is_set);
}

#[test]
fn growing_never_touches_lower_slots() {
    let mut rng = rand::thread_rng();
    let mut params = GpuProgramParameters::new();
    let mut expected = Vec::new();

    for index in 0..64 {
        let v = [rng.gen(), rng.gen(), rng.gen(), rng.gen()];
        params.set_constant_vec4(index * 2, Vector4::new(v[0], v[1], v[2], v[3]));
        expected.push((index * 2, v));

        for &(i, v) in &expected {
            let slot = params.float_constant(i).unwrap();
            assert_eq!(slot.val, v);
            assert!(slot.is_set);
        }
    }

    assert_eq!(params.float_constants().count(), 64);
}

#[test]
fn int_slots() {
    let mut params = GpuProgramParameters::new();
    params.set_int_constants(1, &[1, 2, 3, 4, 5]);

    assert_eq!(params.int_constant_count(), 3);
    assert!(!params.int_constant(0).unwrap().is_set);
    assert_eq!(params.int_constant(1).unwrap().val, [1, 2, 3, 4]);
    assert_eq!(params.int_constant(2).unwrap().val, [5, 0, 0, 0]);
}

#[test]
fn matrices_are_stored_by_rows() {
    let mut params = GpuProgramParameters::new();
    let m = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
    params.set_constant_matrix(0, m);

    assert_eq!(params.float_constant(0).unwrap().val, [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(params.float_constant(1).unwrap().val, [0.0, 1.0, 0.0, 2.0]);
    assert_eq!(params.float_constant(2).unwrap().val, [0.0, 0.0, 1.0, 3.0]);
    assert_eq!(params.float_constant(3).unwrap().val, [0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn named_constants() {
    let mut params = GpuProgramParameters::new();
    assert!(params
        .set_named_constant_f32("shininess", 1.0)
        .is_err());

    params.map_param_name_to_index("shininess", 4);
    params.set_named_constant_f32("shininess", 16.0).unwrap();
    assert_eq!(params.float_constant(4).unwrap().val[0], 16.0);
    assert_eq!(params.name_by_index(4), Some("shininess"));
}

#[test]
fn upload_to_bound_program() {
    let driver = Arc::new(HeadlessDriver::new());
    let mut rs = RenderSystem::new(
        driver.clone(),
        RenderSystemParams::default(),
        WindowDesc::default(),
    )
    .unwrap();

    let program = rs
        .programs_mut()
        .load(
            "transform",
            GpuProgramType::Vertex,
            "arbvp1",
            "!!ARBvp1.0\nEND",
        )
        .unwrap();

    let mut params = rs.programs().create_parameters();
    params.set_constant_vec4(1, Vector4::new(0.5, 0.5, 0.5, 1.0));

    // Nothing is uploaded without a bound program.
    rs.bind_gpu_program_parameters(GpuProgramType::Vertex, &params)
        .unwrap();
    let upload = Command::ProgramLocalParameter(GpuProgramType::Vertex, 1, [0.5, 0.5, 0.5, 1.0]);
    assert_eq!(driver.count(&upload), 0);

    rs.bind_gpu_program(&program).unwrap();
    rs.bind_gpu_program_parameters(GpuProgramType::Vertex, &params)
        .unwrap();
    assert_eq!(driver.count(&upload), 1);

    rs.unbind_gpu_program(GpuProgramType::Vertex);
    assert!(!rs.is_gpu_program_bound(GpuProgramType::Vertex));
}
