extern crate env_logger;
extern crate pigment;

use std::sync::Arc;

use pigment::prelude::*;
use pigment::video::driver::Limit;

fn capabilities(driver: &HeadlessDriver) -> Capabilities {
    let _ = env_logger::try_init();
    Capabilities::probe(driver).unwrap()
}

fn limited(units: i32) -> HeadlessDriver {
    HeadlessDriver::new()
        .with_limit(Limit::MaxTextureUnits, units)
        .with_limit(Limit::MaxTextureImageUnits, units)
}

#[test]
fn fixed_function_passes_are_split() {
    let caps = capabilities(&limited(2));

    let mut material = Material::new("layers");
    {
        let pass = material.create_technique().create_pass();
        for i in 0..5 {
            pass.create_texture_unit(format!("layer{}.png", i));
        }

        pass.texture_unit_mut(2)
            .unwrap()
            .set_color_operation(LayerBlendOperation::Add);
        pass.texture_unit_mut(4)
            .unwrap()
            .set_color_operation(LayerBlendOperation::AlphaBlend);
    }

    material.compile(&caps, true);
    let technique = material.best_technique(0).unwrap();
    assert!(technique.is_supported());

    let units: Vec<_> = technique
        .passes()
        .iter()
        .map(|v| v.num_texture_units())
        .collect();
    assert_eq!(units, [2, 2, 1]);

    let second = technique.pass(1).unwrap();
    assert_eq!(second.texture_unit(0).unwrap().name(), "layer2.png");
    assert_eq!(
        (second.src_blend, second.dst_blend),
        (SceneBlendFactor::One, SceneBlendFactor::One)
    );

    let third = technique.pass(2).unwrap();
    assert_eq!(third.texture_unit(0).unwrap().name(), "layer4.png");
    assert_eq!(
        (third.src_blend, third.dst_blend),
        (
            SceneBlendFactor::SourceAlpha,
            SceneBlendFactor::OneMinusSourceAlpha
        )
    );
}

#[test]
fn programmable_passes_are_not_split() {
    let driver = Arc::new(limited(2));
    let caps = capabilities(&driver);

    let mut programs = GpuProgramManager::new(driver.clone(), true);
    let program = programs
        .load(
            "shade",
            GpuProgramType::Fragment,
            "arbfp1",
            "!!ARBfp1.0\nEND",
        )
        .unwrap();

    let params = programs.create_parameters().into_shared();

    let mut material = Material::new("shaded");
    {
        let pass = material.create_technique().create_pass();
        pass.set_fragment_program(Some(GpuProgramUsage::new(program, params)));
        for i in 0..3 {
            pass.create_texture_unit(format!("layer{}.png", i));
        }
    }

    material.compile(&caps, true);
    assert_eq!(material.num_supported_techniques(), 0);

    let technique = material.technique(0).unwrap();
    assert!(!technique.is_supported());
    assert_eq!(technique.num_passes(), 1);
    assert_eq!(technique.pass(0).unwrap().num_texture_units(), 3);
}

#[test]
fn fallback_technique() {
    let driver = HeadlessDriver::new()
        .with_version("1.2")
        .with_extensions(&["GL_ARB_multitexture"])
        .with_limit(Limit::MaxTextureUnits, 2);
    let caps = capabilities(&driver);

    let mut material = Material::new("bumpy");
    {
        let technique = material.create_technique();
        technique.set_name("dot3");

        let mut mode = LayerBlendModeEx::new(LayerBlendType::Color);
        mode.operation = LayerBlendOperationEx::DotProduct;
        technique
            .create_pass()
            .create_texture_unit("normals.png")
            .set_color_blend_mode(mode);
    }

    material
        .create_technique()
        .set_name("plain");
    material
        .technique_mut(1)
        .unwrap()
        .create_pass()
        .create_texture_unit("diffuse.png");

    material.compile(&caps, true);
    assert_eq!(material.num_supported_techniques(), 1);
    assert_eq!(material.best_technique(0).unwrap().name(), "plain");

    let names: Vec<_> = material.supported_techniques().map(|v| v.name()).collect();
    assert_eq!(names, ["plain"]);
}

#[test]
fn recompilation() {
    let caps = capabilities(&limited(4));

    let mut material = Material::new("rock");
    material.create_technique().create_pass();
    material.compile(&caps, true);
    assert!(!material.is_compilation_required());

    material
        .technique_mut(0)
        .unwrap()
        .set_scheme("Reflection");
    assert!(material.is_compilation_required());

    material.compile(&caps, true);
    assert!(material.best_technique_in_scheme("Reflection", 0).is_some());
    assert!(material.best_technique(0).is_some());

    material.remove_technique(0);
    assert!(material.is_compilation_required());
    material.compile(&caps, true);
    assert!(material.best_technique(0).is_none());
}
