extern crate pigment;

use pigment::prelude::*;
use pigment::video::driver::Limit;

fn capabilities() -> Capabilities {
    let driver = HeadlessDriver::new().with_limit(Limit::MaxTextureUnits, 4);
    Capabilities::probe(&driver).unwrap()
}

fn lit_technique(textured: bool) -> Technique {
    let mut technique = Technique::new();
    {
        let pass = technique.create_pass();
        pass.ambient = Color::gray();
        pass.diffuse = Color::white();
        pass.specular = Color::white();

        if textured {
            pass.create_texture_unit("diffuse.png");
        }
    }

    technique.compile(&capabilities(), true).unwrap();
    technique
}

#[test]
fn stage_order() {
    let mut technique = lit_technique(true);
    let passes = technique.illumination_passes();

    let stages: Vec<_> = passes.iter().map(|v| v.stage).collect();
    assert_eq!(
        stages,
        [
            IlluminationStage::Ambient,
            IlluminationStage::PerLight,
            IlluminationStage::Decal
        ]
    );

    let ambient = &passes[0].pass;
    assert!(passes[0].synthesized);
    assert!(ambient.diffuse.is_black());
    assert!(ambient.specular.is_black());
    assert_eq!(ambient.num_texture_units(), 0);
    assert!(ambient.color_write);

    let per_light = &passes[1].pass;
    assert!(per_light.ambient.is_black());
    assert_eq!(
        (per_light.src_blend, per_light.dst_blend),
        (SceneBlendFactor::One, SceneBlendFactor::One)
    );
    assert_eq!(per_light.num_texture_units(), 0);

    let decal = &passes[2].pass;
    assert!(!decal.lighting);
    assert_eq!(decal.num_texture_units(), 1);
    assert_eq!(
        (decal.src_blend, decal.dst_blend),
        (SceneBlendFactor::DestColor, SceneBlendFactor::Zero)
    );

    assert!(passes.iter().all(|v| v.original == 0));
}

#[test]
fn untextured_passes_have_no_decal() {
    let mut technique = lit_technique(false);
    let stages: Vec<_> = technique
        .illumination_passes()
        .iter()
        .map(|v| v.stage)
        .collect();

    assert_eq!(
        stages,
        [IlluminationStage::Ambient, IlluminationStage::PerLight]
    );
}

#[test]
fn transparent_techniques_are_kept_whole() {
    let mut technique = lit_technique(true);
    technique
        .pass_mut(0)
        .unwrap()
        .set_scene_blending_type(SceneBlendType::TransparentAlpha);

    assert!(technique.is_transparent());
    assert!(technique.illumination_passes().is_empty());
}

#[test]
fn rebuilt_after_changes() {
    let mut technique = lit_technique(true);
    assert_eq!(technique.illumination_passes().len(), 3);

    technique.create_pass().lighting = false;
    let passes = technique.illumination_passes();
    assert_eq!(passes.len(), 3);

    technique.pass_mut(1).unwrap().create_texture_unit("detail.png");
    let passes = technique.illumination_passes();
    assert_eq!(passes.len(), 4);
    assert_eq!(passes[3].stage, IlluminationStage::Decal);
    assert_eq!(passes[3].original, 1);
    assert!(!passes[3].synthesized);
}
