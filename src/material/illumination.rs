use crate::math::prelude::*;
use crate::video::types::*;

use super::pass::Pass;

/// Stages of the additive multi-pass lighting sequence.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IlluminationStage {
    /// Rendered once, ambient and emissive only.
    Ambient,
    /// Rendered once per light, added on top.
    PerLight,
    /// Texture layers modulated over the lit result.
    Decal,
}

/// A pass of a technique specialized for one illumination stage.
#[derive(Debug, Clone)]
pub struct IlluminationPass {
    pub stage: IlluminationStage,
    /// Index of the pass of the technique this one derives from.
    pub original: usize,
    pub pass: Pass,
    /// Is the pass a modified clone rather than the original one.
    pub synthesized: bool,
}

impl IlluminationPass {
    fn original(stage: IlluminationStage, index: usize, pass: &Pass) -> Self {
        IlluminationPass {
            stage,
            original: index,
            pass: pass.clone(),
            synthesized: false,
        }
    }

    fn synthesized(stage: IlluminationStage, index: usize, pass: Pass) -> Self {
        IlluminationPass {
            stage,
            original: index,
            pass,
            synthesized: true,
        }
    }
}

/// Splits `passes` into the ambient, per-light and decal stages.
pub fn compile(passes: &[Pass]) -> Vec<IlluminationPass> {
    let mut outputs = Vec::new();
    let mut stage = IlluminationStage::Ambient;
    let mut has_ambient = false;
    let mut i = 0;

    while i < passes.len() {
        let p = &passes[i];

        match stage {
            IlluminationStage::Ambient => {
                if p.is_ambient_only() {
                    outputs.push(IlluminationPass::original(stage, i, p));
                    has_ambient = true;
                    i += 1;
                    continue;
                }

                if !p.ambient.is_black()
                    || !p.emissive.is_black()
                    || p.alpha_reject_func != CompareFunction::AlwaysPass
                {
                    let mut pass = p.clone();
                    pass.diffuse = Color::black();
                    pass.specular = Color::black();
                    strip_textures(&mut pass);

                    if pass.ambient.is_black() && pass.emissive.is_black() {
                        pass.color_write = false;
                    }

                    outputs.push(IlluminationPass::synthesized(stage, i, pass));
                    has_ambient = true;
                }

                if !has_ambient {
                    let mut pass = p.clone();
                    pass.ambient = Color::black();
                    pass.diffuse = Color::black();
                    pass.specular = Color::black();
                    pass.color_write = false;
                    strip_textures(&mut pass);

                    outputs.push(IlluminationPass::synthesized(stage, i, pass));
                }

                stage = IlluminationStage::PerLight;
            }

            IlluminationStage::PerLight => {
                if p.iterate_per_light {
                    outputs.push(IlluminationPass::original(stage, i, p));
                    i += 1;
                    continue;
                }

                if p.lighting && (!p.diffuse.is_black() || !p.specular.is_black()) {
                    let mut pass = p.clone();
                    pass.ambient = Color::black();
                    pass.emissive = Color::black();
                    pass.set_scene_blending(SceneBlendFactor::One, SceneBlendFactor::One);
                    strip_textures(&mut pass);

                    outputs.push(IlluminationPass::synthesized(stage, i, pass));
                }

                stage = IlluminationStage::Decal;
            }

            IlluminationStage::Decal => {
                if p.num_texture_units() > 0 {
                    if !p.lighting {
                        outputs.push(IlluminationPass::original(stage, i, p));
                    } else {
                        let mut pass = p.clone();
                        pass.ambient = Color::black();
                        pass.diffuse = Color::black();
                        pass.specular = Color::black();
                        pass.emissive = Color::black();
                        pass.lighting = false;
                        pass.set_scene_blending(
                            SceneBlendFactor::DestColor,
                            SceneBlendFactor::Zero,
                        );

                        outputs.push(IlluminationPass::synthesized(stage, i, pass));
                    }
                }

                i += 1;
            }
        }
    }

    outputs
}

fn strip_textures(pass: &mut Pass) {
    pass.remove_all_texture_units();
    pass.set_fragment_program(None);
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ambient_only_pass() {
        let mut pass = Pass::new();
        pass.lighting = false;
        pass.create_texture_unit("decal.png");

        let outputs = compile(&[pass]);
        assert_eq!(outputs.len(), 1);

        assert_eq!(outputs[0].stage, IlluminationStage::Ambient);
        assert!(!outputs[0].synthesized);
        assert_eq!(outputs[0].pass.num_texture_units(), 1);
    }

    #[test]
    fn black_ambient() {
        let mut pass = Pass::new();
        pass.ambient = Color::black();

        let outputs = compile(&[pass]);
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].stage, IlluminationStage::Ambient);
        assert!(!outputs[0].pass.color_write);
        assert_eq!(outputs[1].stage, IlluminationStage::PerLight);
    }

    #[test]
    fn per_light_pass() {
        let mut ambient = Pass::new();
        ambient.diffuse = Color::black();

        let mut lit = Pass::new();
        lit.ambient = Color::black();
        lit.iterate_per_light = true;
        lit.set_scene_blending_type(SceneBlendType::Add);

        let outputs = compile(&[ambient, lit]);
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].original, 0);
        assert_eq!(outputs[1].original, 1);
        assert_eq!(outputs[1].stage, IlluminationStage::PerLight);
        assert!(!outputs[1].synthesized);
    }
}
