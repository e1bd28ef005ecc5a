use std::collections::BTreeMap;

use crate::utils::hash::FastHashMap;
use crate::video::capabilities::Capabilities;

use super::technique::{Technique, DEFAULT_SCHEME};

/// A named set of techniques describing how to render an object.
#[derive(Debug, Clone)]
pub struct Material {
    name: String,
    techniques: Vec<Technique>,
    supported: Vec<usize>,
    best: FastHashMap<String, BTreeMap<usize, usize>>,
    compilation_required: bool,
}

impl Material {
    pub fn new<T: Into<String>>(name: T) -> Self {
        Material {
            name: name.into(),
            techniques: Vec::new(),
            supported: Vec::new(),
            best: FastHashMap::default(),
            compilation_required: true,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn create_technique(&mut self) -> &mut Technique {
        self.compilation_required = true;
        self.techniques.push(Technique::new());
        let last = self.techniques.len() - 1;
        &mut self.techniques[last]
    }

    #[inline]
    pub fn technique(&self, index: usize) -> Option<&Technique> {
        self.techniques.get(index)
    }

    /// Mutable access to a technique. The material has to be compiled again
    /// before the next lookup of its best technique.
    pub fn technique_mut(&mut self, index: usize) -> Option<&mut Technique> {
        self.compilation_required = true;
        self.techniques.get_mut(index)
    }

    #[inline]
    pub fn techniques(&self) -> &[Technique] {
        &self.techniques
    }

    #[inline]
    pub fn num_techniques(&self) -> usize {
        self.techniques.len()
    }

    pub fn remove_technique(&mut self, index: usize) -> Option<Technique> {
        if index < self.techniques.len() {
            self.clear_selection();
            Some(self.techniques.remove(index))
        } else {
            None
        }
    }

    pub fn remove_all_techniques(&mut self) {
        self.clear_selection();
        self.techniques.clear();
    }

    #[inline]
    pub fn is_compilation_required(&self) -> bool {
        self.compilation_required
    }

    /// Marks the cached technique selection as stale.
    pub fn notify_needs_recompile(&mut self) {
        self.compilation_required = true;
    }

    /// Compiles every technique against `caps`, and records the first
    /// supported one of every scheme and lod index.
    pub fn compile(&mut self, caps: &Capabilities, auto_manage: bool) {
        self.supported.clear();
        self.best.clear();

        for (i, technique) in self.techniques.iter_mut().enumerate() {
            if let Err(err) = technique.compile(caps, auto_manage) {
                warn!(
                    "Technique {} of material '{}' is unsupported: {}",
                    i, self.name, err
                );
                continue;
            }

            self.supported.push(i);
            self.best
                .entry(technique.scheme().to_owned())
                .or_insert_with(BTreeMap::new)
                .entry(technique.lod_index())
                .or_insert(i);
        }

        if self.supported.is_empty() {
            warn!(
                "Material '{}' has no supported techniques, it will be rendered blank.",
                self.name
            );
        }

        self.compilation_required = false;
    }

    /// Techniques the hardware supports, in order of preference.
    pub fn supported_techniques(&self) -> impl Iterator<Item = &Technique> {
        self.supported.iter().map(move |&v| &self.techniques[v])
    }

    #[inline]
    pub fn num_supported_techniques(&self) -> usize {
        self.supported.len()
    }

    /// The preferred technique of the default scheme for `lod`.
    pub fn best_technique(&self, lod: usize) -> Option<&Technique> {
        self.best_technique_in_scheme(DEFAULT_SCHEME, lod)
    }

    /// The preferred technique of `scheme` for `lod`. Falls back to the closest
    /// lower lod, then to the default scheme, then to the first supported
    /// technique.
    pub fn best_technique_in_scheme(&self, scheme: &str, lod: usize) -> Option<&Technique> {
        let index = self
            .best
            .get(scheme)
            .or_else(|| self.best.get(DEFAULT_SCHEME))
            .and_then(|lods| {
                lods.get(&lod)
                    .or_else(|| lods.range(..lod).next_back().map(|(_, v)| v))
            })
            .cloned()
            .or_else(|| self.supported.first().cloned())?;

        self.techniques.get(index)
    }

    /// Forgets the supported and best techniques, whose indices are invalid
    /// once techniques move.
    fn clear_selection(&mut self) {
        self.supported.clear();
        self.best.clear();
        self.compilation_required = true;
    }

    /// Returns true if the preferred technique blends with the frame.
    pub fn is_transparent(&self) -> bool {
        self.best_technique(0)
            .map(|v| v.is_transparent())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::video::driver::{HeadlessDriver, Limit};
    use crate::video::types::TextureType;

    fn capabilities() -> Capabilities {
        let driver = HeadlessDriver::new()
            .with_version("1.2")
            .with_extensions(&["GL_ARB_multitexture"])
            .with_limit(Limit::MaxTextureUnits, 2);

        Capabilities::probe(&driver).unwrap()
    }

    #[test]
    fn fallback() {
        let mut material = Material::new("sky");
        material
            .create_technique()
            .create_pass()
            .create_texture_unit("sky.dds")
            .set_texture("sky.dds", TextureType::CubeMap);
        material.create_technique().create_pass();

        assert!(material.is_compilation_required());
        material.compile(&capabilities(), true);
        assert!(!material.is_compilation_required());

        assert_eq!(material.num_supported_techniques(), 1);
        assert!(!material.technique(0).unwrap().is_supported());
        assert!(material.technique(1).unwrap().is_supported());
        assert!(material.best_technique(0).unwrap().is_supported());

        material.technique_mut(1);
        assert!(material.is_compilation_required());
    }

    #[test]
    fn lod() {
        let mut material = Material::new("rock");
        material.create_technique().set_name("near");
        {
            let far = material.create_technique();
            far.set_name("far");
            far.set_lod_index(2);
        }
        {
            let other = material.create_technique();
            other.set_name("other");
            other.set_lod_index(2);
        }

        material.compile(&capabilities(), true);
        assert_eq!(material.best_technique(0).unwrap().name(), "near");
        assert_eq!(material.best_technique(1).unwrap().name(), "near");
        assert_eq!(material.best_technique(2).unwrap().name(), "far");
        assert_eq!(material.best_technique(5).unwrap().name(), "far");
        assert_eq!(
            material.best_technique_in_scheme("Shadow", 0).unwrap().name(),
            "near"
        );
    }

    #[test]
    fn removed_techniques_are_not_selected() {
        let mut material = Material::new("rock");
        material.create_technique().set_name("near");
        material.create_technique().set_name("far");

        material.compile(&capabilities(), true);
        assert_eq!(material.supported_techniques().count(), 2);

        material.remove_technique(0);
        assert!(material.is_compilation_required());
        assert_eq!(material.supported_techniques().count(), 0);
        assert!(material.best_technique(0).is_none());

        material.compile(&capabilities(), true);
        assert_eq!(material.best_technique(0).unwrap().name(), "far");

        material.remove_all_techniques();
        assert_eq!(material.supported_techniques().count(), 0);
        assert!(material.best_technique(0).is_none());
    }

    #[test]
    fn unsupported() {
        let mut material = Material::new("broken");
        material
            .create_technique()
            .create_pass()
            .create_texture_unit("volume.dds")
            .set_texture("volume.dds", TextureType::CubeMap);

        material.compile(&capabilities(), true);
        assert_eq!(material.num_supported_techniques(), 0);
        assert!(material.best_technique(0).is_none());
        assert!(!material.is_transparent());
    }
}
