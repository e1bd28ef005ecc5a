//! GPU programs, their constant parameters and the auto constants resolved
//! from engine-tracked state.

pub mod auto;
pub mod backend;
pub mod data_source;
pub mod parameters;

pub use self::auto::{AutoConstantData, AutoConstantEntry, AutoConstantType};
pub use self::backend::{ArbProgramBackend, GlslBackend, GpuProgramBackend};
pub use self::data_source::AutoParamDataSource;
pub use self::parameters::{
    FloatConstantEntry, GpuNamedConstants, GpuProgramParameters, GpuProgramParametersPtr,
    IntConstantEntry,
};

use std::sync::Arc;

use crate::errors::*;
use crate::utils::hash::FastHashMap;
use crate::video::capabilities::Capabilities;
use crate::video::driver::{self, Driver};
use crate::video::types::GpuProgramType;

/// A vertex, fragment or geometry program loaded into the driver.
#[derive(Debug)]
pub struct GpuProgram {
    name: String,
    ty: GpuProgramType,
    syntax: String,
    source: String,
    id: u32,
    compile_error: bool,
    backend: Box<dyn GpuProgramBackend>,
    driver: Arc<dyn Driver>,
}

impl GpuProgram {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn program_type(&self) -> GpuProgramType {
        self.ty
    }

    #[inline]
    pub fn syntax(&self) -> &str {
        &self.syntax
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn has_compile_error(&self) -> bool {
        self.compile_error
    }

    /// Returns true if the program compiled and the hardware runs its syntax.
    pub fn is_supported(&self, caps: &Capabilities) -> bool {
        !self.compile_error && caps.is_syntax_supported(&self.syntax)
    }

    pub fn bind(&self) {
        self.backend.bind(self.driver.as_ref(), self.ty, self.id);
    }

    pub fn unbind(&self) {
        self.backend.unbind(self.driver.as_ref(), self.ty);
    }

    pub fn upload_parameters(&self, params: &GpuProgramParameters) {
        self.backend
            .upload_parameters(self.driver.as_ref(), self.ty, params);
    }
}

impl Drop for GpuProgram {
    fn drop(&mut self) {
        let kind = self.backend.object_kind();
        if let Err(err) = self.driver.delete(kind, self.id) {
            warn!("Failed to delete program '{}'. {}", self.name, err);
        }
    }
}

/// Creates, looks up and unloads GPU programs by name.
pub struct GpuProgramManager {
    driver: Arc<dyn Driver>,
    programs: FastHashMap<String, Arc<GpuProgram>>,
    auto_add_param_name: bool,
}

impl GpuProgramManager {
    pub fn new(driver: Arc<dyn Driver>, auto_add_param_name: bool) -> Self {
        GpuProgramManager {
            driver,
            programs: FastHashMap::default(),
            auto_add_param_name,
        }
    }

    /// Loads a program from source. Programs that failed to compile stay
    /// registered but are never supported.
    pub fn load<T: Into<String>>(
        &mut self,
        name: T,
        ty: GpuProgramType,
        syntax: &str,
        source: &str,
    ) -> Result<Arc<GpuProgram>> {
        let name = name.into();
        let backend = backend::new(syntax)?;
        let id = self.driver.create(backend.object_kind());

        self.driver.load_program(ty, id, source);
        let err = self.driver.program_error();
        driver::check(self.driver.as_ref())?;

        let program = Arc::new(GpuProgram {
            name: name.clone(),
            ty,
            syntax: syntax.to_owned(),
            source: source.to_owned(),
            id,
            compile_error: err.is_some(),
            backend,
            driver: self.driver.clone(),
        });

        self.programs.insert(name.clone(), program.clone());

        match err {
            Some(err) => {
                warn!(
                    "Failed to compile program '{}' at line {}, column {}. {}",
                    name, err.line, err.column, err.message
                );

                Err(Error::ProgramCompileFailure {
                    name,
                    line: err.line,
                    column: err.column,
                    message: err.message,
                })
            }
            None => Ok(program),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<GpuProgram>> {
        self.programs.get(name).cloned()
    }

    /// Creates an empty parameter set following the name policy of this manager.
    pub fn create_parameters(&self) -> GpuProgramParameters {
        let mut params = GpuProgramParameters::new();
        params.set_auto_add_param_name(self.auto_add_param_name);
        params
    }

    /// Removes the program with `name`. The driver object is deleted once the
    /// last user drops it.
    pub fn unload(&mut self, name: &str) -> bool {
        self.programs.remove(name).is_some()
    }

    pub fn unload_all(&mut self) {
        self.programs.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::video::driver::{Call, HeadlessDriver, ObjectKind, ProgramError};

    #[test]
    fn load() {
        let driver = Arc::new(HeadlessDriver::new());
        let mut programs = GpuProgramManager::new(driver.clone(), true);

        let vs = programs
            .load("vs", GpuProgramType::Vertex, "arbvp1", "!!ARBvp1.0 END")
            .unwrap();
        assert!(!vs.has_compile_error());
        assert!(programs.get("vs").is_some());

        assert!(programs
            .load("x", GpuProgramType::Vertex, "hlsl", "")
            .is_err());

        let id = vs.id();
        drop(vs);
        assert!(programs.unload("vs"));
        assert_eq!(
            driver.count_calls(|v| *v == Call::Delete(ObjectKind::ArbProgram, id)),
            1
        );
    }

    #[test]
    fn compile_failure() {
        let driver = Arc::new(HeadlessDriver::new());
        let mut programs = GpuProgramManager::new(driver.clone(), true);

        driver.set_program_error(Some(ProgramError {
            line: 3,
            column: 7,
            message: "unexpected token".to_owned(),
        }));

        match programs.load("fs", GpuProgramType::Fragment, "glsl", "void main() {") {
            Err(Error::ProgramCompileFailure { line, column, .. }) => {
                assert_eq!((line, column), (3, 7));
            }
            _ => panic!(),
        }

        assert!(programs.get("fs").unwrap().has_compile_error());
    }
}
