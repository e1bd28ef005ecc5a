use std::fmt::Debug;

use crate::errors::*;
use crate::video::driver::{Cap, Command, Driver, ObjectKind};
use crate::video::types::GpuProgramType;

use super::parameters::GpuProgramParameters;

/// The way a family of programs is stored and bound by the driver.
pub trait GpuProgramBackend: Debug + Send + Sync {
    /// Kind of the driver object holding the program.
    fn object_kind(&self) -> ObjectKind;

    fn bind(&self, driver: &dyn Driver, ty: GpuProgramType, id: u32);

    fn unbind(&self, driver: &dyn Driver, ty: GpuProgramType);

    /// Uploads every set constant of `params`.
    fn upload_parameters(
        &self,
        driver: &dyn Driver,
        ty: GpuProgramType,
        params: &GpuProgramParameters,
    );
}

/// Creates the backend serving programs written with `syntax`.
pub fn new(syntax: &str) -> Result<Box<dyn GpuProgramBackend>> {
    match syntax {
        "arbvp1" | "arbfp1" => Ok(Box::new(ArbProgramBackend {})),
        "glsl" => Ok(Box::new(GlslBackend {})),
        _ => Err(Error::UnsupportedFormat(format!("program syntax '{}'", syntax))),
    }
}

/// Assembly programs, with constants uploaded as program local parameters.
#[derive(Debug)]
pub struct ArbProgramBackend {}

impl GpuProgramBackend for ArbProgramBackend {
    fn object_kind(&self) -> ObjectKind {
        ObjectKind::ArbProgram
    }

    fn bind(&self, driver: &dyn Driver, ty: GpuProgramType, id: u32) {
        driver.apply(Command::Enable(Cap::Program(ty)));
        driver.apply(Command::BindProgram(ty, id));
    }

    fn unbind(&self, driver: &dyn Driver, ty: GpuProgramType) {
        driver.apply(Command::BindProgram(ty, 0));
        driver.apply(Command::Disable(Cap::Program(ty)));
    }

    fn upload_parameters(
        &self,
        driver: &dyn Driver,
        ty: GpuProgramType,
        params: &GpuProgramParameters,
    ) {
        for (i, v) in params.float_constants() {
            driver.apply(Command::ProgramLocalParameter(ty, i, v.val));
        }
    }
}

/// Linked GLSL program objects, with constants uploaded as uniform slots.
#[derive(Debug)]
pub struct GlslBackend {}

impl GpuProgramBackend for GlslBackend {
    fn object_kind(&self) -> ObjectKind {
        ObjectKind::GlslProgram
    }

    fn bind(&self, driver: &dyn Driver, _: GpuProgramType, id: u32) {
        driver.apply(Command::UseProgram(id));
    }

    fn unbind(&self, driver: &dyn Driver, _: GpuProgramType) {
        driver.apply(Command::UseProgram(0));
    }

    fn upload_parameters(
        &self,
        driver: &dyn Driver,
        _: GpuProgramType,
        params: &GpuProgramParameters,
    ) {
        for (i, v) in params.float_constants() {
            driver.apply(Command::Uniform4f(i, v.val));
        }

        for (i, v) in params.int_constants() {
            driver.apply(Command::Uniform4i(i, v.val));
        }
    }
}
