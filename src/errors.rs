//! Error taxonomy shared by the render system, the resource managers and the
//! material compiler.

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "Hardware doesn\'t support {}.", _0)]
    CapabilityMissing(String),
    #[fail(display = "Invalid configuration, {}.", _0)]
    InvalidConfiguration(String),
    #[fail(display = "Unsupported format, {}.", _0)]
    UnsupportedFormat(String),
    #[fail(display = "Framebuffer is incomplete, {}.", _0)]
    IncompleteFramebuffer(String),
    #[fail(
        display = "Failed to compile program \'{}\' at line {}, column {}: {}",
        name, line, column, message
    )]
    ProgramCompileFailure {
        name: String,
        line: i32,
        column: i32,
        message: String,
    },
    #[fail(display = "[GL] {}", _0)]
    Driver(String),
    #[fail(display = "{} is not implemented.", _0)]
    Unimplemented(&'static str),
    #[fail(display = "{} is invalid.", _0)]
    HandleInvalid(String),
    #[fail(display = "Main rendering context does not exist.")]
    MainContextMissing,
    #[fail(display = "Buffer is already locked.")]
    AlreadyLocked,
    #[fail(display = "Buffer is not locked.")]
    NotLocked,
    #[fail(display = "Out of bounds.")]
    OutOfBounds,
    #[fail(display = "Parameter \'{}\' is undefined.", _0)]
    NamedParameterUndefined(String),
    #[fail(display = "Failed to parse configuration, {}.", _0)]
    Config(String),
}

pub type Result<T> = ::std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Config(format!("{}", err))
    }
}
