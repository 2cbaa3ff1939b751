//! CLI-level errors (wraps dispatch and config errors)

use thiserror::Error;

use crate::application::DispatchError;
use crate::config::ConfigError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::Config(_) => crate::exitcode::CONFIG,
            CliError::Dispatch(e) => match e {
                DispatchError::InvalidInput
                | DispatchError::Format(_)
                | DispatchError::ArgumentMismatch { .. } => crate::exitcode::USAGE,
                DispatchError::MethodNotFound { .. } => crate::exitcode::UNAVAILABLE,
                DispatchError::Execution { .. } => crate::exitcode::SOFTWARE,
            },
        }
    }
}
