//! Application-level errors (dispatch failures)

use thiserror::Error;

/// Error raised by a handler body.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Every way a command line can fail to produce a value.
///
/// These never escape [`crate::application::Engine::execute`]; they are carried
/// inside an [`crate::application::ExecutionResult`].
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("command line is blank")]
    InvalidInput,

    #[error("command line has no tokens: {0:?}")]
    Format(String),

    #[error("method '{command}' not found on {handler}")]
    MethodNotFound { handler: String, command: String },

    #[error("no overload of '{command}' accepts the supplied arguments")]
    ArgumentMismatch { command: String },

    #[error("command '{command}' failed: {source}")]
    Execution {
        command: String,
        #[source]
        source: HandlerError,
    },
}

impl DispatchError {
    /// Short stable label, used in logs and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::InvalidInput => "invalid-input",
            DispatchError::Format(_) => "format",
            DispatchError::MethodNotFound { .. } => "method-not-found",
            DispatchError::ArgumentMismatch { .. } => "argument-mismatch",
            DispatchError::Execution { .. } => "execution",
        }
    }
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
