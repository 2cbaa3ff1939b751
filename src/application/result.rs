//! Success-or-error envelope returned by the engine.

use std::fmt;

use crate::application::error::{DispatchError, DispatchResult};
use crate::domain::Value;

/// Outcome of executing one command line.
///
/// Holds either the handler's return value (absent for a void-like call) or
/// the error, never both.
#[derive(Debug)]
pub struct ExecutionResult {
    outcome: DispatchResult<Option<Value>>,
}

impl ExecutionResult {
    pub fn success(value: Option<Value>) -> Self {
        Self { outcome: Ok(value) }
    }

    pub fn failure(error: DispatchError) -> Self {
        Self {
            outcome: Err(error),
        }
    }

    /// True when no error occurred.
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Returned value; `None` on failure or for a void-like call.
    pub fn value(&self) -> Option<&Value> {
        self.outcome.as_ref().ok().and_then(Option::as_ref)
    }

    pub fn error(&self) -> Option<&DispatchError> {
        self.outcome.as_ref().err()
    }

    pub fn into_result(self) -> DispatchResult<Option<Value>> {
        self.outcome
    }
}

impl From<DispatchError> for ExecutionResult {
    fn from(error: DispatchError) -> Self {
        Self::failure(error)
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(Some(value)) => write!(f, "{}", value),
            Ok(None) => f.write_str("(no value)"),
            Err(e) => write!(f, "{}", e),
        }
    }
}
