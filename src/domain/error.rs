//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::coercion::ParamType;

/// Domain errors describe malformed input at the token and value level.
/// The application layer decides whether they are recoverable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("command line produced no tokens")]
    NoTokens,

    #[error("cannot convert {token:?} to {target}")]
    Coercion { target: ParamType, token: String },

    #[error("argument {index} is not a {expected}")]
    ArgumentAccess { index: usize, expected: ParamType },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
