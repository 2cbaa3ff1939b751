//! Domain layer: tokens, arguments and typed values
//!
//! This layer is independent of handlers and registration (no I/O, no CLI).

pub mod arguments;
pub mod coercion;
pub mod error;
pub mod tokenizer;

pub use arguments::{resolve, ArgumentKey, ArgumentMap, ResolvedCommand};
pub use coercion::{coerce, parse_bool, FromValue, ParamType, Value};
pub use error::{DomainError, DomainResult};
pub use tokenizer::split;
