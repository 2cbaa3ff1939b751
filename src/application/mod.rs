//! Application layer: registration, binding and invocation
//!
//! This layer turns domain values into handler calls.

pub mod engine;
pub mod error;
pub mod invoker;
pub mod registry;
pub mod result;

pub use engine::{Engine, Handler};
pub use error::{DispatchError, DispatchResult, HandlerError};
pub use invoker::{bind, Arguments, Trial};
pub use registry::{Descriptor, MethodBuilder, Param, ParamKind, Registry, RegistryBuilder};
pub use result::ExecutionResult;
