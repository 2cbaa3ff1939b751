//! Binder/invoker: overload trial over same-named descriptors.

use tracing::{debug, trace};

use crate::application::error::DispatchError;
use crate::application::registry::{Param, ParamKind, Registry};
use crate::application::result::ExecutionResult;
use crate::domain::{coerce, ArgumentMap, DomainError, DomainResult, FromValue, Value};

/// Typed argument list handed to a callable, one value per declared parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<Value>,
}

impl Arguments {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Typed value of parameter `index`.
    pub fn get<T: FromValue>(&self, index: usize) -> DomainResult<T> {
        self.values
            .get(index)
            .and_then(T::from_value)
            .ok_or(DomainError::ArgumentAccess {
                index,
                expected: T::TYPE,
            })
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        Self { values }
    }
}

/// Outcome of binding one candidate's parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Trial {
    /// Every parameter has a value
    Bound(Arguments),
    /// The signature cannot be invoked from a command line at all
    SignatureRejected,
    /// A required parameter is missing or not convertible
    CoercionFailed { parameter: String },
}

/// Build the argument list for `params` from `arguments`.
///
/// Optional parameters fall back to their default. A required parameter
/// reads the positional slot with its own index; when that slot is missing
/// or unconvertible the whole candidate fails, so later positions never shift.
pub fn bind(params: &[Param], arguments: &ArgumentMap) -> Trial {
    if let Some(param) = params.iter().find(|p| p.is_by_ref()) {
        trace!("parameter {} is by-reference", param.name());
        return Trial::SignatureRejected;
    }

    let mut values = Vec::with_capacity(params.len());
    for (index, param) in params.iter().enumerate() {
        match param.kind() {
            ParamKind::Optional { default } => {
                let supplied = arguments
                    .named(param.key())
                    .and_then(|raw| coerce(param.ty(), raw).ok());
                if supplied.is_none() {
                    trace!("{} takes default {:?}", param.name(), default);
                }
                values.push(supplied.unwrap_or_else(|| default.clone()));
            }
            ParamKind::Required => {
                let bound = arguments
                    .positional(index)
                    .map(|raw| coerce(param.ty(), raw));
                match bound {
                    Some(Ok(value)) => values.push(value),
                    Some(Err(e)) => {
                        trace!("{}: {}", param.name(), e);
                        return Trial::CoercionFailed {
                            parameter: param.name().to_string(),
                        };
                    }
                    None => {
                        trace!("{}: no positional argument #{}", param.name(), index);
                        return Trial::CoercionFailed {
                            parameter: param.name().to_string(),
                        };
                    }
                }
            }
            ParamKind::ByRef => return Trial::SignatureRejected,
        }
    }

    Trial::Bound(Arguments::from(values))
}

/// Try every descriptor named `command` in registry order and invoke the
/// first one that binds.
pub fn dispatch<H>(
    registry: &Registry<H>,
    handler: &H,
    handler_type: &str,
    command: &str,
    arguments: &ArgumentMap,
) -> ExecutionResult {
    let mut signature_not_matched = false;

    for descriptor in registry.candidates(command) {
        match bind(descriptor.params(), arguments) {
            Trial::SignatureRejected => {
                debug!("skip {}: unsupported signature", descriptor.method());
            }
            Trial::CoercionFailed { parameter } => {
                debug!(
                    "skip {} (#{}): cannot bind {}",
                    descriptor.method(),
                    descriptor.index(),
                    parameter
                );
                signature_not_matched = true;
            }
            Trial::Bound(bound) => {
                debug!("invoke {} (#{})", descriptor.method(), descriptor.index());
                return match descriptor.call(handler, &bound) {
                    Ok(value) => ExecutionResult::success(value),
                    Err(source) => ExecutionResult::failure(DispatchError::Execution {
                        command: command.to_string(),
                        source,
                    }),
                };
            }
        }
    }

    let error = if signature_not_matched {
        DispatchError::ArgumentMismatch {
            command: command.to_string(),
        }
    } else {
        DispatchError::MethodNotFound {
            handler: handler_type.to_string(),
            command: command.to_string(),
        }
    };
    debug!("{}: {}", error.kind(), error);
    ExecutionResult::failure(error)
}
