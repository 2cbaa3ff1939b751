//! The dispatch engine: one handler instance, one registry, many command lines.

use std::any::type_name;

use tracing::{debug, instrument};

use crate::application::error::DispatchError;
use crate::application::invoker;
use crate::application::registry::{Registry, RegistryBuilder};
use crate::application::result::ExecutionResult;
use crate::domain::{resolve, split, ArgumentMap};

/// A type whose methods are exposed as commands.
pub trait Handler: Sized + 'static {
    /// List the invocable methods. Called once per engine.
    fn register(commands: &mut RegistryBuilder<Self>);

    /// Release held resources; called when the owning engine is dropped.
    fn release(&mut self) {}
}

/// Executes command lines against a handler.
///
/// The registry is built in [`Engine::new`] and read-only afterwards, so
/// `execute` only needs `&self`.
pub struct Engine<H: Handler> {
    handler: H,
    registry: Registry<H>,
}

impl<H: Handler> Engine<H> {
    pub fn new(handler: H) -> Self {
        let registry = Registry::build(H::register);
        debug!(
            "engine for {} with {} commands",
            type_name::<H>(),
            registry.len()
        );
        Self { handler, registry }
    }

    /// Engine over a default-constructed handler.
    pub fn create() -> Self
    where
        H: Default,
    {
        Self::new(H::default())
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn registry(&self) -> &Registry<H> {
        &self.registry
    }

    /// Fully qualified handler type name, as reported in not-found errors.
    pub fn handler_type(&self) -> &'static str {
        type_name::<H>()
    }

    /// Tokenize, resolve and dispatch one raw command line.
    #[instrument(level = "debug", skip(self))]
    pub fn execute(&self, command: &str) -> ExecutionResult {
        if command.trim().is_empty() {
            return DispatchError::InvalidInput.into();
        }

        let resolved = match resolve(split(command)) {
            Ok(resolved) => resolved,
            Err(e) => {
                debug!("{}", e);
                return DispatchError::Format(command.to_string()).into();
            }
        };
        debug!(
            "command '{}' with {} arguments",
            resolved.name,
            resolved.arguments.len()
        );

        self.dispatch(&resolved.name, &resolved.arguments)
    }

    /// Dispatch an already resolved command.
    pub fn dispatch(&self, command: &str, arguments: &ArgumentMap) -> ExecutionResult {
        invoker::dispatch(
            &self.registry,
            &self.handler,
            self.handler_type(),
            command,
            arguments,
        )
    }
}

impl<H: Handler + Default> Default for Engine<H> {
    fn default() -> Self {
        Self::create()
    }
}

impl<H: Handler> Drop for Engine<H> {
    fn drop(&mut self) {
        debug!("release {}", type_name::<H>());
        self.handler.release();
    }
}
