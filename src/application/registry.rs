//! Command registry: the explicit registration table of a handler.
//!
//! A handler lists its invocable methods once, in order:
//!
//! ```
//! use cmdlet::application::{Param, Registry};
//! use cmdlet::domain::{ParamType, Value};
//!
//! struct Greeter;
//!
//! let registry = Registry::<Greeter>::build(|commands| {
//!     commands
//!         .mark("greet")
//!         .param(Param::required("who", ParamType::String))
//!         .param(Param::optional("loud", false).lookup("l"))
//!         .bind(|_, args| Ok(Some(Value::from(format!("hi {}", args.get::<String>(0)?)))));
//! });
//! assert_eq!(registry.candidates("GREET").count(), 1);
//! ```

use std::fmt;

use tracing::debug;

use crate::application::error::HandlerError;
use crate::application::invoker::Arguments;
use crate::domain::{ParamType, Value};

/// Callable behind a descriptor. Static methods ignore the handler.
pub type Callable<H> =
    Box<dyn Fn(&H, &Arguments) -> Result<Option<Value>, HandlerError> + Send + Sync>;

/// How a parameter receives its value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    /// Bound from the positional slot matching the parameter's index
    Required,
    /// Bound from a named flag, falling back to the default
    Optional { default: Value },
    /// Output parameter; a method declaring one cannot be invoked
    ByRef,
}

/// Declared parameter of a registered method.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    name: String,
    ty: ParamType,
    kind: ParamKind,
    lookup: Option<String>,
}

impl Param {
    pub fn required(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            kind: ParamKind::Required,
            lookup: None,
        }
    }

    /// Optional parameter; its type is the type of `default`.
    pub fn optional(name: impl Into<String>, default: impl Into<Value>) -> Self {
        let default = default.into();
        Self {
            name: name.into(),
            ty: default.param_type(),
            kind: ParamKind::Optional { default },
            lookup: None,
        }
    }

    pub fn by_ref(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            kind: ParamKind::ByRef,
            lookup: None,
        }
    }

    /// Flag name used to look the parameter up instead of its own name.
    pub fn lookup(mut self, name: impl Into<String>) -> Self {
        self.lookup = Some(name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> ParamType {
        self.ty
    }

    pub fn kind(&self) -> &ParamKind {
        &self.kind
    }

    pub fn is_by_ref(&self) -> bool {
        matches!(self.kind, ParamKind::ByRef)
    }

    /// Argument map name for an optional parameter: a non-blank lookup
    /// name, else the declared name.
    pub fn key(&self) -> &str {
        match &self.lookup {
            Some(lookup) if !lookup.trim().is_empty() => lookup,
            _ => &self.name,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParamKind::Required => write!(f, "{}: {}", self.name, self.ty),
            ParamKind::Optional { default } => write!(
                f,
                "-{} {}: {} = {:?}",
                self.key(),
                self.name,
                self.ty,
                default.to_string()
            ),
            ParamKind::ByRef => write!(f, "&{}: {}", self.name, self.ty),
        }
    }
}

/// Registered metadata for one invocable method.
pub struct Descriptor<H> {
    name: String,
    key: String,
    method: String,
    index: usize,
    params: Vec<Param>,
    callable: Callable<H>,
}

impl<H> Descriptor<H> {
    /// Display name commands are matched against.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared method name.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Discovery order within the registry.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub(crate) fn call(
        &self,
        handler: &H,
        arguments: &Arguments,
    ) -> Result<Option<Value>, HandlerError> {
        (self.callable)(handler, arguments)
    }
}

impl<H> fmt::Debug for Descriptor<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("index", &self.index)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Collects descriptors in registration order.
pub struct RegistryBuilder<H> {
    descriptors: Vec<Descriptor<H>>,
}

impl<H> Default for RegistryBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> RegistryBuilder<H> {
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    /// Start registering the method `method`.
    pub fn mark(&mut self, method: impl Into<String>) -> MethodBuilder<'_, H> {
        MethodBuilder {
            builder: self,
            method: method.into(),
            display: None,
            params: Vec::new(),
        }
    }

    pub fn build(self) -> Registry<H> {
        Registry {
            descriptors: self.descriptors,
        }
    }
}

/// One pending registration; nothing is recorded until [`MethodBuilder::bind`].
#[must_use = "a method is only registered once bound"]
pub struct MethodBuilder<'a, H> {
    builder: &'a mut RegistryBuilder<H>,
    method: String,
    display: Option<String>,
    params: Vec<Param>,
}

impl<H> MethodBuilder<'_, H> {
    /// Display name; blank means the method name.
    pub fn named(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn params(mut self, params: impl IntoIterator<Item = Param>) -> Self {
        self.params.extend(params);
        self
    }

    /// Attach the callable and record the descriptor.
    pub fn bind<F>(self, callable: F)
    where
        F: Fn(&H, &Arguments) -> Result<Option<Value>, HandlerError> + Send + Sync + 'static,
    {
        let name = match self.display {
            Some(display) if !display.trim().is_empty() => display,
            _ => self.method.clone(),
        };
        let index = self.builder.descriptors.len();
        debug!("register {} as '{}' (#{})", self.method, name, index);

        self.builder.descriptors.push(Descriptor {
            key: name.to_lowercase(),
            name,
            method: self.method,
            index,
            params: self.params,
            callable: Box::new(callable),
        });
    }
}

/// Ordered, read-only set of descriptors.
pub struct Registry<H> {
    descriptors: Vec<Descriptor<H>>,
}

impl<H> Registry<H> {
    /// Run a registration function once and freeze the result.
    pub fn build(register: impl FnOnce(&mut RegistryBuilder<H>)) -> Self {
        let mut builder = RegistryBuilder::new();
        register(&mut builder);
        builder.build()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Descriptor<H>> {
        self.descriptors.iter()
    }

    /// Descriptors whose name matches `command`, in registration order.
    pub fn candidates(&self, command: &str) -> impl Iterator<Item = &Descriptor<H>> + '_ {
        let key = command.to_lowercase();
        self.descriptors.iter().filter(move |d| d.key == key)
    }

    /// Distinct display names in first-registration order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for descriptor in &self.descriptors {
            if !names.iter().any(|n| n.to_lowercase() == descriptor.key) {
                names.push(&descriptor.name);
            }
        }
        names
    }
}

impl<H> fmt::Debug for Registry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.descriptors).finish()
    }
}
