//! Expose plain methods as named sub-commands.
//!
//! One raw command line goes in, one [`application::ExecutionResult`] comes out:
//!
//! ```
//! use cmdlet::application::{Engine, Handler, Param, RegistryBuilder};
//! use cmdlet::domain::{ParamType, Value};
//!
//! #[derive(Default)]
//! struct Shop;
//!
//! impl Handler for Shop {
//!     fn register(commands: &mut RegistryBuilder<Self>) {
//!         commands
//!             .mark("price")
//!             .param(Param::required("item", ParamType::String))
//!             .param(Param::optional("qty", 1u32).lookup("n"))
//!             .bind(|_, args| {
//!                 let qty: u32 = args.get(1)?;
//!                 Ok(Some(Value::from(format!("{} x {}", qty, args.get::<String>(0)?))))
//!             });
//!     }
//! }
//!
//! let engine = Engine::<Shop>::create();
//! let result = engine.execute("PRICE \"green tea\" -n 3");
//! assert!(result.is_success());
//! assert_eq!(result.to_string(), "3 x green tea");
//! ```
//!
//! Layers:
//! - [`domain`]: tokenizer, argument resolver, coercion table
//! - [`application`]: registry, binder/invoker, engine, result envelope
//! - [`cli`]: the `cmdlet` demo binary

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use application::{DispatchError, Engine, ExecutionResult, Handler};
