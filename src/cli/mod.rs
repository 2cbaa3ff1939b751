//! CLI layer: argument parsing, demo handler and command dispatch

pub mod args;
pub mod commands;
pub mod demo;
pub mod error;
pub mod output;

pub use args::{Cli, Commands};
pub use demo::DemoHandler;
pub use error::{CliError, CliResult};
