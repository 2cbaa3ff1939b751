//! Subcommand execution for the `cmdlet` binary.

use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::{Engine, Handler};
use crate::cli::args::{Cli, Commands};
use crate::cli::demo::DemoHandler;
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::Settings;
use crate::domain::{resolve, split};

pub fn execute_command(cli: &Cli, settings: &Settings) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Exec { lines }) => _exec(lines, settings),
        Some(Commands::Tokens { line }) => _tokens(line),
        Some(Commands::Parse { line }) => _parse(line),
        Some(Commands::List) => _list(),
        Some(Commands::Config) => _config(settings),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

#[instrument(skip(settings))]
fn _exec(lines: &[String], settings: &Settings) -> CliResult<()> {
    let engine = Engine::<DemoHandler>::create();
    for line in lines {
        match engine.execute(line).into_result() {
            Ok(Some(value)) => output::info(&value),
            Ok(None) if settings.show_unit => output::info("(no value)"),
            Ok(None) => {}
            Err(e) => {
                debug!("{} failed: {}", line, e.kind());
                return Err(e.into());
            }
        }
    }
    Ok(())
}

#[instrument]
fn _tokens(line: &str) -> CliResult<()> {
    for token in split(line) {
        output::info(&format!("{:?}", token));
    }
    Ok(())
}

#[instrument]
fn _parse(line: &str) -> CliResult<()> {
    let resolved = resolve(split(line)).map_err(|e| CliError::InvalidArgs(e.to_string()))?;
    let entries = resolved.arguments.sorted();

    output::header(&format!(
        "{} [{}]",
        resolved.name,
        entries.iter().map(|(key, _)| key).join(", ")
    ));
    for (key, value) in entries {
        output::detail(&format!("{} = {:?}", key, value));
    }
    Ok(())
}

fn _list() -> CliResult<()> {
    let engine = Engine::<DemoHandler>::create();
    output::info(&command_tree(&engine));
    Ok(())
}

fn _config(settings: &Settings) -> CliResult<()> {
    output::info(&settings.to_toml()?);
    Ok(())
}

/// Registered commands grouped by display name, overloads in trial order.
pub fn command_tree<H: Handler>(engine: &Engine<H>) -> Tree<String> {
    let registry = engine.registry();
    let mut root = Tree::new(engine.handler_type().to_string());

    for name in registry.names() {
        let mut command = Tree::new(name.to_string());
        for descriptor in registry.candidates(name) {
            let mut overload = Tree::new(format!("#{} {}", descriptor.index(), descriptor.method()));
            for param in descriptor.params() {
                overload.push(Tree::new(param.to_string()));
            }
            command.push(overload);
        }
        root.push(command);
    }
    root
}
