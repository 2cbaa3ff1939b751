//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Run command lines against the demo handler
#[derive(Parser, Debug)]
#[command(name = "cmdlet")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global one
    #[arg(short, long, global = true, env = "CMDLET_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute command lines in order, stopping at the first failure
    Exec {
        /// Command lines, e.g. 'test -v 80 AAAA'
        #[arg(required = true, num_args = 1..)]
        lines: Vec<String>,
    },

    /// Show how a command line is tokenized
    Tokens {
        /// Command line
        line: String,
    },

    /// Show the command name and argument map of a command line
    Parse {
        /// Command line
        line: String,
    },

    /// Show registered commands and their parameters
    List,

    /// Show effective settings
    Config,

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
