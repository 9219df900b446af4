//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `arolink`.
#[derive(Debug, Parser)]
#[command(name = "arolink", version, about = "Link convention-organized module trees")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan the project, resolve all declarations, and emit linkage
    /// artifacts into `gen/`.
    Link {
        /// Project root containing `src/` and `gen/`.
        #[arg(long, default_value = ".")]
        project: PathBuf,
    },
    /// Scan and resolve without writing artifacts.
    Check {
        /// Project root containing `src/`.
        #[arg(long, default_value = ".")]
        project: PathBuf,
    },
}
