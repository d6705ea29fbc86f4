//! Defines the command-line arguments and subcommands for the texpack CLI.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "texpack",
    version,
    about = "Inspect parser packages and the configurations they merge into."
)]
pub struct TexpackArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the registered packages.
    Packages,
    /// Show what one package contributes.
    Show {
        /// The package name.
        #[arg(required = true)]
        name: String,
    },
    /// Build and configure a parser from a settings file and print the result.
    Resolve {
        /// Path to a YAML or JSON settings file.
        #[arg(required = true)]
        settings: PathBuf,
        /// Print the merged configuration as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show a line diff between the configurations two settings files produce.
    Diff {
        #[arg(required = true)]
        before: PathBuf,
        #[arg(required = true)]
        after: PathBuf,
    },
}
