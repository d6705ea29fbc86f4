//! The texpack command-line interface.
//!
//! Every subcommand works against the built-in registry.

use std::path::Path;
use std::process;

use clap::Parser;

use crate::builtins::default_registry;
use crate::cli::args::{Command, TexpackArgs};
use crate::errors::{print_error, ConfigError, ConfigResult};
use crate::runtime::ConfigurationSummary;
use crate::settings::ParserSettings;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = TexpackArgs::parse();

    let result = match args.command {
        Command::Packages => handle_packages(),
        Command::Show { name } => handle_show(&name),
        Command::Resolve { settings, json } => handle_resolve(&settings, json),
        Command::Diff { before, after } => handle_diff(&before, &after),
    };

    if let Err(e) = result {
        print_error(e);
        process::exit(1);
    }
}

fn handle_packages() -> ConfigResult<()> {
    let registry = default_registry()?;
    for (name, entry) in registry.entries() {
        println!("{name:<12} parser={} priority={}", entry.parser(), entry.priority());
    }
    Ok(())
}

fn handle_show(name: &str) -> ConfigResult<()> {
    let entry = default_registry()?
        .lookup(name)
        .ok_or_else(|| ConfigError::UnknownPackage {
            name: name.to_string(),
        })?;
    output::print_entry(&entry);
    Ok(())
}

fn summarize(path: &Path) -> ConfigResult<ConfigurationSummary> {
    let settings = ParserSettings::from_path(path)?;
    let (parser, engine) = settings.resolve(default_registry()?)?;
    Ok(parser.summary().with_options(engine.options()))
}

fn handle_resolve(path: &Path, json: bool) -> ConfigResult<()> {
    let summary = summarize(path)?;
    output::print_summary(&summary, json).map_err(|e| ConfigError::Settings {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn handle_diff(before: &Path, after: &Path) -> ConfigResult<()> {
    let before = summarize(before)?;
    let after = summarize(after)?;
    output::print_summary_diff(&before, &after);
    Ok(())
}
