//! The `capl` binary: wires argument parsing, logging, configuration
//! resolution, and the two subcommands together.

mod check;
mod cli;
mod format;
mod fs;
mod logging;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use capl_workspace::Configuration;
use clap::Parser;

use cli::{Cli, SubCommands};

fn project_root(paths: &[PathBuf]) -> PathBuf {
    paths
        .first()
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."))
}

fn run(cli: Cli) -> Result<ExitCode> {
    let paths = match &cli.command {
        SubCommands::Check(args) => &args.paths,
        SubCommands::Format(args) => &args.paths,
    };
    let root = project_root(paths);

    let config = if cli.globals.isolated {
        Configuration::default()
    } else if let Some(path) = &cli.globals.config {
        Configuration::from_explicit_path(path)?
    } else {
        Configuration::discover(&root)?
    };
    let settings = config.to_settings()?;

    match cli.command {
        SubCommands::Check(args) => check::run(args, settings),
        SubCommands::Format(args) => format::run(args, settings),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = logging::set_up_logging(cli.globals.log_level()) {
        eprintln!("error: failed to set up logging: {err}");
        return ExitCode::from(2);
    }

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            log::error!("{err}");
            ExitCode::from(2)
        }
    }
}
