//! Argument parsing for the two commands this binary drives: `check`
//! and `format`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::logging::LogLevel;

#[derive(Debug, Parser)]
#[command(
    author,
    name = "capl",
    version,
    about = "A static analyzer, linter and formatter for CAPL (.can/.cin) source files"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    pub globals: GlobalArgs,
}

#[derive(Debug, Default, Clone, clap::Args)]
pub struct GlobalArgs {
    /// Path to an explicit `capl.toml`/`.capl.toml` configuration file.
    #[arg(long, global = true, help_heading = "Global options")]
    pub config: Option<PathBuf>,

    /// Ignore any configuration file and use built-in defaults.
    #[arg(long, global = true, conflicts_with = "config", help_heading = "Global options")]
    pub isolated: bool,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true, conflicts_with = "quiet", help_heading = "Log levels")]
    pub verbose: bool,

    /// Only print the report, suppressing decorative log output.
    #[arg(short, long, global = true, help_heading = "Log levels")]
    pub quiet: bool,
}

impl GlobalArgs {
    pub fn log_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Verbose
        } else if self.quiet {
            LogLevel::Quiet
        } else {
            LogLevel::Default
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum SubCommands {
    /// Analyze files and report lint issues, optionally
    /// applying auto-fixes.
    Check(CheckArgs),
    /// Check or rewrite files with the five-phase formatter.
    Format(FormatArgs),
}

#[derive(Debug, Clone, clap::Args)]
pub struct CheckArgs {
    /// Files or directories to analyze. Defaults to the current directory.
    pub paths: Vec<PathBuf>,

    /// Apply auto-fixes in place, iterating the C6 loop to convergence.
    #[arg(long)]
    pub fix: bool,

    /// Rule selectors to enable on top of the configured defaults
    /// (`E001`, `E0`, `ALL`); unmatched selectors are reported, not fatal.
    #[arg(long = "select")]
    pub select: Vec<String>,

    /// Rule ids to disable, overriding the configuration file.
    #[arg(long = "disable")]
    pub disable: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,

    /// Print per-rule violation counts after the report.
    #[arg(long)]
    pub statistics: bool,
}

#[derive(Debug, Clone, clap::Args)]
pub struct FormatArgs {
    /// Files or directories to format. Defaults to the current directory.
    pub paths: Vec<PathBuf>,

    /// Report which files would change without writing anything.
    #[arg(long)]
    pub check: bool,

    /// Print a unified diff instead of (or alongside) rewriting files.
    #[arg(long)]
    pub diff: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    /// Single-line-per-diagnostic form, easy to grep from a CI log.
    Ci,
}
