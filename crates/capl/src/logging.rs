//! Logging setup: `log` facade + `fern` dispatch, configured exactly once
//! by the binary. The core crates only ever call `log::debug!`/
//! `log::warn!` and never touch this module.

use anyhow::Result;
use colored::Colorize;
use log::Level;

#[derive(Debug, Default, PartialOrd, Ord, PartialEq, Eq, Copy, Clone)]
pub enum LogLevel {
    /// No output at all.
    Silent,
    /// Only the report itself, no decorative logging.
    Quiet,
    #[default]
    Default,
    Verbose,
}

impl LogLevel {
    const fn level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Default => log::LevelFilter::Info,
            LogLevel::Verbose => log::LevelFilter::Debug,
            LogLevel::Quiet | LogLevel::Silent => log::LevelFilter::Off,
        }
    }
}

pub fn set_up_logging(level: LogLevel) -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| match record.level() {
            Level::Error => out.finish(format_args!("{}{} {}", "error".red().bold(), ":".bold(), message)),
            Level::Warn => out.finish(format_args!("{}{} {}", "warning".yellow().bold(), ":".bold(), message)),
            Level::Info | Level::Debug | Level::Trace => {
                out.finish(format_args!("[{}][{}] {}", record.target(), record.level(), message));
            }
        })
        .level(level.level_filter())
        .level_for("globset", log::LevelFilter::Warn)
        .level_for("ignore", log::LevelFilter::Warn)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering() {
        assert!(LogLevel::Default > LogLevel::Silent);
        assert!(LogLevel::Verbose > LogLevel::Default);
        assert!(LogLevel::Quiet > LogLevel::Silent);
    }
}
