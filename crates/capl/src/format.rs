//! The `format` subcommand: runs the five-phase formatter over each
//! discovered file, either rewriting in place or, under `--check`/`--diff`,
//! only reporting.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use capl_formatter::{format, format_check};
use capl_linter::settings::Settings;
use rayon::prelude::*;

use crate::cli::FormatArgs;
use crate::fs::{discover, relativize};
use crate::report::print_diff;

struct FileOutcome {
    path: PathBuf,
    changed: bool,
    before: String,
    after: String,
}

fn format_one(path: &PathBuf, settings: &Settings, check_only: bool) -> Result<FileOutcome> {
    let source = std::fs::read_to_string(path)?;
    let file_path = path.to_string_lossy().into_owned();

    if check_only {
        let report = format_check(&file_path, &source, settings)?;
        Ok(FileOutcome {
            path: path.clone(),
            changed: report.changed,
            before: source,
            after: String::new(),
        })
    } else {
        let report = format(&file_path, &source, settings)?;
        Ok(FileOutcome {
            path: path.clone(),
            changed: report.changed,
            before: source,
            after: report.new_bytes,
        })
    }
}

pub fn run(args: FormatArgs, settings: Settings) -> Result<ExitCode> {
    let roots = if args.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        args.paths.clone()
    };
    let files = discover(&roots)?;
    log::info!("formatting {} file(s)", files.len());

    let check_only = args.check || args.diff;
    let outcomes: Vec<Result<FileOutcome>> = files.par_iter().map(|path| format_one(path, &settings, check_only)).collect();

    let mut any_changed = false;
    for outcome in outcomes {
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                log::error!("{err}");
                return Ok(ExitCode::from(2));
            }
        };

        if !outcome.changed {
            continue;
        }
        any_changed = true;
        let display_path = relativize(&outcome.path);

        if args.diff {
            let file_path = outcome.path.to_string_lossy().into_owned();
            let after = if outcome.after.is_empty() {
                format(&file_path, &outcome.before, &settings)?.new_bytes
            } else {
                outcome.after.clone()
            };
            print_diff(&display_path, &outcome.before, &after);
        } else if args.check {
            println!("would reformat {display_path}");
        } else {
            std::fs::write(&outcome.path, &outcome.after)?;
            log::info!("reformatted {display_path}");
        }
    }

    if check_only && any_changed {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
