//! The `check` subcommand: walks files, calls `capl_linter::analyze` (or
//! `lint_fix` under `--fix`), and renders the result. Parallel dispatch
//! across files via `rayon`'s `par_iter`; the core itself stays
//! single-threaded per file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use capl_linter::model::Severity;
use capl_linter::settings::Settings;
use capl_linter::SymbolStore;
use indicatif::{ParallelProgressIterator, ProgressStyle};
use itertools::Itertools;
use rayon::prelude::*;

use crate::cli::{CheckArgs, OutputFormat};
use crate::fs::{discover, relativize};
use crate::report;

/// One file's outcome: the (possibly fixed) bytes and the issues left
/// standing, plus whether anything was actually rewritten.
struct FileOutcome {
    path: PathBuf,
    source_after: String,
    issues: Vec<capl_linter::model::Issue>,
    rewritten: bool,
    applied_rule_ids: Vec<&'static str>,
}

fn resolve_include_noop(_including_file: &str, _target: &str) -> Option<String> {
    // Cross-file include resolution needs a project-wide file list; this
    // CLI runs each file independently for `check`, so includes never
    // resolve here. `visible_symbols`/E011 degrade gracefully to
    // "only this file's facts" rather than erroring.
    None
}

fn check_one(path: &Path, settings: &Settings, fix: bool) -> Result<FileOutcome> {
    let source = std::fs::read_to_string(path)?;
    let file_path = path.to_string_lossy().into_owned();
    let mut store = SymbolStore::new();

    if fix {
        let report = capl_linter::lint_fix(&file_path, &source, settings, &mut store, &resolve_include_noop)?;
        Ok(FileOutcome {
            path: path.to_path_buf(),
            source_after: report.new_bytes.clone(),
            issues: report.remaining_issues,
            rewritten: report.new_bytes != source,
            applied_rule_ids: report.applied_rule_ids,
        })
    } else {
        let report = capl_linter::analyze(&file_path, &source, settings, &mut store, &resolve_include_noop)?;
        Ok(FileOutcome {
            path: path.to_path_buf(),
            source_after: source,
            issues: report.issues,
            rewritten: false,
            applied_rule_ids: Vec::new(),
        })
    }
}

pub fn run(args: CheckArgs, mut settings: Settings) -> Result<ExitCode> {
    for id in &args.disable {
        settings.disabled_rules.insert(id.clone());
    }

    let roots = if args.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        args.paths.clone()
    };
    let files = discover(&roots)?;

    log::info!("checking {} file(s)", files.len());
    let progress_style = ProgressStyle::with_template("{bar:40} {pos}/{len}").unwrap_or_else(|_| ProgressStyle::default_bar());

    let outcomes: Vec<Result<FileOutcome>> = files
        .par_iter()
        .progress_with_style(progress_style)
        .map(|path| check_one(path, &settings, args.fix))
        .collect();

    let mut rendered_all = Vec::new();
    let mut had_error = false;
    let mut rule_counts: BTreeMap<&'static str, usize> = BTreeMap::new();

    for outcome in &outcomes {
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                log::error!("{err}");
                return Ok(ExitCode::from(2));
            }
        };

        if outcome.rewritten {
            std::fs::write(&outcome.path, &outcome.source_after)?;
            for id in &outcome.applied_rule_ids {
                log::info!("{}: applied fix for {id}", relativize(&outcome.path));
            }
        }

        for issue in &outcome.issues {
            *rule_counts.entry(issue.rule_id).or_default() += 1;
            if issue.severity == Severity::Error {
                had_error = true;
            }
        }
    }

    // Re-flatten for rendering once all files are processed, so output
    // order is deterministic regardless of which `rayon` worker finished
    // first.
    for outcome in outcomes.iter().flatten().sorted_by(|a, b| a.path.cmp(&b.path)) {
        let file_path = outcome.path.to_string_lossy().into_owned();
        let rendered = report::render_issues(&outcome.issues, &file_path, &outcome.source_after);
        rendered_all.extend(rendered);
    }

    report::render(args.output_format, &rendered_all, matches!(args.output_format, OutputFormat::Text))?;

    if args.statistics {
        report::print_statistics(&rule_counts);
    }

    if had_error {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
