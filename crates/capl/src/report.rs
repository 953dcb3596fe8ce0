//! Human/JSON/CI report rendering; the core only ever hands back
//! `Issue`/`FixReport`/`FormatReport` values, never formatted text.
//! Row/column numbers here are 1-based for user-facing output.

use std::path::Path;

use capl_linter::model::{Issue, Severity};
use capl_linter::ast::LineIndex;
use colored::Colorize;
use ruff_source_file::SourceFileBuilder;

use crate::cli::OutputFormat;
use crate::fs::relativize;

/// One issue rendered with 1-based line/column, ready for any of the
/// three output formats.
pub struct RenderedIssue<'a> {
    pub file: &'a str,
    pub line: usize,
    pub column: usize,
    pub rule_id: &'a str,
    pub severity: Severity,
    pub message: &'a str,
    pub auto_fixable: bool,
}

pub fn render_issues<'a>(issues: &'a [Issue], file_path: &str, source: &str) -> Vec<RenderedIssue<'a>> {
    let source_file = SourceFileBuilder::new(file_path, source).finish();
    let index = LineIndex::new(&source_file);
    issues
        .iter()
        .map(|issue| {
            let (row, col) = index.row_column(issue.primary_range.start());
            RenderedIssue {
                file: file_path,
                line: row + 1,
                column: col + 1,
                rule_id: issue.rule_id,
                severity: issue.severity,
                message: &issue.message,
                auto_fixable: issue.auto_fixable,
            }
        })
        .collect()
}

fn severity_color(severity: Severity, text: &str) -> colored::ColoredString {
    match severity {
        Severity::Error => text.red().bold(),
        Severity::Warning => text.yellow().bold(),
        Severity::Style => text.cyan().bold(),
    }
}

pub fn print_text(rendered: &[RenderedIssue], use_color: bool) {
    for issue in rendered {
        let location = format!("{}:{}:{}", relativize(Path::new(issue.file)), issue.line, issue.column);
        let severity = issue.severity.to_string();
        let tag = if use_color {
            severity_color(issue.severity, &severity).to_string()
        } else {
            severity
        };
        let fixable = if issue.auto_fixable { " [*]" } else { "" };
        println!("{location}: {tag} {} {}{fixable}", issue.rule_id, issue.message);
    }
}

pub fn print_ci(rendered: &[RenderedIssue]) {
    for issue in rendered {
        println!(
            "::{}::file={},line={},col={},title={}::{}",
            match issue.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Style => "notice",
            },
            relativize(Path::new(issue.file)),
            issue.line,
            issue.column,
            issue.rule_id,
            issue.message
        );
    }
}

#[derive(serde::Serialize)]
struct JsonIssue<'a> {
    file: &'a str,
    line: usize,
    column: usize,
    rule_id: &'a str,
    severity: &'a str,
    message: &'a str,
    fixable: bool,
}

pub fn print_json(rendered: &[RenderedIssue]) -> anyhow::Result<()> {
    let severity_str = |s: Severity| match s {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Style => "style",
    };
    let payload: Vec<JsonIssue> = rendered
        .iter()
        .map(|issue| JsonIssue {
            file: issue.file,
            line: issue.line,
            column: issue.column,
            rule_id: issue.rule_id,
            severity: severity_str(issue.severity),
            message: issue.message,
            fixable: issue.auto_fixable,
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

pub fn print_statistics(counts: &std::collections::BTreeMap<&'static str, usize>) {
    println!("{}", "Statistics:".bold());
    for (rule_id, count) in counts {
        println!("  {rule_id}: {count}");
    }
}

pub fn print_diff(file_path: &str, before: &str, after: &str) {
    let diff = similar::TextDiff::from_lines(before, after);
    println!("{}", format!("--- {file_path}").bold());
    println!("{}", format!("+++ {file_path}").bold());
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            similar::ChangeTag::Delete => "-".red(),
            similar::ChangeTag::Insert => "+".green(),
            similar::ChangeTag::Equal => " ".normal(),
        };
        print!("{sign}{change}");
    }
}

/// Pick the renderer for `format` and print `rendered`.
pub fn render(format: OutputFormat, rendered: &[RenderedIssue], use_color: bool) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print_text(rendered, use_color),
        OutputFormat::Json => print_json(rendered)?,
        OutputFormat::Ci => print_ci(rendered),
    }
    Ok(())
}
