//! `capl_formatter`: the five-phase formatter engine (C7) and its
//! structural rules (C8). Depends on `capl_linter` for the parser
//! façade and the `Transformation`/`apply_transformations` machinery, so
//! the linter's fixes and the formatter's rewrites share one
//! byte-offset model and the same no-overlap invariant.

pub mod engine;
pub mod phases;
pub mod rules;

use capl_linter::settings::Settings;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("failed to parse {file} while formatting")]
    ParseFailed {
        file: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Result of `format(file_path, bytes, config)`. In check-only mode the
/// caller discards `new_bytes` and looks only at `changed`.
#[derive(Debug, Clone)]
pub struct FormatReport {
    pub new_bytes: String,
    pub changed: bool,
    pub violations: Vec<String>,
}

/// Run the five-phase formatter over `source` and return the formatted
/// buffer plus whether anything changed.
pub fn format(file_path: &str, source: &str, settings: &Settings) -> Result<FormatReport, FormatError> {
    let new_bytes = engine::run(file_path, source, settings)?;
    let changed = new_bytes != source;
    let violations = if changed {
        vec![format!("{file_path}: formatting differs from the expected layout")]
    } else {
        Vec::new()
    };

    Ok(FormatReport {
        new_bytes,
        changed,
        violations,
    })
}

/// Check-only variant: never returns the reformatted bytes, only
/// whether the file would change and why.
pub fn format_check(file_path: &str, source: &str, settings: &Settings) -> Result<FormatReport, FormatError> {
    let mut report = format(file_path, source, settings)?;
    report.new_bytes.clear();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_collapses_one_line_block_and_indents() {
        let source = "void f() { int a; a = 1; }\n";
        let settings = Settings::default();
        let report = format("f.can", source, &settings).unwrap();
        assert!(report.changed);
        assert!(report.new_bytes.contains("void f() {\n"));
        assert!(report.new_bytes.contains("  int a;\n"));
        assert!(report.new_bytes.contains("  a = 1;\n"));
        assert!(report.new_bytes.trim_end().ends_with('}'));
    }

    #[test]
    fn format_is_idempotent_on_a_simple_function() {
        let source = "void f() { int a; a = 1; }\n";
        let settings = Settings::default();
        let once = format("f.can", source, &settings).unwrap();
        let twice = format("f.can", &once.new_bytes, &settings).unwrap();
        assert_eq!(once.new_bytes, twice.new_bytes);
        assert!(!twice.changed);
    }

    #[test]
    fn format_normalizes_arrow_free_quote_style() {
        let source = "void f() { write('multi char'); }\n";
        let settings = Settings::default();
        let report = format("f.can", source, &settings).unwrap();
        assert!(report.new_bytes.contains("\"multi char\""));
    }
}
