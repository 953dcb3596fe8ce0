//! `capl_linter`: the CORE of the analyzer — C1 parser façade, C2 fact
//! extractor, C3 symbol store, C4 rule framework, C5 lint rules, C6
//! auto-fix driver. No file-system walking, no config-file
//! parsing, no report rendering: those are `capl_workspace`/`capl`'s job.
//!
//! Exposes the `analyze` and `lint_fix` entry points; the third,
//! `format`, lives in `capl_formatter`, which depends on this
//! crate for the parser façade and the `Transformation`/`apply_transformations`
//! machinery so both components share one byte-offset rewrite model.

pub mod ast;
pub mod error;
pub mod facts;
pub mod fix;
pub mod model;
pub mod parser;
pub mod registry;
pub mod rule_selector;
pub mod rules;
pub mod settings;
pub mod store;
pub mod traits;

pub use error::CoreError;
pub use fix::{lint_fix, FixReport};
pub use model::{Issue, Severity, Transformation};
pub use settings::Settings;
pub use store::SymbolStore;

use ast::count_error_nodes;
use facts::FileFacts;
use rules::{run_ast_rules, run_project_rules, RuleContext};

/// Result of `analyze`: the facts extracted plus whatever issues the
/// enabled rules raised against them.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub issues: Vec<Issue>,
    pub symbols_added: usize,
    pub references_added: usize,
    /// `true` when the grammar had to repair local regions of this file;
    /// non-fatal.
    pub parse_degraded: bool,
}

/// `analyze(file_path, bytes, config) -> AnalysisReport`.
///
/// Parses `source`, extracts facts into `store`, and runs every rule the
/// active `settings` selection enables. `resolve_include` resolves an
/// `#include`'s literal target text against the caller's search path —
/// the core never touches the filesystem itself.
pub fn analyze(
    file_path: &str,
    source: &str,
    settings: &Settings,
    store: &mut SymbolStore,
    resolve_include: &dyn Fn(&str, &str) -> Option<String>,
) -> Result<AnalysisReport, CoreError> {
    let parsed = parser::parse(source).map_err(|source| CoreError::ParseFailed {
        file: file_path.to_string(),
        source,
    })?;

    let facts: FileFacts = facts::extract_facts(parsed.tree.root_node(), source, file_path);
    let symbols_added = facts.symbols.len();
    let references_added = facts.references.len();
    store.update_file(file_path, source, facts.clone());

    let active_rules: Vec<&str> = registry::ordered_rules()
        .iter()
        .map(|r| r.id)
        .filter(|id| settings.rule_enabled(id))
        .collect();

    let ctx = RuleContext {
        file_path,
        source,
        tree: &parsed.tree,
        facts: &facts,
        store,
        settings,
        resolve_include,
    };

    let mut issues = run_ast_rules(&ctx, &active_rules);
    issues.extend(run_project_rules(&ctx, &active_rules));
    issues.sort_by_key(|i| (i.primary_range.start(), i.rule_id));

    Ok(AnalysisReport {
        issues,
        symbols_added,
        references_added,
        parse_degraded: parsed.errors_present || count_error_nodes(parsed.tree.root_node()) > 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_includes(_: &str, _: &str) -> Option<String> {
        None
    }

    #[test]
    fn analyze_reports_facts_and_flags_mid_block_locals() {
        let source = "void f() { write(\"hi\"); int x; }\n";
        let settings = Settings::default();
        let mut store = SymbolStore::new();
        let report = analyze("f.can", source, &settings, &mut store, &no_includes).unwrap();
        assert!(report.symbols_added > 0);
        assert!(report.issues.iter().any(|i| i.rule_id == "E007"));
    }

    #[test]
    fn analyze_flags_arrow_operator() {
        let source = "void f() { x->y = 1; }\n";
        let settings = Settings::default();
        let mut store = SymbolStore::new();
        let report = analyze("f.can", source, &settings, &mut store, &no_includes).unwrap();
        assert!(report.issues.iter().any(|i| i.rule_id == "E008"));
    }

    #[test]
    fn analyze_does_not_flag_a_non_pointer_parameter_next_to_a_pointer_one() {
        let source = "void process(int count, char *name) { }\n";
        let settings = Settings::default();
        let mut store = SymbolStore::new();
        let report = analyze("f.can", source, &settings, &mut store, &no_includes).unwrap();
        let e009: Vec<_> = report.issues.iter().filter(|i| i.rule_id == "E009").collect();
        assert_eq!(e009.len(), 1, "expected only `char *name` flagged, got {e009:?}");
    }
}
