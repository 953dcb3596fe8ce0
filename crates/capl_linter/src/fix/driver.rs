//! C6: the iterative auto-fix loop. Each pass extracts
//! facts, runs the enabled rules, applies whatever fix transformations
//! they produce, and re-parses; the loop stops on a fixpoint, a lack of
//! textual progress, or the pass cap. The invariant that no rewrite may
//! introduce a new `ERROR` node is enforced per pass: a pass whose
//! aggregate transformations would regress parse quality is rejected,
//! the offending rule(s) are isolated by re-applying each rule's own
//! transformations alone, and those rules are disabled for the rest of
//! the session on this file before the loop retries.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::ast::count_error_nodes;
use crate::error::CoreError;
use crate::facts::extract_facts;
use crate::model::{apply_transformations, Issue, Transformation};
use crate::parser;
use crate::registry;
use crate::rules::{run_ast_rules, run_project_rules, RuleContext, AST_RULES};
use crate::settings::Settings;
use crate::store::SymbolStore;

/// Result of running the auto-fix loop to convergence (or the pass cap)
/// on one file, per the `lint_fix` external entry point.
#[derive(Debug, Clone)]
pub struct FixReport {
    pub new_bytes: String,
    pub remaining_issues: Vec<Issue>,
    pub applied_rule_ids: Vec<&'static str>,
    pub passes_used: usize,
    /// Rules disabled mid-run because their fix introduced a new `ERROR`
    /// node; surfaced so a caller can report it rather than silently
    /// losing the fix.
    pub rejected_rule_ids: Vec<&'static str>,
}

/// Run the C6 loop for `source`, bounded by `settings.max_passes`.
///
/// `store` is updated with the facts of each intermediate buffer as the
/// loop progresses, so facts are recomputed whenever a file's content
/// hash changes. `resolve_include` resolves
/// an include's literal target text against the project's search path,
/// the same closure `analyze` takes.
pub fn lint_fix(
    file_path: &str,
    source: &str,
    settings: &Settings,
    store: &mut SymbolStore,
    resolve_include: &dyn Fn(&str, &str) -> Option<String>,
) -> Result<FixReport, CoreError> {
    let mut current = source.to_string();
    let mut disabled_for_file: FxHashSet<&'static str> = FxHashSet::default();
    let mut applied_rule_ids: Vec<&'static str> = Vec::new();
    let mut rejected_rule_ids: Vec<&'static str> = Vec::new();
    let mut last_issues: Vec<Issue> = Vec::new();
    let mut passes_used = 0;

    for pass in 0..settings.max_passes.max(1) {
        passes_used = pass + 1;

        let parsed = parser::parse(&current).map_err(|source| CoreError::ParseFailed {
            file: file_path.to_string(),
            source,
        })?;
        let pre_error_count = count_error_nodes(parsed.tree.root_node());

        let facts = extract_facts(parsed.tree.root_node(), &current, file_path);
        store.update_file(file_path, &current, facts.clone());

        let active_rules: Vec<&str> = registry::ordered_rules()
            .iter()
            .map(|r| r.id)
            .filter(|id| settings.rule_enabled(id) && !disabled_for_file.contains(id))
            .collect();

        let ctx = RuleContext {
            file_path,
            source: &current,
            tree: &parsed.tree,
            facts: &facts,
            store,
            settings,
            resolve_include,
        };

        let mut issues = run_ast_rules(&ctx, &active_rules);
        issues.extend(run_project_rules(&ctx, &active_rules));
        last_issues = issues.clone();

        let mut by_rule: FxHashMap<&'static str, Vec<Issue>> = FxHashMap::default();
        for issue in issues
            .iter()
            .filter(|i| i.auto_fixable && active_rules.contains(&i.rule_id))
        {
            by_rule.entry(issue.rule_id).or_default().push(issue.clone());
        }
        if by_rule.is_empty() {
            break;
        }

        let transformations: Vec<Transformation> = AST_RULES
            .iter()
            .filter_map(|kind| by_rule.get(kind.id()).map(|issues| kind.fix(&ctx, issues)))
            .flatten()
            .collect();
        if transformations.is_empty() {
            break;
        }

        let candidate = apply_transformations(&current, transformations.clone());
        if candidate == current {
            // No textual progress: stop even before the pass cap.
            break;
        }

        let post_parsed = parser::parse(&candidate).map_err(|source| CoreError::ParseFailed {
            file: file_path.to_string(),
            source,
        })?;
        let post_error_count = count_error_nodes(post_parsed.tree.root_node());

        if post_error_count > pre_error_count {
            let offenders = isolate_offending_rules(&current, &transformations, pre_error_count);
            let offenders = if offenders.is_empty() {
                // Couldn't isolate a single culprit (only visible in
                // combination); disable everything this pass touched so
                // the loop still terminates.
                by_rule.keys().copied().collect()
            } else {
                offenders
            };
            for id in &offenders {
                log::warn!(
                    "{file_path}: rule `{id}` introduced a new parse error on pass {pass}; disabling it for the rest of this file's session"
                );
                disabled_for_file.insert(id);
                rejected_rule_ids.push(id);
            }
            continue;
        }

        applied_rule_ids.extend(by_rule.keys().copied());
        current = candidate;
    }

    applied_rule_ids.sort_unstable();
    applied_rule_ids.dedup();
    rejected_rule_ids.sort_unstable();
    rejected_rule_ids.dedup();

    Ok(FixReport {
        new_bytes: current,
        remaining_issues: last_issues,
        applied_rule_ids,
        passes_used,
        rejected_rule_ids,
    })
}

/// Re-apply each rule's own transformations from this pass in isolation
/// and re-parse, to find which one(s) actually introduced the new
/// `ERROR` node(s) rather than blaming the whole pass.
fn isolate_offending_rules(
    source: &str,
    transformations: &[Transformation],
    pre_error_count: usize,
) -> Vec<&'static str> {
    let mut by_rule: FxHashMap<&'static str, Vec<Transformation>> = FxHashMap::default();
    for t in transformations {
        by_rule.entry(t.originating_rule_id).or_default().push(t.clone());
    }

    let mut offenders = Vec::new();
    for (rule_id, group) in by_rule {
        let candidate = apply_transformations(source, group);
        let Ok(parsed) = parser::parse(&candidate) else {
            offenders.push(rule_id);
            continue;
        };
        if count_error_nodes(parsed.tree.root_node()) > pre_error_count {
            offenders.push(rule_id);
        }
    }
    offenders.sort_unstable();
    offenders
}

/// Verify `lint_fix(lint_fix(source).new_bytes) == lint_fix(source).new_bytes`.
/// Exposed so integration tests can assert it fixture-by-fixture without
/// duplicating the two-call dance.
pub fn is_idempotent(
    file_path: &str,
    source: &str,
    settings: &Settings,
    resolve_include: &dyn Fn(&str, &str) -> Option<String>,
) -> Result<bool, CoreError> {
    let mut store_a = SymbolStore::new();
    let once = lint_fix(file_path, source, settings, &mut store_a, resolve_include)?;
    let mut store_b = SymbolStore::new();
    let twice = lint_fix(file_path, &once.new_bytes, settings, &mut store_b, resolve_include)?;
    Ok(twice.new_bytes == once.new_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_includes(_: &str, _: &str) -> Option<String> {
        None
    }

    #[test]
    fn arrow_operator_fix_converges_and_is_idempotent() {
        let source = "void f() { x->y = 1; }\n";
        let settings = Settings::default();
        let mut store = SymbolStore::new();
        let report = lint_fix("f.can", source, &settings, &mut store, &no_includes).unwrap();
        assert_eq!(report.new_bytes, "void f() { x.y = 1; }\n");
        assert!(!report.remaining_issues.iter().any(|i| i.rule_id == "E008"));

        assert!(is_idempotent("f.can", source, &settings, &no_includes).unwrap());
    }

    #[test]
    fn variable_outside_block_moves_into_variables_block() {
        let source = "variables {\n  int a;\n}\nint b;\non start {\n  b = a;\n}\n";
        let settings = Settings::default();
        let mut store = SymbolStore::new();
        let report = lint_fix("f.can", source, &settings, &mut store, &no_includes).unwrap();

        let variables_close = report.new_bytes.find('}').expect("variables block closes");
        let on_start = report.new_bytes.find("on start").expect("on start handler kept");
        assert!(
            report.new_bytes[..variables_close].contains("int b;"),
            "expected `int b;` moved inside the variables block, got: {}",
            report.new_bytes
        );
        assert!(variables_close < on_start);
        assert!(!report.remaining_issues.iter().any(|i| i.rule_id == "E006"));
        assert!(is_idempotent("f.can", source, &settings, &no_includes).unwrap());
    }
}
