//! Project-scoped semantic rules: E011 (undefined-symbol) and E012
//! (duplicate-function). Both read the whole symbol store rather than a
//! single node, since their verdict depends on facts from every file
//! reachable via the include graph.

use rustc_hash::FxHashSet;

use crate::facts::{ReferenceContext, BUILTIN_TYPES};
use crate::model::{Issue, Severity};

use super::{ProjectLintRule, RuleContext};

/// CAPL built-in functions a reference site may legitimately name without
/// a corresponding `visible_symbols` entry.
const BUILTIN_FUNCTIONS: &[&str] = &[
    "write", "output", "setTimer", "cancelTimer", "isTimerActive", "testStep", "testCase",
    "testWaitForTimeout", "testWaitForMessage", "getValue", "setValue", "runErrorMsg",
    "elCount", "strtol", "itoa",
];

/// E011 `undefined-symbol`: an identifier at a reference site whose name
/// is absent from `visible_symbols`, built-ins, and enum members.
pub struct UndefinedSymbol;

impl ProjectLintRule for UndefinedSymbol {
    const ID: &'static str = "E011";

    fn check(ctx: &RuleContext) -> Vec<Issue> {
        let visible = ctx.store.visible_symbols(ctx.file_path, ctx.resolve_include);
        let mut known: FxHashSet<&str> = visible.iter().map(|s| s.name.as_str()).collect();
        known.extend(ctx.facts.symbols.iter().map(|s| s.name.as_str()));
        known.extend(BUILTIN_TYPES.iter().copied());
        known.extend(BUILTIN_FUNCTIONS.iter().copied());

        ctx.facts
            .references
            .iter()
            .filter(|r| {
                !matches!(r.context_kind, ReferenceContext::MemberAccess)
                    && !known.contains(r.referenced_name.as_str())
            })
            .map(|r| Issue {
                rule_id: Self::ID,
                severity: Severity::Error,
                file: ctx.file_path.to_string(),
                primary_range: r.range,
                message: format!("`{}` is not declared in any visible scope", r.referenced_name),
                auto_fixable: false,
                fix_hint: None,
            })
            .collect()
    }
}

/// E012 `duplicate-function`: multiple definitions with the same name
/// across the project.
pub struct DuplicateFunction;

impl ProjectLintRule for DuplicateFunction {
    const ID: &'static str = "E012";

    fn check(ctx: &RuleContext) -> Vec<Issue> {
        ctx.store
            .duplicate_functions()
            .into_iter()
            .flat_map(|(name, defs)| {
                defs.into_iter()
                    .filter(move |s| s.defining_file == ctx.file_path)
                    .map(move |s| Issue {
                        rule_id: Self::ID,
                        severity: Severity::Error,
                        file: s.defining_file.clone(),
                        primary_range: s.range,
                        message: format!("`{name}` is defined more than once across the project"),
                        auto_fixable: false,
                        fix_hint: None,
                    })
            })
            .collect()
    }
}
