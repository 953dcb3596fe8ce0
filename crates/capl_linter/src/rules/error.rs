//! The one rule that always runs regardless of rule selection. When the
//! grammar has to repair a region (tree present, `ERROR` nodes present,
//! otherwise non-fatal), `SyntaxError` surfaces each `ERROR` region as a
//! style-severity issue so a caller always sees *where* it happened,
//! even with every E/W rule disabled.

use tree_sitter::Node;

use crate::model::{Issue, Severity, Transformation};
use crate::traits::TextRanged;

use super::{AstLintRule, RuleContext};

pub struct SyntaxError;

impl AstLintRule for SyntaxError {
    const ID: &'static str = "syntax-error";

    fn entrypoints() -> &'static [&'static str] {
        &["ERROR"]
    }

    fn check(node: Node, ctx: &RuleContext) -> Vec<Issue> {
        vec![Issue {
            rule_id: Self::ID,
            severity: Severity::Style,
            file: ctx.file_path.to_string(),
            primary_range: node.textrange(),
            message: "the grammar could not parse this region cleanly".to_string(),
            auto_fixable: false,
            fix_hint: None,
        }]
    }

    fn fix(_ctx: &RuleContext, _issues: &[Issue]) -> Vec<Transformation> {
        Vec::new()
    }
}
