//! Keyword-level rules: token patterns the grammar already segments out
//! cleanly (`extern`, `->`), checked before the placement rules so their
//! fixes land first.

use ruff_text_size::TextRange;
use tree_sitter::Node;

use crate::ast::CaplNode;
use crate::model::{Issue, Severity, Transformation};
use crate::traits::TextRanged;

use super::{AstLintRule, RuleContext};

/// E001 `extern-keyword`: any occurrence of the token `extern` at
/// statement start.
pub struct ExternKeyword;

impl AstLintRule for ExternKeyword {
    const ID: &'static str = "E001";

    fn entrypoints() -> &'static [&'static str] {
        &["declaration"]
    }

    fn check(node: Node, ctx: &RuleContext) -> Vec<Issue> {
        let Some(keyword) = node.child_with_name("storage_class_specifier") else {
            return Vec::new();
        };
        if keyword.to_text(ctx.source) != Some("extern") {
            return Vec::new();
        }
        vec![Issue {
            rule_id: Self::ID,
            severity: Severity::Error,
            file: ctx.file_path.to_string(),
            primary_range: keyword.textrange(),
            message: "`extern` is not a permitted CAPL keyword".to_string(),
            auto_fixable: true,
            fix_hint: Some("remove the `extern` keyword".to_string()),
        }]
    }

    fn fix(ctx: &RuleContext, issues: &[Issue]) -> Vec<Transformation> {
        issues
            .iter()
            .map(|issue| {
                let range = issue.primary_range;
                let end = extend_past_trailing_whitespace(ctx.source, range);
                Transformation::deletion(range.start().into(), end, Self::ID)
            })
            .collect()
    }
}

/// Extend a deletion range past the whitespace immediately following the
/// token, so removing `extern` doesn't leave a double space behind.
fn extend_past_trailing_whitespace(source: &str, range: TextRange) -> usize {
    let mut end = usize::from(range.end());
    let bytes = source.as_bytes();
    while bytes.get(end).is_some_and(|b| *b == b' ' || *b == b'\t') {
        end += 1;
    }
    end
}

/// E008 `arrow-operator`: the token sequence `-` immediately followed by
/// `>` acting as member access. CAPL forbids pointers, so `->` never has
/// a legitimate pointer-dereference meaning here; it is always a slip for
/// `.`.
pub struct ArrowOperator;

impl AstLintRule for ArrowOperator {
    const ID: &'static str = "E008";

    fn entrypoints() -> &'static [&'static str] {
        &["field_expression"]
    }

    fn check(node: Node, ctx: &RuleContext) -> Vec<Issue> {
        let mut cursor = node.walk();
        let Some(operator) = node.children(&mut cursor).find(|c| c.to_text(ctx.source) == Some("->")) else {
            return Vec::new();
        };
        vec![Issue {
            rule_id: Self::ID,
            severity: Severity::Error,
            file: ctx.file_path.to_string(),
            primary_range: operator.textrange(),
            message: "`->` is not permitted; CAPL has no pointer dereference".to_string(),
            auto_fixable: true,
            fix_hint: Some("replace `->` with `.`".to_string()),
        }]
    }

    fn fix(_ctx: &RuleContext, issues: &[Issue]) -> Vec<Transformation> {
        issues
            .iter()
            .map(|issue| {
                Transformation::replacement(
                    issue.primary_range.start().into(),
                    issue.primary_range.end().into(),
                    ".".to_string(),
                    Self::ID,
                )
            })
            .collect()
    }
}
