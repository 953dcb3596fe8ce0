//! Placement rules: where a declaration sits relative to the `variables`
//! block and the enclosing statement list. These run after the keyword
//! rules so E001's removal of `extern` can surface a
//! top-level declaration for E006 to pick up on the following pass,
//! rather than both firing in the same pass.

use ruff_text_size::TextRange;
use tree_sitter::Node;

use crate::ast::CaplNode;
use crate::facts::{DeclaredScope, SymbolKind};
use crate::fix::edits::{collect_remove_insert, MovedItem};
use crate::model::{Issue, Severity, Transformation};
use crate::traits::TextRanged;

use super::{AstLintRule, RuleContext};

fn matching_symbol<'a>(
    ctx: &'a RuleContext,
    node: Node,
    kind: SymbolKind,
    scope: DeclaredScope,
) -> Option<&'a crate::facts::Symbol> {
    ctx.facts
        .symbols
        .iter()
        .find(|s| s.range == node.textrange() && s.kind == kind && s.declared_in_scope == scope)
}

/// Find the nearest (first) `variables { ... }` block in the file, if any,
/// recognized the same positional way the fact extractor does.
pub(crate) fn find_variables_block<'a>(root: Node<'a>, source: &'a str) -> Option<Node<'a>> {
    let mut cursor = root.walk();
    root.children(&mut cursor).find(|child| {
        child
            .to_text(source)
            .map(|t| t.trim_start().starts_with("variables"))
            .unwrap_or(false)
            && child.child_with_name("compound_statement").is_some()
    })
}

fn variables_block_insertion_point(root: Node, source: &str) -> Option<usize> {
    let block = find_variables_block(root, source)?;
    let body = block.child_with_name("compound_statement")?;
    // insert just before the closing brace, preserving existing content order
    Some(usize::from(body.end_textsize()) - 1)
}

/// E002 `function-declaration`: a function symbol with `has_body=false`
/// at top level (a forward declaration, which CAPL forbids).
pub struct FunctionDeclaration;

impl AstLintRule for FunctionDeclaration {
    const ID: &'static str = "E002";

    fn entrypoints() -> &'static [&'static str] {
        &["declaration"]
    }

    fn check(node: Node, ctx: &RuleContext) -> Vec<Issue> {
        let Some(symbol) = matching_symbol(ctx, node, SymbolKind::Function, DeclaredScope::TopLevel) else {
            return Vec::new();
        };
        if symbol.has_body {
            return Vec::new();
        }
        vec![Issue {
            rule_id: Self::ID,
            severity: Severity::Error,
            file: ctx.file_path.to_string(),
            primary_range: node.textrange(),
            message: format!("forward declaration of `{}` is not permitted in CAPL", symbol.name),
            auto_fixable: true,
            fix_hint: Some("remove the forward declaration".to_string()),
        }]
    }

    fn fix(ctx: &RuleContext, issues: &[Issue]) -> Vec<Transformation> {
        issues
            .iter()
            .map(|issue| {
                let end = extend_through_trailing_newline(ctx.source, issue.primary_range);
                Transformation::deletion(issue.primary_range.start().into(), end, Self::ID)
            })
            .collect()
    }
}

fn extend_through_trailing_newline(source: &str, range: TextRange) -> usize {
    let mut end = usize::from(range.end());
    if source.as_bytes().get(end) == Some(&b'\n') {
        end += 1;
    }
    end
}

/// E006 `variable-outside-block`: a variable symbol with
/// `declared_in_scope=top_level`.
pub struct VariableOutsideBlock;

impl AstLintRule for VariableOutsideBlock {
    const ID: &'static str = "E006";

    fn entrypoints() -> &'static [&'static str] {
        &["declaration"]
    }

    fn check(node: Node, ctx: &RuleContext) -> Vec<Issue> {
        let Some(symbol) = matching_symbol(ctx, node, SymbolKind::Variable, DeclaredScope::TopLevel) else {
            return Vec::new();
        };
        vec![Issue {
            rule_id: Self::ID,
            severity: Severity::Error,
            file: ctx.file_path.to_string(),
            primary_range: node.textrange(),
            message: format!(
                "variable `{}` is declared outside the `variables` block",
                symbol.name
            ),
            auto_fixable: true,
            fix_hint: Some("move into the `variables` block".to_string()),
        }]
    }

    fn fix(ctx: &RuleContext, issues: &[Issue]) -> Vec<Transformation> {
        let Some(insert_at) = variables_block_insertion_point(ctx.tree.root_node(), ctx.source) else {
            // No `variables` block exists yet; without one to insert into,
            // this rule cannot safely act — it reports but does not fix.
            return Vec::new();
        };
        let items: Vec<MovedItem> = issues
            .iter()
            .map(|issue| MovedItem {
                range: issue.primary_range,
                text: &ctx.source[std::ops::Range::<usize>::from(issue.primary_range)],
            })
            .collect();
        collect_remove_insert(&items, insert_at, Self::ID)
    }
}

/// E007 `variable-mid-block`: a local variable fact with
/// `statements_before_in_block > 0`.
pub struct VariableMidBlock;

impl AstLintRule for VariableMidBlock {
    const ID: &'static str = "E007";

    fn entrypoints() -> &'static [&'static str] {
        &["declaration"]
    }

    fn check(node: Node, ctx: &RuleContext) -> Vec<Issue> {
        let Some(symbol) = matching_symbol(ctx, node, SymbolKind::Variable, DeclaredScope::LocalBlock) else {
            return Vec::new();
        };
        if symbol.statements_before_in_block == 0 {
            return Vec::new();
        }
        vec![Issue {
            rule_id: Self::ID,
            severity: Severity::Error,
            file: ctx.file_path.to_string(),
            primary_range: node.textrange(),
            message: format!(
                "local variable `{}` is declared after executable statements",
                symbol.name
            ),
            auto_fixable: true,
            fix_hint: Some("move to the start of the enclosing block".to_string()),
        }]
    }

    fn fix(ctx: &RuleContext, issues: &[Issue]) -> Vec<Transformation> {
        let mut transformations = Vec::new();
        for issue in issues {
            let Some(node) = enclosing_declaration(ctx, issue.primary_range) else {
                continue;
            };
            let Some(block) = node.parent() else { continue };
            let insert_at = usize::from(block.start_textsize()) + 1; // just after '{'
            let text = &ctx.source[std::ops::Range::<usize>::from(node.textrange())];
            let items = [MovedItem {
                range: node.textrange(),
                text,
            }];
            transformations.extend(collect_remove_insert(&items, insert_at, Self::ID));
        }
        transformations
    }
}

fn enclosing_declaration<'a>(ctx: &'a RuleContext, range: TextRange) -> Option<Node<'a>> {
    ctx.tree
        .root_node()
        .descendants()
        .find(|n| n.kind() == "declaration" && n.textrange() == range)
}
