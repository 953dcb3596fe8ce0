//! `SpacingRule`: exactly one space around binary/assignment
//! operators, one space after `,`/`;` when not line-terminal, one space
//! after control keywords before `(`, and no space between a function
//! name and its argument list's `(`. Unary operators are judged from
//! their AST position (`unary_expression`/`pointer_expression`), never
//! from lexical guessing.

use capl_linter::ast::CaplNode;
use capl_linter::model::Transformation;
use capl_linter::traits::TextRanged;
use tree_sitter::Node;

use super::{FormatContext, FormatRule};

pub struct SpacingRule;

const CONTROL_KEYWORDS: &[&str] = &["if", "for", "while", "switch", "return"];

impl FormatRule for SpacingRule {
    const NAME: &'static str = "spacing";

    fn apply(ctx: &FormatContext) -> Vec<Transformation> {
        let mut out = Vec::new();
        let root = ctx.tree.root_node();
        out.extend(space_around_operator(root, ctx.source));
        for (node, _depth) in root.walk_from() {
            out.extend(space_around_operator(node, ctx.source));
            out.extend(space_after_punct(node, ctx.source));
            out.extend(space_before_call_parens(node, ctx.source));
            out.extend(space_after_control_keyword(node, ctx.source));
        }
        out
    }
}

/// Normalize the gap `[a_end, b_start)` to exactly `want` spaces, unless
/// it spans a newline (multi-line layout is the structural rules'/
/// indentation pass's concern, not spacing's).
fn normalize_gap(a_end: usize, b_start: usize, source: &str, want: &str, rule: &'static str) -> Option<Transformation> {
    if b_start < a_end {
        return None;
    }
    let gap = &source[a_end..b_start];
    if gap.contains('\n') {
        return None;
    }
    if gap == want {
        return None;
    }
    Some(Transformation::replacement(a_end, b_start, want.to_string(), rule))
}

fn space_around_operator(node: Node, source: &str) -> Vec<Transformation> {
    let kind = node.kind();
    if !matches!(
        kind,
        "binary_expression" | "assignment_expression" | "conditional_expression"
    ) {
        return Vec::new();
    }
    // In tree-sitter-c, these nodes expose `left`/`operator`/`right`
    // (or `condition`/`consequence`/`alternative`) fields; the operator
    // token sits as an unnamed child between the two operand children.
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    let Some(op_idx) = children.iter().position(|c| !c.is_named() && c.kind() != "(" && c.kind() != ")") else {
        return Vec::new();
    };
    let Some(left) = children.get(op_idx.wrapping_sub(1)) else {
        return Vec::new();
    };
    let Some(op) = children.get(op_idx) else {
        return Vec::new();
    };
    let Some(right) = children.get(op_idx + 1) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    if let Some(t) = normalize_gap(left.end_byte(), op.start_byte(), source, " ", SpacingRule::NAME) {
        out.push(t);
    }
    if let Some(t) = normalize_gap(op.end_byte(), right.start_byte(), source, " ", SpacingRule::NAME) {
        out.push(t);
    }
    out
}

fn space_after_punct(node: Node, source: &str) -> Vec<Transformation> {
    if !matches!(node.kind(), "," | ";") {
        return Vec::new();
    }
    let Some(next) = node.next_sibling() else {
        return Vec::new();
    };
    // A trailing `;` at statement end with nothing else on the line is
    // "line-terminal" and untouched.
    let gap_to_newline = source[node.end_byte()..].find('\n').unwrap_or(source.len() - node.end_byte());
    let rest_of_line = &source[node.end_byte()..node.end_byte() + gap_to_newline];
    if node.kind() == ";" && rest_of_line.trim().is_empty() {
        return Vec::new();
    }
    normalize_gap(node.end_byte(), next.start_byte(), source, " ", SpacingRule::NAME)
        .into_iter()
        .collect()
}

fn space_before_call_parens(node: Node, source: &str) -> Vec<Transformation> {
    if node.kind() != "call_expression" {
        return Vec::new();
    }
    let Some(function) = node.child_by_field_name("function") else {
        return Vec::new();
    };
    let Some(args) = node.child_by_field_name("arguments") else {
        return Vec::new();
    };
    normalize_gap(function.end_byte(), args.start_byte(), source, "", SpacingRule::NAME)
        .into_iter()
        .collect()
}

fn space_after_control_keyword(node: Node, source: &str) -> Vec<Transformation> {
    let kind = node.kind();
    if !matches!(
        kind,
        "if_statement" | "for_statement" | "while_statement" | "switch_statement" | "return_statement"
    ) {
        return Vec::new();
    }
    let mut cursor = node.walk();
    let Some(keyword) = node
        .children(&mut cursor)
        .find(|c| c.to_text(source).is_some_and(|t| CONTROL_KEYWORDS.contains(&t)))
    else {
        return Vec::new();
    };
    let Some(next) = keyword.next_sibling() else {
        return Vec::new();
    };
    if next.to_text(source) != Some("(") && next.kind() != "parenthesized_expression" {
        return Vec::new();
    }
    normalize_gap(keyword.end_byte(), next.start_byte(), source, " ", SpacingRule::NAME)
        .into_iter()
        .collect()
}
