//! `SwitchNormalizationRule`: each `case`/`default` label starts a new
//! line, and the statements that follow it (fall-through or not) are
//! each on their own line.

use capl_linter::ast::CaplNode;
use capl_linter::model::Transformation;
use tree_sitter::Node;

use super::{FormatContext, FormatRule};

pub struct SwitchNormalizationRule;

impl FormatRule for SwitchNormalizationRule {
    const NAME: &'static str = "switch-normalization";

    fn apply(ctx: &FormatContext) -> Vec<Transformation> {
        let mut out = Vec::new();
        let root = ctx.tree.root_node();
        for (node, _depth) in root.walk_from() {
            if node.kind() == "case_statement" {
                out.extend(normalize_case(node, ctx.source));
            }
        }
        out
    }
}

fn line_of(offset: usize, source: &str) -> usize {
    source[..offset].matches('\n').count()
}

fn normalize_case(case_node: Node, source: &str) -> Vec<Transformation> {
    let mut cursor = case_node.walk();
    let children: Vec<Node> = case_node.children(&mut cursor).collect();
    let Some(colon_idx) = children.iter().position(|c| c.kind() == ":") else {
        return Vec::new();
    };
    let colon = children[colon_idx];
    let body: Vec<Node> = children[colon_idx + 1..].to_vec();

    let mut out = Vec::new();
    if let Some(first) = body.first() {
        if line_of(colon.end_byte(), source) == line_of(first.start_byte(), source) {
            out.push(Transformation::insertion(
                colon.end_byte(),
                "\n".to_string(),
                SwitchNormalizationRule::NAME,
            ));
        }
    }
    for pair in body.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if line_of(a.end_byte(), source) == line_of(b.start_byte(), source) {
            out.push(Transformation::insertion(
                a.end_byte(),
                "\n".to_string(),
                SwitchNormalizationRule::NAME,
            ));
        }
    }
    out
}
