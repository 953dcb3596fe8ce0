//! `BraceStyleRule`: `{` sits on the same line as its header, separated
//! by exactly one space, collapsing both Allman-style line breaks and
//! runs of extra horizontal space. `SpacingRule` deliberately leaves a
//! gap alone when it spans a newline; this rule is the one that closes
//! that gap for block headers.

use capl_linter::model::Transformation;
use capl_linter::ast::CaplNode;
use tree_sitter::Node;

use super::{FormatContext, FormatRule};

pub struct BraceStyleRule;

impl FormatRule for BraceStyleRule {
    const NAME: &'static str = "brace-style";

    fn apply(ctx: &FormatContext) -> Vec<Transformation> {
        let mut out = Vec::new();
        let root = ctx.tree.root_node();
        for (node, _depth) in root.walk_from() {
            if node.kind() == "compound_statement" {
                out.extend(normalize_header_gap(node, ctx.source));
            }
        }
        out
    }
}

fn normalize_header_gap(block: Node, source: &str) -> Vec<Transformation> {
    let Some(prev) = block.prev_sibling() else {
        return Vec::new();
    };
    let gap_start = prev.end_byte();
    let gap_end = block.start_byte();
    if gap_end <= gap_start {
        return Vec::new();
    }
    let gap = &source[gap_start..gap_end];
    if gap == " " {
        return Vec::new();
    }
    vec![Transformation::replacement(
        gap_start,
        gap_end,
        " ".to_string(),
        BraceStyleRule::NAME,
    )]
}
