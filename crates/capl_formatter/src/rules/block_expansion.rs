//! `BlockExpansionRule`: a brace-enclosed block with content
//! on the same line as `{` is split onto multiple lines; empty blocks
//! stay `{ }` on one line.

use capl_linter::ast::CaplNode;
use capl_linter::model::Transformation;
use tree_sitter::Node;

use super::{FormatContext, FormatRule};

pub struct BlockExpansionRule;

impl FormatRule for BlockExpansionRule {
    const NAME: &'static str = "block-expansion";

    fn apply(ctx: &FormatContext) -> Vec<Transformation> {
        let mut out = Vec::new();
        let root = ctx.tree.root_node();
        for (node, _depth) in root.walk_from() {
            if node.kind() == "compound_statement" {
                out.extend(expand_block(node, ctx.source));
            }
        }
        out
    }
}

fn line_of(offset: usize, source: &str) -> usize {
    source[..offset].matches('\n').count()
}

fn expand_block(block: Node, source: &str) -> Vec<Transformation> {
    let mut cursor = block.walk();
    let children: Vec<Node> = block.named_children(&mut cursor).collect();
    if children.is_empty() {
        return Vec::new();
    }

    let open_line = line_of(block.start_byte(), source);
    let close_line = line_of(block.end_byte() - 1, source);

    let mut out = Vec::new();

    // Splitting *between* same-line siblings is `StatementSplitRule`'s
    // job; this rule only owns the `{`/`}` boundary transitions so the
    // two rules never emit overlapping transformations in one pass.
    let first = children[0];
    if line_of(first.start_byte(), source) == open_line {
        out.push(Transformation::insertion(
            block.start_byte() + 1,
            "\n".to_string(),
            BlockExpansionRule::NAME,
        ));
    }

    let last = *children.last().unwrap();
    if line_of(last.end_byte(), source) == close_line {
        out.push(Transformation::insertion(
            block.end_byte() - 1,
            "\n".to_string(),
            BlockExpansionRule::NAME,
        ));
    }

    out
}
