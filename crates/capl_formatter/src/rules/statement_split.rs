//! `StatementSplitRule`: when two statements inside the same block share
//! a source line, each gets its own line. Struct and enum bodies use
//! `field_declaration_list`/`enumerator_list`, not `compound_statement`,
//! so members packed onto one line are untouched by this rule.

use capl_linter::ast::CaplNode;
use capl_linter::model::Transformation;
use tree_sitter::Node;

use super::{FormatContext, FormatRule};

pub struct StatementSplitRule;

impl FormatRule for StatementSplitRule {
    const NAME: &'static str = "statement-split";

    fn apply(ctx: &FormatContext) -> Vec<Transformation> {
        let mut out = Vec::new();
        let root = ctx.tree.root_node();
        for (node, _depth) in root.walk_from() {
            if node.kind() == "compound_statement" {
                out.extend(split_siblings(node, ctx.source));
            }
        }
        out
    }
}

fn line_of(offset: usize, source: &str) -> usize {
    source[..offset].matches('\n').count()
}

fn split_siblings(block: Node, source: &str) -> Vec<Transformation> {
    let mut cursor = block.walk();
    let children: Vec<Node> = block.named_children(&mut cursor).collect();

    let mut out = Vec::new();
    for pair in children.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if line_of(a.end_byte(), source) == line_of(b.start_byte(), source) {
            out.push(Transformation::insertion(
                a.end_byte(),
                "\n".to_string(),
                StatementSplitRule::NAME,
            ));
        }
    }
    out
}
