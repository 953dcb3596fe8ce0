//! Phase 1: pre-normalization. Every top-level declaration's starting
//! column is forced to zero by erasing whatever leading spaces/tabs sit
//! between the start of its line and the declaration itself.

use capl_linter::model::Transformation;
use tree_sitter::Node;

const NAME: &str = "pre-normalization";

pub fn apply(root: Node, source: &str) -> Vec<Transformation> {
    let mut cursor = root.walk();
    root.children(&mut cursor)
        .filter_map(|node| zero_column(node, source))
        .collect()
}

fn zero_column(node: Node, source: &str) -> Option<Transformation> {
    let line_start = source[..node.start_byte()].rfind('\n').map_or(0, |i| i + 1);
    if line_start == node.start_byte() {
        return None;
    }
    let gap = &source[line_start..node.start_byte()];
    if !gap.chars().all(|c| c == ' ' || c == '\t') {
        return None;
    }
    Some(Transformation::deletion(line_start, node.start_byte(), NAME))
}
