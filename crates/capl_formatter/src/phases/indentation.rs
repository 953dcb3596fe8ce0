//! Phase 5: indentation. Each line's indentation level is the minimum
//! AST depth over every token that starts on that line. Depth increases
//! when entering a braced block or a parenthesized expression that
//! spans multiple lines; `case`/`default` labels are dedented by one
//! relative to the ordinary depth a `switch` body's children would get.

use std::collections::BTreeMap;

use capl_linter::ast::CaplNode;
use capl_linter::model::Transformation;
use tree_sitter::Node;

const NAME: &str = "indentation";

pub fn apply(root: Node, source: &str, indent_size: usize) -> Vec<Transformation> {
    let mut by_row: BTreeMap<usize, usize> = BTreeMap::new();

    for leaf in std::iter::once(root).chain(root.descendants()).filter(|n| n.child_count() == 0) {
        let row = leaf.start_position().row;
        let depth = leaf_depth(leaf);
        by_row
            .entry(row)
            .and_modify(|d| *d = (*d).min(depth))
            .or_insert(depth);
    }

    let mut out = Vec::new();
    for (row, depth) in by_row {
        let Some(t) = reindent_line(source, row, depth * indent_size) else {
            continue;
        };
        out.push(t);
    }
    out
}

fn leaf_depth(leaf: Node) -> usize {
    let mut depth = 0usize;
    let mut cur = leaf;
    while let Some(parent) = cur.parent() {
        if parent.kind() == "compound_statement" {
            depth += 1;
        } else if parent.kind() == "parenthesized_expression" && spans_multiple_lines(parent) {
            depth += 1;
        }
        cur = parent;
    }

    if let Some(cs) = nearest_case_statement(leaf) {
        if let Some(colon) = case_colon(cs) {
            if leaf.start_byte() < colon.end_byte() {
                depth = depth.saturating_sub(1);
            }
        }
    }

    depth
}

fn spans_multiple_lines(node: Node) -> bool {
    node.start_position().row != node.end_position().row
}

fn nearest_case_statement(leaf: Node) -> Option<Node<'_>> {
    leaf.ancestors().find(|n| n.kind() == "case_statement")
}

fn case_colon(case_node: Node) -> Option<Node<'_>> {
    let mut cursor = case_node.walk();
    case_node.children(&mut cursor).find(|c| c.kind() == ":")
}

fn reindent_line(source: &str, row: usize, want_spaces: usize) -> Option<Transformation> {
    let line_start = nth_line_start(source, row)?;
    let rest = &source[line_start..];
    if rest.trim_start_matches([' ', '\t']).starts_with('\n') || rest.is_empty() {
        // blank line: leave it alone.
        return None;
    }
    let indent_end = line_start
        + rest
            .bytes()
            .take_while(|b| *b == b' ' || *b == b'\t')
            .count();
    let current = &source[line_start..indent_end];
    let wanted = " ".repeat(want_spaces);
    if current == wanted {
        return None;
    }
    Some(Transformation::replacement(line_start, indent_end, wanted, NAME))
}

fn nth_line_start(source: &str, row: usize) -> Option<usize> {
    if row == 0 {
        return Some(0);
    }
    source
        .match_indices('\n')
        .nth(row - 1)
        .map(|(i, _)| i + 1)
}
