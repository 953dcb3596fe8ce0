//! Phase 3: vertical whitespace normalization. Every block has a setup
//! zone (its leading run of declarations and comments) and a logic zone
//! (everything from the first non-declaration, non-comment child on);
//! blank lines inside the setup zone are collapsed away entirely, blank
//! lines between logic-zone siblings are capped at one, and whatever is
//! left anywhere else in the buffer is capped at one blank line (two
//! newlines) by the global sweep.

use capl_linter::ast::CaplNode;
use capl_linter::model::Transformation;
use lazy_regex::regex;
use tree_sitter::Node;

const NAME: &str = "vertical-whitespace";

pub fn collapse_block_zones(root: Node, source: &str) -> Vec<Transformation> {
    let mut out = Vec::new();
    for (node, _depth) in root.walk_from() {
        if node.kind() == "compound_statement" {
            out.extend(collapse_one_block(node, source));
        }
    }
    out
}

fn is_declaration_like(node: Node) -> bool {
    matches!(node.kind(), "declaration" | "comment")
}

fn collapse_one_block(block: Node, source: &str) -> Vec<Transformation> {
    let mut cursor = block.walk();
    let children: Vec<Node> = block.named_children(&mut cursor).collect();
    if children.len() < 2 {
        return Vec::new();
    }

    let setup_len = children
        .iter()
        .take_while(|c| is_declaration_like(**c))
        .count();

    let mut out = Vec::new();
    for (i, pair) in children.windows(2).enumerate() {
        let (a, b) = (pair[0], pair[1]);
        let gap_start = a.end_byte();
        let gap_end = b.start_byte();
        if gap_end < gap_start {
            continue;
        }
        let gap = &source[gap_start..gap_end];
        if !gap.contains('\n') {
            continue;
        }
        let in_setup_zone = i + 1 < setup_len;
        let target_newlines = if in_setup_zone { 1 } else { 2.min(gap.matches('\n').count().max(1)) };
        let trailing = gap.rsplit('\n').next().unwrap_or("");
        if let Some(t) = collapse_gap(gap_start, gap_end, gap, target_newlines, trailing) {
            out.push(t);
        }
    }
    out
}

fn collapse_gap(start: usize, end: usize, gap: &str, target_newlines: usize, trailing_indent: &str) -> Option<Transformation> {
    let newline_count = gap.matches('\n').count();
    if newline_count <= target_newlines {
        return None;
    }
    let replacement = format!("{}{trailing_indent}", "\n".repeat(target_newlines));
    Some(Transformation::replacement(start, end, replacement, NAME))
}

/// Collapse any run of three-or-more newlines left outside a block
/// (top-level gaps, the file header) down to exactly two.
pub fn collapse_global_runs(source: &str) -> Vec<Transformation> {
    regex!(r"\n[ \t]*(?:\n[ \t]*){2,}")
        .find_iter(source)
        .map(|m| {
            let trailing_indent: String = m.as_str().rsplit('\n').next().unwrap_or("").to_string();
            Transformation::replacement(m.start(), m.end(), format!("\n\n{trailing_indent}"), NAME)
        })
        .collect()
}
