//! Phase 4: comments. `CommentAlignmentRule` lines up trailing comments
//! on consecutive annotated lines; `CommentReflowRule` wraps overlong
//! single-line comments at word boundaries. Both skip Doxygen/JSDoc tag
//! lines, ASCII-art banner comments, and `#pragma` text, which are left
//! exactly as written.
//!
//! Only single-line comments (the whole comment token occupies one
//! source line, `//...` or a one-line `/* ... */`) are reflowed; an
//! already-multi-line block comment is left to the author's own line
//! breaks.

use capl_linter::ast::CaplNode;
use capl_linter::model::Transformation;
use tree_sitter::Node;
use unicode_width::UnicodeWidthStr;

const ALIGN_NAME: &str = "comment-alignment";
const REFLOW_NAME: &str = "comment-reflow";

pub fn align_trailing_comments(root: Node, source: &str, line_length: usize) -> Vec<Transformation> {
    let mut out = Vec::new();
    for (node, _depth) in root.walk_from() {
        if matches!(node.kind(), "compound_statement" | "translation_unit") {
            out.extend(align_block(node, source, line_length));
        }
    }
    out
}

fn align_block(block: Node, source: &str, line_length: usize) -> Vec<Transformation> {
    let mut cursor = block.walk();
    let children: Vec<Node> = block.named_children(&mut cursor).collect();

    let mut annotated: Vec<(Node, Node)> = Vec::new();
    let mut out = Vec::new();
    for pair in children.windows(2) {
        let (code, comment) = (pair[0], pair[1]);
        if comment.kind() == "comment" && comment.start_position().row == code.end_position().row {
            annotated.push((code, comment));
        } else if !annotated.is_empty() {
            out.extend(flush_run(&annotated, source, line_length));
            annotated.clear();
        }
    }
    out.extend(flush_run(&annotated, source, line_length));
    out
}

fn column_of(node: Node, source: &str) -> usize {
    let line_start = source[..node.start_byte()].rfind('\n').map_or(0, |i| i + 1);
    node.start_byte() - line_start
}

fn flush_run(run: &[(Node, Node)], source: &str, line_length: usize) -> Vec<Transformation> {
    if run.len() < 2 {
        return Vec::new();
    }
    let target_col = run.iter().map(|(_, c)| column_of(*c, source)).max().unwrap_or(0);
    let longest_comment = run
        .iter()
        .map(|(_, c)| c.end_byte() - c.start_byte())
        .max()
        .unwrap_or(0);
    if target_col + longest_comment > line_length {
        return Vec::new();
    }

    let mut out = Vec::new();
    for (code, comment) in run {
        let current_col = column_of(*comment, source);
        if current_col == target_col {
            continue;
        }
        let pad = " ".repeat(target_col.saturating_sub(code.end_position().column));
        out.push(Transformation::replacement(
            code.end_byte(),
            comment.start_byte(),
            pad,
            ALIGN_NAME,
        ));
    }
    out
}

pub fn reflow_overlong_comments(root: Node, source: &str, line_length: usize) -> Vec<Transformation> {
    let mut out = Vec::new();
    for (node, _depth) in root.walk_from() {
        if node.kind() == "comment" {
            if let Some(t) = reflow_one(node, source, line_length) {
                out.push(t);
            }
        }
    }
    out
}

fn reflow_one(comment: Node, source: &str, line_length: usize) -> Option<Transformation> {
    if comment.start_position().row != comment.end_position().row {
        return None;
    }
    let text = comment.to_text(source)?;
    let line_start = source[..comment.start_byte()].rfind('\n').map_or(0, |i| i + 1);
    let column = comment.start_byte() - line_start;
    if column + text.width() <= line_length {
        return None;
    }
    if is_excluded(text) {
        return None;
    }

    let (prefix, suffix, body) = if let Some(inner) = text.strip_prefix("//") {
        ("// ", "", inner.trim())
    } else if let Some(inner) = text.strip_prefix("/*").and_then(|t| t.strip_suffix("*/")) {
        ("/* ", " */", inner.trim())
    } else {
        return None;
    };

    let indent = " ".repeat(column);
    let wrap_width = line_length.saturating_sub(column + prefix.len()).max(10);
    let wrapped = textwrap::wrap(body, wrap_width);
    if wrapped.len() <= 1 {
        return None;
    }

    let mut rebuilt = String::new();
    for (i, line) in wrapped.iter().enumerate() {
        if i > 0 {
            rebuilt.push('\n');
            rebuilt.push_str(&indent);
        }
        rebuilt.push_str(prefix);
        rebuilt.push_str(line);
        if i + 1 == wrapped.len() {
            rebuilt.push_str(suffix);
        }
    }

    Some(Transformation::replacement(
        comment.start_byte(),
        comment.end_byte(),
        rebuilt,
        REFLOW_NAME,
    ))
}

fn is_excluded(text: &str) -> bool {
    let body = text
        .trim_start_matches("//")
        .trim_start_matches("/*")
        .trim_end_matches("*/")
        .trim();
    if body.starts_with('@') {
        return true;
    }
    if body.contains("#pragma") {
        return true;
    }
    let word_chars = body.chars().filter(|c| c.is_alphanumeric()).count();
    let total = body.chars().filter(|c| !c.is_whitespace()).count();
    total > 0 && word_chars * 2 < total
}
