//! `QuoteNormalizationRule`: string literals use double quotes.
//! `char_literal` nodes holding more than a single character are really
//! strings written with single quotes; they are rewritten to `"..."`.
//! A true one-character literal (including an escape like `'\n'`) is
//! left alone.

use capl_linter::ast::CaplNode;
use capl_linter::model::Transformation;
use tree_sitter::Node;

use super::{FormatContext, FormatRule};

pub struct QuoteNormalizationRule;

impl FormatRule for QuoteNormalizationRule {
    const NAME: &'static str = "quote-normalization";

    fn apply(ctx: &FormatContext) -> Vec<Transformation> {
        let mut out = Vec::new();
        let root = ctx.tree.root_node();
        for (node, _depth) in root.walk_from() {
            if node.kind() == "char_literal" {
                out.extend(normalize_single_quoted_string(node, ctx.source));
            }
        }
        out
    }
}

fn normalize_single_quoted_string(node: Node, source: &str) -> Vec<Transformation> {
    let Some(text) = node.to_text(source) else {
        return Vec::new();
    };
    let Some(inner) = text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) else {
        return Vec::new();
    };
    if is_single_character(inner) {
        return Vec::new();
    }
    vec![Transformation::replacement(
        node.start_byte(),
        node.end_byte(),
        format!("\"{inner}\""),
        QuoteNormalizationRule::NAME,
    )]
}

/// A C escape (`\n`, `\t`, `\xFF`, ...) still counts as a single
/// character; anything with more than one unescaped character, or more
/// than one escape, is a string that was written with single quotes.
fn is_single_character(inner: &str) -> bool {
    let mut chars = inner.chars();
    match chars.next() {
        Some('\\') => chars.next().is_some() && chars.as_str().chars().all(|c| c.is_ascii_hexdigit()),
        Some(_) => chars.next().is_none(),
        None => false,
    }
}
