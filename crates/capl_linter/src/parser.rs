//! C1: the parser façade. Wraps the `tree-sitter-c` grammar — CAPL is
//! parsed as a constrained C dialect; CAPL-specific keywords
//! (`variables`, `on`, `message`, `timer`, `start`, `key`, `testcase`,
//! `msTimer`) are not part of the grammar and surface as plain
//! identifiers, sibling-text pairs, or local `ERROR` regions, recognized
//! positionally by the fact extractor (C2) rather than by the grammar.

use anyhow::{Context, Result};
use tree_sitter::{Parser, Query, QueryCursor, QueryMatch, Tree};

use crate::ast::count_error_nodes;

/// Result of parsing one buffer of source bytes.
pub struct ParseResult {
    pub tree: Tree,
    pub errors_present: bool,
}

/// Parse `source` with the tree-sitter-C grammar.
///
/// Failure to construct a tree at all (grammar load failure, or
/// tree-sitter's hard parse failure) is a hard error surfaced to the
/// caller; `errors_present` distinguishes a best-effort tree that still
/// contains `ERROR` subtrees from a fully clean one.
pub fn parse(source: &str) -> Result<ParseResult> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_c::LANGUAGE.into())
        .context("error loading C grammar for CAPL parsing")?;
    let tree = parser
        .parse(source, None)
        .context("failed to parse CAPL source")?;
    let errors_present = count_error_nodes(tree.root_node()) > 0;
    Ok(ParseResult {
        tree,
        errors_present,
    })
}

/// Run an s-expression tree-sitter query against `tree`, returning the
/// captured matches. Each match binds capture names to nodes, per the C1
/// contract.
pub fn query<'a>(
    tree: &'a Tree,
    source: &'a str,
    s_expression: &str,
) -> Result<Vec<QueryMatch<'a, 'a>>> {
    let language = tree_sitter_c::LANGUAGE.into();
    let query = Query::new(&language, s_expression).context("invalid tree-sitter query")?;
    let mut cursor = QueryCursor::new();
    let matches = cursor
        .matches(&query, tree.root_node(), source.as_bytes())
        .map(|m| m.to_owned())
        .collect();
    Ok(matches)
}

/// Re-parse `source`, returning only the count of `ERROR` nodes. Used by
/// the C6 auto-fix driver and the C7 formatter engine to check the
/// no-new-error invariant between passes without keeping the whole tree
/// around.
pub fn error_node_count(source: &str) -> Result<usize> {
    let result = parse(source)?;
    Ok(count_error_nodes(result.tree.root_node()))
}
