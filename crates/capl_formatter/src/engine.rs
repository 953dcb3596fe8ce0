//! Ties the five phases together on one shared buffer, re-parsing
//! between phases as each one requires a fresh tree to walk.

use capl_linter::model::apply_transformations;
use capl_linter::parser;
use capl_linter::settings::Settings;

use crate::phases::{comments, indentation, normalize, structural, vertical};
use crate::rules::top_level_ordering::TopLevelOrderingRule;
use crate::rules::{FormatContext, FormatRule};
use crate::FormatError;

pub fn run(file_path: &str, source: &str, settings: &Settings) -> Result<String, FormatError> {
    let mut current = source.to_string();

    // Phase 1: pre-normalization.
    let parsed = reparse(file_path, &current)?;
    let transformations = normalize::apply(parsed.tree.root_node(), &current);
    if !transformations.is_empty() {
        current = apply_transformations(&current, transformations);
    }

    // Optional top-level regrouping runs once, before structural
    // convergence gets a chance to reflow the reordered buffer.
    if settings.reorder_top_level {
        let parsed = reparse(file_path, &current)?;
        let ctx = FormatContext {
            source: &current,
            tree: &parsed.tree,
            settings,
        };
        let transformations = TopLevelOrderingRule::apply(&ctx);
        if !transformations.is_empty() {
            current = apply_transformations(&current, transformations);
        }
    }

    // Phase 2: structural convergence.
    current = structural::apply(file_path, &current, settings)?;

    // Phase 3: vertical whitespace.
    for _ in 0..settings.max_passes.max(1) {
        let parsed = reparse(file_path, &current)?;
        let transformations = vertical::collapse_block_zones(parsed.tree.root_node(), &current);
        if transformations.is_empty() {
            break;
        }
        let candidate = apply_transformations(&current, transformations);
        if candidate == current {
            break;
        }
        current = candidate;
    }
    let global_runs = vertical::collapse_global_runs(&current);
    if !global_runs.is_empty() {
        current = apply_transformations(&current, global_runs);
    }

    // Phase 4: comments.
    if settings.enable_comment_features {
        let parsed = reparse(file_path, &current)?;
        let alignment = comments::align_trailing_comments(parsed.tree.root_node(), &current, settings.line_length);
        if !alignment.is_empty() {
            current = apply_transformations(&current, alignment);
        }
        let parsed = reparse(file_path, &current)?;
        let reflow = comments::reflow_overlong_comments(parsed.tree.root_node(), &current, settings.line_length);
        if !reflow.is_empty() {
            current = apply_transformations(&current, reflow);
        }
    }

    // Phase 5: indentation.
    let parsed = reparse(file_path, &current)?;
    let transformations = indentation::apply(parsed.tree.root_node(), &current, settings.indent_size);
    if !transformations.is_empty() {
        current = apply_transformations(&current, transformations);
    }

    Ok(current)
}

fn reparse(file_path: &str, source: &str) -> Result<parser::ParseResult, FormatError> {
    parser::parse(source).map_err(|source| FormatError::ParseFailed {
        file: file_path.to_string(),
        source,
    })
}
