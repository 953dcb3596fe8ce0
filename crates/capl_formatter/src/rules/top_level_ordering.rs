//! `TopLevelOrderingRule` (config-gated on `settings.reorder_top_level`,
//! default off): regroups top-level declarations into includes (`.cin`
//! before `.can`, alphabetical and de-duplicated within each group),
//! the `variables` block, `testcase`s in source order, event handlers
//! alphabetically by `(kind, subject)`, then user functions
//! alphabetically. A header comment directly above an item moves with
//! it. Anything this rule doesn't recognize (struct/enum type
//! definitions) keeps its original relative position, placed right
//! after the includes.
//!
//! Unlike the other formatter rules this one never fires incrementally:
//! it replaces the whole top-level region in a single transformation,
//! so the engine runs it once, outside the structural-convergence loop.

use capl_linter::ast::CaplNode;
use capl_linter::model::Transformation;
use lazy_regex::regex;
use tree_sitter::Node;

use super::{FormatContext, FormatRule};

pub struct TopLevelOrderingRule;

impl FormatRule for TopLevelOrderingRule {
    const NAME: &'static str = "top-level-ordering";

    fn apply(ctx: &FormatContext) -> Vec<Transformation> {
        if !ctx.settings.reorder_top_level {
            return Vec::new();
        }
        let root = ctx.tree.root_node();
        let mut cursor = root.walk();
        let top: Vec<Node> = root.children(&mut cursor).collect();
        if top.is_empty() {
            return Vec::new();
        }

        let items = group_into_items(&top, ctx.source);
        if items.len() < 2 {
            return Vec::new();
        }

        let mut ordered: Vec<&Item> = items.iter().collect();
        ordered.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        dedupe_includes(&mut ordered);

        let before: Vec<&str> = items.iter().map(|i| i.text(ctx.source)).collect();
        let after: Vec<&str> = ordered.iter().map(|i| i.text(ctx.source)).collect();
        if before == after {
            return Vec::new();
        }

        let region_start = items.first().unwrap().span_start;
        let region_end = items.last().unwrap().span_end;
        let joined = after.join("\n\n");

        vec![Transformation::replacement(
            region_start,
            region_end,
            joined,
            TopLevelOrderingRule::NAME,
        )]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Category {
    IncludeCin,
    IncludeCan,
    Other,
    Variables,
    Testcase(usize),
    EventHandler,
    Function,
}

struct Item {
    span_start: usize,
    span_end: usize,
    category: Category,
    sort_name: String,
}

impl Item {
    fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.span_start..self.span_end]
    }

    fn sort_key(&self) -> (u8, String) {
        let rank = match self.category {
            Category::IncludeCin => 0,
            Category::IncludeCan => 1,
            Category::Other => 2,
            Category::Variables => 3,
            Category::Testcase(_) => 4,
            Category::EventHandler => 5,
            Category::Function => 6,
        };
        let order_key = match self.category {
            Category::Testcase(i) => format!("{i:08}"),
            _ => self.sort_name.clone(),
        };
        (rank, order_key)
    }
}

fn dedupe_includes(ordered: &mut Vec<&Item>) {
    let mut seen = std::collections::HashSet::new();
    ordered.retain(|item| {
        if !matches!(item.category, Category::IncludeCin | Category::IncludeCan) {
            return true;
        }
        seen.insert(item.sort_name.clone())
    });
}

fn group_into_items(top: &[Node], source: &str) -> Vec<Item> {
    let mut items = Vec::new();
    let mut testcase_index = 0usize;
    let mut i = 0;
    while i < top.len() {
        let node = top[i];
        if node.kind() == "comment" {
            i += 1;
            continue;
        }

        let mut span_start = node.start_byte();
        if i > 0 {
            let prev = top[i - 1];
            let prev_is_trailing_comment = i >= 2
                && top[i - 2].kind() != "comment"
                && prev.start_position().row == top[i - 2].end_position().row;
            if prev.kind() == "comment" && !prev_is_trailing_comment {
                let gap = &source[prev.end_byte()..node.start_byte()];
                if gap.matches('\n').count() <= 2 {
                    span_start = prev.start_byte();
                }
            }
        }

        let text = node.to_text(source).unwrap_or_default();
        let trimmed = text.trim_start();
        let category = classify(node, trimmed, source, &mut testcase_index);
        let sort_name = sort_name_for(node, trimmed, source, category);

        let mut span_end = node.end_byte();
        if let Some(next) = top.get(i + 1) {
            if next.kind() == "comment" && next.start_position().row == node.end_position().row {
                span_end = next.end_byte();
            }
        }

        items.push(Item {
            span_start,
            span_end,
            category,
            sort_name,
        });
        i += 1;
    }
    items
}

fn classify(node: Node, trimmed: &str, source: &str, testcase_index: &mut usize) -> Category {
    if node.kind() == "preproc_include" {
        let is_cin = node
            .child_with_name("string_literal")
            .or_else(|| node.child_with_name("system_lib_string"))
            .and_then(|n| n.to_text(source))
            .map(|t| t.trim_end_matches(['"', '>']).to_lowercase().ends_with(".cin"))
            .unwrap_or(false);
        return if is_cin { Category::IncludeCin } else { Category::IncludeCan };
    }
    if regex!(r"^variables\b\s*\{").is_match(trimmed) {
        return Category::Variables;
    }
    if regex!(r"^testcase\b").is_match(trimmed) {
        let idx = *testcase_index;
        *testcase_index += 1;
        return Category::Testcase(idx);
    }
    if regex!(r"^on\s+(message|timer|start|key)\b").is_match(trimmed) {
        return Category::EventHandler;
    }
    if node.kind() == "function_definition"
        || (node.kind() == "declaration" && node.descendants().any(|n| n.kind() == "function_declarator"))
    {
        return Category::Function;
    }
    Category::Other
}

fn sort_name_for(node: Node, trimmed: &str, source: &str, category: Category) -> String {
    match category {
        Category::IncludeCin | Category::IncludeCan => node
            .child_with_name("string_literal")
            .or_else(|| node.child_with_name("system_lib_string"))
            .and_then(|n| n.to_text(source))
            .unwrap_or(trimmed)
            .to_lowercase(),
        Category::EventHandler => {
            let caps = regex!(r"^on\s+(message|timer|start|key)\b\s*([A-Za-z0-9_:.*]*)").captures(trimmed);
            match caps {
                Some(c) => format!(
                    "{}:{}",
                    c.get(1).map(|m| m.as_str()).unwrap_or(""),
                    c.get(2).map(|m| m.as_str()).unwrap_or("")
                ),
                None => trimmed.to_string(),
            }
        }
        Category::Function => node
            .descendants()
            .find(|n| n.kind() == "function_declarator")
            .and_then(|d| d.child_with_name("identifier"))
            .and_then(|n| n.to_text(source))
            .unwrap_or(trimmed)
            .to_lowercase(),
        Category::Variables | Category::Testcase(_) | Category::Other => String::new(),
    }
}
