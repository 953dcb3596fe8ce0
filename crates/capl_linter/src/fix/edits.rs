//! Interface for generating fix transformations from higher-level actions
//! ("move this declaration into the `variables` block"). Centralizes the
//! Collect-Remove-Insert pattern mandated for E003/E006/E007.

use ruff_text_size::TextRange;

use crate::model::Transformation;

/// One item being relocated: its current byte range and its source text.
pub struct MovedItem<'a> {
    pub range: TextRange,
    pub text: &'a str,
}

/// Collect the full byte ranges of items to move in AST order, emit a
/// deletion transformation for each, and a single insertion transformation
/// at `insert_at` whose replacement is the concatenation of the moved
/// text in original relative order, each followed by a trailing newline.
/// All deletions are disjoint from the insertion point by construction
/// (callers never move an item to a point inside its own range).
pub fn collect_remove_insert(
    items: &[MovedItem],
    insert_at: usize,
    rule_id: &'static str,
) -> Vec<Transformation> {
    let mut transformations = Vec::with_capacity(items.len() + 1);
    let mut combined = String::new();
    for item in items {
        transformations.push(Transformation::deletion(
            item.range.start().into(),
            item.range.end().into(),
            rule_id,
        ));
        combined.push_str(item.text.trim_end());
        combined.push('\n');
    }
    transformations.push(
        Transformation::insertion(insert_at, combined, rule_id).with_priority(-1),
    );
    transformations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::apply_transformations;
    use ruff_text_size::TextSize;

    #[test]
    fn moves_a_declaration_to_the_insertion_point() {
        let source = "int b;\nvariables {\n  int a;\n}\n";
        // "int b;\n" occupies bytes [0, 7)
        let item_range = TextRange::new(TextSize::new(0), TextSize::new(7));
        let items = [MovedItem {
            range: item_range,
            text: "int b;",
        }];
        // insert right before the closing brace of the variables block
        let insert_at = source.find('}').unwrap();
        let transformations = collect_remove_insert(&items, insert_at, "E006");
        let result = apply_transformations(source, transformations);
        assert_eq!(result, "variables {\n  int a;\nint b;\n}\n");
    }
}
