//! Type-definition placement and type-keyword rules: E003/E004/E005/E009.

use tree_sitter::Node;

use crate::ast::CaplNode;
use crate::facts::{DeclaredScope, SymbolKind};
use crate::fix::edits::{collect_remove_insert, MovedItem};
use crate::model::{Issue, Severity, Transformation};
use crate::traits::TextRanged;

use super::declarations::find_variables_block;
use super::{AstLintRule, RuleContext};

fn enclosing_declaration(node: Node) -> Node {
    node.parent().filter(|p| p.kind() == "declaration").unwrap_or(node)
}

/// E003 `global-type-definition`: an `enum`/`struct` definition at top
/// level, outside the `variables` block.
pub struct GlobalTypeDefinition;

impl AstLintRule for GlobalTypeDefinition {
    const ID: &'static str = "E003";

    fn entrypoints() -> &'static [&'static str] {
        &["struct_specifier", "enum_specifier"]
    }

    fn check(node: Node, ctx: &RuleContext) -> Vec<Issue> {
        let declaring = enclosing_declaration(node);
        let kind = if node.kind() == "struct_specifier" {
            SymbolKind::Struct
        } else {
            SymbolKind::Enum
        };
        let is_top_level_definition = ctx.facts.symbols.iter().any(|s| {
            s.kind == kind
                && s.declared_in_scope == DeclaredScope::TopLevel
                && s.range == node.textrange()
                && s.has_body
        });
        if !is_top_level_definition {
            return Vec::new();
        }
        vec![Issue {
            rule_id: Self::ID,
            severity: Severity::Error,
            file: ctx.file_path.to_string(),
            primary_range: declaring.textrange(),
            message: "type definitions must live inside the `variables` block".to_string(),
            auto_fixable: true,
            fix_hint: Some("move into the `variables` block".to_string()),
        }]
    }

    fn fix(ctx: &RuleContext, issues: &[Issue]) -> Vec<Transformation> {
        let Some(block) = find_variables_block(ctx.tree.root_node(), ctx.source) else {
            return Vec::new();
        };
        let Some(body) = block.child_with_name("compound_statement") else {
            return Vec::new();
        };
        let insert_at = usize::from(body.end_textsize()) - 1;
        let items: Vec<MovedItem> = issues
            .iter()
            .map(|issue| MovedItem {
                range: issue.primary_range,
                text: &ctx.source[std::ops::Range::<usize>::from(issue.primary_range)],
            })
            .collect();
        collect_remove_insert(&items, insert_at, Self::ID)
    }
}

fn declared_type_name(node: Node, ctx: &RuleContext) -> Option<String> {
    let type_node = node.named_child(0)?;
    if type_node.kind() != "type_identifier" {
        return None;
    }
    type_node.to_text(ctx.source).map(str::to_string)
}

fn visible_enum_or_struct_names(ctx: &RuleContext, kind: SymbolKind) -> Vec<String> {
    ctx.store
        .visible_symbols(ctx.file_path, ctx.resolve_include)
        .into_iter()
        .chain(ctx.facts.symbols.iter().cloned())
        .filter(|s| s.kind == kind)
        .map(|s| s.name)
        .collect()
}

/// E004 `missing-enum-keyword`: a declaration whose type name matches a
/// known `enum` in `visible_symbols`, but the `enum` keyword is absent.
pub struct MissingEnumKeyword;

impl AstLintRule for MissingEnumKeyword {
    const ID: &'static str = "E004";

    fn entrypoints() -> &'static [&'static str] {
        &["declaration"]
    }

    fn check(node: Node, ctx: &RuleContext) -> Vec<Issue> {
        let Some(type_name) = declared_type_name(node, ctx) else {
            return Vec::new();
        };
        let enums = visible_enum_or_struct_names(ctx, SymbolKind::Enum);
        if !enums.contains(&type_name) {
            return Vec::new();
        }
        let type_node = node.named_child(0).expect("checked above");
        vec![Issue {
            rule_id: Self::ID,
            severity: Severity::Error,
            file: ctx.file_path.to_string(),
            primary_range: type_node.textrange(),
            message: format!("`{type_name}` is an enum; the `enum` keyword is missing"),
            auto_fixable: true,
            fix_hint: Some(format!("prepend `enum` before `{type_name}`")),
        }]
    }

    fn fix(_ctx: &RuleContext, issues: &[Issue]) -> Vec<Transformation> {
        issues
            .iter()
            .map(|issue| {
                Transformation::insertion(
                    issue.primary_range.start().into(),
                    "enum ".to_string(),
                    Self::ID,
                )
            })
            .collect()
    }
}

/// E005 `missing-struct-keyword`: same as E004, for `struct`.
pub struct MissingStructKeyword;

impl AstLintRule for MissingStructKeyword {
    const ID: &'static str = "E005";

    fn entrypoints() -> &'static [&'static str] {
        &["declaration"]
    }

    fn check(node: Node, ctx: &RuleContext) -> Vec<Issue> {
        let Some(type_name) = declared_type_name(node, ctx) else {
            return Vec::new();
        };
        let structs = visible_enum_or_struct_names(ctx, SymbolKind::Struct);
        if !structs.contains(&type_name) {
            return Vec::new();
        }
        let type_node = node.named_child(0).expect("checked above");
        vec![Issue {
            rule_id: Self::ID,
            severity: Severity::Error,
            file: ctx.file_path.to_string(),
            primary_range: type_node.textrange(),
            message: format!("`{type_name}` is a struct; the `struct` keyword is missing"),
            auto_fixable: true,
            fix_hint: Some(format!("prepend `struct` before `{type_name}`")),
        }]
    }

    fn fix(_ctx: &RuleContext, issues: &[Issue]) -> Vec<Transformation> {
        issues
            .iter()
            .map(|issue| {
                Transformation::insertion(
                    issue.primary_range.start().into(),
                    "struct ".to_string(),
                    Self::ID,
                )
            })
            .collect()
    }
}

/// E009 `pointer-parameter`: a parameter declarator containing `*`,
/// unless the parameter's type is `ethernetpacket` (CANoe's one
/// pointer-shaped builtin that is passed this way by convention).
pub struct PointerParameter;

impl AstLintRule for PointerParameter {
    const ID: &'static str = "E009";

    fn entrypoints() -> &'static [&'static str] {
        &["parameter_declaration"]
    }

    fn check(node: Node, ctx: &RuleContext) -> Vec<Issue> {
        let has_pointer = node.descendants().any(|n| n.kind() == "pointer_declarator")
            || node.to_text(ctx.source).is_some_and(|t| t.contains('*'));
        if !has_pointer {
            return Vec::new();
        }
        let type_text = node
            .named_child(0)
            .and_then(|n| n.to_text(ctx.source))
            .unwrap_or("");
        if type_text == "ethernetpacket" {
            return Vec::new();
        }
        vec![Issue {
            rule_id: Self::ID,
            severity: Severity::Error,
            file: ctx.file_path.to_string(),
            primary_range: node.textrange(),
            message: "pointer parameters are not permitted in CAPL".to_string(),
            auto_fixable: false,
            fix_hint: None,
        }]
    }
}
