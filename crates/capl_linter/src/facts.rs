//! C2: the fact extractor. One AST walk per file, recording neutral facts
//! (symbols, includes, event handlers, references) with no evaluative
//! judgment. Whether a fact is a violation is entirely up to C5 rules.

use lazy_regex::regex;
use ruff_text_size::TextRange;
use tree_sitter::Node;

use crate::ast::CaplNode;
use crate::traits::TextRanged;

/// What kind of entity a [`Symbol`] names. `Is` derives one `is_*`
/// predicate per variant (`is_function`, `is_enum`, ...), used wherever a
/// rule needs to ask "is this symbol a function" without spelling out a
/// `matches!`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, is_macro::Is)]
pub enum SymbolKind {
    Variable,
    Function,
    EventHandler,
    Testcase,
    Enum,
    EnumMember,
    Struct,
    StructMember,
    Timer,
    Message,
    IncludeTarget,
}

/// Where a symbol was declared, purely as a recorded position — not a
/// verdict. A mid-block local is recorded as `LocalBlock` with
/// `statements_before_in_block > 0`; E007 is what turns that into an
/// issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclaredScope {
    GlobalVariablesBlock,
    LocalBlock,
    TopLevel,
    InsideBlock,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub defining_file: String,
    pub range: TextRange,
    pub declared_in_scope: DeclaredScope,
    pub type_text: String,
    pub has_body: bool,
    pub param_count: usize,
    pub is_forward_declaration: bool,
    pub parent_symbol: Option<String>,
    /// Number of executable statements preceding this declaration within
    /// its enclosing block. Zero for declarations at the head of a block.
    pub statements_before_in_block: usize,
}

#[derive(Debug, Clone)]
pub struct Include {
    pub source_file: String,
    pub target_path_text: String,
    pub resolved_path: Option<String>,
    pub range: TextRange,
    /// `true` for `#include <...>`, which never resolves against user paths.
    pub angle_bracket: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceContext {
    Call,
    Read,
    Write,
    MemberAccess,
    TimerSet,
}

#[derive(Debug, Clone)]
pub struct Reference {
    pub file: String,
    pub range: TextRange,
    pub referenced_name: String,
    pub context_kind: ReferenceContext,
}

/// All facts extracted from a single file in one walk.
#[derive(Debug, Clone, Default)]
pub struct FileFacts {
    pub symbols: Vec<Symbol>,
    pub includes: Vec<Include>,
    pub references: Vec<Reference>,
}

/// Built-in CAPL types and keywords that reference sites may legitimately
/// name without being declared anywhere in `visible_symbols`.
pub const BUILTIN_TYPES: &[&str] = &[
    "int", "char", "float", "double", "long", "short", "byte", "word", "dword", "qword", "void",
    "unsigned", "signed", "ethernetpacket", "message", "timer", "msTimer",
];

/// Walk `root` and extract neutral facts for `file_path`.
pub fn extract_facts(root: Node, source: &str, file_path: &str) -> FileFacts {
    let mut facts = FileFacts::default();
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        extract_top_level_item(child, source, file_path, &mut facts);
    }
    facts
}

fn extract_top_level_item(node: Node, source: &str, file_path: &str, facts: &mut FileFacts) {
    let text = node.to_text(source).unwrap_or_default().trim_start();

    if node.kind() == "preproc_include" {
        extract_include(node, source, file_path, facts);
        return;
    }

    if let Some(caps) = regex!(r"^variables\b\s*\{").find(text) {
        let _ = caps;
        extract_variables_block(node, source, file_path, facts);
        return;
    }

    if let Some(m) = regex!(r"^on\s+(message|timer|start|key)\b\s*([A-Za-z0-9_:.*]*)").find(text)
    {
        extract_event_handler(node, source, file_path, facts, m.as_str());
        return;
    }

    if regex!(r"^testcase\b").is_match(text) {
        extract_testcase(node, source, file_path, facts);
        return;
    }

    if let Some(struct_node) = find_shallow(node, "struct_specifier") {
        extract_struct(struct_node, source, file_path, facts, DeclaredScope::TopLevel);
    }
    if let Some(enum_node) = find_shallow(node, "enum_specifier") {
        extract_enum(enum_node, source, file_path, facts, DeclaredScope::TopLevel);
    }

    match node.kind() {
        "function_definition" => {
            extract_function(node, source, file_path, facts, true);
        }
        "declaration" => {
            if node.child_with_name("function_declarator").is_some()
                || has_descendant_kind(node, "function_declarator")
            {
                extract_function(node, source, file_path, facts, false);
            } else {
                extract_variable_declaration(node, source, file_path, facts, DeclaredScope::TopLevel, 0);
            }
        }
        _ => {}
    }
}

fn find_shallow<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    if node.kind() == kind {
        return Some(node);
    }
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| c.kind() == kind)
}

fn has_descendant_kind(node: Node, kind: &str) -> bool {
    node.descendants().any(|n| n.kind() == kind)
}

fn extract_include(node: Node, source: &str, file_path: &str, facts: &mut FileFacts) {
    let path_node = node
        .child_with_name("string_literal")
        .or_else(|| node.child_with_name("system_lib_string"));
    let Some(path_node) = path_node else {
        return;
    };
    let raw = path_node.to_text(source).unwrap_or_default();
    let angle_bracket = path_node.kind() == "system_lib_string";
    let target = raw.trim_matches(|c| c == '"' || c == '<' || c == '>').to_string();

    facts.includes.push(Include {
        source_file: file_path.to_string(),
        target_path_text: target,
        // Resolution against the project's include search path happens in
        // `capl_workspace`/the CLI, which owns the filesystem; the core
        // only records the literal text.
        resolved_path: None,
        range: node.textrange(),
        angle_bracket,
    });
}

fn extract_variables_block(node: Node, source: &str, file_path: &str, facts: &mut FileFacts) {
    let Some(body) = find_shallow(node, "compound_statement") else {
        return;
    };
    let mut cursor = body.walk();
    for child in body.named_children(&mut cursor) {
        match child.kind() {
            "declaration" => {
                if let Some(struct_node) = find_shallow(child, "struct_specifier") {
                    extract_struct(
                        struct_node,
                        source,
                        file_path,
                        facts,
                        DeclaredScope::GlobalVariablesBlock,
                    );
                }
                if let Some(enum_node) = find_shallow(child, "enum_specifier") {
                    extract_enum(
                        enum_node,
                        source,
                        file_path,
                        facts,
                        DeclaredScope::GlobalVariablesBlock,
                    );
                }
                extract_variable_declaration(
                    child,
                    source,
                    file_path,
                    facts,
                    DeclaredScope::GlobalVariablesBlock,
                    0,
                );
            }
            "comment" => {}
            _ => {}
        }
    }
}

fn extract_event_handler(
    node: Node,
    source: &str,
    file_path: &str,
    facts: &mut FileFacts,
    header: &str,
) {
    let subject = regex!(r"^on\s+\w+\b\s*(.*)$")
        .captures(header)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    let kind_word = regex!(r"^on\s+(\w+)")
        .captures(header)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    facts.symbols.push(Symbol {
        name: format!("{kind_word} {subject}").trim().to_string(),
        kind: SymbolKind::EventHandler,
        defining_file: file_path.to_string(),
        range: node.textrange(),
        declared_in_scope: DeclaredScope::TopLevel,
        type_text: kind_word,
        has_body: true,
        param_count: 0,
        is_forward_declaration: false,
        parent_symbol: None,
        statements_before_in_block: 0,
    });

    if let Some(body) = find_shallow(node, "compound_statement") {
        extract_block_locals(body, source, file_path, facts, None);
    }
}

fn extract_testcase(node: Node, source: &str, file_path: &str, facts: &mut FileFacts) {
    let name = regex!(r"^testcase\s+(\w+)")
        .captures(node.to_text(source).unwrap_or_default())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let params = node.child_with_name("parameter_list");
    let param_count = params
        .map(|p| {
            let mut cursor = p.walk();
            p.named_children(&mut cursor)
                .filter(|c| c.kind() == "parameter_declaration")
                .count()
        })
        .unwrap_or(0);

    facts.symbols.push(Symbol {
        name: name.clone(),
        kind: SymbolKind::Testcase,
        defining_file: file_path.to_string(),
        range: node.textrange(),
        declared_in_scope: DeclaredScope::TopLevel,
        type_text: "testcase".to_string(),
        has_body: true,
        param_count,
        is_forward_declaration: false,
        parent_symbol: None,
        statements_before_in_block: 0,
    });

    if let Some(body) = find_shallow(node, "compound_statement") {
        extract_block_locals(body, source, file_path, facts, Some(&name));
    }
}

fn extract_function(
    node: Node,
    source: &str,
    file_path: &str,
    facts: &mut FileFacts,
    has_body: bool,
) {
    let declarator = node
        .descendants()
        .find(|n| n.kind() == "function_declarator");
    let Some(declarator) = declarator else {
        return;
    };
    let name = declarator
        .child_with_name("identifier")
        .and_then(|n| n.to_text(source))
        .unwrap_or_default()
        .to_string();

    let params = declarator.child_with_name("parameter_list");
    let param_count = params
        .map(|p| {
            let mut cursor = p.walk();
            p.named_children(&mut cursor)
                .filter(|c| c.kind() == "parameter_declaration")
                .count()
        })
        .unwrap_or(0);

    let type_node = node.child_with_name("primitive_type").or_else(|| {
        node.named_child(0)
            .filter(|n| n.kind() != "function_declarator")
    });
    let type_text = type_node
        .and_then(|n| n.to_text(source))
        .unwrap_or("void")
        .to_string();

    facts.symbols.push(Symbol {
        name: name.clone(),
        kind: SymbolKind::Function,
        defining_file: file_path.to_string(),
        range: node.textrange(),
        declared_in_scope: DeclaredScope::TopLevel,
        type_text,
        has_body,
        param_count,
        is_forward_declaration: !has_body,
        parent_symbol: None,
        statements_before_in_block: 0,
    });

    if let Some(params) = params {
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            if param.kind() != "parameter_declaration" {
                continue;
            }
            let param_type = param.to_text(source).unwrap_or_default().to_string();
            let param_name = param
                .descendants()
                .find(|n| n.kind() == "identifier")
                .and_then(|n| n.to_text(source))
                .unwrap_or("")
                .to_string();
            facts.symbols.push(Symbol {
                name: param_name,
                kind: SymbolKind::Variable,
                defining_file: file_path.to_string(),
                range: param.textrange(),
                declared_in_scope: DeclaredScope::InsideBlock,
                type_text: param_type,
                has_body: false,
                param_count: 0,
                is_forward_declaration: false,
                parent_symbol: Some(name.clone()),
                statements_before_in_block: 0,
            });
        }
    }

    if has_body {
        if let Some(body) = find_shallow(node, "compound_statement") {
            extract_block_locals(body, source, file_path, facts, Some(&name));
        }
    }
}

fn extract_struct(
    node: Node,
    source: &str,
    file_path: &str,
    facts: &mut FileFacts,
    scope: DeclaredScope,
) {
    let name = node
        .child_with_name("type_identifier")
        .and_then(|n| n.to_text(source))
        .unwrap_or("")
        .to_string();

    facts.symbols.push(Symbol {
        name: name.clone(),
        kind: SymbolKind::Struct,
        defining_file: file_path.to_string(),
        range: node.textrange(),
        declared_in_scope: scope,
        type_text: "struct".to_string(),
        has_body: node.child_with_name("field_declaration_list").is_some(),
        param_count: 0,
        is_forward_declaration: node.child_with_name("field_declaration_list").is_none(),
        parent_symbol: None,
        statements_before_in_block: 0,
    });

    if let Some(fields) = node.child_with_name("field_declaration_list") {
        let mut cursor = fields.walk();
        for field in fields.named_children(&mut cursor) {
            if field.kind() != "field_declaration" {
                continue;
            }
            for member in field.descendants().filter(|n| n.kind() == "field_identifier") {
                facts.symbols.push(Symbol {
                    name: member.to_text(source).unwrap_or_default().to_string(),
                    kind: SymbolKind::StructMember,
                    defining_file: file_path.to_string(),
                    range: member.textrange(),
                    declared_in_scope: DeclaredScope::InsideBlock,
                    type_text: field.to_text(source).unwrap_or_default().to_string(),
                    has_body: false,
                    param_count: 0,
                    is_forward_declaration: false,
                    parent_symbol: Some(name.clone()),
                    statements_before_in_block: 0,
                });
            }
        }
    }
}

fn extract_enum(
    node: Node,
    source: &str,
    file_path: &str,
    facts: &mut FileFacts,
    scope: DeclaredScope,
) {
    let name = node
        .child_with_name("type_identifier")
        .and_then(|n| n.to_text(source))
        .unwrap_or("")
        .to_string();

    facts.symbols.push(Symbol {
        name: name.clone(),
        kind: SymbolKind::Enum,
        defining_file: file_path.to_string(),
        range: node.textrange(),
        declared_in_scope: scope,
        type_text: "enum".to_string(),
        has_body: node.child_with_name("enumerator_list").is_some(),
        param_count: 0,
        is_forward_declaration: node.child_with_name("enumerator_list").is_none(),
        parent_symbol: None,
        statements_before_in_block: 0,
    });

    if let Some(list) = node.child_with_name("enumerator_list") {
        let mut cursor = list.walk();
        for member in list.named_children(&mut cursor) {
            if member.kind() != "enumerator" {
                continue;
            }
            let member_name = member
                .child_with_name("identifier")
                .and_then(|n| n.to_text(source))
                .unwrap_or_default()
                .to_string();
            facts.symbols.push(Symbol {
                name: member_name,
                kind: SymbolKind::EnumMember,
                defining_file: file_path.to_string(),
                range: member.textrange(),
                declared_in_scope: DeclaredScope::InsideBlock,
                type_text: name.clone(),
                has_body: false,
                param_count: 0,
                is_forward_declaration: false,
                parent_symbol: Some(name.clone()),
                statements_before_in_block: 0,
            });
        }
    }
}

fn extract_variable_declaration(
    node: Node,
    source: &str,
    file_path: &str,
    facts: &mut FileFacts,
    scope: DeclaredScope,
    statements_before: usize,
) {
    let type_text = node
        .named_child(0)
        .and_then(|n| n.to_text(source))
        .unwrap_or("")
        .to_string();

    let mut cursor = node.walk();
    let declarators = node
        .named_children(&mut cursor)
        .filter(|c| matches!(c.kind(), "init_declarator" | "identifier" | "array_declarator"))
        .collect::<Vec<_>>();

    if declarators.is_empty() {
        return;
    }

    for decl in declarators {
        let ident = decl
            .descendants()
            .find(|n| n.kind() == "identifier")
            .or(Some(decl).filter(|d| d.kind() == "identifier"));
        let Some(ident) = ident else { continue };
        facts.symbols.push(Symbol {
            name: ident.to_text(source).unwrap_or_default().to_string(),
            kind: SymbolKind::Variable,
            defining_file: file_path.to_string(),
            range: node.textrange(),
            declared_in_scope: scope,
            type_text: type_text.clone(),
            has_body: false,
            param_count: 0,
            is_forward_declaration: false,
            parent_symbol: None,
            statements_before_in_block: statements_before,
        });
    }
}

/// Walk a block's direct statement children, recording local variable
/// facts with the number of non-declaration statements seen before them —
/// this is what lets E007 tell a setup-zone declaration from a mid-block
/// one without the extractor itself passing judgment.
fn extract_block_locals(
    body: Node,
    source: &str,
    file_path: &str,
    facts: &mut FileFacts,
    enclosing: Option<&str>,
) {
    let mut statements_before = 0usize;
    let mut cursor = body.walk();
    for stmt in body.named_children(&mut cursor) {
        match stmt.kind() {
            "declaration" => {
                extract_variable_declaration(
                    stmt,
                    source,
                    file_path,
                    facts,
                    DeclaredScope::LocalBlock,
                    statements_before,
                );
                if let Some(last) = facts.symbols.last_mut() {
                    last.parent_symbol = enclosing.map(str::to_string).or(last.parent_symbol.take());
                }
            }
            "comment" => {}
            _ => {
                statements_before += 1;
                collect_references(stmt, source, file_path, facts);
            }
        }
    }
}

/// Record reference-site facts (`call`, `read`, `write`, `member_access`,
/// `timer_set`) for identifiers used within executable statements.
fn collect_references(stmt: Node, source: &str, file_path: &str, facts: &mut FileFacts) {
    for node in stmt.descendants() {
        match node.kind() {
            "call_expression" => {
                if let Some(name) = node
                    .child_with_name("identifier")
                    .and_then(|n| n.to_text(source))
                {
                    facts.references.push(Reference {
                        file: file_path.to_string(),
                        range: node.textrange(),
                        referenced_name: name.to_string(),
                        context_kind: if name.eq_ignore_ascii_case("setTimer")
                            || name.eq_ignore_ascii_case("cancelTimer")
                        {
                            ReferenceContext::TimerSet
                        } else {
                            ReferenceContext::Call
                        },
                    });
                }
            }
            "field_expression" => {
                if let Some(name) = node
                    .child_with_name("field_identifier")
                    .and_then(|n| n.to_text(source))
                {
                    facts.references.push(Reference {
                        file: file_path.to_string(),
                        range: node.textrange(),
                        referenced_name: name.to_string(),
                        context_kind: ReferenceContext::MemberAccess,
                    });
                }
            }
            "assignment_expression" => {
                if let Some(lhs) = node.named_child(0).filter(|n| n.kind() == "identifier") {
                    facts.references.push(Reference {
                        file: file_path.to_string(),
                        range: lhs.textrange(),
                        referenced_name: lhs.to_text(source).unwrap_or_default().to_string(),
                        context_kind: ReferenceContext::Write,
                    });
                }
            }
            "identifier" => {
                // Bare identifier reads; calls/writes/member-accesses are
                // already captured above via their enclosing node kind, so
                // skip identifiers that are a direct child of one of those.
                if let Some(parent) = node.parent() {
                    if matches!(
                        parent.kind(),
                        "call_expression" | "field_expression" | "assignment_expression"
                    ) {
                        continue;
                    }
                }
                facts.references.push(Reference {
                    file: file_path.to_string(),
                    range: node.textrange(),
                    referenced_name: node.to_text(source).unwrap_or_default().to_string(),
                    context_kind: ReferenceContext::Read,
                });
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    #[test]
    fn extract_facts_records_scope_and_position_with_no_verdict() {
        let source = "void f() { write(\"hi\"); int x; }\n";
        let parsed = parser::parse(source).unwrap();
        let facts = extract_facts(parsed.tree.root_node(), source, "f.can");

        let x = facts
            .symbols
            .iter()
            .find(|s| s.name == "x")
            .expect("local `x` recorded as a symbol");
        assert_eq!(x.declared_in_scope, DeclaredScope::LocalBlock);
        assert_eq!(x.statements_before_in_block, 1);

        let top_level = "int g;\n";
        let parsed = parser::parse(top_level).unwrap();
        let facts = extract_facts(parsed.tree.root_node(), top_level, "g.can");
        let g = facts
            .symbols
            .iter()
            .find(|s| s.name == "g")
            .expect("top-level `g` recorded as a symbol");
        assert_eq!(g.declared_in_scope, DeclaredScope::TopLevel);
    }
}
