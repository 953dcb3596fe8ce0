//! C4/C5: the rule trait contracts plus the concrete E-series/W-series
//! rules. Each rule is a value implementing a small capability set (id,
//! check, optional fix) — no reflection or plugin loading; the dispatch
//! enums below are a one-line-registration tagged list.

pub mod declarations;
pub mod error;
pub mod includes;
pub mod keywords;
pub mod semantic;
pub mod types;

use std::panic::{self, AssertUnwindSafe};

use ruff_text_size::{TextRange, TextSize};
use tree_sitter::{Node, Tree};

use crate::facts::FileFacts;
use crate::model::{Issue, Severity, Transformation};
use crate::registry::RULE_INTERNAL_ERROR;
use crate::settings::Settings;
use crate::store::SymbolStore;

/// Everything a node-scoped rule needs to inspect without owning it.
pub struct RuleContext<'a> {
    pub file_path: &'a str,
    pub source: &'a str,
    pub tree: &'a Tree,
    pub facts: &'a FileFacts,
    pub store: &'a SymbolStore,
    pub settings: &'a Settings,
    pub resolve_include: &'a dyn Fn(&str, &str) -> Option<String>,
}

/// Implemented by rules that act on individual AST nodes of a declared
/// set of entrypoint kinds.
/// `check` is pure with respect to file content; it may read the store
/// but must not mutate it. `fix` is a pure function of the issues it's
/// handed — it must not read global state.
pub trait AstLintRule {
    const ID: &'static str;

    fn entrypoints() -> &'static [&'static str];

    fn check(node: Node, ctx: &RuleContext) -> Vec<Issue>;

    fn fix(_ctx: &RuleContext, _issues: &[Issue]) -> Vec<Transformation> {
        Vec::new()
    }
}

/// Implemented by rules that reason over the whole project rather than a
/// single node (E011, E012, W001).
pub trait ProjectLintRule {
    const ID: &'static str;

    fn check(ctx: &RuleContext) -> Vec<Issue>;
}

/// Tagged dispatch over the node-scoped rules, in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AstRuleKind {
    ExternKeyword,
    ArrowOperator,
    FunctionDeclaration,
    GlobalTypeDefinition,
    VariableOutsideBlock,
    VariableMidBlock,
    MissingEnumKeyword,
    MissingStructKeyword,
    PointerParameter,
    SyntaxError,
}

impl AstRuleKind {
    pub fn id(self) -> &'static str {
        match self {
            Self::ExternKeyword => keywords::ExternKeyword::ID,
            Self::ArrowOperator => keywords::ArrowOperator::ID,
            Self::FunctionDeclaration => declarations::FunctionDeclaration::ID,
            Self::GlobalTypeDefinition => types::GlobalTypeDefinition::ID,
            Self::VariableOutsideBlock => declarations::VariableOutsideBlock::ID,
            Self::VariableMidBlock => declarations::VariableMidBlock::ID,
            Self::MissingEnumKeyword => types::MissingEnumKeyword::ID,
            Self::MissingStructKeyword => types::MissingStructKeyword::ID,
            Self::PointerParameter => types::PointerParameter::ID,
            Self::SyntaxError => error::SyntaxError::ID,
        }
    }

    pub fn entrypoints(self) -> &'static [&'static str] {
        match self {
            Self::ExternKeyword => keywords::ExternKeyword::entrypoints(),
            Self::ArrowOperator => keywords::ArrowOperator::entrypoints(),
            Self::FunctionDeclaration => declarations::FunctionDeclaration::entrypoints(),
            Self::GlobalTypeDefinition => types::GlobalTypeDefinition::entrypoints(),
            Self::VariableOutsideBlock => declarations::VariableOutsideBlock::entrypoints(),
            Self::VariableMidBlock => declarations::VariableMidBlock::entrypoints(),
            Self::MissingEnumKeyword => types::MissingEnumKeyword::entrypoints(),
            Self::MissingStructKeyword => types::MissingStructKeyword::entrypoints(),
            Self::PointerParameter => types::PointerParameter::entrypoints(),
            Self::SyntaxError => error::SyntaxError::entrypoints(),
        }
    }

    pub fn check(self, node: Node, ctx: &RuleContext) -> Vec<Issue> {
        match self {
            Self::ExternKeyword => keywords::ExternKeyword::check(node, ctx),
            Self::ArrowOperator => keywords::ArrowOperator::check(node, ctx),
            Self::FunctionDeclaration => declarations::FunctionDeclaration::check(node, ctx),
            Self::GlobalTypeDefinition => types::GlobalTypeDefinition::check(node, ctx),
            Self::VariableOutsideBlock => declarations::VariableOutsideBlock::check(node, ctx),
            Self::VariableMidBlock => declarations::VariableMidBlock::check(node, ctx),
            Self::MissingEnumKeyword => types::MissingEnumKeyword::check(node, ctx),
            Self::MissingStructKeyword => types::MissingStructKeyword::check(node, ctx),
            Self::PointerParameter => types::PointerParameter::check(node, ctx),
            Self::SyntaxError => error::SyntaxError::check(node, ctx),
        }
    }

    pub fn fix(self, ctx: &RuleContext, issues: &[Issue]) -> Vec<Transformation> {
        match self {
            Self::ExternKeyword => keywords::ExternKeyword::fix(ctx, issues),
            Self::ArrowOperator => keywords::ArrowOperator::fix(ctx, issues),
            Self::FunctionDeclaration => declarations::FunctionDeclaration::fix(ctx, issues),
            Self::GlobalTypeDefinition => types::GlobalTypeDefinition::fix(ctx, issues),
            Self::VariableOutsideBlock => declarations::VariableOutsideBlock::fix(ctx, issues),
            Self::VariableMidBlock => declarations::VariableMidBlock::fix(ctx, issues),
            Self::MissingEnumKeyword => types::MissingEnumKeyword::fix(ctx, issues),
            Self::MissingStructKeyword => types::MissingStructKeyword::fix(ctx, issues),
            Self::PointerParameter => types::PointerParameter::fix(ctx, issues),
            Self::SyntaxError => error::SyntaxError::fix(ctx, issues),
        }
    }
}

/// All node-scoped rules, in the same fixed order as `registry::ordered_rules`.
pub const AST_RULES: &[AstRuleKind] = &[
    AstRuleKind::ExternKeyword,
    AstRuleKind::ArrowOperator,
    AstRuleKind::FunctionDeclaration,
    AstRuleKind::GlobalTypeDefinition,
    AstRuleKind::VariableOutsideBlock,
    AstRuleKind::VariableMidBlock,
    AstRuleKind::MissingEnumKeyword,
    AstRuleKind::MissingStructKeyword,
    AstRuleKind::PointerParameter,
];

/// Tagged dispatch over the project-scoped rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectRuleKind {
    UndefinedSymbol,
    DuplicateFunction,
    CircularInclude,
}

impl ProjectRuleKind {
    pub fn id(self) -> &'static str {
        match self {
            Self::UndefinedSymbol => semantic::UndefinedSymbol::ID,
            Self::DuplicateFunction => semantic::DuplicateFunction::ID,
            Self::CircularInclude => includes::CircularInclude::ID,
        }
    }

    pub fn check(self, ctx: &RuleContext) -> Vec<Issue> {
        match self {
            Self::UndefinedSymbol => semantic::UndefinedSymbol::check(ctx),
            Self::DuplicateFunction => semantic::DuplicateFunction::check(ctx),
            Self::CircularInclude => includes::CircularInclude::check(ctx),
        }
    }
}

pub const PROJECT_RULES: &[ProjectRuleKind] = &[
    ProjectRuleKind::UndefinedSymbol,
    ProjectRuleKind::DuplicateFunction,
    ProjectRuleKind::CircularInclude,
];

/// Run `f`, catching a panic and converting it into a synthetic
/// `rule_internal_error` issue rather than letting it abort the pass
/// is
/// caught, converted to an internal issue... and does not abort other
/// rules").
fn guarded_check<F>(rule_id: &'static str, ctx: &RuleContext, at: TextRange, f: F) -> Vec<Issue>
where
    F: FnOnce() -> Vec<Issue>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(issues) => issues,
        Err(_) => vec![Issue {
            rule_id: RULE_INTERNAL_ERROR,
            severity: Severity::Error,
            file: ctx.file_path.to_string(),
            primary_range: at,
            message: format!("rule `{rule_id}` failed while checking this file"),
            auto_fixable: false,
            fix_hint: None,
        }],
    }
}

/// Walk every node in `tree` once, running each enabled AST rule whose
/// entrypoints match the node's kind: a map keyed by grammar node kind,
/// so a single walk dispatches to every rule interested in that kind
/// instead of each rule re-walking the tree.
pub fn run_ast_rules(ctx: &RuleContext, enabled: &[&str]) -> Vec<Issue> {
    use crate::ast::CaplNode;

    let mut entrypoint_map: rustc_hash::FxHashMap<&str, Vec<AstRuleKind>> = rustc_hash::FxHashMap::default();
    for rule in AST_RULES.iter().chain([&AstRuleKind::SyntaxError]) {
        if !enabled.contains(&rule.id()) && *rule != AstRuleKind::SyntaxError {
            continue;
        }
        for kind in rule.entrypoints() {
            entrypoint_map.entry(kind).or_default().push(*rule);
        }
    }

    let first_byte = TextRange::new(TextSize::from(0u32), TextSize::from(0u32));
    let mut issues = Vec::new();
    let root = ctx.tree.root_node();
    issues.extend(
        entrypoint_map
            .get(root.kind())
            .into_iter()
            .flatten()
            .flat_map(|rule| guarded_check(rule.id(), ctx, first_byte, || rule.check(root, ctx))),
    );
    for (node, _depth) in root.walk_from() {
        if let Some(rules) = entrypoint_map.get(node.kind()) {
            for rule in rules {
                issues.extend(guarded_check(rule.id(), ctx, first_byte, || rule.check(node, ctx)));
            }
        }
    }
    issues
}

pub fn run_project_rules(ctx: &RuleContext, enabled: &[&str]) -> Vec<Issue> {
    let first_byte = TextRange::new(TextSize::from(0u32), TextSize::from(0u32));
    PROJECT_RULES
        .iter()
        .filter(|rule| enabled.contains(&rule.id()))
        .flat_map(|rule| guarded_check(rule.id(), ctx, first_byte, || rule.check(ctx)))
        .collect()
}
