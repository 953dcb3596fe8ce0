//! C8: the formatter rules run by phase 2's structural-convergence loop.
//! Each rule is a value with an `id` and an
//! `apply` that inspects the current parse tree and emits
//! [`capl_linter::model::Transformation`]s — the same atomic rewrite
//! unit the linter's fixes use, so both components share one
//! byte-offset model and one `apply_transformations`/no-overlap
//! invariant.

pub mod block_expansion;
pub mod brace_style;
pub mod quote_normalization;
pub mod spacing;
pub mod statement_split;
pub mod switch_normalization;
pub mod top_level_ordering;

use capl_linter::model::Transformation;
use capl_linter::settings::Settings;
use tree_sitter::Tree;

/// Context every formatter rule sees: the current buffer and its tree,
/// plus the active settings (`indent_size`, `line_length`, ...).
pub struct FormatContext<'a> {
    pub source: &'a str,
    pub tree: &'a Tree,
    pub settings: &'a Settings,
}

/// A single structural-convergence rule. `apply` is run
/// against the *current* tree each iteration; after any rule produces
/// transformations, the engine re-parses before the next rule runs.
pub trait FormatRule {
    const NAME: &'static str;

    fn apply(ctx: &FormatContext) -> Vec<Transformation>;
}

/// Tagged dispatch over the structural rules, run in a fixed order:
/// `SpacingRule`, `BlockExpansionRule`, `StatementSplitRule`,
/// `BraceStyleRule`, `SwitchNormalizationRule`, `QuoteNormalizationRule`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralRuleKind {
    Spacing,
    BlockExpansion,
    StatementSplit,
    BraceStyle,
    SwitchNormalization,
    QuoteNormalization,
}

impl StructuralRuleKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Spacing => spacing::SpacingRule::NAME,
            Self::BlockExpansion => block_expansion::BlockExpansionRule::NAME,
            Self::StatementSplit => statement_split::StatementSplitRule::NAME,
            Self::BraceStyle => brace_style::BraceStyleRule::NAME,
            Self::SwitchNormalization => switch_normalization::SwitchNormalizationRule::NAME,
            Self::QuoteNormalization => quote_normalization::QuoteNormalizationRule::NAME,
        }
    }

    pub fn apply(self, ctx: &FormatContext) -> Vec<Transformation> {
        match self {
            Self::Spacing => spacing::SpacingRule::apply(ctx),
            Self::BlockExpansion => block_expansion::BlockExpansionRule::apply(ctx),
            Self::StatementSplit => statement_split::StatementSplitRule::apply(ctx),
            Self::BraceStyle => brace_style::BraceStyleRule::apply(ctx),
            Self::SwitchNormalization => switch_normalization::SwitchNormalizationRule::apply(ctx),
            Self::QuoteNormalization => quote_normalization::QuoteNormalizationRule::apply(ctx),
        }
    }
}

/// Fixed rule order for phase 2.
pub const STRUCTURAL_RULES: &[StructuralRuleKind] = &[
    StructuralRuleKind::Spacing,
    StructuralRuleKind::BlockExpansion,
    StructuralRuleKind::StatementSplit,
    StructuralRuleKind::BraceStyle,
    StructuralRuleKind::SwitchNormalization,
    StructuralRuleKind::QuoteNormalization,
];
