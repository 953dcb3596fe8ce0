//! C4: the rule framework's registry half. Every rule advertises its
//! `rule_id`, a human slug, severity, and whether it is auto-fixable; the
//! registry enumerates rules in a fixed order (E-series before W-series;
//! within E, placement rules after keyword rules, so fixes don't compound
//! confusingly) and applies the active rule selection
//! (`disabled_rules`/`fix_only`).

use crate::model::Severity;
use crate::rule_selector::expand_selectors;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy)]
pub struct RuleMetadata {
    pub id: &'static str,
    pub slug: &'static str,
    pub severity: Severity,
    pub auto_fixable: bool,
    pub category: &'static str,
}

/// Fixed rule order: keyword rules, then placement rules, then the
/// remaining type/semantic rules in id order, then the W-series. This is
/// the literal order `ordered_rules()` returns; nothing downstream is
/// allowed to re-sort it.
const REGISTRY: &[RuleMetadata] = &[
    RuleMetadata {
        id: "E001",
        slug: "extern-keyword",
        severity: Severity::Error,
        auto_fixable: true,
        category: "keyword",
    },
    RuleMetadata {
        id: "E008",
        slug: "arrow-operator",
        severity: Severity::Error,
        auto_fixable: true,
        category: "keyword",
    },
    RuleMetadata {
        id: "E002",
        slug: "function-declaration",
        severity: Severity::Error,
        auto_fixable: true,
        category: "placement",
    },
    RuleMetadata {
        id: "E003",
        slug: "global-type-definition",
        severity: Severity::Error,
        auto_fixable: true,
        category: "placement",
    },
    RuleMetadata {
        id: "E006",
        slug: "variable-outside-block",
        severity: Severity::Error,
        auto_fixable: true,
        category: "placement",
    },
    RuleMetadata {
        id: "E007",
        slug: "variable-mid-block",
        severity: Severity::Error,
        auto_fixable: true,
        category: "placement",
    },
    RuleMetadata {
        id: "E004",
        slug: "missing-enum-keyword",
        severity: Severity::Error,
        auto_fixable: true,
        category: "type",
    },
    RuleMetadata {
        id: "E005",
        slug: "missing-struct-keyword",
        severity: Severity::Error,
        auto_fixable: true,
        category: "type",
    },
    RuleMetadata {
        id: "E009",
        slug: "pointer-parameter",
        severity: Severity::Error,
        auto_fixable: false,
        category: "type",
    },
    RuleMetadata {
        id: "E011",
        slug: "undefined-symbol",
        severity: Severity::Error,
        auto_fixable: false,
        category: "semantic",
    },
    RuleMetadata {
        id: "E012",
        slug: "duplicate-function",
        severity: Severity::Error,
        auto_fixable: false,
        category: "semantic",
    },
    RuleMetadata {
        id: "W001",
        slug: "circular-include",
        severity: Severity::Warning,
        auto_fixable: false,
        category: "include",
    },
];

/// Synthetic id for a rule's `check` raising internally; not
/// part of the selectable catalog.
pub const RULE_INTERNAL_ERROR: &str = "rule_internal_error";

pub fn ordered_rules() -> &'static [RuleMetadata] {
    REGISTRY
}

pub fn rule_ids() -> Vec<&'static str> {
    REGISTRY.iter().map(|r| r.id).collect()
}

pub fn metadata_for(rule_id: &str) -> Option<RuleMetadata> {
    REGISTRY.iter().copied().find(|r| r.id == rule_id)
}

/// The active, ordered rule selection for one analysis run, derived from
/// `Settings.disabled_rules`/`fix_only` plus any ad hoc `--select`
/// strings. Unknown selector strings are recorded, never fatal.
pub struct RuleTable {
    pub enabled: Vec<&'static str>,
    pub unknown_selectors: Vec<String>,
}

impl RuleTable {
    pub fn from_settings(settings: &Settings) -> Self {
        let catalog = rule_ids();
        let enabled = REGISTRY
            .iter()
            .filter(|r| settings.rule_enabled(r.id))
            .map(|r| r.id)
            .collect();
        let _ = catalog;
        Self {
            enabled,
            unknown_selectors: Vec::new(),
        }
    }

    /// Apply additional `--select`-style selector strings on top of the
    /// settings-derived table, recording any that matched nothing.
    pub fn with_selectors(settings: &Settings, selectors: &[String]) -> Self {
        let catalog = rule_ids();
        let (matched, unknown) = expand_selectors(selectors, &catalog);
        let enabled = matched
            .into_iter()
            .filter(|id| settings.rule_enabled(id))
            .collect();
        Self {
            enabled,
            unknown_selectors: unknown,
        }
    }

    pub fn is_enabled(&self, rule_id: &str) -> bool {
        self.enabled.contains(&rule_id)
    }
}
