//! Parses `--select`/`--fix-only`/`disabled_rules`-style rule selector
//! strings (`E001`, `E0`, `ALL`) into the set of rule ids they match
//! against a fixed catalog, without aborting on an id the catalog doesn't
//! recognise.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSelector {
    All,
    /// A whole category prefix, e.g. `E` or `W`.
    Category(char),
    /// A specific rule id, e.g. `E001`.
    Code(String),
}

impl fmt::Display for RuleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "ALL"),
            Self::Category(c) => write!(f, "{c}"),
            Self::Code(code) => write!(f, "{code}"),
        }
    }
}

impl FromStr for RuleSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        if trimmed.len() == 1 {
            if let Some(c) = trimmed.chars().next().filter(char::is_ascii_alphabetic) {
                return Ok(Self::Category(c.to_ascii_uppercase()));
            }
        }
        Ok(Self::Code(trimmed.to_ascii_uppercase()))
    }
}

impl RuleSelector {
    pub fn matches(&self, rule_id: &str) -> bool {
        match self {
            Self::All => true,
            Self::Category(c) => rule_id.starts_with(*c),
            Self::Code(code) => rule_id == code,
        }
    }
}

/// Expand a list of selector strings against `catalog`, returning the set
/// of matched rule ids and the subset of input strings that matched
/// nothing in the catalog (reported by the caller, never a hard error).
pub fn expand_selectors(selectors: &[String], catalog: &[&'static str]) -> (Vec<&'static str>, Vec<String>) {
    let mut matched = Vec::new();
    let mut unknown = Vec::new();
    for raw in selectors {
        let selector: RuleSelector = raw.parse().unwrap_or(RuleSelector::All);
        let hits: Vec<&'static str> = catalog
            .iter()
            .copied()
            .filter(|id| selector.matches(id))
            .collect();
        if hits.is_empty() {
            unknown.push(raw.clone());
        } else {
            matched.extend(hits);
        }
    }
    matched.sort_unstable();
    matched.dedup();
    (matched, unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &[&str] = &["E001", "E002", "E008", "W001"];

    #[test]
    fn category_selector_expands_to_its_prefix() {
        let (matched, unknown) = expand_selectors(&["E".to_string()], CATALOG);
        assert_eq!(matched, vec!["E001", "E002", "E008"]);
        assert!(unknown.is_empty());
    }

    #[test]
    fn unknown_code_is_reported_not_fatal() {
        let (matched, unknown) = expand_selectors(&["E999".to_string()], CATALOG);
        assert!(matched.is_empty());
        assert_eq!(unknown, vec!["E999".to_string()]);
    }

    #[test]
    fn all_selector_matches_everything() {
        let (matched, _) = expand_selectors(&["ALL".to_string()], CATALOG);
        assert_eq!(matched.len(), CATALOG.len());
    }
}
