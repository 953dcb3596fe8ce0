//! The on-disk shape of `capl.toml`/`.capl.toml`: every field optional so a
//! partial file only overrides what it mentions. Decoding and merging
//! live here; the core never sees this type, only the `Settings` it is
//! translated into.

use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "snake_case")]
pub struct Options {
    pub indent_size: Option<usize>,
    pub line_length: Option<usize>,
    pub brace_style: Option<String>,
    pub quote_style: Option<String>,
    pub reorder_top_level: Option<bool>,
    pub enable_comment_features: Option<bool>,
    pub max_passes: Option<usize>,
    pub disabled_rules: Option<Vec<String>>,
    pub fix_only: Option<Vec<String>>,
    /// Directories searched, in order, for a quoted `#include "..."`
    /// target that doesn't resolve relative to the including file. Not
    /// part of the core's Config surface; it is what
    /// `capl_workspace::includes` needs to resolve the `Include` facts
    /// the core only records the literal text of.
    pub include_paths: Option<Vec<String>>,
}

impl Options {
    /// Merge `other` on top of `self`: every field `other` sets wins,
    /// everything else is kept. Used to layer a `--config` file's
    /// options over a discovered `capl.toml`.
    pub fn merge(self, other: Options) -> Options {
        Options {
            indent_size: other.indent_size.or(self.indent_size),
            line_length: other.line_length.or(self.line_length),
            brace_style: other.brace_style.or(self.brace_style),
            quote_style: other.quote_style.or(self.quote_style),
            reorder_top_level: other.reorder_top_level.or(self.reorder_top_level),
            enable_comment_features: other.enable_comment_features.or(self.enable_comment_features),
            max_passes: other.max_passes.or(self.max_passes),
            disabled_rules: other.disabled_rules.or(self.disabled_rules),
            fix_only: other.fix_only.or(self.fix_only),
            include_paths: other.include_paths.or(self.include_paths),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_the_overriding_side_field_by_field() {
        let base = Options {
            indent_size: Some(2),
            line_length: Some(100),
            ..Default::default()
        };
        let over = Options {
            line_length: Some(120),
            ..Default::default()
        };
        let merged = base.merge(over);
        assert_eq!(merged.indent_size, Some(2));
        assert_eq!(merged.line_length, Some(120));
    }

    #[test]
    fn unknown_key_is_a_decode_error_not_a_silent_ignore() {
        let err = toml::from_str::<Options>("not_a_real_key = 1").unwrap_err();
        assert!(err.to_string().contains("not_a_real_key") || err.to_string().contains("unknown field"));
    }
}
