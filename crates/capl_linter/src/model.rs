//! The core data model shared by every rule and driver: `Issue` and
//! `Transformation`. Both are plain values — no rule ever holds a live
//! reference into another rule's output.

use ruff_text_size::TextRange;
use strum_macros::{Display, EnumString};

/// A rule's fixed attribute, never a user preference. `Display` and
/// `EnumString` back the CLI's text/JSON report rendering and
/// `--severity`-style filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Style,
}

#[derive(Debug, Clone)]
pub struct Issue {
    pub rule_id: &'static str,
    pub severity: Severity,
    pub file: String,
    pub primary_range: TextRange,
    pub message: String,
    pub auto_fixable: bool,
    pub fix_hint: Option<String>,
}

/// The atomic unit every rewrite emits: "within `[start_byte, end_byte)`,
/// replace with exactly `replacement_bytes`".
#[derive(Debug, Clone)]
pub struct Transformation {
    pub start_byte: usize,
    pub end_byte: usize,
    pub replacement_bytes: String,
    pub priority: i32,
    pub originating_rule_id: &'static str,
}

impl Transformation {
    pub fn deletion(start_byte: usize, end_byte: usize, rule_id: &'static str) -> Self {
        Self {
            start_byte,
            end_byte,
            replacement_bytes: String::new(),
            priority: 0,
            originating_rule_id: rule_id,
        }
    }

    pub fn insertion(at_byte: usize, text: String, rule_id: &'static str) -> Self {
        Self {
            start_byte: at_byte,
            end_byte: at_byte,
            replacement_bytes: text,
            priority: 0,
            originating_rule_id: rule_id,
        }
    }

    pub fn replacement(start_byte: usize, end_byte: usize, text: String, rule_id: &'static str) -> Self {
        Self {
            start_byte,
            end_byte,
            replacement_bytes: text,
            priority: 0,
            originating_rule_id: rule_id,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Apply a set of non-overlapping transformations to `source`, in
/// descending start-byte order. Panics if two transformations'
/// `[start, end)` intervals overlap — that's always an implementation
/// bug upstream, not a recoverable case.
pub fn apply_transformations(source: &str, mut transformations: Vec<Transformation>) -> String {
    transformations.sort_by_key(|t| (t.start_byte, t.priority));
    for pair in transformations.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            a.end_byte <= b.start_byte,
            "overlapping transformations from {} and {}: [{}, {}) vs [{}, {})",
            a.originating_rule_id,
            b.originating_rule_id,
            a.start_byte,
            a.end_byte,
            b.start_byte,
            b.end_byte
        );
    }

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0usize;
    for t in &transformations {
        out.push_str(&source[cursor..t.start_byte]);
        out.push_str(&t.replacement_bytes);
        cursor = t.end_byte;
    }
    out.push_str(&source[cursor..]);
    out
}
