//! W001 `circular-include`: the only place a cycle in the include graph
//! has semantic meaning. Reported once per cycle, attached to the
//! lexicographically smallest member, naming every file in the cycle.

use itertools::Itertools;

use crate::model::{Issue, Severity};

use super::{ProjectLintRule, RuleContext};

pub struct CircularInclude;

impl ProjectLintRule for CircularInclude {
    const ID: &'static str = "W001";

    fn check(ctx: &RuleContext) -> Vec<Issue> {
        let cycles = ctx.store.include_cycles(ctx.resolve_include);
        cycles
            .into_iter()
            .filter(|cycle| cycle.anchor_file() == ctx.file_path)
            .map(|cycle| {
                let members = cycle.members.iter().sorted().join(", ");
                Issue {
                    rule_id: Self::ID,
                    severity: Severity::Warning,
                    file: ctx.file_path.to_string(),
                    primary_range: ctx
                        .facts
                        .includes
                        .first()
                        .map(|inc| inc.range)
                        .unwrap_or_default(),
                    message: format!("circular `#include` among: {members}"),
                    auto_fixable: false,
                    fix_hint: None,
                }
            })
            .collect()
    }
}
