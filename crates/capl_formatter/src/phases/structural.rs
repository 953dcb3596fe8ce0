//! Phase 2: structural convergence. Runs the six fixed-order structural
//! rules; whichever rule produces a transformation gets its change
//! applied and the buffer re-parsed before the next rule sees it. The
//! whole six-rule sweep repeats until nothing changes or the settings'
//! pass cap is hit.

use capl_linter::model::apply_transformations;
use capl_linter::parser;

use crate::rules::{FormatContext, STRUCTURAL_RULES};
use crate::FormatError;

pub fn apply(file_path: &str, source: &str, settings: &capl_linter::settings::Settings) -> Result<String, FormatError> {
    let mut current = source.to_string();

    for _pass in 0..settings.max_passes.max(1) {
        let mut changed_this_pass = false;

        for kind in STRUCTURAL_RULES {
            let parsed = parser::parse(&current).map_err(|source| FormatError::ParseFailed {
                file: file_path.to_string(),
                source,
            })?;
            let ctx = FormatContext {
                source: &current,
                tree: &parsed.tree,
                settings,
            };
            let transformations = kind.apply(&ctx);
            if transformations.is_empty() {
                continue;
            }
            let candidate = apply_transformations(&current, transformations);
            if candidate == current {
                continue;
            }
            current = candidate;
            changed_this_pass = true;
        }

        if !changed_this_pass {
            break;
        }
    }

    Ok(current)
}
