//! Resolves an `Include` fact's literal target text against real
//! filesystem paths. The core never touches the filesystem; it
//! hands `analyze`/`lint_fix` a `resolve_include: &dyn Fn(&str, &str) ->
//! Option<String>` closure, and this module is what the CLI constructs
//! that closure from.

use std::path::{Path, PathBuf};

use path_absolutize::Absolutize;

/// Resolve a quoted `#include "target"` seen in `including_file` against
/// (1) the including file's own directory, then (2) each configured
/// include search path, in order. Returns the canonical absolute path as
/// a string, or `None` if it resolves nowhere — a null `resolved_path`
/// for an unresolved include.
///
/// Angle-bracket includes never reach this function: `extract_facts`
/// already marks them `angle_bracket = true`, and
/// `SymbolStore::adjacency` skips them before `resolve` is ever called.
pub fn resolve(including_file: &str, target: &str, include_paths: &[PathBuf]) -> Option<String> {
    let including_dir = Path::new(including_file).parent().unwrap_or_else(|| Path::new("."));

    let candidate = including_dir.join(target);
    if candidate.is_file() {
        return absolutize(&candidate);
    }

    let resolved = include_paths
        .iter()
        .map(|dir| dir.join(target))
        .find(|candidate| candidate.is_file())
        .and_then(|candidate| absolutize(&candidate));

    if resolved.is_none() {
        log::debug!("{including_file}: could not resolve #include \"{target}\" against {} search path(s)", include_paths.len());
    }
    resolved
}

fn absolutize(path: &Path) -> Option<String> {
    path.absolutize().ok().map(|p| p.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn resolves_relative_to_the_including_file_first() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("util.cin");
        std::fs::File::create(&target).unwrap().write_all(b"").unwrap();

        let including_file = dir.path().join("main.can");
        let resolved = resolve(including_file.to_str().unwrap(), "util.cin", &[]);
        assert!(resolved.is_some());
    }

    #[test]
    fn falls_back_to_configured_include_paths() {
        let dir = tempdir().unwrap();
        let search_dir = dir.path().join("shared");
        std::fs::create_dir_all(&search_dir).unwrap();
        std::fs::File::create(search_dir.join("common.cin"))
            .unwrap()
            .write_all(b"")
            .unwrap();

        let including_file = dir.path().join("nested/main.can");
        let resolved = resolve(including_file.to_str().unwrap(), "common.cin", &[search_dir]);
        assert!(resolved.is_some());
    }

    #[test]
    fn unresolvable_target_is_none() {
        let resolved = resolve("main.can", "nowhere.cin", &[]);
        assert!(resolved.is_none());
    }
}
