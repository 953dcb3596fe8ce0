//! File discovery: the filesystem walking the core itself never does.
//! Gitignore-aware via `ignore::WalkBuilder`, trimmed to CAPL's two
//! extensions and no per-directory config resolution.

use std::path::{Path, PathBuf};

use anyhow::Result;
use ignore::WalkBuilder;
use path_absolutize::path_dedot;

pub const CAPL_EXTENSIONS: &[&str] = &["can", "cin"];

fn is_capl_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| CAPL_EXTENSIONS.iter().any(|capl_ext| ext.eq_ignore_ascii_case(capl_ext)))
}

/// Walk `paths` (files or directories), gitignore-aware, and return every
/// `.can`/`.cin` file found, sorted for deterministic output. A bare file
/// path is included even if it doesn't match the extension filter —
/// explicit arguments are never silently excluded.
pub fn discover(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for root in paths {
        if root.is_file() {
            out.push(root.clone());
            continue;
        }
        let mut builder = WalkBuilder::new(root);
        builder.hidden(false).standard_filters(true);
        for entry in builder.build() {
            let entry = entry?;
            if entry.file_type().is_some_and(|t| t.is_file()) && is_capl_file(entry.path()) {
                out.push(entry.path().to_path_buf());
            }
        }
    }
    out.sort();
    out.dedup();
    Ok(out)
}

/// Render `path` relative to the current working directory for display,
/// falling back to the absolute path when no relative form exists
/// (different filesystem roots on Windows, for instance).
pub fn relativize(path: &Path) -> String {
    let cwd = path_dedot::CWD.as_path();
    pathdiff::diff_paths(path, cwd)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn discover_finds_can_and_cin_files_and_skips_others() {
        let dir = tempdir().unwrap();
        std::fs::File::create(dir.path().join("a.can")).unwrap().write_all(b"").unwrap();
        std::fs::File::create(dir.path().join("b.cin")).unwrap().write_all(b"").unwrap();
        std::fs::File::create(dir.path().join("readme.md")).unwrap().write_all(b"").unwrap();

        let files = discover(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn discover_is_sorted_and_deduplicated() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.can");
        std::fs::File::create(&file).unwrap().write_all(b"").unwrap();

        let files = discover(&[file.clone(), file.clone()]).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn an_explicit_file_argument_is_kept_regardless_of_extension() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("weird.txt");
        std::fs::File::create(&file).unwrap().write_all(b"").unwrap();

        let files = discover(&[file.clone()]).unwrap();
        assert_eq!(files, vec![file]);
    }
}
