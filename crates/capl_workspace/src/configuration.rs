//! Config-file discovery and decoding — explicitly out of the core's scope
//! but owned here so the CLI never has to parse TOML itself. A flat
//! ancestor walk for a single file format, with no multi-package host
//! manifest to piggyback on.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use capl_linter::settings::{BraceStyle, QuoteStyle, Settings};
use rustc_hash::FxHashSet;

use crate::options::Options;

const CONFIG_FILE_NAMES: &[&str] = &[".capl.toml", "capl.toml"];

/// Return the path to `.capl.toml`/`capl.toml` in `dir`, if either exists.
/// `.capl.toml` wins when both are present (dotfile-first convention).
pub fn config_toml_in<P: AsRef<Path>>(dir: P) -> Option<PathBuf> {
    CONFIG_FILE_NAMES.iter().map(|name| dir.as_ref().join(name)).find(|p| p.is_file())
}

/// Walk `start`'s ancestors looking for a config file.
pub fn find_config_toml<P: AsRef<Path>>(start: P) -> Option<PathBuf> {
    start.as_ref().ancestors().find_map(config_toml_in)
}

fn parse_options_toml(path: &Path) -> Result<Options> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

/// One resolved configuration: the decoded `Options` plus where (if
/// anywhere) they came from.
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    pub options: Options,
    pub source: Option<PathBuf>,
}

impl Configuration {
    /// Load `.capl.toml`/`capl.toml` for `project_root`, or fall back to
    /// built-in defaults if neither is found. `--isolated` callers should
    /// skip this and use `Configuration::default()` directly.
    pub fn discover(project_root: &Path) -> Result<Self> {
        match find_config_toml(project_root) {
            Some(path) => {
                let options = parse_options_toml(&path)?;
                Ok(Self {
                    options,
                    source: Some(path),
                })
            }
            None => {
                log::debug!("no capl.toml/.capl.toml found above {}; using defaults", project_root.display());
                Ok(Self::default())
            }
        }
    }

    /// Load an explicit `--config <path>` file, bypassing discovery.
    pub fn from_explicit_path(path: &Path) -> Result<Self> {
        let options = parse_options_toml(path)?;
        Ok(Self {
            options,
            source: Some(path.to_path_buf()),
        })
    }

    /// Layer `cli_overrides` (e.g. `--select`/`--indent-size`) over this
    /// configuration's file-sourced options.
    pub fn with_overrides(mut self, cli_overrides: Options) -> Self {
        self.options = self.options.merge(cli_overrides);
        self
    }

    /// Translate the decoded `Options` into the core's `Settings`,
    /// applying every documented default for a field the file left
    /// unset. This is the only place a `brace_style`/`quote_style`
    /// string is parsed into its enum — the core never parses config
    /// text itself.
    pub fn to_settings(&self) -> Result<Settings> {
        let defaults = Settings::default();
        let brace_style = match self.options.brace_style.as_deref() {
            None => defaults.brace_style,
            Some("k&r") | Some("k_and_r") | Some("kandr") => BraceStyle::KAndR,
            Some(other) => {
                anyhow::bail!(
                    "unsupported brace_style {other:?}: only \"k&r\" is implemented"
                )
            }
        };
        let quote_style = match self.options.quote_style.as_deref() {
            None => defaults.quote_style,
            Some("double") => QuoteStyle::Double,
            Some(other) => anyhow::bail!("unsupported quote_style {other:?}: only \"double\" is implemented"),
        };

        Ok(Settings {
            indent_size: self.options.indent_size.unwrap_or(defaults.indent_size),
            line_length: self.options.line_length.unwrap_or(defaults.line_length),
            brace_style,
            quote_style,
            reorder_top_level: self.options.reorder_top_level.unwrap_or(defaults.reorder_top_level),
            enable_comment_features: self
                .options
                .enable_comment_features
                .unwrap_or(defaults.enable_comment_features),
            max_passes: self.options.max_passes.unwrap_or(defaults.max_passes),
            disabled_rules: self
                .options
                .disabled_rules
                .clone()
                .map(|v| v.into_iter().collect())
                .unwrap_or_default(),
            fix_only: self
                .options
                .fix_only
                .clone()
                .map(|v| v.into_iter().collect::<FxHashSet<_>>()),
        })
    }

    /// The include search path configured for this project, used by
    /// [`crate::includes::resolve`]. Relative entries are resolved
    /// against the directory the config file lives in (or the project
    /// root, for a synthesized default configuration).
    pub fn include_paths(&self, project_root: &Path) -> Vec<PathBuf> {
        let base = self
            .source
            .as_ref()
            .and_then(|p| p.parent())
            .unwrap_or(project_root);
        self.options
            .include_paths
            .iter()
            .flatten()
            .map(|p| base.join(p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn discover_finds_dotfile_over_plain_name() {
        let dir = tempdir().unwrap();
        std::fs::File::create(dir.path().join("capl.toml"))
            .unwrap()
            .write_all(b"line_length = 80\n")
            .unwrap();
        std::fs::File::create(dir.path().join(".capl.toml"))
            .unwrap()
            .write_all(b"line_length = 120\n")
            .unwrap();
        let config = Configuration::discover(dir.path()).unwrap();
        assert_eq!(config.options.line_length, Some(120));
    }

    #[test]
    fn discover_walks_up_to_an_ancestor_directory() {
        let dir = tempdir().unwrap();
        std::fs::File::create(dir.path().join("capl.toml"))
            .unwrap()
            .write_all(b"indent_size = 4\n")
            .unwrap();
        let nested = dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        let config = Configuration::discover(&nested).unwrap();
        assert_eq!(config.options.indent_size, Some(4));
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let config = Configuration::discover(dir.path()).unwrap();
        let settings = config.to_settings().unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn unsupported_brace_style_is_rejected_at_load_time() {
        let config = Configuration {
            options: Options {
                brace_style: Some("allman".to_string()),
                ..Default::default()
            },
            source: None,
        };
        assert!(config.to_settings().is_err());
    }

    #[test]
    fn cli_overrides_win_over_the_file() {
        let file = Configuration {
            options: Options {
                line_length: Some(100),
                ..Default::default()
            },
            source: None,
        };
        let merged = file.with_overrides(Options {
            line_length: Some(72),
            ..Default::default()
        });
        assert_eq!(merged.options.line_length, Some(72));
    }
}
