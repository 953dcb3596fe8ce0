//! The error taxonomy, surfaced as structured `Result` values at
//! component boundaries rather than raised across them. Only failures
//! the core itself cannot route around land here; rule and fix failures
//! are caught and turned into synthetic issues or discarded
//! transformations instead (see `rules::run_ast_rules` and `fix::driver`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// The grammar produced no tree at all. Fatal for the file, as
    /// opposed to a best-effort tree with `ERROR` subtrees, which is
    /// non-fatal parse degradation.
    #[error("failed to parse {file}")]
    ParseFailed {
        file: String,
        #[source]
        source: anyhow::Error,
    },

    /// I/O or integrity error in the persistence layer, fatal to the
    /// external caller.
    #[error("symbol store failure: {0}")]
    StoreFailure(String),

    /// Pass cap reached without a fixpoint. Not returned as an `Err` by
    /// `lint_fix`/`format` — both still hand back the best buffer they
    /// reached — but callers that want to treat it as fatal can match on
    /// `FixReport`/`FormatReport` and construct this for their own
    /// reporting.
    #[error("convergence not reached after {passes} passes")]
    ConvergenceFailure { passes: usize },
}
