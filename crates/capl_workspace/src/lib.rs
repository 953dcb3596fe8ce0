//! The external collaborator that owns config-file discovery/decoding and
//! include-path resolution. Translates the documented Config surface
//! into `capl_linter::settings::Settings` and never the other way
//! around — the core has no notion of a TOML file.

pub mod configuration;
pub mod includes;
pub mod options;

pub use configuration::Configuration;
pub use options::Options;
