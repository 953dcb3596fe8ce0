//! C6: the auto-fix driver and the Collect-Remove-Insert helper it and
//! the placement rules share.

pub mod driver;
pub mod edits;

pub use driver::{lint_fix, FixReport};
