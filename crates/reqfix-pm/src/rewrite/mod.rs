//! Pure constraint rewriters over a manifest.
//!
//! Neither rewriter performs I/O or mutates its input; each returns a new
//! manifest.

mod conflict_fix;
mod flexible;

pub use conflict_fix::{apply_conflict_fixes, ConflictFixRule, ConflictFixTable, BUILTIN_FIXES};
pub use flexible::{flexible_range, make_flexible};
