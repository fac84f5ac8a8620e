//! Release version handling for Python requirement manifests
//!
//! This crate provides version parsing, ordering, and specifier matching for the
//! subset of PEP 440 that shows up in `requirements.txt` files.

mod operator;
mod specifier;
mod version;

pub use operator::{InvalidOperatorError, Operator};
pub use specifier::{SpecifierError, SpecifierSet, VersionSpecifier};
pub use version::{Version, VersionError};
