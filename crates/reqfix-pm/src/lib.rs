//! Conflict-resolution engine for Python requirements manifests.
//!
//! A [`Manifest`] is rewritten by an ordered [`StrategyLadder`] until a
//! [`ResolutionOracle`] accepts one of the candidates. The upgrade pass
//! ([`upgrade_manifest`]) is a separate entry point that pins every
//! requirement to its newest published version.

pub mod artifact;
pub mod cli;
pub mod config;
pub mod error;
pub mod ladder;
pub mod manifest;
pub mod oracle;
pub mod process;
pub mod report;
pub mod rewrite;
pub mod template;
pub mod upgrade;
pub mod util;

pub use error::{ReqfixError, Result};
pub use ladder::{LadderObserver, LadderOutcome, Strategy, StrategyLadder, StrategyResult};
pub use manifest::{Constraint, Manifest, ManifestLine, RangeConstraint, Requirement, VersionPin};
pub use oracle::{PipOracle, Resolution, ResolutionOracle};
pub use report::{diff, diff_by_membership, diff_with_mode, Change, ChangeSummary, DiffMode};
pub use rewrite::{apply_conflict_fixes, make_flexible, ConflictFixRule, ConflictFixTable};
pub use upgrade::{upgrade_manifest, PipIndexLookup, Upgrade, UpgradeOutcome, VersionLookup};
pub use util::normalize_package_name;
