//! Rewrite every requirement to pin the newest published version.

mod lookup;

pub use lookup::{parse_available_versions, PipIndexLookup, VersionLookup};

use reqfix_semver::Version;
use serde::Serialize;

use crate::manifest::{Constraint, Manifest, Requirement};

/// One requirement that was moved to a newer pin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Upgrade {
    pub package: String,
    /// The previously pinned version, if the line was an exact pin
    pub from: Option<String>,
    pub to: String,
    /// The new pin falls outside the range the line declared before
    pub leaves_range: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeOutcome {
    pub manifest: Manifest,
    pub upgrades: Vec<Upgrade>,
    /// Packages whose latest version could not be found; their lines are unchanged
    pub misses: Vec<String>,
}

/// Pin every named requirement to the version `lookup` reports as newest.
///
/// Comments, blanks and unnamed lines are copied. A lookup failure leaves
/// the line as it was and records the package in `misses`.
pub fn upgrade_manifest(manifest: &Manifest, lookup: &dyn VersionLookup) -> UpgradeOutcome {
    let mut upgrades = Vec::new();
    let mut misses = Vec::new();

    let upgraded = manifest.map_requirements(|req| {
        if !req.is_named() {
            return req.clone();
        }

        let latest = match lookup.latest_version(req.name()) {
            Ok(latest) => latest,
            Err(e) => {
                log::warn!("Keeping {}: {}", req.text(), e);
                misses.push(req.name().to_string());
                return req.clone();
            }
        };

        let from = req.as_pin().map(|pin| pin.exact_version);
        if from.as_deref() == Some(latest.as_str()) {
            log::debug!("{} is already at {}", req.name(), latest);
            return req.clone();
        }

        upgrades.push(Upgrade {
            package: req.name().to_string(),
            from,
            leaves_range: leaves_range(req, &latest),
            to: latest.clone(),
        });
        req.with_constraint(Constraint::ExactPin(latest))
    });

    UpgradeOutcome {
        manifest: upgraded,
        upgrades,
        misses,
    }
}

/// Whether `latest` violates a floor, ceiling or other declared specifier.
/// Exact pins are always left behind by an upgrade, so they never count.
fn leaves_range(req: &Requirement, latest: &str) -> bool {
    if matches!(req.constraint(), Constraint::ExactPin(_) | Constraint::Unconstrained) {
        return false;
    }
    let Ok(version) = Version::parse(latest) else {
        return false;
    };
    req.constraint().allows(&version) == Some(false)
}
