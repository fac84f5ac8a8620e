use crate::manifest::{Manifest, RangeConstraint, VersionPin};

/// Loosen an exact pin to a floor that keeps major.minor and frees the patch level.
///
/// `2.3.1` becomes `>=2.3.0`. Versions without two numeric leading
/// components are used as the floor unchanged.
pub fn flexible_range(pin: &VersionPin) -> RangeConstraint {
    let parts: Vec<&str> = pin.exact_version.split('.').collect();

    let min_version = match parts.as_slice() {
        [major, minor, ..] if is_numeric(major) && is_numeric(minor) => {
            format!("{}.{}.0", major, minor)
        }
        _ => pin.exact_version.clone(),
    };

    RangeConstraint {
        package: pin.package.clone(),
        min_version,
        max_version_exclusive: None,
    }
}

fn is_numeric(part: &str) -> bool {
    !part.is_empty() && part.chars().all(|c| c.is_ascii_digit())
}

/// Turn every exact pin in the manifest into a minimum-version constraint.
pub fn make_flexible(manifest: &Manifest) -> Manifest {
    manifest.map_requirements(|req| match req.as_pin() {
        Some(pin) => {
            let range = flexible_range(&pin);
            log::trace!("flexible: {} -> {}", req.text(), range);
            req.with_constraint(range.to_constraint())
        }
        None => req.clone(),
    })
}
