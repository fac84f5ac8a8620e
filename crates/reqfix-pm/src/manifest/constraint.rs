//! Version constraints attached to a requirement line.

use std::fmt;

use reqfix_semver::{SpecifierSet, Version};

/// The version part of a requirement, parsed once when the manifest is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// No version given (`flask`)
    Unconstrained,
    /// `==VERSION`
    ExactPin(String),
    /// `>=VERSION`
    MinBound(String),
    /// `>=MIN,<MAX`
    BoundedRange { min: String, max_exclusive: String },
    /// Anything else, kept as written (`~=1.4`, `!=2.0`, `@ https://...`)
    Opaque(String),
}

impl Constraint {
    /// Classify constraint text. Never fails: unknown shapes become `Opaque`.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Constraint::Unconstrained;
        }

        if let Some(rest) = text.strip_prefix(">=") {
            match rest.split_once(',') {
                None if is_version_token(rest) => {
                    return Constraint::MinBound(rest.trim().to_string());
                }
                Some((min, max)) => {
                    let max = max.trim();
                    if let Some(max) = max.strip_prefix('<').filter(|m| !m.starts_with('=')) {
                        if is_version_token(min) && is_version_token(max) {
                            return Constraint::BoundedRange {
                                min: min.trim().to_string(),
                                max_exclusive: max.trim().to_string(),
                            };
                        }
                    }
                }
                None => {}
            }
        }

        if let Some(rest) = text.strip_prefix("==").filter(|r| !r.starts_with('=')) {
            if is_version_token(rest) {
                return Constraint::ExactPin(rest.trim().to_string());
            }
        }

        Constraint::Opaque(text.to_string())
    }

    pub fn is_exact_pin(&self) -> bool {
        matches!(self, Constraint::ExactPin(_))
    }

    /// The constraint as a specifier set, if it can be read as one.
    pub fn to_specifiers(&self) -> Option<SpecifierSet> {
        SpecifierSet::parse(&self.to_string()).ok()
    }

    /// Whether `version` satisfies this constraint. `None` when the constraint
    /// cannot be evaluated (opaque text, non-PEP 440 versions).
    pub fn allows(&self, version: &Version) -> Option<bool> {
        self.to_specifiers().map(|set| set.matches(version))
    }
}

/// A single version token: non-empty, no whitespace, no commas.
fn is_version_token(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && !text.contains(char::is_whitespace) && !text.contains(',')
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Unconstrained => Ok(()),
            Constraint::ExactPin(version) => write!(f, "=={}", version),
            Constraint::MinBound(version) => write!(f, ">={}", version),
            Constraint::BoundedRange { min, max_exclusive } => {
                write!(f, ">={},<{}", min, max_exclusive)
            }
            Constraint::Opaque(text) => f.write_str(text),
        }
    }
}

/// An exact pin read from a requirement line (`numpy==2.3.1`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionPin {
    pub package: String,
    pub exact_version: String,
}

/// A floor with an optional exclusive ceiling (`numpy>=2.0.0,<2.3.0`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeConstraint {
    pub package: String,
    pub min_version: String,
    pub max_version_exclusive: Option<String>,
}

impl RangeConstraint {
    pub fn to_constraint(&self) -> Constraint {
        match &self.max_version_exclusive {
            Some(max) => Constraint::BoundedRange {
                min: self.min_version.clone(),
                max_exclusive: max.clone(),
            },
            None => Constraint::MinBound(self.min_version.clone()),
        }
    }
}

impl fmt::Display for RangeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.package, self.to_constraint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shapes() {
        assert_eq!(Constraint::parse(""), Constraint::Unconstrained);
        assert_eq!(Constraint::parse("==2.3.1"), Constraint::ExactPin("2.3.1".into()));
        assert_eq!(Constraint::parse("== 2.3.1"), Constraint::ExactPin("2.3.1".into()));
        assert_eq!(Constraint::parse(">=1.24.0"), Constraint::MinBound("1.24.0".into()));
        assert_eq!(
            Constraint::parse(">=2.0.0,<2.3.0"),
            Constraint::BoundedRange { min: "2.0.0".into(), max_exclusive: "2.3.0".into() }
        );
        assert_eq!(
            Constraint::parse(">=2.0.0 , <2.3.0"),
            Constraint::BoundedRange { min: "2.0.0".into(), max_exclusive: "2.3.0".into() }
        );
    }

    #[test]
    fn test_parse_opaque() {
        assert_eq!(Constraint::parse("~=1.4"), Constraint::Opaque("~=1.4".into()));
        assert_eq!(Constraint::parse("===1.0"), Constraint::Opaque("===1.0".into()));
        assert_eq!(Constraint::parse(">=1.0,<=2.0"), Constraint::Opaque(">=1.0,<=2.0".into()));
        assert_eq!(Constraint::parse("==1.0,!=1.0.1"), Constraint::Opaque("==1.0,!=1.0.1".into()));
        assert_eq!(Constraint::parse("<3"), Constraint::Opaque("<3".into()));
    }

    #[test]
    fn test_display_matches_parse() {
        for text in ["==2.3.1", ">=1.0", ">=2.0.0,<2.3.0", "~=1.4", ""] {
            assert_eq!(Constraint::parse(text).to_string(), text);
        }
    }

    #[test]
    fn test_allows() {
        let range = Constraint::parse(">=2.0.0,<2.3.0");
        assert_eq!(range.allows(&Version::parse("2.2.6").unwrap()), Some(true));
        assert_eq!(range.allows(&Version::parse("2.3.1").unwrap()), Some(false));
        assert_eq!(Constraint::Unconstrained.allows(&Version::parse("1").unwrap()), Some(true));
        assert_eq!(
            Constraint::parse("@ https://example.com/pkg.whl").allows(&Version::parse("1").unwrap()),
            None
        );
    }

    #[test]
    fn test_range_constraint_display() {
        let bounded = RangeConstraint {
            package: "numpy".into(),
            min_version: "2.0.0".into(),
            max_version_exclusive: Some("2.3.0".into()),
        };
        assert_eq!(bounded.to_string(), "numpy>=2.0.0,<2.3.0");

        let floor = RangeConstraint {
            package: "scipy".into(),
            min_version: "1.11.0".into(),
            max_version_exclusive: None,
        };
        assert_eq!(floor.to_string(), "scipy>=1.11.0");
    }
}
