//! Version specifiers such as `>=2.0.0,<2.3.0`

use std::fmt;
use thiserror::Error;

use crate::operator::Operator;
use crate::version::{Version, VersionError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecifierError {
    #[error("Missing operator in specifier \"{0}\"")]
    MissingOperator(String),
    #[error("Wildcards are only allowed with == and != in \"{0}\"")]
    MisplacedWildcard(String),
    #[error("~= needs at least two release segments in \"{0}\"")]
    CompatibleTooShort(String),
    #[error(transparent)]
    Version(#[from] VersionError),
}

/// A single `<operator><version>` clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSpecifier {
    operator: Operator,
    version: Version,
    wildcard: bool,
}

impl VersionSpecifier {
    /// Parse a clause like `>=1.2`, `==1.4.*` or `~=2.2`
    pub fn parse(input: &str) -> Result<Self, SpecifierError> {
        let trimmed = input.trim();
        let (operator, rest) = Operator::split_prefix(trimmed)
            .ok_or_else(|| SpecifierError::MissingOperator(trimmed.to_string()))?;
        let rest = rest.trim();

        let (version_text, wildcard) = match rest.strip_suffix(".*") {
            Some(prefix) => (prefix, true),
            None => (rest, false),
        };

        if wildcard && !matches!(operator, Operator::Equal | Operator::NotEqual) {
            return Err(SpecifierError::MisplacedWildcard(trimmed.to_string()));
        }

        let version = Version::parse(version_text)?;

        if operator == Operator::Compatible && version.release().len() < 2 {
            return Err(SpecifierError::CompatibleTooShort(trimmed.to_string()));
        }

        Ok(Self {
            operator,
            version,
            wildcard,
        })
    }

    /// Check whether a candidate version satisfies this clause
    pub fn matches(&self, candidate: &Version) -> bool {
        match self.operator {
            Operator::Equal if self.wildcard => {
                candidate.has_release_prefix(self.version.release())
            }
            Operator::NotEqual if self.wildcard => {
                !candidate.has_release_prefix(self.version.release())
            }
            Operator::Equal => candidate == &self.version,
            Operator::NotEqual => candidate != &self.version,
            Operator::LessThan => candidate < &self.version,
            Operator::LessThanOrEqual => candidate <= &self.version,
            Operator::GreaterThan => candidate > &self.version,
            Operator::GreaterThanOrEqual => candidate >= &self.version,
            Operator::Compatible => {
                let release = self.version.release();
                let prefix = &release[..release.len() - 1];
                candidate >= &self.version && candidate.has_release_prefix(prefix)
            }
            Operator::Arbitrary => {
                candidate.as_str().eq_ignore_ascii_case(self.version.as_str())
            }
        }
    }
}

impl fmt::Display for VersionSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.version)?;
        if self.wildcard {
            f.write_str(".*")?;
        }
        Ok(())
    }
}

/// A comma separated conjunction of specifiers. An empty set matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecifierSet {
    specifiers: Vec<VersionSpecifier>,
}

impl SpecifierSet {
    pub fn parse(input: &str) -> Result<Self, SpecifierError> {
        let specifiers = input
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(VersionSpecifier::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { specifiers })
    }

    pub fn matches(&self, candidate: &Version) -> bool {
        self.specifiers.iter().all(|s| s.matches(candidate))
    }

    pub fn is_empty(&self) -> bool {
        self.specifiers.is_empty()
    }
}

impl fmt::Display for SpecifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.specifiers.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join(","))
    }
}
