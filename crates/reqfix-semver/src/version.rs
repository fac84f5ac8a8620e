//! Release version parsing and ordering

use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

lazy_static! {
    static ref VERSION_RE: Regex = Regex::new(
        r"(?x)
        ^v?
        (?:(?P<epoch>\d+)!)?
        (?P<release>\d+(?:\.\d+)*)
        (?:[-_.]?(?P<pre_l>alpha|beta|preview|pre|rc|a|b|c)[-_.]?(?P<pre_n>\d+)?)?
        (?P<post>-(?P<post_n1>\d+)|[-_.]?(?:post|rev|r)[-_.]?(?P<post_n2>\d+)?)?
        (?P<dev>[-_.]?dev[-_.]?(?P<dev_n>\d+)?)?
        (?:\+[a-z0-9]+(?:[-_.][a-z0-9]+)*)?
        $"
    )
    .unwrap();
}

/// Error type for version parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version string \"{0}\"")]
    InvalidVersion(String),
    #[error("Version component out of range in \"{0}\"")]
    Overflow(String),
}

/// Pre-release phases, in ascending order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum PreReleaseKind {
    Alpha,
    Beta,
    ReleaseCandidate,
}

impl PreReleaseKind {
    fn from_label(label: &str) -> Self {
        match label {
            "a" | "alpha" => PreReleaseKind::Alpha,
            "b" | "beta" => PreReleaseKind::Beta,
            _ => PreReleaseKind::ReleaseCandidate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PreRelease {
    kind: PreReleaseKind,
    number: u64,
}

/// A parsed release version such as `2.3.1`, `1.0rc2` or `2024.1.post1`.
///
/// Ordering follows the release segments (missing trailing segments count as
/// zero), then dev releases, pre-releases, the final release, and post
/// releases. Local version labels (`+cpu`) are accepted and ignored.
#[derive(Debug, Clone)]
pub struct Version {
    original: String,
    epoch: u64,
    release: Vec<u64>,
    pre: Option<PreRelease>,
    post: Option<u64>,
    dev: Option<u64>,
}

impl Version {
    /// Parse a version string
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        let lowered = trimmed.to_lowercase();
        let caps = VERSION_RE
            .captures(&lowered)
            .ok_or_else(|| VersionError::InvalidVersion(trimmed.to_string()))?;

        let number = |s: &str| -> Result<u64, VersionError> {
            s.parse::<u64>()
                .map_err(|_| VersionError::Overflow(trimmed.to_string()))
        };

        let epoch = match caps.name("epoch") {
            Some(m) => number(m.as_str())?,
            None => 0,
        };

        let release = caps["release"]
            .split('.')
            .map(|part| number(part))
            .collect::<Result<Vec<_>, _>>()?;

        let pre = match caps.name("pre_l") {
            Some(label) => Some(PreRelease {
                kind: PreReleaseKind::from_label(label.as_str()),
                number: match caps.name("pre_n") {
                    Some(n) => number(n.as_str())?,
                    None => 0,
                },
            }),
            None => None,
        };

        // A marker without a number (`1.0.post`, `1.0.dev`) means number 0
        let post = match (caps.name("post_n1"), caps.name("post_n2")) {
            (Some(n), _) | (None, Some(n)) => Some(number(n.as_str())?),
            (None, None) => caps.name("post").map(|_| 0),
        };

        let dev = match caps.name("dev_n") {
            Some(n) => Some(number(n.as_str())?),
            None => caps.name("dev").map(|_| 0),
        };

        Ok(Self {
            original: trimmed.to_string(),
            epoch,
            release,
            pre,
            post,
            dev,
        })
    }

    /// Release segments, e.g. `[2, 3, 1]` for `2.3.1`
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// The version text as it was given
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// True when `self` starts with all release segments of `prefix`
    pub fn has_release_prefix(&self, prefix: &[u64]) -> bool {
        prefix
            .iter()
            .enumerate()
            .all(|(i, seg)| self.release.get(i).copied().unwrap_or(0) == *seg)
    }

    fn compare_release(&self, other: &Self) -> Ordering {
        let len = self.release.len().max(other.release.len());
        for i in 0..len {
            let a = self.release.get(i).copied().unwrap_or(0);
            let b = other.release.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }

    // A bare dev release sorts before every pre-release of the same release.
    fn pre_key(&self) -> (i8, u64) {
        match (self.pre, self.post, self.dev) {
            (Some(pre), _, _) => (pre.kind as i8, pre.number),
            (None, None, Some(_)) => (-1, 0),
            _ => (3, 0),
        }
    }

    fn post_key(&self) -> (i8, u64) {
        match self.post {
            Some(n) => (1, n),
            None => (0, 0),
        }
    }

    fn dev_key(&self) -> (i8, u64) {
        match self.dev {
            Some(n) => (0, n),
            None => (1, 0),
        }
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| self.compare_release(other))
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            .then_with(|| self.post_key().cmp(&other.post_key()))
            .then_with(|| self.dev_key().cmp(&other.dev_key()))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl std::str::FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}
