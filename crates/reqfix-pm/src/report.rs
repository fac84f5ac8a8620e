//! Human-readable changes between an original manifest and its rewrite.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::manifest::{Manifest, ManifestLine};
use crate::util::same_package;

/// A line that changed, `old → new`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub old: String,
    pub new: String,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.old, self.new)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffMode {
    /// Compare line `i` of the original with line `i` of the result
    #[default]
    Positional,
    /// Match changed lines to result lines by package name
    Membership,
}

impl FromStr for DiffMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "positional" => Ok(DiffMode::Positional),
            "membership" => Ok(DiffMode::Membership),
            other => Err(format!(
                "unknown diff mode '{}', expected 'positional' or 'membership'",
                other
            )),
        }
    }
}

impl fmt::Display for DiffMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffMode::Positional => f.write_str("positional"),
            DiffMode::Membership => f.write_str("membership"),
        }
    }
}

pub fn diff_with_mode(original: &Manifest, result: &Manifest, mode: DiffMode) -> Vec<Change> {
    match mode {
        DiffMode::Positional => diff(original, result),
        DiffMode::Membership => diff_by_membership(original, result),
    }
}

/// Index-aligned diff. Every rewriter preserves line count, so line `i` of
/// the result is the rewrite of line `i` of the original. Manifests of
/// different length fall back to [`diff_by_membership`].
pub fn diff(original: &Manifest, result: &Manifest) -> Vec<Change> {
    if original.len() != result.len() {
        return diff_by_membership(original, result);
    }

    original
        .lines()
        .iter()
        .zip(result.lines())
        .filter(|(old, new)| old.text() != new.text())
        .map(|(old, new)| Change {
            old: old.text().to_string(),
            new: new.text().to_string(),
        })
        .collect()
}

/// For each original line absent from the result, the first result line for
/// the same package. Lines with no counterpart are not reported.
pub fn diff_by_membership(original: &Manifest, result: &Manifest) -> Vec<Change> {
    let result_texts: HashSet<&str> = result.lines().iter().map(ManifestLine::text).collect();
    let mut seen = HashSet::new();
    let mut changes = Vec::new();

    for req in original.requirements() {
        if !req.is_named() || result_texts.contains(req.text()) || !seen.insert(req.text()) {
            continue;
        }

        let counterpart = result
            .requirements()
            .find(|candidate| candidate.is_named() && same_package(candidate.name(), req.name()));

        if let Some(counterpart) = counterpart {
            changes.push(Change {
                old: req.text().to_string(),
                new: counterpart.text().to_string(),
            });
        }
    }

    changes
}

/// A bounded listing of changes
#[derive(Debug, Clone, Copy)]
pub struct ChangeSummary<'a> {
    changes: &'a [Change],
    limit: usize,
}

impl<'a> ChangeSummary<'a> {
    pub const DEFAULT_LIMIT: usize = 10;

    pub fn new(changes: &'a [Change]) -> Self {
        Self::with_limit(changes, Self::DEFAULT_LIMIT)
    }

    pub fn with_limit(changes: &'a [Change], limit: usize) -> Self {
        Self { changes, limit }
    }

    pub fn shown(&self) -> &'a [Change] {
        &self.changes[..self.changes.len().min(self.limit)]
    }

    pub fn hidden(&self) -> usize {
        self.changes.len().saturating_sub(self.limit)
    }

    /// One line per shown change, then `... and N more changes` if any were cut
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.shown().iter().map(Change::to_string).collect();
        if self.hidden() > 0 {
            lines.push(format!("... and {} more changes", self.hidden()));
        }
        lines
    }
}

impl fmt::Display for ChangeSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "  {}", line)?;
        }
        Ok(())
    }
}
