//! Line-oriented requirements manifest model.
//!
//! Parsing never fails: every line is classified as blank, comment, or
//! requirement, and each keeps its raw text so that serializing an
//! untouched manifest reproduces the input byte for byte.

mod constraint;
mod requirement;

pub use constraint::{Constraint, RangeConstraint, VersionPin};
pub use requirement::Requirement;

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// One line of a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestLine {
    Blank(String),
    Comment(String),
    Requirement(Requirement),
}

impl ManifestLine {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            ManifestLine::Blank(raw.to_string())
        } else if trimmed.starts_with('#') {
            ManifestLine::Comment(raw.to_string())
        } else {
            ManifestLine::Requirement(Requirement::parse(raw))
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            ManifestLine::Blank(raw) | ManifestLine::Comment(raw) => raw,
            ManifestLine::Requirement(req) => req.raw(),
        }
    }

    /// The line without surrounding whitespace
    pub fn text(&self) -> &str {
        self.raw().trim()
    }

    pub fn as_requirement(&self) -> Option<&Requirement> {
        match self {
            ManifestLine::Requirement(req) => Some(req),
            _ => None,
        }
    }
}

/// An ordered requirements manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    lines: Vec<ManifestLine>,
}

impl Manifest {
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(ManifestLine::parse).collect(),
        }
    }

    pub fn from_lines(lines: Vec<ManifestLine>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[ManifestLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Requirement lines in manifest order
    pub fn requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.lines.iter().filter_map(ManifestLine::as_requirement)
    }

    /// Build a new manifest by mapping every requirement line; other lines are copied.
    pub fn map_requirements<F>(&self, mut f: F) -> Manifest
    where
        F: FnMut(&Requirement) -> Requirement,
    {
        let lines = self
            .lines
            .iter()
            .map(|line| match line {
                ManifestLine::Requirement(req) => ManifestLine::Requirement(f(req)),
                other => other.clone(),
            })
            .collect();
        Manifest { lines }
    }

    /// Join the raw lines with `\n`
    pub fn serialize(&self) -> String {
        self.lines
            .iter()
            .map(ManifestLine::raw)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl FromStr for Manifest {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Manifest::parse(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# Web\nflask==3.0.0\n\n  # indented comment\nnumpy>=1.24.0,<2.3.0\n-r base.txt\nrequests\n";

    #[test]
    fn test_classifies_lines() {
        let manifest = Manifest::parse(SAMPLE);
        let kinds: Vec<&str> = manifest
            .lines()
            .iter()
            .map(|line| match line {
                ManifestLine::Blank(_) => "blank",
                ManifestLine::Comment(_) => "comment",
                ManifestLine::Requirement(_) => "requirement",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["comment", "requirement", "blank", "comment", "requirement", "requirement", "requirement", "blank"]
        );
    }

    #[test]
    fn test_roundtrip_is_byte_identical() {
        for text in [
            SAMPLE,
            "",
            "numpy==2.3.1\nrequests==2.0.0",
            "  flask == 1.0  \r\n\t\r\n# c\r\nscipy",
            "\n\n\n",
        ] {
            assert_eq!(Manifest::parse(text).serialize(), text);
        }
    }

    #[test]
    fn test_requirements_iterator() {
        let manifest = Manifest::parse(SAMPLE);
        let names: Vec<&str> = manifest.requirements().map(|r| r.name()).collect();
        assert_eq!(names, vec!["flask", "numpy", "-r base.txt", "requests"]);
    }

    #[test]
    fn test_map_requirements_leaves_other_lines() {
        let manifest = Manifest::parse("# keep\nflask==3.0.0\n");
        let mapped = manifest.map_requirements(|req| req.with_constraint(Constraint::Unconstrained));
        assert_eq!(mapped.serialize(), "# keep\nflask\n");
        assert_eq!(manifest.serialize(), "# keep\nflask==3.0.0\n");
    }

    #[test]
    fn test_display_and_from_str() {
        let manifest: Manifest = "a==1\nb".parse().unwrap();
        assert_eq!(manifest.to_string(), "a==1\nb");
        assert_eq!(manifest.len(), 2);
    }
}
