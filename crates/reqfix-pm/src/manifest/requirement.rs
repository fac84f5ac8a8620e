//! A single requirement line.

use lazy_static::lazy_static;
use regex::Regex;

use super::constraint::{Constraint, RangeConstraint, VersionPin};
use crate::util::normalize_package_name;

lazy_static! {
    static ref REQUIREMENT_RE: Regex =
        Regex::new(r"^([A-Za-z0-9][A-Za-z0-9._-]*)(\[[^\]]*\])?").unwrap();
}

/// A package requirement such as `requests[socks]==2.0.0 ; python_version >= "3.8"`.
///
/// `raw` is the line exactly as it appeared in the manifest. Lines that do
/// not start with a package name (pip options, bare URLs) are kept with
/// `named == false`, the whole trimmed line as `name`, and an opaque
/// constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    raw: String,
    name: String,
    extras: Option<String>,
    constraint: Constraint,
    marker: Option<String>,
    named: bool,
}

impl Requirement {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        let Some(caps) = REQUIREMENT_RE.captures(trimmed) else {
            return Self {
                raw: raw.to_string(),
                name: trimmed.to_string(),
                extras: None,
                constraint: Constraint::Opaque(trimmed.to_string()),
                marker: None,
                named: false,
            };
        };

        let whole = caps.get(0).map_or(0, |m| m.end());
        let rest = &trimmed[whole..];

        // Environment markers and inline comments ride along unchanged
        let (constraint_text, marker) = match rest.find([';', '#']) {
            Some(idx) => (&rest[..idx], Some(rest[idx..].trim_end().to_string())),
            None => (rest, None),
        };

        Self {
            raw: raw.to_string(),
            name: caps[1].to_string(),
            extras: caps.get(2).map(|m| m.as_str().to_string()),
            constraint: Constraint::parse(constraint_text),
            marker,
            named: true,
        }
    }

    /// Parse `raw` as the requirement for `package`, whatever name the text itself starts with.
    pub fn parse_for(raw: &str, package: &str) -> Self {
        let mut req = Self::parse(raw);
        req.name = package.to_string();
        req.named = true;
        req
    }

    /// Build a requirement from its parts; the raw text is rendered from them.
    pub fn from_parts(
        name: impl Into<String>,
        extras: Option<String>,
        constraint: Constraint,
        marker: Option<String>,
    ) -> Self {
        let name = name.into();
        let raw = render(&name, extras.as_deref(), &constraint, marker.as_deref());
        Self {
            raw,
            name,
            extras,
            constraint,
            marker,
            named: true,
        }
    }

    /// The line as written, including surrounding whitespace
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The line without surrounding whitespace
    pub fn text(&self) -> &str {
        self.raw.trim()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn normalized_name(&self) -> String {
        normalize_package_name(&self.name)
    }

    pub fn extras(&self) -> Option<&str> {
        self.extras.as_deref()
    }

    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    /// False for lines that did not match the requirement pattern
    pub fn is_named(&self) -> bool {
        self.named
    }

    pub fn as_pin(&self) -> Option<VersionPin> {
        match &self.constraint {
            Constraint::ExactPin(version) if self.named => Some(VersionPin {
                package: self.name.clone(),
                exact_version: version.clone(),
            }),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<RangeConstraint> {
        if !self.named {
            return None;
        }
        match &self.constraint {
            Constraint::MinBound(min) => Some(RangeConstraint {
                package: self.name.clone(),
                min_version: min.clone(),
                max_version_exclusive: None,
            }),
            Constraint::BoundedRange { min, max_exclusive } => Some(RangeConstraint {
                package: self.name.clone(),
                min_version: min.clone(),
                max_version_exclusive: Some(max_exclusive.clone()),
            }),
            _ => None,
        }
    }

    /// A new requirement for the same package with a different constraint.
    ///
    /// Extras and marker are kept, and so is a trailing `\r` of the original line.
    pub fn with_constraint(&self, constraint: Constraint) -> Self {
        let mut next = Self::from_parts(
            self.name.clone(),
            self.extras.clone(),
            constraint,
            self.marker.clone(),
        );
        if self.raw.ends_with('\r') {
            next.raw.push('\r');
        }
        next
    }

    /// Take over the extras, marker and trailing `\r` of `original` that this
    /// line does not spell out itself.
    pub fn inherit_tail(mut self, original: &Requirement) -> Self {
        let mut line = self.raw.trim_end().to_string();

        if self.extras.is_none() {
            if let Some(extras) = &original.extras {
                let name_end = REQUIREMENT_RE
                    .captures(line.trim_start())
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.end() + (line.len() - line.trim_start().len()));
                if let Some(idx) = name_end {
                    line.insert_str(idx, extras);
                    self.extras = Some(extras.clone());
                }
            }
        }

        if self.marker.is_none() {
            if let Some(marker) = &original.marker {
                line.push(' ');
                line.push_str(marker);
                self.marker = Some(marker.clone());
            }
        }

        if original.raw.ends_with('\r') {
            line.push('\r');
        }
        self.raw = line;
        self
    }
}

fn render(name: &str, extras: Option<&str>, constraint: &Constraint, marker: Option<&str>) -> String {
    let mut line = format!("{}{}{}", name, extras.unwrap_or(""), constraint);
    if let Some(marker) = marker {
        line.push(' ');
        line.push_str(marker);
    }
    line
}
