use indexmap::IndexMap;

use crate::error::{ReqfixError, Result};
use crate::manifest::{Manifest, Requirement};
use crate::util::same_package;

/// A known-bad constraint and the constraint that replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictFixRule {
    /// The constraint as it appears in a manifest, e.g. `numpy==2.3.1`
    pub constraint: String,
    /// The full replacement line, e.g. `numpy>=2.0.0,<2.3.0`
    pub replacement: String,
    /// Package name part of `constraint`, derived once when the rule is built
    pub prefix: String,
    /// Set when `constraint` is an `==` pin; the rule then only fires on pins
    pub pins_only: bool,
}

impl ConflictFixRule {
    pub fn new(constraint: impl Into<String>, replacement: impl Into<String>) -> Result<Self> {
        let constraint = constraint.into().trim().to_string();
        let replacement = replacement.into().trim().to_string();

        let prefix = derive_prefix(&constraint).ok_or_else(|| ReqfixError::InvalidRule {
            constraint: constraint.clone(),
            reason: "no package name before the version operator".to_string(),
        })?;
        let pins_only = Requirement::parse(&constraint).constraint().is_exact_pin();

        if replacement.is_empty() {
            return Err(ReqfixError::InvalidRule {
                constraint,
                reason: "replacement is empty".to_string(),
            });
        }

        Ok(Self {
            constraint,
            replacement,
            prefix,
            pins_only,
        })
    }

    /// Whether the rule fires on `req` by package name
    pub fn matches_package(&self, req: &Requirement) -> bool {
        same_package(&self.prefix, req.name()) && (!self.pins_only || req.constraint().is_exact_pin())
    }

    /// The replacement line for `original`. Its package name comes from the
    /// rule, not from re-parsing; the original marker and line ending are kept.
    pub fn apply(&self, original: &Requirement) -> Requirement {
        Requirement::parse_for(&self.replacement, &self.prefix).inherit_tail(original)
    }
}

/// Text before the first operator character, validated as a package name.
fn derive_prefix(constraint: &str) -> Option<String> {
    let head = constraint
        .split(['=', '>', '<', '!', '~'])
        .next()
        .unwrap_or_default()
        .trim();
    if head.is_empty() {
        return None;
    }
    let req = Requirement::parse(head);
    req.is_named().then(|| req.name().to_string())
}

/// Ordered conflict-fix knowledge table. Iteration order is the match order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictFixTable {
    rules: IndexMap<String, ConflictFixRule>,
}

/// `(constraint, replacement)` pairs shipped with reqfix
pub const BUILTIN_FIXES: &[(&str, &str)] = &[
    // OpenCV wheels are built against numpy < 2.3
    ("numpy==2.3.1", "numpy>=2.0.0,<2.3.0"),
    ("numpy==2.3.0", "numpy>=2.0.0,<2.3.0"),
    ("pillow>=11.3.0", "pillow>=10.0.0"),
    ("scipy>=1.16.0", "scipy>=1.11.0"),
];

impl ConflictFixTable {
    /// An empty table
    pub fn new() -> Self {
        Self {
            rules: IndexMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut table = Self::new();
        for (constraint, replacement) in BUILTIN_FIXES {
            // builtin rules all carry a package name
            if let Ok(rule) = ConflictFixRule::new(*constraint, *replacement) {
                table.rules.insert(rule.constraint.clone(), rule);
            }
        }
        table
    }

    /// Add a rule at the end of the table. Re-inserting a constraint replaces
    /// its replacement but keeps its position.
    pub fn insert(&mut self, constraint: &str, replacement: &str) -> Result<()> {
        let rule = ConflictFixRule::new(constraint, replacement)?;
        self.rules.insert(rule.constraint.clone(), rule);
        Ok(())
    }

    pub fn extend<'a, I>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (constraint, replacement) in pairs {
            self.insert(constraint, replacement)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConflictFixRule> {
        self.rules.values()
    }

    /// The rule that fires for a requirement: an exact match on the line text
    /// first, otherwise the first rule for the same package. `==` rules only
    /// match lines that are themselves exact pins.
    pub fn find(&self, req: &Requirement) -> Option<&ConflictFixRule> {
        if !req.is_named() {
            return None;
        }
        self.rules
            .get(req.text())
            .or_else(|| self.rules.values().find(|rule| rule.matches_package(req)))
    }
}

impl Default for ConflictFixTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Replace every requirement that matches a rule in `table`.
pub fn apply_conflict_fixes(manifest: &Manifest, table: &ConflictFixTable) -> Manifest {
    manifest.map_requirements(|req| match table.find(req) {
        Some(rule) => {
            log::trace!("conflict fix: {} -> {}", req.text(), rule.replacement);
            rule.apply(req)
        }
        None => req.clone(),
    })
}
