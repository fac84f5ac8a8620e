//! Operator types for version specifiers

use std::fmt;
use thiserror::Error;

/// Comparison operators allowed in a version specifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equal (==)
    Equal,
    /// Not equal (!=)
    NotEqual,
    /// Less than (<)
    LessThan,
    /// Less than or equal (<=)
    LessThanOrEqual,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal (>=)
    GreaterThanOrEqual,
    /// Compatible release (~=)
    Compatible,
    /// Arbitrary string equality (===)
    Arbitrary,
}

#[derive(Error, Debug)]
#[error("Invalid operator: {0}")]
pub struct InvalidOperatorError(pub String);

impl Operator {
    /// Parse operator from string
    pub fn from_str(s: &str) -> Result<Self, InvalidOperatorError> {
        match s {
            "==" => Ok(Operator::Equal),
            "!=" => Ok(Operator::NotEqual),
            "<" => Ok(Operator::LessThan),
            "<=" => Ok(Operator::LessThanOrEqual),
            ">" => Ok(Operator::GreaterThan),
            ">=" => Ok(Operator::GreaterThanOrEqual),
            "~=" => Ok(Operator::Compatible),
            "===" => Ok(Operator::Arbitrary),
            _ => Err(InvalidOperatorError(s.to_string())),
        }
    }

    /// Get the string representation of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::Compatible => "~=",
            Operator::Arbitrary => "===",
        }
    }

    /// Split a leading operator off a specifier string.
    ///
    /// Longer operators are tried first so `===` wins over `==` and `>=` over `>`.
    pub fn split_prefix(s: &str) -> Option<(Self, &str)> {
        for op in Self::supported_operators() {
            if let Some(rest) = s.strip_prefix(op) {
                // supported_operators only lists parseable strings
                return Self::from_str(op).ok().map(|parsed| (parsed, rest));
            }
        }
        None
    }

    /// Get all supported operators, longest first
    pub fn supported_operators() -> &'static [&'static str] {
        &["===", "==", "!=", "<=", ">=", "~=", "<", ">"]
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_roundtrips_as_str() {
        for op in Operator::supported_operators() {
            let parsed = Operator::from_str(op).unwrap();
            assert_eq!(parsed.as_str(), *op);
        }
    }

    #[test]
    fn test_invalid_operator() {
        assert!(Operator::from_str("=>").is_err());
        assert!(Operator::from_str("=").is_err());
    }

    #[test]
    fn test_split_prefix_prefers_longest() {
        assert_eq!(Operator::split_prefix("===1.0"), Some((Operator::Arbitrary, "1.0")));
        assert_eq!(Operator::split_prefix("==1.0"), Some((Operator::Equal, "1.0")));
        assert_eq!(Operator::split_prefix(">=2"), Some((Operator::GreaterThanOrEqual, "2")));
        assert_eq!(Operator::split_prefix(">2"), Some((Operator::GreaterThan, "2")));
        assert_eq!(Operator::split_prefix("1.0"), None);
    }
}
