//! Resolution oracle: the authority on whether a manifest is installable.

mod pip;

pub use pip::{PipOracle, DEFAULT_TIMEOUT_SECS};

/// Outcome of asking a resolver about one candidate manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub success: bool,
    pub stderr: String,
    pub stdout: String,
}

impl Resolution {
    pub fn passed(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stderr: String::new(),
            stdout: stdout.into(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stderr: stderr.into(),
            stdout: String::new(),
        }
    }

    /// The text that explains the outcome: stderr, or stdout when stderr is empty
    pub fn diagnostic(&self) -> &str {
        if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

/// Answers whether a manifest resolves.
///
/// Implementations never fail: any error running the resolver is reported
/// as an unsuccessful [`Resolution`].
pub trait ResolutionOracle {
    fn test_resolves(&self, manifest_text: &str) -> Resolution;
}

impl<F> ResolutionOracle for F
where
    F: Fn(&str) -> Resolution,
{
    fn test_resolves(&self, manifest_text: &str) -> Resolution {
        self(manifest_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_prefers_stderr() {
        let resolution = Resolution {
            success: false,
            stderr: "ERROR: ResolutionImpossible".into(),
            stdout: "Collecting numpy".into(),
        };
        assert_eq!(resolution.diagnostic(), "ERROR: ResolutionImpossible");

        let resolution = Resolution {
            success: false,
            stderr: "\n".into(),
            stdout: "Would install numpy-2.2.6".into(),
        };
        assert_eq!(resolution.diagnostic(), "Would install numpy-2.2.6");
    }

    #[test]
    fn test_closure_oracle() {
        let oracle = |text: &str| {
            if text.contains("numpy==2.3.1") {
                Resolution::failed("conflict")
            } else {
                Resolution::passed("")
            }
        };
        assert!(!oracle.test_resolves("numpy==2.3.1").success);
        assert!(oracle.test_resolves("numpy>=2.0.0,<2.3.0").success);
    }
}
