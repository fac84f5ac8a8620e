use std::time::Duration;

use crate::error::{ReqfixError, Result};
use crate::oracle::DEFAULT_TIMEOUT_SECS;
use crate::process::{run_with_timeout, split_command};

/// Finds the newest published version of a package.
pub trait VersionLookup {
    fn latest_version(&self, package: &str) -> Result<String>;
}

impl<F> VersionLookup for F
where
    F: Fn(&str) -> Result<String>,
{
    fn latest_version(&self, package: &str) -> Result<String> {
        self(package)
    }
}

/// Lookup backed by `pip index versions`.
#[derive(Debug, Clone)]
pub struct PipIndexLookup {
    command: Vec<String>,
    timeout: Option<Duration>,
}

impl PipIndexLookup {
    pub fn new(command: Vec<String>, timeout: Option<Duration>) -> Self {
        Self { command, timeout }
    }
}

impl Default for PipIndexLookup {
    fn default() -> Self {
        Self::new(
            vec!["pip".to_string()],
            Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        )
    }
}

impl VersionLookup for PipIndexLookup {
    fn latest_version(&self, package: &str) -> Result<String> {
        let (program, leading) = split_command(&self.command)?;

        let mut args: Vec<&str> = leading.iter().map(String::as_str).collect();
        args.extend(["index", "versions", package]);

        let output = run_with_timeout(program, &args, self.timeout).map_err(|e| {
            ReqfixError::LookupMiss {
                package: package.to_string(),
                reason: e.to_string(),
            }
        })?;

        parse_available_versions(&output.stdout).ok_or_else(|| {
            let reason = output
                .stderr
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .unwrap_or("no versions listed")
                .to_string();
            ReqfixError::LookupMiss {
                package: package.to_string(),
                reason,
            }
        })
    }
}

/// First entry of the `Available versions:` line, which pip lists newest first.
pub fn parse_available_versions(stdout: &str) -> Option<String> {
    const MARKER: &str = "Available versions:";

    stdout
        .lines()
        .find_map(|line| line.split_once(MARKER).map(|(_, rest)| rest))
        .and_then(|rest| rest.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_available_versions() {
        let stdout = "numpy (2.3.1)\nAvailable versions: 2.3.1, 2.3.0, 2.2.6, 2.2.5\n  INSTALLED: 2.2.6\n  LATEST:    2.3.1\n";
        assert_eq!(parse_available_versions(stdout).as_deref(), Some("2.3.1"));
    }

    #[test]
    fn test_parse_single_version() {
        assert_eq!(
            parse_available_versions("Available versions: 0.1.0").as_deref(),
            Some("0.1.0")
        );
    }

    #[test]
    fn test_parse_missing_line() {
        assert_eq!(parse_available_versions(""), None);
        assert_eq!(parse_available_versions("ERROR: No matching distribution found"), None);
        assert_eq!(parse_available_versions("Available versions:   \n"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_pip_index_lookup_with_fake_command() {
        // `sh -c SCRIPT sh index versions PKG` puts the package in $3
        let lookup = PipIndexLookup::new(
            vec![
                "sh".into(),
                "-c".into(),
                "echo \"$3 (9.9.9)\"; echo \"Available versions: 9.9.9, 9.9.8\"".into(),
                "sh".into(),
            ],
            Some(Duration::from_secs(10)),
        );
        assert_eq!(lookup.latest_version("flask").unwrap(), "9.9.9");
    }

    #[cfg(unix)]
    #[test]
    fn test_pip_index_lookup_miss_carries_stderr() {
        let lookup = PipIndexLookup::new(
            vec![
                "sh".into(),
                "-c".into(),
                "echo 'ERROR: No matching distribution found for nope' >&2; exit 1".into(),
                "sh".into(),
            ],
            None,
        );
        match lookup.latest_version("nope") {
            Err(ReqfixError::LookupMiss { package, reason }) => {
                assert_eq!(package, "nope");
                assert!(reason.contains("No matching distribution"));
            }
            other => panic!("expected a lookup miss, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_program_is_a_miss() {
        let lookup = PipIndexLookup::new(vec!["reqfix-no-such-pip".into()], None);
        assert!(matches!(
            lookup.latest_version("flask"),
            Err(ReqfixError::LookupMiss { .. })
        ));
    }
}
