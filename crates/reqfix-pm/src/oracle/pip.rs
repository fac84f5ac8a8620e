use std::ffi::OsString;
use std::io::Write;
use std::time::Duration;

use super::{Resolution, ResolutionOracle};
use crate::error::Result;
use crate::process::{run_with_timeout, split_command};

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Oracle backed by `pip install --dry-run`.
#[derive(Debug, Clone)]
pub struct PipOracle {
    command: Vec<String>,
    timeout: Option<Duration>,
}

impl PipOracle {
    /// `command` is the program followed by any leading arguments,
    /// e.g. `["python3", "-m", "pip"]`. A `None` timeout waits forever.
    pub fn new(command: Vec<String>, timeout: Option<Duration>) -> Self {
        Self { command, timeout }
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn try_resolve(&self, manifest_text: &str) -> Result<Resolution> {
        let (program, leading) = split_command(&self.command)?;

        // Removed when `candidate` drops, whichever way this returns
        let mut candidate = tempfile::Builder::new()
            .prefix("reqfix-")
            .suffix(".txt")
            .tempfile()?;
        candidate.write_all(manifest_text.as_bytes())?;
        candidate.flush()?;

        let mut args: Vec<OsString> = leading.iter().map(OsString::from).collect();
        args.push("install".into());
        args.push("--dry-run".into());
        args.push("-r".into());
        args.push(candidate.path().as_os_str().to_os_string());

        let output = run_with_timeout(program, &args, self.timeout)?;

        Ok(Resolution {
            success: output.success,
            stderr: output.stderr,
            stdout: output.stdout,
        })
    }
}

impl Default for PipOracle {
    fn default() -> Self {
        Self::new(
            vec!["pip".to_string()],
            Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        )
    }
}

impl ResolutionOracle for PipOracle {
    fn test_resolves(&self, manifest_text: &str) -> Resolution {
        match self.try_resolve(manifest_text) {
            Ok(resolution) => resolution,
            Err(e) => {
                log::debug!("Resolver failed to run: {}", e);
                Resolution::failed(e.to_string())
            }
        }
    }
}
