//! Blocking external process execution with a timeout.

use std::ffi::OsStr;
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{ReqfixError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Run `program` with `args`, capturing both output streams.
///
/// With a timeout, the child is polled and killed once the limit passes;
/// that case is reported as [`ReqfixError::Timeout`]. Failing to start the
/// program is [`ReqfixError::OracleUnavailable`].
pub fn run_with_timeout<S: AsRef<OsStr>>(
    program: &str,
    args: &[S],
    timeout: Option<Duration>,
) -> Result<ProcessOutput> {
    log::debug!("Executing: {} {}", program, display_args(args));

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ReqfixError::OracleUnavailable {
            program: program.to_string(),
            reason: e.to_string(),
        })?;

    // Drain both pipes so a chatty child cannot block on a full buffer
    let stdout = child.stdout.take().map(spawn_reader);
    let stderr = child.stderr.take().map(spawn_reader);

    let start = Instant::now();

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if let Some(limit) = timeout {
                    if start.elapsed() > limit {
                        let _ = child.kill();
                        let _ = child.wait();
                        // Readers are left detached: grandchildren may still hold the pipes
                        return Err(ReqfixError::Timeout {
                            program: program.to_string(),
                            limit,
                        });
                    }
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ReqfixError::Io(e));
            }
        }
    };

    let output = ProcessOutput {
        success: status.success(),
        code: status.code(),
        stdout: join_reader(stdout),
        stderr: join_reader(stderr),
    };

    log::debug!(
        "{} exited with {:?} after {:?}",
        program,
        output.code,
        start.elapsed()
    );

    Ok(output)
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join_reader(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

fn display_args<S: AsRef<OsStr>>(args: &[S]) -> String {
    args.iter()
        .map(|a| a.as_ref().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a configured command into program and leading arguments.
pub fn split_command(command: &[String]) -> Result<(&str, &[String])> {
    match command.split_first() {
        Some((program, rest)) if !program.trim().is_empty() => Ok((program.as_str(), rest)),
        _ => Err(ReqfixError::Config("command is empty".to_string())),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_captures_streams_and_status() {
        let output = run_with_timeout(
            "sh",
            &["-c", "echo out; echo err >&2; exit 3"],
            Some(Duration::from_secs(10)),
        )
        .unwrap();
        assert!(!output.success);
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[test]
    fn test_success_without_timeout() {
        let output = run_with_timeout("sh", &["-c", "exit 0"], None).unwrap();
        assert!(output.success);
    }

    #[test]
    fn test_timeout_kills_child() {
        let start = Instant::now();
        let err = run_with_timeout("sh", &["-c", "sleep 5"], Some(Duration::from_millis(200)))
            .unwrap_err();
        assert!(matches!(&err, ReqfixError::Timeout { limit, .. } if *limit == Duration::from_millis(200)));
        assert_eq!(err.to_string(), "sh timed out after 200ms");
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_missing_program() {
        let err = run_with_timeout::<&str>("reqfix-no-such-program-xyz", &[], None).unwrap_err();
        assert!(matches!(err, ReqfixError::OracleUnavailable { .. }));
    }

    #[test]
    fn test_split_command() {
        let command = vec!["python3".to_string(), "-m".to_string(), "pip".to_string()];
        let (program, rest) = split_command(&command).unwrap();
        assert_eq!(program, "python3");
        assert_eq!(rest, &["-m".to_string(), "pip".to_string()]);
        assert!(split_command(&[]).is_err());
        assert!(split_command(&[" ".to_string()]).is_err());
    }
}
