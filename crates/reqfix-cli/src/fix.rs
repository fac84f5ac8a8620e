//! Fix command - find a resolvable variant of a requirements file.

use anyhow::{Context, Result};
use clap::Args;
use indicatif::ProgressBar;
use serde::Serialize;
use std::path::{Path, PathBuf};

use reqfix_pm::artifact::{derived_output_path, read_manifest, write_manifest, COMPATIBLE_SUFFIX};
use reqfix_pm::cli::{Output, ProgressManager};
use reqfix_pm::config::Config;
use reqfix_pm::{
    diff_with_mode, Change, ChangeSummary, DiffMode, LadderObserver, LadderOutcome, Strategy,
    StrategyLadder, StrategyResult,
};

use crate::config::{self, ConfigOverrides};

#[derive(Args, Debug, Clone, Default)]
pub struct FixArgs {
    /// Requirements file to fix
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Where to save the result (default: <FILE>-compatible.txt)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Show what would change, but do not write anything
    #[arg(long)]
    pub dry_run: bool,

    /// How changed lines are paired in the report (positional, membership)
    #[arg(long, value_name = "MODE")]
    pub diff: Option<DiffMode>,

    /// Seconds to wait for each resolver run, 0 waits forever
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Resolver command, e.g. "python3 -m pip"
    #[arg(long, value_name = "COMMAND")]
    pub resolver: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
enum FixStatus {
    AlreadyCompatible,
    Fixed,
    Failed,
}

#[derive(Serialize)]
struct FixReport<'a> {
    file: &'a Path,
    status: FixStatus,
    strategy: Option<&'static str>,
    output: Option<&'a Path>,
    changes: &'a [Change],
    attempts: &'a [StrategyResult],
}

/// Prints one line per attempt and keeps a spinner up while the resolver runs
struct AttemptReporter<'a> {
    output: &'a Output,
    progress: &'a ProgressManager,
    spinner: Option<ProgressBar>,
}

impl LadderObserver for AttemptReporter<'_> {
    fn attempt_started(&mut self, strategy: Strategy) {
        let message = format!("Testing: {}", strategy);
        if !self.progress.is_enabled() {
            self.output.verbose(&message);
        }
        self.spinner = Some(self.progress.create_spinner(&message));
    }

    fn attempt_finished(&mut self, result: &StrategyResult) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }

        self.output.attempt(result.strategy.description(), result.success);
        if !result.success {
            if let Some(details) = result.conflict_details() {
                self.output.detail("Conflict details:", details);
            }
            self.output.debug(result.diagnostic.trim());
        }
    }
}

pub fn execute(args: FixArgs, output: &Output) -> Result<i32> {
    let config = config::load_from_cwd(&ConfigOverrides {
        resolver: args.resolver.clone(),
        timeout: args.timeout,
        diff: args.diff,
        ..Default::default()
    })?;
    run(&args, &config, output)
}

fn run(args: &FixArgs, config: &Config, output: &Output) -> Result<i32> {
    let manifest = read_manifest(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    output.verbose(&format!(
        "Read {} requirements from {}",
        manifest.requirements().count(),
        args.file.display()
    ));

    let table = config
        .conflict_fix_table()
        .context("Invalid conflict fix rules")?;
    let oracle = config.oracle();
    let ladder = StrategyLadder::new(table);

    output.section("Testing compatibility strategies");
    let progress = ProgressManager::new(output.wants_progress());
    let mut reporter = AttemptReporter {
        output,
        progress: &progress,
        spinner: None,
    };
    let outcome = ladder.run_with_observer(&manifest, &oracle, &mut reporter);

    match &outcome {
        LadderOutcome::Resolved {
            winner: Strategy::Original,
            attempts,
            ..
        } => {
            output.success("Original requirements are already compatible, nothing to write");
            output.json(&FixReport {
                file: &args.file,
                status: FixStatus::AlreadyCompatible,
                strategy: Some(Strategy::Original.label()),
                output: None,
                changes: &[],
                attempts,
            });
            Ok(0)
        }
        LadderOutcome::Resolved {
            winner,
            manifest: fixed,
            attempts,
        } => {
            let changes = diff_with_mode(&manifest, fixed, config.diff_mode);
            let target = args
                .output
                .clone()
                .unwrap_or_else(|| derived_output_path(&args.file, COMPATIBLE_SUFFIX));

            output.success(&format!("Fixed using strategy: {}", winner));

            if args.dry_run {
                output.info("Dry run, nothing written");
                if !output.is_json() {
                    println!("{}", fixed);
                }
            } else {
                write_manifest(&target, fixed)
                    .with_context(|| format!("Failed to write {}", target.display()))?;
                output.success(&format!("Compatible requirements saved to {}", target.display()));
            }

            if !changes.is_empty() {
                output.section(&format!("Changes made ({})", changes.len()));
                for line in ChangeSummary::new(&changes).lines() {
                    output.list_item("-", &line);
                }
            }

            output.json(&FixReport {
                file: &args.file,
                status: FixStatus::Fixed,
                strategy: Some(winner.label()),
                output: (!args.dry_run).then_some(target.as_path()),
                changes: &changes,
                attempts,
            });
            Ok(0)
        }
        LadderOutcome::Exhausted { attempts } => {
            output.error("Could not automatically fix the dependency conflicts");
            output.info("Try manually adjusting the versions of the conflicting packages");
            output.json(&FixReport {
                file: &args.file,
                status: FixStatus::Failed,
                strategy: None,
                output: None,
                changes: &[],
                attempts,
            });
            Ok(1)
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use reqfix_pm::cli::Verbosity;
    use std::fs;
    use tempfile::TempDir;

    fn quiet() -> Output {
        let mut output = Output::new();
        output.set_verbosity(Verbosity::Quiet);
        output
    }

    /// A resolver that runs `script` with the candidate file as `$4`
    fn config_with_resolver(script: &str) -> Config {
        let mut config = Config::default();
        config
            .set_resolver_command(vec!["sh".into(), "-c".into(), script.into(), "sh".into()])
            .unwrap();
        config.set_timeout(10);
        config
    }

    fn args_for(dir: &TempDir, contents: &str) -> FixArgs {
        let file = dir.path().join("requirements.txt");
        fs::write(&file, contents).unwrap();
        FixArgs {
            file,
            ..Default::default()
        }
    }

    #[test]
    fn test_already_compatible_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let args = args_for(&dir, "flask==3.0.0\n");

        let code = run(&args, &config_with_resolver("exit 0"), &quiet()).unwrap();

        assert_eq!(code, 0);
        assert!(!dir.path().join("requirements-compatible.txt").exists());
    }

    #[test]
    fn test_resolved_writes_compatible_file() {
        let dir = TempDir::new().unwrap();
        let args = args_for(&dir, "numpy==2.3.1\nflask==3.0.0\n");
        let config = config_with_resolver("if grep -q 'numpy==2.3.1' \"$4\"; then exit 1; fi");

        let code = run(&args, &config, &quiet()).unwrap();

        assert_eq!(code, 0);
        let written = fs::read_to_string(dir.path().join("requirements-compatible.txt")).unwrap();
        assert_eq!(written, "numpy>=2.0.0,<2.3.0\nflask==3.0.0\n");
        assert_eq!(
            fs::read_to_string(&args.file).unwrap(),
            "numpy==2.3.1\nflask==3.0.0\n"
        );
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut args = args_for(&dir, "numpy==2.3.1\n");
        args.dry_run = true;
        let config = config_with_resolver("if grep -q 'numpy==2.3.1' \"$4\"; then exit 1; fi");

        assert_eq!(run(&args, &config, &quiet()).unwrap(), 0);
        assert!(!dir.path().join("requirements-compatible.txt").exists());
    }

    #[test]
    fn test_exhausted_exits_one_and_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let args = args_for(&dir, "numpy==2.3.1\n");

        let code = run(&args, &config_with_resolver("echo 'ResolutionImpossible' >&2; exit 1"), &quiet()).unwrap();

        assert_eq!(code, 1);
        assert!(!dir.path().join("requirements-compatible.txt").exists());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let args = FixArgs {
            file: dir.path().join("absent.txt"),
            ..Default::default()
        };
        assert!(run(&args, &config_with_resolver("exit 0"), &quiet()).is_err());
    }
}
