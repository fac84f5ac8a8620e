//! Upgrade command - pin every requirement to its newest published version.

use anyhow::{Context, Result};
use clap::Args;
use indicatif::ProgressBar;
use serde::Serialize;
use std::path::{Path, PathBuf};

use reqfix_pm::artifact::{derived_output_path, read_manifest, write_manifest, UPGRADED_SUFFIX};
use reqfix_pm::cli::{Output, ProgressManager};
use reqfix_pm::{upgrade_manifest, Upgrade, VersionLookup};

use crate::config::{self, ConfigOverrides};

#[derive(Args, Debug, Clone, Default)]
pub struct UpgradeArgs {
    /// Requirements file to upgrade
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Where to save the result (default: <FILE>-upgraded.txt)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Outputs the upgrades, but will not write anything
    #[arg(long)]
    pub dry_run: bool,

    /// Seconds to wait for each version lookup, 0 waits forever
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Package index command, e.g. "python3 -m pip"
    #[arg(long, value_name = "COMMAND")]
    pub lookup: Option<String>,
}

#[derive(Serialize)]
struct UpgradeReport<'a> {
    file: &'a Path,
    output: Option<&'a Path>,
    upgrades: &'a [Upgrade],
    misses: &'a [String],
}

/// Advances a bar around each lookup of the wrapped service
struct TrackedLookup<'a> {
    inner: &'a dyn VersionLookup,
    bar: &'a ProgressBar,
}

impl VersionLookup for TrackedLookup<'_> {
    fn latest_version(&self, package: &str) -> reqfix_pm::Result<String> {
        self.bar.set_message(package.to_string());
        let latest = self.inner.latest_version(package);
        self.bar.inc(1);
        latest
    }
}

pub fn execute(args: UpgradeArgs, output: &Output) -> Result<i32> {
    let config = config::load_from_cwd(&ConfigOverrides {
        lookup: args.lookup.clone(),
        timeout: args.timeout,
        ..Default::default()
    })?;

    let manifest = read_manifest(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let total = manifest.requirements().filter(|r| r.is_named()).count();

    output.info(&format!("Looking up the latest versions of {} packages", total));

    let lookup = config.version_lookup();
    let progress = ProgressManager::new(output.wants_progress());
    let bar = progress.create_lookup_bar(total as u64);
    let outcome = upgrade_manifest(
        &manifest,
        &TrackedLookup {
            inner: &lookup,
            bar: &bar,
        },
    );
    bar.finish_and_clear();

    for upgrade in &outcome.upgrades {
        output.list_item(
            "↑",
            &format!(
                "{}: {} → {}",
                upgrade.package,
                upgrade.from.as_deref().unwrap_or("unpinned"),
                upgrade.to
            ),
        );
        if upgrade.leaves_range {
            output.warning(&format!(
                "{} {} is outside the range the file declared before",
                upgrade.package, upgrade.to
            ));
        }
    }
    for package in &outcome.misses {
        output.warning(&format!("No version found for {}, line kept as is", package));
    }

    let target = args
        .output
        .clone()
        .unwrap_or_else(|| derived_output_path(&args.file, UPGRADED_SUFFIX));

    if args.dry_run {
        output.info("Dry run, nothing written");
        if !output.is_json() {
            println!("{}", outcome.manifest);
        }
    } else {
        write_manifest(&target, &outcome.manifest)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        output.success(&format!("Upgraded requirements saved to {}", target.display()));
    }

    output.json(&UpgradeReport {
        file: &args.file,
        output: (!args.dry_run).then_some(target.as_path()),
        upgrades: &outcome.upgrades,
        misses: &outcome.misses,
    });

    Ok(0)
}
