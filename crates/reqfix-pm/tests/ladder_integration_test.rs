/// End-to-end tests of the engine with scripted oracles and lookups
///
/// The oracles here stand in for `pip install --dry-run`: each one decides
/// from the candidate text alone and records every call it receives.

use reqfix_pm::artifact::{derived_output_path, read_manifest, write_manifest, COMPATIBLE_SUFFIX};
use reqfix_pm::upgrade::parse_available_versions;
use reqfix_pm::{
    diff, upgrade_manifest, ConflictFixTable, LadderOutcome, Manifest, ReqfixError, Resolution,
    ResolutionOracle, Result, Strategy, StrategyLadder, VersionLookup,
};
use std::cell::RefCell;
use std::fs;
use tempfile::TempDir;

/// Fails every candidate containing one of `rejected`, records all calls
struct ScriptedOracle {
    rejected: Vec<&'static str>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedOracle {
    fn rejecting(rejected: &[&'static str]) -> Self {
        Self {
            rejected: rejected.to_vec(),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl ResolutionOracle for ScriptedOracle {
    fn test_resolves(&self, manifest_text: &str) -> Resolution {
        self.calls.borrow_mut().push(manifest_text.to_string());
        match self.rejected.iter().find(|r| manifest_text.contains(*r)) {
            Some(bad) => Resolution::failed(format!(
                "ERROR: Cannot install {} because these package versions have conflicting dependencies.",
                bad
            )),
            None => Resolution::passed("Would install ..."),
        }
    }
}

/// Answers from canned `pip index versions` output
struct CannedIndex;

impl VersionLookup for CannedIndex {
    fn latest_version(&self, package: &str) -> Result<String> {
        let stdout = match package {
            "requests" => "requests (2.31.0)\nAvailable versions: 2.31.0, 2.30.0\n",
            _ => "",
        };
        parse_available_versions(stdout).ok_or_else(|| ReqfixError::LookupMiss {
            package: package.to_string(),
            reason: "not found".to_string(),
        })
    }
}

#[test]
fn test_original_success_short_circuits() {
    let oracle = ScriptedOracle::rejecting(&[]);
    let manifest = Manifest::parse("flask==3.0.3\nnumpy==2.3.1\n");

    let outcome = StrategyLadder::default().run(&manifest, &oracle);

    assert_eq!(oracle.call_count(), 1);
    assert_eq!(outcome.winner(), Some(Strategy::Original));
    assert_eq!(oracle.calls.borrow()[0], "flask==3.0.3\nnumpy==2.3.1\n");
    assert_eq!(outcome.manifest(), Some(&manifest));
}

#[test]
fn test_exhaustion_tries_four_candidates_in_order() {
    let oracle = ScriptedOracle::rejecting(&["flask"]);
    let outcome = StrategyLadder::default().run(&Manifest::parse("numpy==2.3.1\nflask==1.0.0"), &oracle);

    assert_eq!(
        *oracle.calls.borrow(),
        vec![
            "numpy==2.3.1\nflask==1.0.0",
            "numpy>=2.0.0,<2.3.0\nflask==1.0.0",
            "numpy>=2.3.0\nflask>=1.0.0",
            "numpy>=2.0.0,<2.3.0\nflask>=1.0.0",
        ]
    );
    let labels: Vec<&str> = outcome.attempts().iter().map(|a| a.strategy.label()).collect();
    assert_eq!(labels, vec!["Original", "FixedConflicts", "FlexibleVersions", "FlexibleAndFixed"]);
    assert!(outcome.attempts().iter().all(|a| a.conflict_details().is_some()));
}

#[test]
fn test_scenario_fixed_conflicts_wins() {
    let oracle = ScriptedOracle::rejecting(&["numpy==2.3.1"]);
    let original = Manifest::parse("numpy==2.3.1\nrequests==2.0.0");

    let outcome = StrategyLadder::new(ConflictFixTable::builtin()).run(&original, &oracle);

    let LadderOutcome::Resolved { winner, manifest, attempts } = outcome else {
        panic!("expected a resolved outcome");
    };
    assert_eq!(winner.label(), "FixedConflicts");
    assert_eq!(manifest.serialize(), "numpy>=2.0.0,<2.3.0\nrequests==2.0.0");
    assert_eq!(attempts.len(), 2);
    assert!(!attempts[0].success);
    assert!(attempts[1].success);

    let changes = diff(&original, &manifest);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].to_string(), "numpy==2.3.1 → numpy>=2.0.0,<2.3.0");
}

#[test]
fn test_scenario_total_failure_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("requirements.txt");
    fs::write(&input, "flask==1.0.0").unwrap();

    let oracle = ScriptedOracle::rejecting(&["flask"]);
    let manifest = read_manifest(&input).unwrap();
    let outcome = StrategyLadder::default().run(&manifest, &oracle);

    assert!(!outcome.is_resolved());
    assert_eq!(outcome.attempts().len(), 4);
    assert_eq!(oracle.call_count(), 4);
    if let Some(fixed) = outcome.manifest() {
        write_manifest(&derived_output_path(&input, COMPATIBLE_SUFFIX), fixed).unwrap();
    }
    assert!(!dir.path().join("requirements-compatible.txt").exists());
}

#[test]
fn test_scenario_upgrade_to_latest() {
    let outcome = upgrade_manifest(&Manifest::parse("requests==2.0.0"), &CannedIndex);
    assert_eq!(outcome.manifest.serialize(), "requests==2.31.0");
    assert_eq!(outcome.upgrades.len(), 1);
    assert_eq!(outcome.upgrades[0].from.as_deref(), Some("2.0.0"));
}

#[test]
fn test_flexible_and_fixed_order_matters() {
    // scipy>=1.16.0 is not a pin, so only fixing it first lets both strategies apply
    let oracle = ScriptedOracle::rejecting(&["scipy>=1.16.0", "torch==2.7.0"]);
    let original = Manifest::parse("# ml\nscipy>=1.16.0\ntorch==2.7.0\n");

    let outcome = StrategyLadder::default().run(&original, &oracle);

    assert_eq!(outcome.winner(), Some(Strategy::FlexibleAndFixed));
    assert_eq!(
        outcome.manifest().map(Manifest::serialize).as_deref(),
        Some("# ml\nscipy>=1.11.0\ntorch>=2.7.0\n")
    );
}

#[test]
fn test_successful_run_writes_compatible_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("requirements.txt");
    let original_text = "# Vision\nopencv-python==4.12.0.88\nnumpy==2.3.0\n";
    fs::write(&input, original_text).unwrap();

    let oracle = ScriptedOracle::rejecting(&["numpy==2.3.0"]);
    let (winner, fixed) = StrategyLadder::default()
        .run(&read_manifest(&input).unwrap(), &oracle)
        .into_result()
        .unwrap();
    assert_eq!(winner, Strategy::FixedConflicts);

    let output = derived_output_path(&input, COMPATIBLE_SUFFIX);
    write_manifest(&output, &fixed).unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "# Vision\nopencv-python==4.12.0.88\nnumpy>=2.0.0,<2.3.0\n"
    );
    assert_eq!(fs::read_to_string(&input).unwrap(), original_text);
}
