//! The strategy ladder: ordered candidate manifests, first resolvable one wins.

use std::fmt;

use serde::Serialize;

use crate::error::{ReqfixError, Result};
use crate::manifest::Manifest;
use crate::oracle::ResolutionOracle;
use crate::rewrite::{apply_conflict_fixes, make_flexible, ConflictFixTable};

/// A named way of producing a candidate manifest from the original
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Strategy {
    Original,
    FixedConflicts,
    FlexibleVersions,
    FlexibleAndFixed,
}

impl Strategy {
    /// Every strategy, in the order the ladder tries them
    pub const ALL: [Strategy; 4] = [
        Strategy::Original,
        Strategy::FixedConflicts,
        Strategy::FlexibleVersions,
        Strategy::FlexibleAndFixed,
    ];

    /// Stable identifier, as used in reports and JSON output
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Original => "Original",
            Strategy::FixedConflicts => "FixedConflicts",
            Strategy::FlexibleVersions => "FlexibleVersions",
            Strategy::FlexibleAndFixed => "FlexibleAndFixed",
        }
    }

    /// Name shown to people
    pub fn description(&self) -> &'static str {
        match self {
            Strategy::Original => "Original",
            Strategy::FixedConflicts => "Fixed conflicts",
            Strategy::FlexibleVersions => "Flexible versions",
            Strategy::FlexibleAndFixed => "Flexible + Fixed",
        }
    }

    /// Build this strategy's candidate from the original manifest
    pub fn candidate(&self, original: &Manifest, table: &ConflictFixTable) -> Manifest {
        match self {
            Strategy::Original => original.clone(),
            Strategy::FixedConflicts => apply_conflict_fixes(original, table),
            Strategy::FlexibleVersions => make_flexible(original),
            Strategy::FlexibleAndFixed => make_flexible(&apply_conflict_fixes(original, table)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Record of one oracle attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyResult {
    pub strategy: Strategy,
    pub manifest_text: String,
    pub success: bool,
    pub diagnostic: String,
}

impl StrategyResult {
    /// The first diagnostic line that names a conflict, when the diagnostic
    /// reports a conflict or an incompatibility at all.
    pub fn conflict_details(&self) -> Option<&str> {
        let lowered = self.diagnostic.to_lowercase();
        if !lowered.contains("conflict") && !lowered.contains("incompatible") {
            return None;
        }
        self.diagnostic
            .lines()
            .find(|line| line.contains("depends on") || line.to_lowercase().contains("conflict"))
            .map(str::trim)
    }
}

/// What the ladder produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LadderOutcome {
    Resolved {
        winner: Strategy,
        manifest: Manifest,
        attempts: Vec<StrategyResult>,
    },
    Exhausted {
        attempts: Vec<StrategyResult>,
    },
}

impl LadderOutcome {
    pub fn attempts(&self) -> &[StrategyResult] {
        match self {
            LadderOutcome::Resolved { attempts, .. } | LadderOutcome::Exhausted { attempts } => {
                attempts
            }
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, LadderOutcome::Resolved { .. })
    }

    pub fn winner(&self) -> Option<Strategy> {
        match self {
            LadderOutcome::Resolved { winner, .. } => Some(*winner),
            LadderOutcome::Exhausted { .. } => None,
        }
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        match self {
            LadderOutcome::Resolved { manifest, .. } => Some(manifest),
            LadderOutcome::Exhausted { .. } => None,
        }
    }

    /// The winning strategy and its manifest, or [`ReqfixError::AllStrategiesFailed`]
    pub fn into_result(self) -> Result<(Strategy, Manifest)> {
        match self {
            LadderOutcome::Resolved { winner, manifest, .. } => Ok((winner, manifest)),
            LadderOutcome::Exhausted { .. } => Err(ReqfixError::AllStrategiesFailed),
        }
    }
}

/// Notified around each attempt while the ladder runs
pub trait LadderObserver {
    fn attempt_started(&mut self, _strategy: Strategy) {}

    fn attempt_finished(&mut self, _result: &StrategyResult) {}
}

impl LadderObserver for () {}

/// Runs the strategies in order against an oracle.
#[derive(Debug, Clone, Default)]
pub struct StrategyLadder {
    table: ConflictFixTable,
}

impl StrategyLadder {
    pub fn new(table: ConflictFixTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ConflictFixTable {
        &self.table
    }

    pub fn run(&self, manifest: &Manifest, oracle: &dyn ResolutionOracle) -> LadderOutcome {
        self.run_with_observer(manifest, oracle, &mut ())
    }

    pub fn run_with_observer(
        &self,
        manifest: &Manifest,
        oracle: &dyn ResolutionOracle,
        observer: &mut dyn LadderObserver,
    ) -> LadderOutcome {
        let mut attempts = Vec::with_capacity(Strategy::ALL.len());

        for strategy in Strategy::ALL {
            observer.attempt_started(strategy);

            // Built only now so that an early success skips the later rewrites
            let candidate = strategy.candidate(manifest, &self.table);
            let manifest_text = candidate.serialize();

            log::debug!("Trying strategy: {}", strategy);
            let resolution = oracle.test_resolves(&manifest_text);

            let result = StrategyResult {
                strategy,
                manifest_text,
                success: resolution.success,
                diagnostic: resolution.diagnostic().to_string(),
            };
            observer.attempt_finished(&result);
            attempts.push(result);

            if resolution.success {
                log::info!("Strategy {} produced a resolvable manifest", strategy);
                return LadderOutcome::Resolved {
                    winner: strategy,
                    manifest: candidate,
                    attempts,
                };
            }
        }

        log::info!("All {} strategies failed", attempts.len());
        LadderOutcome::Exhausted { attempts }
    }
}
