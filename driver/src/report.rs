//! Structured results of a driver run.

use serde::Serialize;

use silently_core::{DeferredId, Failure, OrphanPolicy, OrphanedFailure};

use crate::scenario::{DriverPhase, ExpectedOutcome, Expectation, Scenario};

/// What the driver actually saw at the end of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Observation {
    Value(i32),
    Unit,
    /// Observation raised this failure.
    Failed(Failure),
    /// The deferred was dropped without being observed.
    Dropped,
}

impl Observation {
    #[must_use]
    pub fn from_value(result: Result<i32, Failure>) -> Self {
        match result {
            Ok(value) => Self::Value(value),
            Err(failure) => Self::Failed(failure),
        }
    }

    #[must_use]
    pub fn from_unit(result: Result<(), Failure>) -> Self {
        match result {
            Ok(()) => Self::Unit,
            Err(failure) => Self::Failed(failure),
        }
    }

    /// Whether the observed outcome is the documented one. `Orphaned` also
    /// needs the orphan sink's view, which the driver checks separately.
    #[must_use]
    pub fn matches(&self, expected: ExpectedOutcome) -> bool {
        match (expected, self) {
            (ExpectedOutcome::Value(want), Self::Value(got)) => want == *got,
            (ExpectedOutcome::Unit, Self::Unit) | (ExpectedOutcome::Orphaned, Self::Dropped) => {
                true
            }
            (ExpectedOutcome::Propagates(kind), Self::Failed(failure)) => failure.kind() == kind,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioRecord {
    pub scenario: Scenario,
    pub phase: DriverPhase,
    pub expected: Expectation,
    pub observed: Observation,
    /// The failure the runner replaced with a fallback, if any.
    pub suppressed: Option<Failure>,
    pub effects: usize,
    /// The deferred the scenario launched, for async scenarios whose launch succeeded.
    pub deferred: Option<DeferredId>,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub phases: Vec<DriverPhase>,
    pub records: Vec<ScenarioRecord>,
    pub orphan_policy: OrphanPolicy,
    pub orphans: Vec<OrphanedFailure>,
    pub escalated: bool,
}

impl RunReport {
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.records.iter().all(|record| record.passed)
    }

    pub fn failed_records(&self) -> impl Iterator<Item = &ScenarioRecord> {
        self.records.iter().filter(|record| !record.passed)
    }

    #[must_use]
    pub fn record(&self, scenario: Scenario) -> Option<&ScenarioRecord> {
        self.records
            .iter()
            .find(|record| record.scenario == scenario)
    }

    pub fn records_in(&self, phase: DriverPhase) -> impl Iterator<Item = &ScenarioRecord> {
        self.records
            .iter()
            .filter(move |record| record.phase == phase)
    }
}
