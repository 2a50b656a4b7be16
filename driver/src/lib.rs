//! Scenario driver for the Silently combinators.
//!
//! Runs the fixed scenario catalogue through the runners and returns a
//! [`RunReport`] instead of printing. Background work is joined with
//! [`Executor::quiesce`] before orphans are read, so results never depend on
//! timing.

mod report;
mod scenario;

pub use report::{Observation, RunReport, ScenarioRecord};
pub use scenario::{DriverPhase, ExpectedOutcome, Expectation, Scenario};

use std::sync::Arc;

use silently_core::blocks::{Blocks, effect, effect_crash, two, two_crash};
use silently_core::{
    Deferred, DeferredId, Executor, ExecutorError, Failure, OrphanPolicy, OrphanSink, Silenced,
    silence_async, silence_effect, silence_sync,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverOptions {
    pub orphan_policy: OrphanPolicy,
    /// Run the completion-failure scenarios.
    pub async_failures: bool,
    /// Run the fire-and-forget scenario.
    pub fire_and_forget: bool,
}

impl DriverOptions {
    #[must_use]
    pub const fn includes_failure_phase(&self) -> bool {
        self.async_failures || self.fire_and_forget
    }

    fn scenarios(&self, phase: DriverPhase) -> Vec<Scenario> {
        let mut scenarios = Vec::new();
        if phase != DriverPhase::AsyncFailureScenarios || self.async_failures {
            scenarios.extend_from_slice(Scenario::for_phase(phase));
        }
        if phase == DriverPhase::AsyncFailureScenarios && self.fire_and_forget {
            scenarios.push(Scenario::FireAndForget);
        }
        scenarios
    }
}

/// What a scenario body hands back before it is checked.
struct Run {
    observed: Observation,
    suppressed: Option<Failure>,
    effects: usize,
    deferred: Option<DeferredId>,
}

#[derive(Debug)]
pub struct Driver {
    executor: Executor,
    options: DriverOptions,
}

impl Driver {
    #[must_use]
    pub fn new(executor: Executor, options: DriverOptions) -> Self {
        Self { executor, options }
    }

    /// Driver with a fresh executor and orphan sink on the current runtime.
    pub fn current(options: DriverOptions) -> Result<Self, ExecutorError> {
        let orphans = Arc::new(OrphanSink::new(options.orphan_policy));
        Ok(Self::new(Executor::current(orphans)?, options))
    }

    #[must_use]
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub async fn run(&self) -> RunReport {
        let include_failures = self.options.includes_failure_phase();
        let mut phase = DriverPhase::Init;
        let mut phases = vec![phase];
        let mut records = Vec::new();

        while phase != DriverPhase::Done {
            phase = phase.next(include_failures);
            phases.push(phase);
            tracing::info!(phase = phase.title(), "Entering phase");
            for scenario in self.options.scenarios(phase) {
                records.push(self.run_scenario(scenario).await);
            }
        }

        self.executor.quiesce().await;
        let sink = self.executor.orphans();
        RunReport {
            phases,
            records,
            orphan_policy: sink.policy(),
            orphans: sink.orphans(),
            escalated: sink.escalated(),
        }
    }

    /// Run one scenario with fresh building blocks and check it.
    pub async fn run_scenario(&self, scenario: Scenario) -> ScenarioRecord {
        let blocks = Blocks::new(&self.executor);
        let run = match scenario {
            Scenario::SyncValue => sync_value(silence_sync(two, 0)),
            Scenario::SyncValueCrash => sync_value(silence_sync(two_crash, 0)),
            Scenario::SyncEffect => {
                let log = blocks.effects().clone();
                sync_unit(silence_effect(move || effect(&log)), &blocks)
            }
            Scenario::SyncEffectCrash => sync_unit(silence_effect(effect_crash), &blocks),
            Scenario::AsyncEffect => {
                let silenced = silence_async(|| blocks.effect_async(), Deferred::completed());
                observe_unit(silenced, &blocks).await
            }
            Scenario::AsyncValue => {
                let silenced = silence_async(|| blocks.two_async(), Deferred::succeeded(0));
                observe_value(silenced).await
            }
            Scenario::AsyncLaunchRejected => {
                let silenced = silence_async(|| blocks.double_async(-1), Deferred::succeeded(0));
                observe_value(silenced).await
            }
            Scenario::AsyncEffectCrash => {
                let silenced =
                    silence_async(|| blocks.effect_crash_async(), Deferred::completed());
                observe_unit(silenced, &blocks).await
            }
            Scenario::AsyncValueCrash => {
                let silenced = silence_async(|| blocks.two_crash_async(), Deferred::succeeded(0));
                observe_value(silenced).await
            }
            Scenario::InlineEffectCrash => {
                let silenced = Silenced::Returned(blocks.silently_effect_async());
                observe_unit(silenced, &blocks).await
            }
            Scenario::FireAndForget => {
                let silenced = silence_async(|| blocks.two_crash_async(), Deferred::succeeded(0));
                let suppressed = silenced.suppressed_failure().cloned();
                let deferred = silenced.into_inner();
                let id = deferred.id();
                drop(deferred);
                self.executor.quiesce().await;
                Run {
                    observed: Observation::Dropped,
                    suppressed,
                    effects: 0,
                    deferred: Some(id),
                }
            }
        };
        self.check(scenario, run)
    }

    fn check(&self, scenario: Scenario, run: Run) -> ScenarioRecord {
        let expected = scenario.expectation();
        let mut passed = run.observed.matches(expected.outcome)
            && run.suppressed.is_some() == expected.suppressed
            && run.effects == expected.effects;
        if expected.outcome == ExpectedOutcome::Orphaned {
            passed &= self.orphan_accounted_for(run.deferred);
        }

        if passed {
            tracing::info!(
                scenario = scenario.name(),
                observed = ?run.observed,
                "Scenario behaved as documented"
            );
        } else {
            tracing::error!(
                scenario = scenario.name(),
                expected = ?expected,
                observed = ?run.observed,
                suppressed = ?run.suppressed,
                "Scenario did not behave as documented"
            );
        }

        ScenarioRecord {
            scenario,
            phase: scenario.phase(),
            expected,
            observed: run.observed,
            suppressed: run.suppressed,
            effects: run.effects,
            deferred: run.deferred,
            passed,
        }
    }

    fn orphan_accounted_for(&self, deferred: Option<DeferredId>) -> bool {
        let sink = self.executor.orphans();
        if !sink.policy().records() {
            return true;
        }
        deferred.is_some_and(|id| sink.orphans().iter().any(|orphan| orphan.id == id))
    }
}

fn sync_value(silenced: Silenced<i32>) -> Run {
    let suppressed = silenced.suppressed_failure().cloned();
    Run {
        observed: Observation::Value(silenced.into_inner()),
        suppressed,
        effects: 0,
        deferred: None,
    }
}

fn sync_unit(silenced: Silenced<()>, blocks: &Blocks<'_>) -> Run {
    Run {
        observed: Observation::Unit,
        suppressed: silenced.suppressed_failure().cloned(),
        effects: blocks.effects().count(),
        deferred: None,
    }
}

fn launched<T>(
    silenced: Silenced<Deferred<T>>,
) -> (Deferred<T>, Option<Failure>, Option<DeferredId>) {
    let suppressed = silenced.suppressed_failure().cloned();
    let launched_id = (!silenced.was_suppressed()).then(|| silenced.value().id());
    (silenced.into_inner(), suppressed, launched_id)
}

async fn observe_value(silenced: Silenced<Deferred<i32>>) -> Run {
    let (deferred, suppressed, id) = launched(silenced);
    Run {
        observed: Observation::from_value(deferred.observe().await),
        suppressed,
        effects: 0,
        deferred: id,
    }
}

async fn observe_unit(silenced: Silenced<Deferred<()>>, blocks: &Blocks<'_>) -> Run {
    let (deferred, suppressed, id) = launched(silenced);
    let observed = Observation::from_unit(deferred.observe().await);
    Run {
        observed,
        suppressed,
        effects: blocks.effects().count(),
        deferred: id,
    }
}
