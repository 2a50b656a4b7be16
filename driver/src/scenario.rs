//! The fixed scenario catalogue and the phase state machine.

use serde::Serialize;

use silently_core::FailureKind;

/// Phases the driver moves through, in order.
///
/// ```text
/// Init -> SyncScenarios -> AsyncScenarios -> [AsyncFailureScenarios] -> Done
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverPhase {
    Init,
    SyncScenarios,
    AsyncScenarios,
    AsyncFailureScenarios,
    Done,
}

impl DriverPhase {
    /// The phase after `self`. `AsyncFailureScenarios` is skipped unless
    /// `include_failures` is set. `Done` is terminal.
    #[must_use]
    pub const fn next(self, include_failures: bool) -> Self {
        match self {
            Self::Init => Self::SyncScenarios,
            Self::SyncScenarios => Self::AsyncScenarios,
            Self::AsyncScenarios if include_failures => Self::AsyncFailureScenarios,
            Self::AsyncScenarios | Self::AsyncFailureScenarios | Self::Done => Self::Done,
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Init => "Init",
            Self::SyncScenarios => "Simple expressions and effects",
            Self::AsyncScenarios => "Async world",
            Self::AsyncFailureScenarios => "Async world, failing after launch",
            Self::Done => "Done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    SyncValue,
    SyncValueCrash,
    SyncEffect,
    SyncEffectCrash,
    AsyncEffect,
    AsyncValue,
    AsyncLaunchRejected,
    AsyncEffectCrash,
    AsyncValueCrash,
    InlineEffectCrash,
    FireAndForget,
}

const SYNC: &[Scenario] = &[
    Scenario::SyncValue,
    Scenario::SyncValueCrash,
    Scenario::SyncEffect,
    Scenario::SyncEffectCrash,
];

const ASYNC: &[Scenario] = &[
    Scenario::AsyncEffect,
    Scenario::AsyncValue,
    Scenario::AsyncLaunchRejected,
];

const ASYNC_FAILURE: &[Scenario] = &[
    Scenario::AsyncEffectCrash,
    Scenario::AsyncValueCrash,
    Scenario::InlineEffectCrash,
];

impl Scenario {
    /// Scenarios that always run in `phase`. The fire-and-forget scenario is
    /// opt-in and not listed here.
    #[must_use]
    pub fn for_phase(phase: DriverPhase) -> &'static [Scenario] {
        match phase {
            DriverPhase::SyncScenarios => SYNC,
            DriverPhase::AsyncScenarios => ASYNC,
            DriverPhase::AsyncFailureScenarios => ASYNC_FAILURE,
            DriverPhase::Init | DriverPhase::Done => &[],
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SyncValue => "sync_value",
            Self::SyncValueCrash => "sync_value_crash",
            Self::SyncEffect => "sync_effect",
            Self::SyncEffectCrash => "sync_effect_crash",
            Self::AsyncEffect => "async_effect",
            Self::AsyncValue => "async_value",
            Self::AsyncLaunchRejected => "async_launch_rejected",
            Self::AsyncEffectCrash => "async_effect_crash",
            Self::AsyncValueCrash => "async_value_crash",
            Self::InlineEffectCrash => "inline_effect_crash",
            Self::FireAndForget => "fire_and_forget",
        }
    }

    #[must_use]
    pub const fn phase(self) -> DriverPhase {
        match self {
            Self::SyncValue | Self::SyncValueCrash | Self::SyncEffect | Self::SyncEffectCrash => {
                DriverPhase::SyncScenarios
            }
            Self::AsyncEffect | Self::AsyncValue | Self::AsyncLaunchRejected => {
                DriverPhase::AsyncScenarios
            }
            Self::AsyncEffectCrash
            | Self::AsyncValueCrash
            | Self::InlineEffectCrash
            | Self::FireAndForget => DriverPhase::AsyncFailureScenarios,
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::SyncValue => "Most basic example, should return 2",
            Self::SyncValueCrash => "The expression fails, we fall back to 0",
            Self::SyncEffect => "The effect runs",
            Self::SyncEffectCrash => "The effect fails, the failure is ignored",
            Self::AsyncEffect => "The async effect runs once awaited",
            Self::AsyncValue => "The async expression yields 2 once awaited",
            Self::AsyncLaunchRejected => {
                "The launch itself fails, so the fallback deferred is returned"
            }
            Self::AsyncEffectCrash => "The effect fails after launch; awaiting it raises",
            Self::AsyncValueCrash => "The expression fails after launch; awaiting it raises",
            Self::InlineEffectCrash => "Same pitfall with the guard written inline",
            Self::FireAndForget => "The failing deferred is dropped unobserved",
        }
    }

    #[must_use]
    pub const fn expectation(self) -> Expectation {
        const LATE_FAILURE: Expectation = Expectation {
            outcome: ExpectedOutcome::Propagates(FailureKind::InvalidOperation),
            suppressed: false,
            effects: 0,
        };
        match self {
            Self::SyncValue | Self::AsyncValue => Expectation {
                outcome: ExpectedOutcome::Value(2),
                suppressed: false,
                effects: 0,
            },
            Self::SyncValueCrash | Self::AsyncLaunchRejected => Expectation {
                outcome: ExpectedOutcome::Value(0),
                suppressed: true,
                effects: 0,
            },
            Self::SyncEffect | Self::AsyncEffect => Expectation {
                outcome: ExpectedOutcome::Unit,
                suppressed: false,
                effects: 1,
            },
            Self::SyncEffectCrash => Expectation {
                outcome: ExpectedOutcome::Unit,
                suppressed: true,
                effects: 0,
            },
            Self::AsyncEffectCrash | Self::AsyncValueCrash | Self::InlineEffectCrash => {
                LATE_FAILURE
            }
            Self::FireAndForget => Expectation {
                outcome: ExpectedOutcome::Orphaned,
                suppressed: false,
                effects: 0,
            },
        }
    }
}

/// What a scenario is documented to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Expectation {
    pub outcome: ExpectedOutcome,
    /// Whether the runner should report a suppressed failure.
    pub suppressed: bool,
    /// How many side effects should have run.
    pub effects: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ExpectedOutcome {
    Value(i32),
    Unit,
    /// Observing the result raises a failure of this kind.
    Propagates(FailureKind),
    /// Nobody observes the result; the failure goes to the orphan sink.
    Orphaned,
}
