//! Building-block computations the scenarios run through the combinators.
//!
//! Synchronous blocks fail or succeed on the caller's thread. The `*_async`
//! blocks split into a launch phase (the method call) and a completion phase
//! (the launched closure), and only [`Blocks::double_async`] can fail during
//! launch.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use silently_types::Failure;

use crate::deferred::Deferred;
use crate::executor::Executor;

pub fn two_may_crash(crash: bool) -> Result<i32, Failure> {
    if crash {
        return Err(Failure::invalid_operation("two crashed"));
    }
    Ok(2)
}

pub fn two() -> Result<i32, Failure> {
    two_may_crash(false)
}

pub fn two_crash() -> Result<i32, Failure> {
    two_may_crash(true)
}

/// Counts side effects that actually ran.
///
/// Clones share the counter, so the copy moved into a worker reports back to
/// the scenario that launched it.
#[derive(Debug, Clone, Default)]
pub struct EffectLog {
    count: Arc<AtomicUsize>,
}

impl EffectLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    fn record(&self) {
        self.count.fetch_add(1, Ordering::AcqRel);
    }
}

pub fn effect(log: &EffectLog) -> Result<(), Failure> {
    log.record();
    tracing::info!("Computed effect");
    Ok(())
}

pub fn effect_crash() -> Result<(), Failure> {
    Err(Failure::invalid_operation("effect crashed"))
}

/// Async building blocks bound to one executor and one effect log.
#[derive(Debug)]
pub struct Blocks<'a> {
    executor: &'a Executor,
    effects: EffectLog,
}

impl<'a> Blocks<'a> {
    #[must_use]
    pub fn new(executor: &'a Executor) -> Self {
        Self {
            executor,
            effects: EffectLog::new(),
        }
    }

    #[must_use]
    pub fn effects(&self) -> &EffectLog {
        &self.effects
    }

    pub fn two_async(&self) -> Result<Deferred<i32>, Failure> {
        Ok(self.executor.launch("two_async", two))
    }

    pub fn two_crash_async(&self) -> Result<Deferred<i32>, Failure> {
        Ok(self.executor.launch("two_crash_async", two_crash))
    }

    pub fn effect_async(&self) -> Result<Deferred<()>, Failure> {
        let log = self.effects.clone();
        Ok(self.executor.launch("effect_async", move || effect(&log)))
    }

    pub fn effect_crash_async(&self) -> Result<Deferred<()>, Failure> {
        Ok(self.executor.launch("effect_crash_async", effect_crash))
    }

    /// Validates `n` before scheduling anything. A negative `n` fails during
    /// launch; an overflowing one fails during completion.
    pub fn double_async(&self, n: i32) -> Result<Deferred<i32>, Failure> {
        if n < 0 {
            return Err(Failure::invalid_argument(format!(
                "expected a non-negative input, got {n}"
            )));
        }
        Ok(self.executor.launch("double_async", move || {
            n.checked_mul(2)
                .ok_or_else(|| Failure::invalid_operation(format!("doubling {n} overflows")))
        }))
    }

    /// The same pitfall as `run_silently_async(effect_crash_async, ..)`,
    /// written inline: the guard covers scheduling the crash, not the crash.
    #[must_use]
    pub fn silently_effect_async(&self) -> Deferred<()> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.effect_crash_async())) {
            Ok(Ok(deferred)) => deferred,
            Ok(Err(failure)) => {
                tracing::warn!(%failure, "Ignoring failure");
                Deferred::completed()
            }
            Err(payload) => {
                let failure = Failure::from_panic(payload.as_ref());
                tracing::warn!(%failure, "Ignoring failure");
                Deferred::completed()
            }
        }
    }
}
