//! Unhandled-failure hook for deferred computations nobody observed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use silently_types::{DeferredId, Failure, OrphanPolicy};

/// A failure stored on a deferred computation that was dropped unobserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanedFailure {
    pub id: DeferredId,
    pub label: String,
    pub failure: Failure,
}

/// Collects orphaned failures according to an [`OrphanPolicy`].
///
/// One sink is shared by every deferred an [`Executor`](crate::Executor)
/// launches. Sinks are independent of each other, so separate runs never see
/// each other's orphans.
#[derive(Debug)]
pub struct OrphanSink {
    policy: OrphanPolicy,
    records: Mutex<Vec<OrphanedFailure>>,
    escalated: AtomicBool,
}

impl OrphanSink {
    #[must_use]
    pub fn new(policy: OrphanPolicy) -> Self {
        Self {
            policy,
            records: Mutex::new(Vec::new()),
            escalated: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn policy(&self) -> OrphanPolicy {
        self.policy
    }

    pub fn report(&self, orphan: OrphanedFailure) {
        if !self.policy.records() {
            tracing::debug!(
                id = %orphan.id,
                label = %orphan.label,
                "Swallowing orphaned failure"
            );
            return;
        }

        let escalate = self.policy.escalates();
        tracing::error!(
            id = %orphan.id,
            label = %orphan.label,
            failure = %orphan.failure,
            escalate,
            "Deferred computation failed and nobody observed it"
        );
        if escalate {
            self.escalated.store(true, Ordering::Release);
        }
        self.lock().push(orphan);
    }

    /// Snapshot of the recorded orphans, in report order.
    #[must_use]
    pub fn orphans(&self) -> Vec<OrphanedFailure> {
        self.lock().clone()
    }

    /// Drain the recorded orphans. The escalation flag is left untouched.
    pub fn take(&self) -> Vec<OrphanedFailure> {
        std::mem::take(&mut *self.lock())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once any orphan was reported under [`OrphanPolicy::Escalate`].
    #[must_use]
    pub fn escalated(&self) -> bool {
        self.escalated.load(Ordering::Acquire)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<OrphanedFailure>> {
        // A panic while holding the lock cannot leave the Vec half-written.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for OrphanSink {
    fn default() -> Self {
        Self::new(OrphanPolicy::default())
    }
}
