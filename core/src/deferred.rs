//! Deferred computations: a single-assignment outcome cell shared between the
//! worker that resolves it and any number of observers.
//!
//! A [`Deferred`] is created Pending (or already resolved) at launch. Its
//! [`Resolver`] half moves to the worker and sets the outcome exactly once.
//! A stored failure is inert data: it reaches caller code only when someone
//! calls [`Deferred::observe`] or [`Deferred::outcome`].
//!
//! When the last handle and the resolver are gone, a failure nobody observed
//! is reported to the [`OrphanSink`] the deferred was launched with.

use std::fmt;
use std::future::IntoFuture;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use futures_util::future::{BoxFuture, FutureExt};
use tokio::sync::Notify;

use silently_types::{DeferredId, DeferredState, Failure, Outcome};

use crate::orphan::{OrphanSink, OrphanedFailure};

struct Shared<T> {
    id: DeferredId,
    label: String,
    outcome: OnceLock<Outcome<T>>,
    resolved: Notify,
    observed: AtomicBool,
    orphans: Option<Arc<OrphanSink>>,
}

impl<T> Shared<T> {
    fn new(id: DeferredId, label: String, orphans: Option<Arc<OrphanSink>>) -> Self {
        Self {
            id,
            label,
            outcome: OnceLock::new(),
            resolved: Notify::new(),
            observed: AtomicBool::new(false),
            orphans,
        }
    }

    fn settle(&self, outcome: Outcome<T>) {
        let state = outcome.state();
        if self.outcome.set(outcome).is_err() {
            tracing::error!(
                id = %self.id,
                "Deferred computation resolved twice; keeping first outcome"
            );
            return;
        }
        tracing::debug!(
            id = %self.id,
            label = %self.label,
            ?state,
            "Deferred computation resolved"
        );
        self.resolved.notify_waiters();
    }
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        if *self.observed.get_mut() {
            return;
        }
        let Some(Outcome::Failed(failure)) = self.outcome.take() else {
            return;
        };
        let orphan = OrphanedFailure {
            id: self.id,
            label: std::mem::take(&mut self.label),
            failure,
        };
        if let Some(sink) = &self.orphans {
            sink.report(orphan);
        } else {
            tracing::warn!(
                id = %orphan.id,
                label = %orphan.label,
                failure = %orphan.failure,
                "Detached deferred computation dropped with an unobserved failure"
            );
        }
    }
}

/// Handle to the outcome of a computation that may still be running.
///
/// Cloning shares the same outcome cell. Observation through any clone counts
/// for all of them.
pub struct Deferred<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Deferred<T> {
    pub(crate) fn pending(
        id: DeferredId,
        label: impl Into<String>,
        orphans: Option<Arc<OrphanSink>>,
    ) -> (Self, Resolver<T>) {
        let shared = Arc::new(Shared::new(id, label.into(), orphans));
        let resolver = Resolver {
            shared: Some(Arc::clone(&shared)),
        };
        (Self { shared }, resolver)
    }

    fn resolved(label: &str, outcome: Outcome<T>) -> Self {
        let shared = Shared::new(DeferredId::DETACHED, label.to_string(), None);
        shared.settle(outcome);
        Self {
            shared: Arc::new(shared),
        }
    }

    /// An already-succeeded deferred computation.
    #[must_use]
    pub fn succeeded(value: T) -> Self {
        Self::resolved("succeeded", Outcome::Succeeded(value))
    }

    /// An already-failed deferred computation, with no orphan sink attached.
    #[must_use]
    pub fn failed(failure: Failure) -> Self {
        Self::resolved("failed", Outcome::Failed(failure))
    }

    #[must_use]
    pub fn id(&self) -> DeferredId {
        self.shared.id
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.shared.label
    }

    /// Peek at the lifecycle state. This does not count as observation.
    #[must_use]
    pub fn state(&self) -> DeferredState {
        self.shared
            .outcome
            .get()
            .map_or(DeferredState::Pending, Outcome::state)
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.state().is_resolved()
    }

    #[must_use]
    pub fn was_observed(&self) -> bool {
        self.shared.observed.load(Ordering::Acquire)
    }

    /// Wait until the computation resolves without taking its outcome.
    ///
    /// A failure stays inert and is still reported as orphaned if nobody
    /// observes it afterwards.
    pub async fn settled(&self) -> DeferredState {
        loop {
            let notified = self.shared.resolved.notified();
            if let Some(outcome) = self.shared.outcome.get() {
                return outcome.state();
            }
            notified.await;
        }
    }

    fn mark_observed(&self) {
        self.shared.observed.store(true, Ordering::Release);
    }
}

impl<T: Clone> Deferred<T> {
    /// Non-waiting observation. Returns `None` while Pending; a resolved
    /// outcome handed out here counts as observed.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome<T>> {
        let outcome = self.shared.outcome.get()?.clone();
        self.mark_observed();
        Some(outcome)
    }

    /// Wait for the computation and take responsibility for its outcome.
    ///
    /// A stored failure comes back as `Err`. Repeated calls return the same
    /// outcome.
    pub async fn observe(&self) -> Result<T, Failure> {
        loop {
            let notified = self.shared.resolved.notified();
            if let Some(outcome) = self.shared.outcome.get() {
                self.mark_observed();
                return outcome.clone().into_result();
            }
            notified.await;
        }
    }
}

impl Deferred<()> {
    /// An already-completed effect.
    #[must_use]
    pub fn completed() -> Self {
        Self::resolved("completed", Outcome::Succeeded(()))
    }
}

impl<T> IntoFuture for Deferred<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = Result<T, Failure>;
    type IntoFuture = BoxFuture<'static, Result<T, Failure>>;

    fn into_future(self) -> Self::IntoFuture {
        async move { self.observe().await }.boxed()
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("id", &self.shared.id)
            .field("label", &self.shared.label)
            .field("state", &self.state())
            .field("observed", &self.was_observed())
            .finish()
    }
}

/// Write half of a [`Deferred`]. Consumed by resolving.
///
/// Dropping an unresolved resolver resolves the deferred with
/// [`Failure::Abandoned`] so observers never wait forever.
pub struct Resolver<T> {
    shared: Option<Arc<Shared<T>>>,
}

impl<T> Resolver<T> {
    #[must_use]
    pub fn id(&self) -> DeferredId {
        self.shared.as_ref().map_or(DeferredId::DETACHED, |s| s.id)
    }

    pub fn resolve(mut self, outcome: Outcome<T>) {
        if let Some(shared) = self.shared.take() {
            shared.settle(outcome);
        }
    }

    pub fn succeed(self, value: T) {
        self.resolve(Outcome::Succeeded(value));
    }

    pub fn fail(self, failure: Failure) {
        self.resolve(Outcome::Failed(failure));
    }
}

impl<T> Drop for Resolver<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            tracing::warn!(
                id = %shared.id,
                label = %shared.label,
                "Resolver dropped before resolving"
            );
            shared.settle(Outcome::Failed(Failure::Abandoned));
        }
    }
}

impl<T> fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver").field("id", &self.id()).finish()
    }
}
