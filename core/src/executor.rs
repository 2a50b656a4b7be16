//! Worker pool that runs the completion phase of launched computations.

use std::future::Future;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::{FutureExt, join_all};
use tokio::runtime::{Handle, TryCurrentError};
use tokio::task::JoinHandle;

use silently_types::{DeferredId, Failure, Outcome};

use crate::deferred::{Deferred, Resolver};
use crate::orphan::OrphanSink;

#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("no tokio runtime is running on this thread")]
    NoRuntime(#[from] TryCurrentError),
}

/// Launches work onto the tokio runtime and hands back [`Deferred`] handles.
///
/// `launch*` never suspends: it schedules the work and returns a Pending
/// deferred immediately. [`Executor::quiesce`] is the join barrier that waits
/// for every launched worker to finish.
#[derive(Debug)]
pub struct Executor {
    runtime: Handle,
    orphans: Arc<OrphanSink>,
    inflight: Mutex<Vec<JoinHandle<()>>>,
    next_id: AtomicU64,
}

impl Executor {
    #[must_use]
    pub fn new(runtime: Handle, orphans: Arc<OrphanSink>) -> Self {
        Self {
            runtime,
            orphans,
            inflight: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Build an executor on the runtime the caller is running in.
    pub fn current(orphans: Arc<OrphanSink>) -> Result<Self, ExecutorError> {
        let runtime = Handle::try_current()?;
        Ok(Self::new(runtime, orphans))
    }

    #[must_use]
    pub fn orphans(&self) -> &Arc<OrphanSink> {
        &self.orphans
    }

    /// Run a blocking closure on the worker pool.
    ///
    /// A panic inside `work` resolves the deferred with [`Failure::Panicked`].
    pub fn launch<T, F>(&self, label: impl Into<String>, work: F) -> Deferred<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Result<T, Failure> + Send + 'static,
    {
        let (deferred, resolver) = self.prepare(label);
        let handle = self.runtime.spawn_blocking(move || {
            let outcome = match panic::catch_unwind(AssertUnwindSafe(work)) {
                Ok(result) => Outcome::from(result),
                Err(payload) => Outcome::Failed(Failure::from_panic(payload.as_ref())),
            };
            resolver.resolve(outcome);
        });
        self.track(handle);
        deferred
    }

    /// Run a future on the runtime's scheduler.
    pub fn launch_future<T, Fut>(&self, label: impl Into<String>, future: Fut) -> Deferred<T>
    where
        T: Send + Sync + 'static,
        Fut: Future<Output = Result<T, Failure>> + Send + 'static,
    {
        let (deferred, resolver) = self.prepare(label);
        let handle = self.runtime.spawn(async move {
            let outcome = match AssertUnwindSafe(future).catch_unwind().await {
                Ok(result) => Outcome::from(result),
                Err(payload) => Outcome::Failed(Failure::from_panic(payload.as_ref())),
            };
            resolver.resolve(outcome);
        });
        self.track(handle);
        deferred
    }

    /// Number of launched workers that have not been joined yet.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.lock()
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// Wait until every launched worker has finished, including workers
    /// launched while waiting.
    ///
    /// Once this returns, every deferred this executor launched is resolved,
    /// and any of them already dropped unobserved has reached the orphan sink.
    pub async fn quiesce(&self) {
        loop {
            let batch = mem::take(&mut *self.lock());
            if batch.is_empty() {
                return;
            }
            tracing::debug!(workers = batch.len(), "Joining launched workers");
            for result in join_all(batch).await {
                if let Err(err) = result {
                    tracing::error!(error = %err, "Worker task ended without resolving");
                }
            }
        }
    }

    fn prepare<T>(&self, label: impl Into<String>) -> (Deferred<T>, Resolver<T>) {
        let id = DeferredId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let label = label.into();
        tracing::debug!(%id, %label, "Launching deferred computation");
        Deferred::pending(id, label, Some(Arc::clone(&self.orphans)))
    }

    fn track(&self, handle: JoinHandle<()>) {
        let mut inflight = self.lock();
        inflight.retain(|handle| !handle.is_finished());
        inflight.push(handle);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
