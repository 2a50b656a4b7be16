//! The "Silently" combinators.
//!
//! Each runner executes a computation and replaces any failure it can see
//! with a fallback. What it can see depends on the form:
//!
//! ```text
//! run_silently_sync(compute, fallback)   compute runs here; every failure is seen
//! run_silently_async(launch, fallback)   only the launch runs here; completion
//!                                        failures land in the returned Deferred
//! ```
//!
//! The async form therefore guards the act of *starting* a computation, not
//! the computation. A launch that succeeds returns its deferred unchanged,
//! even if that deferred later resolves to a failure.

use std::panic::{self, AssertUnwindSafe};

use silently_types::{Failure, Silenced};

use crate::deferred::Deferred;

/// Run `compute` on the caller's thread and report whether a failure was suppressed.
///
/// Both `Err` returns and panics are suppressed.
pub fn silence_sync<T, E, F>(compute: F, fallback: T) -> Silenced<T>
where
    F: FnOnce() -> Result<T, E>,
    E: Into<Failure>,
{
    match panic::catch_unwind(AssertUnwindSafe(compute)) {
        Ok(Ok(value)) => Silenced::Returned(value),
        Ok(Err(err)) => suppress(fallback, err.into()),
        Err(payload) => suppress(fallback, Failure::from_panic(payload.as_ref())),
    }
}

/// Run `compute`, returning its value or `fallback` if it failed.
pub fn run_silently_sync<T, E, F>(compute: F, fallback: T) -> T
where
    F: FnOnce() -> Result<T, E>,
    E: Into<Failure>,
{
    silence_sync(compute, fallback).into_inner()
}

pub fn silence_effect<E, F>(statement: F) -> Silenced<()>
where
    F: FnOnce() -> Result<(), E>,
    E: Into<Failure>,
{
    silence_sync(statement, ())
}

/// Run a side effect, suppressing any failure.
pub fn run_silently_effect<E, F>(statement: F)
where
    F: FnOnce() -> Result<(), E>,
    E: Into<Failure>,
{
    silence_effect(statement).into_inner();
}

/// Run the launch phase of a deferred computation.
///
/// `Returned` means only that `launch` handed back a deferred. That deferred
/// may still be Pending and may still fail; nothing here waits for it.
pub fn silence_async<T, E, F>(launch: F, fallback: Deferred<T>) -> Silenced<Deferred<T>>
where
    F: FnOnce() -> Result<Deferred<T>, E>,
    E: Into<Failure>,
{
    let silenced = silence_sync(launch, fallback);
    if let Silenced::Returned(deferred) = &silenced {
        tracing::debug!(
            id = %deferred.id(),
            label = deferred.label(),
            state = ?deferred.state(),
            "Launch returned; completion failures are not suppressed"
        );
    }
    silenced
}

/// Launch a deferred computation, returning `fallback` only if the launch itself failed.
///
/// A failure during the completion phase is returned inside the deferred, not
/// replaced by `fallback`.
pub fn run_silently_async<T, E, F>(launch: F, fallback: Deferred<T>) -> Deferred<T>
where
    F: FnOnce() -> Result<Deferred<T>, E>,
    E: Into<Failure>,
{
    silence_async(launch, fallback).into_inner()
}

pub fn run_silently_async_effect<E, F>(launch: F, fallback: Deferred<()>) -> Deferred<()>
where
    F: FnOnce() -> Result<Deferred<()>, E>,
    E: Into<Failure>,
{
    run_silently_async(launch, fallback)
}

fn suppress<T>(fallback: T, failure: Failure) -> Silenced<T> {
    tracing::warn!(%failure, "Ignoring failure");
    Silenced::Suppressed { fallback, failure }
}
