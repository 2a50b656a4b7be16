//! Suppression combinators and the deferred-computation model they wrap.
//!
//! # Architecture
//!
//! ```text
//! runner::run_silently_async(launch, fallback)
//!         |
//!         v  launch phase (caller thread, may fail -> fallback)
//! Executor::launch(work) -> Deferred (Pending)
//!         |
//!         v  completion phase (worker pool)
//! Resolver::resolve(outcome) -> Deferred (Succeeded | Failed)
//!         |
//!         +--> Deferred::observe()  -> Err(failure) at the observation point
//!         +--> dropped unobserved   -> OrphanSink::report(failure)
//! ```

pub mod blocks;
mod deferred;
mod executor;
mod orphan;
pub mod runner;

pub use deferred::{Deferred, Resolver};
pub use executor::{Executor, ExecutorError};
pub use orphan::{OrphanSink, OrphanedFailure};
pub use runner::{
    run_silently_async, run_silently_async_effect, run_silently_effect, run_silently_sync,
    silence_async, silence_effect, silence_sync,
};

pub use silently_types::{
    DeferredId, DeferredState, Failure, FailureKind, OrphanPolicy, Outcome, Silenced,
};
