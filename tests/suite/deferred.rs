//! Deferred computations launched through an executor.

use std::time::Duration;

use silently_core::{DeferredState, Failure, FailureKind, OrphanPolicy, Outcome};

use crate::common::executor;

fn fail_late() -> Result<i32, Failure> {
    Err(Failure::invalid_operation("late"))
}

fn explode() -> Result<i32, Failure> {
    panic!("worker blew up")
}

async fn explode_later() -> Result<i32, Failure> {
    tokio::task::yield_now().await;
    panic!("future blew up")
}

#[tokio::test]
async fn observing_twice_returns_the_same_outcome() {
    let executor = executor(OrphanPolicy::Escalate);

    let value = executor.launch("value", || Ok::<_, Failure>(2));
    assert_eq!(value.observe().await, Ok(2));
    assert_eq!(value.observe().await, Ok(2));
    assert_eq!(value.outcome(), Some(Outcome::Succeeded(2)));

    let failed = executor.launch("failed", fail_late);
    let first = failed.observe().await;
    assert_eq!(first, failed.observe().await);
    assert_eq!(first, Err(Failure::invalid_operation("late")));
}

#[tokio::test]
async fn worker_panic_resolves_as_panicked() {
    let executor = executor(OrphanPolicy::Escalate);

    let deferred = executor.launch("panics", explode);
    assert_eq!(
        deferred.observe().await,
        Err(Failure::Panicked("worker blew up".to_string()))
    );

    let future = executor.launch_future("future_panics", explode_later());
    let failure = future.observe().await.unwrap_err();
    assert_eq!(failure.kind(), FailureKind::Panicked);
}

#[tokio::test]
async fn launch_returns_before_the_work_finishes() {
    let executor = executor(OrphanPolicy::Escalate);
    let (release, gate) = tokio::sync::oneshot::channel::<()>();

    let deferred = executor.launch_future("gated", async move {
        gate.await
            .map_err(|_| Failure::invalid_operation("gate dropped"))?;
        Ok::<_, Failure>(7)
    });
    assert_eq!(deferred.state(), DeferredState::Pending);

    release.send(()).unwrap();
    assert_eq!(deferred.settled().await, DeferredState::Succeeded);
    assert_eq!(deferred.await, Ok(7));
}

#[tokio::test]
async fn clones_share_observation() {
    let executor = executor(OrphanPolicy::Escalate);

    let deferred = executor.launch("shared", || {
        Err::<(), _>(Failure::invalid_operation("shared failure"))
    });
    let clone = deferred.clone();
    assert_eq!(clone.id(), deferred.id());

    assert!(clone.observe().await.is_err());
    assert!(deferred.was_observed());

    drop(deferred);
    drop(clone);
    executor.quiesce().await;
    assert!(executor.orphans().is_empty());
}

#[tokio::test]
async fn observed_failure_is_not_orphaned() {
    let executor = executor(OrphanPolicy::Log);

    let deferred = executor.launch("seen", || -> Result<i32, Failure> {
        std::thread::sleep(Duration::from_millis(10));
        Err(Failure::invalid_operation("seen"))
    });
    assert!(deferred.observe().await.is_err());
    drop(deferred);

    executor.quiesce().await;
    assert!(executor.orphans().is_empty());
    assert!(!executor.orphans().escalated());
}

#[tokio::test]
async fn launched_ids_are_distinct() {
    let executor = executor(OrphanPolicy::Escalate);

    let first = executor.launch("a", || Ok::<_, Failure>(1));
    let second = executor.launch("b", || Ok::<_, Failure>(2));
    assert_ne!(first.id(), second.id());
    assert!(!first.id().is_detached());

    executor.quiesce().await;
    assert_eq!(executor.in_flight(), 0);
    assert!(first.is_resolved() && second.is_resolved());
}
