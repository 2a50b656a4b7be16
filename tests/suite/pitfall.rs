//! The sync runner suppresses every failure; the async runner only
//! suppresses failures raised while launching.

use silently_core::blocks::{Blocks, EffectLog, effect, effect_crash, two, two_crash};
use silently_core::{
    Deferred, DeferredState, Failure, FailureKind, OrphanPolicy, run_silently_async,
    run_silently_async_effect, run_silently_effect, run_silently_sync, silence_async,
    silence_sync,
};

use crate::common::executor;

#[test]
fn sync_runner_returns_value_or_fallback() {
    assert_eq!(run_silently_sync(two, 0), 2);
    assert_eq!(run_silently_sync(two_crash, 0), 0);

    for value in [-7, 0, 41, i32::MAX] {
        assert_eq!(run_silently_sync(|| Ok::<_, Failure>(value), 99), value);
        let failing = || -> Result<i32, Failure> { Err(Failure::invalid_operation("nope")) };
        assert_eq!(run_silently_sync(failing, value), value);
    }
}

#[test]
fn sync_runner_suppresses_panics() {
    let silenced = silence_sync(|| -> Result<i32, Failure> { panic!("exploded") }, 5);
    assert_eq!(silenced.value(), &5);
    assert_eq!(
        silenced.suppressed_failure(),
        Some(&Failure::Panicked("exploded".to_string()))
    );
}

#[test]
fn sync_effect_runs_once_and_swallows_failures() {
    let log = EffectLog::new();
    run_silently_effect(|| effect(&log));
    assert_eq!(log.count(), 1);

    run_silently_effect(effect_crash);
    assert_eq!(log.count(), 1);
}

#[tokio::test]
async fn async_runner_yields_value_once_awaited() {
    let executor = executor(OrphanPolicy::Escalate);
    let blocks = Blocks::new(&executor);

    let deferred = run_silently_async(|| blocks.two_async(), Deferred::succeeded(0));
    assert_eq!(deferred.observe().await, Ok(2));
}

#[tokio::test]
async fn launch_failure_is_replaced_by_fallback() {
    let executor = executor(OrphanPolicy::Escalate);
    let blocks = Blocks::new(&executor);

    let silenced = silence_async(|| blocks.double_async(-3), Deferred::succeeded(0));
    assert!(silenced.was_suppressed());
    assert_eq!(
        silenced.suppressed_failure().map(Failure::kind),
        Some(FailureKind::InvalidArgument)
    );

    let deferred = silenced.into_inner();
    assert_eq!(deferred.state(), DeferredState::Succeeded);
    assert_eq!(deferred.observe().await, Ok(0));
    assert_eq!(executor.in_flight(), 0);
}

#[tokio::test]
async fn completion_failure_escapes_the_async_runner() {
    let executor = executor(OrphanPolicy::Escalate);
    let blocks = Blocks::new(&executor);

    let silenced = silence_async(|| blocks.two_crash_async(), Deferred::succeeded(0));
    assert!(!silenced.was_suppressed());

    let deferred = silenced.into_inner();
    assert_eq!(
        deferred.observe().await,
        Err(Failure::invalid_operation("two crashed"))
    );
}

#[tokio::test]
async fn completion_failure_escapes_the_effect_runner() {
    let executor = executor(OrphanPolicy::Escalate);
    let blocks = Blocks::new(&executor);

    let deferred = run_silently_async_effect(|| blocks.effect_crash_async(), Deferred::completed());
    let failure = deferred.observe().await.unwrap_err();
    assert_eq!(failure.kind(), FailureKind::InvalidOperation);
    assert_eq!(blocks.effects().count(), 0);

    let inline = blocks.silently_effect_async();
    assert!(inline.observe().await.is_err());
}

#[tokio::test]
async fn launched_deferred_is_returned_unchanged() {
    let executor = executor(OrphanPolicy::Escalate);

    let launched = executor.launch("doubled", || Ok::<_, Failure>(21 * 2));
    let id = launched.id();
    let returned = run_silently_async(move || Ok::<_, Failure>(launched), Deferred::succeeded(0));

    assert_eq!(returned.id(), id);
    assert_eq!(returned.label(), "doubled");
    assert_eq!(returned.observe().await, Ok(42));
}

#[tokio::test]
async fn overflow_is_a_completion_failure() {
    let executor = executor(OrphanPolicy::Escalate);
    let blocks = Blocks::new(&executor);

    let deferred = run_silently_async(|| blocks.double_async(i32::MAX), Deferred::succeeded(0));
    let failure = deferred.observe().await.unwrap_err();
    assert_eq!(failure.kind(), FailureKind::InvalidOperation);
}
