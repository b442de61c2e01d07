//! Waiting for an object to disappear.

use std::time::Duration;

use converge_core::{FluentAssertions, ObjectKey};
use converge_domain::SpaceAssertions;
use converge_poll::{find, PollConfig, PollError};
use converge_tests::fixtures::{fast_poll, space};
use converge_tests::{after, init_test_tracing, settle, timed, FlakyStore, InMemoryStore};
use pretty_assertions::assert_eq;

fn john() -> SpaceAssertions {
    SpaceAssertions::new()
        .metadata()
        .in_namespace("toolchain")
        .metadata()
        .has_name("john")
}

#[tokio::test(start_paused = true)]
async fn test_converges_once_object_is_gone() {
    init_test_tracing();
    let store = InMemoryStore::with_objects([space("toolchain", "john", "base")]);

    let writer = store.clone();
    let deletion = after(Duration::from_millis(300), move || {
        writer.delete(&ObjectKey::new("toolchain", "john"));
    });

    let (result, elapsed) = timed(find(&store, john().build()).with_config(fast_poll()).deleted()).await;
    settle(deletion).await;

    assert!(result.is_ok(), "{:?}", result.err());
    assert!(elapsed >= Duration::from_millis(300));
    assert!(elapsed <= Duration::from_millis(310));
    assert!(store.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_already_absent_returns_immediately() {
    let store = InMemoryStore::with_objects([space("toolchain", "jane", "base")]);

    let (result, elapsed) = timed(find(&store, john().build()).with_config(fast_poll()).deleted()).await;

    assert!(result.is_ok());
    assert_eq!(elapsed, Duration::ZERO);
    assert_eq!(store.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_other_store_errors_are_fatal() {
    init_test_tracing();
    let store = FlakyStore::new(InMemoryStore::with_objects([space("toolchain", "john", "base")]), 1);

    let err = find(&store, john().build())
        .with_config(fast_poll())
        .deleted()
        .await
        .expect_err("backend failure is not a deletion");

    match err {
        PollError::Store { awaited, elapsed, source } => {
            assert_eq!(awaited, "Space toolchain/john to be deleted");
            assert_eq!(elapsed, Duration::ZERO);
            assert!(!source.is_not_found());
        }
        other => panic!("expected a store error, got {:?}", other),
    }
    assert_eq!(store.inner().calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_when_object_stays() {
    init_test_tracing();
    let store = InMemoryStore::with_objects([space("toolchain", "john", "base")]);

    let err = find(&store, john().build())
        .with_config(PollConfig::new(Duration::from_millis(200), Duration::from_millis(50)))
        .deleted()
        .await
        .expect_err("never deleted");

    let timeout = err.as_timeout().expect("timeout");
    assert_eq!(timeout.elapsed, Duration::from_millis(200));
    assert_eq!(timeout.failures, vec!["toolchain/john still exists"]);
}
