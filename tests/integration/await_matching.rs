//! Waiting for one object to reach a desired state.

use std::time::Duration;

use converge_core::{FluentAssertions, ObjectKey};
use converge_domain::{Space, SpaceAssertions};
use converge_poll::{find, PollConfig, PollError};
use converge_tests::fixtures::{fast_poll, not_ready, ready, space};
use converge_tests::{after, init_test_tracing, settle, timed, FlakyStore, InMemoryStore};
use pretty_assertions::assert_eq;

fn john_is_ready() -> SpaceAssertions {
    SpaceAssertions::new()
        .metadata()
        .in_namespace("toolchain")
        .metadata()
        .has_name("john")
        .conditions()
        .is_ready()
}

#[tokio::test(start_paused = true)]
async fn test_waits_for_delayed_creation() {
    init_test_tracing();
    let store: InMemoryStore<Space> = InMemoryStore::new();

    let writer = store.clone();
    let creation = after(Duration::from_millis(200), move || {
        let mut created = space("toolchain", "john", "base");
        created.status.conditions.push(ready("Provisioned"));
        writer.insert(created);
    });

    let (found, elapsed) = timed(find(&store, john_is_ready().build()).with_config(fast_poll()).matching()).await;
    settle(creation).await;

    let found = found.expect("space becomes ready");
    assert_eq!(found.metadata.name, "john");
    assert!(elapsed >= Duration::from_millis(200), "converged before creation: {:?}", elapsed);
    assert!(elapsed <= Duration::from_millis(210), "missed a tick: {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_waits_for_status_to_progress() {
    init_test_tracing();
    let mut initial = space("toolchain", "john", "base");
    initial.status.conditions.push(not_ready("Provisioning"));
    let store = InMemoryStore::with_objects([initial]);

    let writer = store.clone();
    let progress = after(Duration::from_millis(500), move || {
        writer.update(&ObjectKey::new("toolchain", "john"), |s| {
            s.status.conditions = vec![ready("Provisioned")];
        });
    });

    let found = find(&store, john_is_ready().has_tier("base").build())
        .with_config(fast_poll())
        .matching()
        .await
        .expect("space becomes ready");
    settle(progress).await;

    assert_eq!(found.status.conditions, vec![ready("Provisioned")]);
    assert!(store.calls() >= 50, "expected a poll per tick, got {}", store.calls());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_reports_diff_of_last_object() {
    init_test_tracing();
    let mut current = space("toolchain", "john", "base");
    current.status.conditions.push(not_ready("Provisioning"));
    let store = InMemoryStore::with_objects([current]);

    let err = find(&store, john_is_ready().has_tier("advanced").build())
        .with_config(PollConfig::new(Duration::from_secs(1), Duration::from_millis(100)))
        .matching()
        .await
        .expect_err("tier never changes");

    let timeout = err.as_timeout().expect("timeout");
    assert_eq!(timeout.elapsed, Duration::from_secs(1));
    assert_eq!(
        timeout.failures,
        vec![
            "expected condition 'Ready' to be True, got False",
            "expected tier 'advanced', got 'base'",
        ]
    );

    let explanation = timeout.explanation.as_ref().expect("object was available");
    assert!(explanation.unexplained.is_empty());
    assert_eq!(
        explanation.diff_text(),
        [
            "~ spec.tierName: \"base\" -> \"advanced\"",
            "~ status.conditions[0].status: \"False\" -> \"True\"",
        ]
        .join("\n")
    );
    assert!(err.to_string().starts_with(
        "timed out after 1s waiting for Space toolchain/john matching 4 assertion(s)"
    ));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_without_object_reports_store_error() {
    init_test_tracing();
    let store: InMemoryStore<Space> = InMemoryStore::new();

    let err = find(&store, john_is_ready().build())
        .with_config(PollConfig::new(Duration::from_millis(300), Duration::from_millis(100)))
        .matching()
        .await
        .expect_err("never created");

    let timeout = err.as_timeout().expect("timeout");
    assert_eq!(timeout.last_error.as_deref(), Some("toolchain/john not found"));
    assert!(timeout.failures.is_empty());
    assert!(timeout.explanation.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_transient_store_errors_are_retried() {
    init_test_tracing();
    let mut current = space("toolchain", "john", "base");
    current.status.conditions.push(ready("Provisioned"));
    let store = FlakyStore::new(InMemoryStore::with_objects([current]), 3);

    let (found, elapsed) = timed(find(&store, john_is_ready().build()).with_config(fast_poll()).matching()).await;

    assert!(found.is_ok(), "{:?}", found.err());
    assert_eq!(elapsed, Duration::from_millis(30));
    assert_eq!(store.inner().calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_hung_store_cannot_outlive_the_deadline() {
    init_test_tracing();
    let store = FlakyStore::new(InMemoryStore::with_objects([space("toolchain", "john", "base")]), 0)
        .with_delay(Duration::from_secs(3600));

    let (result, elapsed) = timed(
        find(&store, john_is_ready().build())
            .with_config(PollConfig::new(Duration::from_secs(1), Duration::from_millis(100)))
            .matching(),
    )
    .await;

    let err = result.expect_err("store never answers");
    assert!(elapsed < Duration::from_secs(2), "poll overran: {:?}", elapsed);
    let last_error = err
        .as_timeout()
        .and_then(|t| t.last_error.clone())
        .expect("store error recorded");
    assert!(last_error.contains("did not complete"), "{}", last_error);
}

#[tokio::test]
async fn test_missing_identity_fails_before_polling() {
    let store: InMemoryStore<Space> = InMemoryStore::new();

    let err = find(&store, SpaceAssertions::new().has_tier("base").build())
        .matching()
        .await
        .expect_err("no key");

    assert!(matches!(err, PollError::Identity(_)), "{:?}", err);
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_explicit_key_overrides_markers() {
    let mut current = space("other", "jane", "base");
    current.status.conditions.push(ready("Provisioned"));
    let store = InMemoryStore::with_objects([current]);

    let found = find(&store, SpaceAssertions::new().conditions().is_ready().build())
        .with_key(ObjectKey::new("other", "jane"))
        .with_config(fast_poll())
        .matching()
        .await
        .expect("found by explicit key");

    assert_eq!(found.metadata.key(), ObjectKey::new("other", "jane"));
}
