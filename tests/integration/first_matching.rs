//! Waiting for any object in a namespace to reach a desired state.

use std::time::Duration;

use converge_core::{FluentAssertions, ObjectKey};
use converge_domain::{UserSignup, UserSignupAssertions};
use converge_poll::{find, PollConfig};
use converge_tests::fixtures::{fast_poll, user_signup};
use converge_tests::{after, init_test_tracing, settle, InMemoryStore};
use pretty_assertions::assert_eq;

fn approved_in_toolchain() -> UserSignupAssertions {
    UserSignupAssertions::new()
        .metadata()
        .in_namespace("toolchain")
        .is_approved()
}

#[tokio::test(start_paused = true)]
async fn test_returns_first_match_in_store_order() {
    init_test_tracing();
    let mut second = user_signup("toolchain", "b", "bob");
    second.spec.approved = true;
    let mut third = user_signup("toolchain", "c", "carol");
    third.spec.approved = true;
    let store = InMemoryStore::with_objects([user_signup("toolchain", "a", "alice"), second, third]);

    let found = find(&store, approved_in_toolchain().build())
        .with_config(fast_poll())
        .first_matching()
        .await
        .expect("bob is approved");

    assert_eq!(found.metadata.name, "b");
}

#[tokio::test(start_paused = true)]
async fn test_scope_follows_namespace_marker() {
    init_test_tracing();
    let mut elsewhere = user_signup("other", "x", "xavier");
    elsewhere.spec.approved = true;
    let store = InMemoryStore::with_objects([elsewhere, user_signup("toolchain", "a", "alice")]);

    let writer = store.clone();
    let approval = after(Duration::from_millis(100), move || {
        writer.update(&ObjectKey::new("toolchain", "a"), |s| s.spec.approved = true);
    });

    let found = find(&store, approved_in_toolchain().build())
        .with_config(fast_poll())
        .first_matching()
        .await
        .expect("alice gets approved");
    settle(approval).await;

    assert_eq!(found.metadata.name, "a");
}

#[tokio::test(start_paused = true)]
async fn test_timeout_explains_closest_candidate() {
    init_test_tracing();
    let mut close = user_signup("toolchain", "b", "bob");
    close.spec.approved = true;
    let store: InMemoryStore<UserSignup> =
        InMemoryStore::with_objects([user_signup("toolchain", "a", "alice"), close]);

    let err = find(
        &store,
        approved_in_toolchain().has_username("carol").build(),
    )
    .with_config(PollConfig::new(Duration::from_millis(200), Duration::from_millis(50)))
    .first_matching()
    .await
    .expect_err("carol never signs up");

    let timeout = err.as_timeout().expect("timeout");
    assert_eq!(timeout.awaited, "any UserSignup in namespace toolchain matching 3 assertion(s)");
    assert_eq!(timeout.failures, vec!["expected username 'carol', got 'bob'"]);
    let explanation = timeout.explanation.as_ref().expect("closest candidate explained");
    assert_eq!(explanation.diff_text(), "~ spec.username: \"bob\" -> \"carol\"");
}

#[tokio::test(start_paused = true)]
async fn test_explicit_namespace_widens_nothing_else() {
    init_test_tracing();
    let mut elsewhere = user_signup("other", "x", "xavier");
    elsewhere.spec.approved = true;
    let store = InMemoryStore::with_objects([elsewhere]);

    let found = find(&store, UserSignupAssertions::new().is_approved().build())
        .in_namespace("other")
        .with_config(fast_poll())
        .first_matching()
        .await
        .expect("approved signup in other");

    assert_eq!(found.metadata.key(), ObjectKey::new("other", "x"));
}

#[tokio::test(start_paused = true)]
async fn test_no_marker_scans_every_namespace() {
    init_test_tracing();
    let store = InMemoryStore::with_objects([user_signup("a", "one", "ann"), user_signup("b", "two", "ben")]);

    let found = find(&store, UserSignupAssertions::new().has_username("ben").build())
        .with_config(fast_poll())
        .first_matching()
        .await
        .expect("ben found in namespace b");

    assert_eq!(found.metadata.namespace.as_deref(), Some("b"));
}
