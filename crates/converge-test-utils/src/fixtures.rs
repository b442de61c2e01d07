//! Resource fixtures.

use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use converge_domain::{Condition, ConditionStatus, ObjectMeta, Space, UserSignup};
use converge_poll::PollConfig;

/// Metadata as a store would return it, with uid and creation time set
pub fn stored_meta(namespace: &str, name: &str) -> ObjectMeta {
    ObjectMeta {
        uid: Some(Uuid::new_v4()),
        creation_timestamp: Some(Utc::now()),
        generation: 1,
        ..ObjectMeta::namespaced(namespace, name)
    }
}

/// A freshly created space on `tier`
pub fn space(namespace: &str, name: &str, tier: &str) -> Space {
    let mut space = Space {
        metadata: stored_meta(namespace, name),
        ..Default::default()
    };
    space.spec.tier_name = tier.to_string();
    space
}

/// A pending signup for `username`
pub fn user_signup(namespace: &str, name: &str, username: &str) -> UserSignup {
    let mut signup = UserSignup {
        metadata: stored_meta(namespace, name),
        ..Default::default()
    };
    signup.spec.username = username.to_string();
    signup
}

/// `Ready=True` with the given reason
pub fn ready(reason: &str) -> Condition {
    Condition::new("Ready", ConditionStatus::True).with_reason(reason)
}

/// `Ready=False` with the given reason
pub fn not_ready(reason: &str) -> Condition {
    Condition::new("Ready", ConditionStatus::False).with_reason(reason)
}

/// Short timing for tests: 5 s timeout, 10 ms tick
pub fn fast_poll() -> PollConfig {
    PollConfig::new(Duration::from_secs(5), Duration::from_millis(10))
}
