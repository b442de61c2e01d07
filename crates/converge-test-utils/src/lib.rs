//! Testing utilities for converge.
//!
//! Fakes for the [`Store`](converge_poll::Store) trait, fault injection,
//! resource fixtures and tracing setup for tests.

pub mod fixtures;
pub mod logging;
pub mod store;

/// Re-export commonly used types for convenience
pub use mockall;

pub use logging::init_test_tracing;
pub use store::{FlakyStore, InMemoryStore};
