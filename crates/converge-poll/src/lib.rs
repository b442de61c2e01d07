//! Converge Poll - wait for an eventually consistent store to converge
//!
//! This crate drives `get` / `list` calls against a [`Store`] and evaluates
//! the fetched objects with assertions from `converge-core` until they hold
//! or the deadline passes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Poll timing configuration
pub mod config;

/// Error types
pub mod error;

/// The polling engine
pub mod finder;

/// The store abstraction
pub mod store;

pub use config::PollConfig;
pub use error::{PollError, PollResult, TimeoutError};
pub use finder::{find, Finder};
pub use store::{ListScope, Store, StoreError};
