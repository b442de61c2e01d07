//! The store the engine polls.
//!
//! Implemented by collaborators wrapping a remote typed API client. The engine
//! only relies on `get` and `list` and is agnostic to the wire format.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use converge_core::ObjectKey;

#[cfg(test)]
use mockall::automock;

/// Errors reported by a [`Store`]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The object does not exist (yet, or any more)
    #[error("{0} not found")]
    NotFound(ObjectKey),

    /// Any other failure of the backing store or its transport
    #[error("store error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    /// Whether this is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Which objects a `list` call returns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListScope {
    /// Restrict to one namespace, `None` for all namespaces
    pub namespace: Option<String>,
}

impl ListScope {
    /// Every namespace
    pub fn all() -> Self {
        Self::default()
    }

    /// A single namespace
    pub fn namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
        }
    }
}

/// Read access to a typed, eventually consistent store
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Store<T: Send + Sync + 'static>: Send + Sync {
    /// Fetch one object by key
    async fn get(&self, key: &ObjectKey) -> Result<T, StoreError>;

    /// List objects in scope, in the store's own order
    async fn list(&self, scope: &ListScope) -> Result<Vec<T>, StoreError>;
}
