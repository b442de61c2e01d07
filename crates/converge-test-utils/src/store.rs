//! Store fakes.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use converge_core::{Keyed, ObjectKey};
use converge_poll::{ListScope, Store, StoreError};

/// Thread-safe in-memory store.
///
/// Objects are kept in insertion order, so `list` is deterministic. Clones
/// share the same contents, which lets a test mutate the store from a spawned
/// task while a poller reads it.
pub struct InMemoryStore<T> {
    objects: Arc<RwLock<Vec<T>>>,
    calls: Arc<AtomicUsize>,
}

impl<T> Clone for InMemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            objects: Arc::clone(&self.objects),
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<T> fmt::Debug for InMemoryStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("object_count", &self.objects.read().len())
            .field("calls", &self.calls.load(Ordering::SeqCst))
            .finish()
    }
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self {
            objects: Arc::new(RwLock::new(Vec::new())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl<T: Keyed + Clone> InMemoryStore<T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `objects`.
    pub fn with_objects(objects: impl IntoIterator<Item = T>) -> Self {
        let store = Self::new();
        for obj in objects {
            store.insert(obj);
        }
        store
    }

    /// Insert or replace an object, keyed by [`Keyed::object_key`].
    pub fn insert(&self, obj: T) {
        let key = obj.object_key();
        let mut objects = self.objects.write();
        match objects.iter_mut().find(|o| o.object_key() == key) {
            Some(existing) => *existing = obj,
            None => objects.push(obj),
        }
    }

    /// Mutate an object in place. Returns false when it does not exist.
    pub fn update(&self, key: &ObjectKey, f: impl FnOnce(&mut T)) -> bool {
        let mut objects = self.objects.write();
        match objects.iter_mut().find(|o| o.object_key() == *key) {
            Some(obj) => {
                f(obj);
                true
            }
            None => false,
        }
    }

    /// Remove an object.
    pub fn delete(&self, key: &ObjectKey) -> Option<T> {
        let mut objects = self.objects.write();
        let index = objects.iter().position(|o| o.object_key() == *key)?;
        Some(objects.remove(index))
    }

    /// Snapshot of an object, bypassing call accounting.
    pub fn peek(&self, key: &ObjectKey) -> Option<T> {
        self.objects.read().iter().find(|o| o.object_key() == *key).cloned()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Number of `get` and `list` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T> Store<T> for InMemoryStore<T>
where
    T: Keyed + Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &ObjectKey) -> Result<T, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.peek(key).ok_or_else(|| StoreError::NotFound(key.clone()))
    }

    async fn list(&self, scope: &ListScope) -> Result<Vec<T>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let objects = self.objects.read();
        Ok(objects
            .iter()
            .filter(|o| match &scope.namespace {
                Some(ns) => o.object_key().namespace.as_deref() == Some(ns.as_str()),
                None => true,
            })
            .cloned()
            .collect())
    }
}

/// Store wrapper injecting failures and latency.
///
/// The first `failures` calls fail with a backend error. Every call, failed or
/// not, is delayed by `delay` first.
pub struct FlakyStore<S> {
    inner: S,
    remaining_failures: AtomicUsize,
    delay: Duration,
}

impl<S> FlakyStore<S> {
    /// Wrap `inner`, failing its first `failures` calls.
    pub fn new(inner: S, failures: usize) -> Self {
        Self {
            inner,
            remaining_failures: AtomicUsize::new(failures),
            delay: Duration::ZERO,
        }
    }

    /// Delay every call by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// The wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn before_call(&self, op: &str) -> Result<(), StoreError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let injected = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            debug!(op, "injecting store failure");
            return Err(StoreError::Backend(anyhow!("injected failure on {}", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl<T, S> Store<T> for FlakyStore<S>
where
    T: Send + Sync + 'static,
    S: Store<T>,
{
    async fn get(&self, key: &ObjectKey) -> Result<T, StoreError> {
        self.before_call("get").await?;
        self.inner.get(key).await
    }

    async fn list(&self, scope: &ListScope) -> Result<Vec<T>, StoreError> {
        self.before_call("list").await?;
        self.inner.list(scope).await
    }
}
