//! Embeddable builder mixins.
//!
//! A mixin is a reusable package of fluent assertion methods (metadata,
//! conditions, ...) that can be mounted on any resource specific builder. Each
//! mixin method appends to the list shared with its parent and hands the parent
//! back, so calls across mixins and the parent accumulate in call order:
//!
//! ```ignore
//! let assertions = SpaceAssertions::new()
//!     .metadata().has_name("john")
//!     .conditions().has_condition("Ready", ConditionStatus::True)
//!     .has_tier("base")
//!     .build();
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::assertion::{assertion_fn, Assertion, AssertionList};
use crate::sink::FailureSink;

/// The list a fluent chain accumulates into.
pub type SharedAssertions<T> = Arc<Mutex<AssertionList<T>>>;

/// Create an empty shared list
pub fn shared_list<T: ?Sized>() -> SharedAssertions<T> {
    Arc::new(Mutex::new(AssertionList::new()))
}

/// Binding of a mixin to its parent builder and the parent's list.
pub struct EmbeddableAssertions<S, T: ?Sized> {
    parent: S,
    list: SharedAssertions<T>,
}

impl<S, T: ?Sized> EmbeddableAssertions<S, T> {
    /// Bind a mixin to `parent` and the list it shares with it.
    ///
    /// This is the only way to obtain a mixin, so an unbound mixin cannot exist.
    pub fn wire_up(parent: S, list: SharedAssertions<T>) -> Self {
        Self { parent, list }
    }

    /// Append an assertion to the shared list
    pub fn add_assertion(&self, assertion: impl Assertion<T> + 'static) {
        self.list.lock().push(assertion);
    }

    /// Append a closure assertion to the shared list
    pub fn add_assertion_fn<F>(&self, description: impl Into<String>, check: F)
    where
        F: Fn(&mut dyn FailureSink, &T) + Send + Sync + 'static,
    {
        self.add_assertion(assertion_fn(description, check));
    }

    /// Append an assertion and hand back the parent builder
    pub fn then(self, assertion: impl Assertion<T> + 'static) -> S {
        self.add_assertion(assertion);
        self.parent
    }

    /// The parent builder, to continue the chain
    pub fn parent(self) -> S {
        self.parent
    }

    /// The shared list
    pub fn list(&self) -> &SharedAssertions<T> {
        &self.list
    }
}

/// A top-level fluent builder owning a shared list.
pub trait FluentAssertions<T: ?Sized>: Sized {
    /// The list this builder and its mixins append to
    fn shared(&self) -> &SharedAssertions<T>;

    /// Mount a mixin on this builder
    fn embed<M>(self) -> M
    where
        M: From<EmbeddableAssertions<Self, T>>,
    {
        let list = Arc::clone(self.shared());
        M::from(EmbeddableAssertions::wire_up(self, list))
    }

    /// Append an assertion directly
    fn satisfies(self, assertion: impl Assertion<T> + 'static) -> Self {
        self.shared().lock().push(assertion);
        self
    }

    /// Append a closure assertion directly
    fn satisfies_fn<F>(self, description: impl Into<String>, check: F) -> Self
    where
        F: Fn(&mut dyn FailureSink, &T) + Send + Sync + 'static,
    {
        self.shared().lock().push_fn(description, check);
        self
    }

    /// Snapshot of the accumulated list, ready for evaluation
    fn build(&self) -> AssertionList<T> {
        self.shared().lock().clone()
    }
}
