//! Assertions over [`ObjectMeta`] and the mixin that mounts them on any kind.
//!
//! `HasName` and `InNamespace` carry identity markers, so a builder chain using
//! them is enough for the poller to know which object to fetch.

use converge_core::{convert_with_lens, Assertion, AssertionFixer, EmbeddableAssertions, FailureSink, Lifted};

use crate::resources::{HasMetadata, ObjectMeta};

/// The object has the given name
#[derive(Debug, Clone, PartialEq)]
pub struct HasName(pub String);

impl Assertion<ObjectMeta> for HasName {
    fn test(&self, sink: &mut dyn FailureSink, obj: &ObjectMeta) {
        if obj.name != self.0 {
            sink.error(format!("expected name '{}', got '{}'", self.0, obj.name));
        }
    }

    fn describe(&self) -> String {
        format!("name is {}", self.0)
    }

    fn name_marker(&self) -> Option<&str> {
        Some(&self.0)
    }

    fn as_fixer(&self) -> Option<&dyn AssertionFixer<ObjectMeta>> {
        Some(self)
    }
}

impl AssertionFixer<ObjectMeta> for HasName {
    fn adapt_to_match(&self, obj: &mut ObjectMeta) {
        obj.name = self.0.clone();
    }
}

/// The object lives in the given namespace
#[derive(Debug, Clone, PartialEq)]
pub struct InNamespace(pub String);

impl Assertion<ObjectMeta> for InNamespace {
    fn test(&self, sink: &mut dyn FailureSink, obj: &ObjectMeta) {
        match obj.namespace.as_deref() {
            Some(ns) if ns == self.0 => {}
            Some(ns) => sink.error(format!("expected namespace '{}', got '{}'", self.0, ns)),
            None => sink.error(format!("expected namespace '{}', object is cluster scoped", self.0)),
        }
    }

    fn describe(&self) -> String {
        format!("namespace is {}", self.0)
    }

    fn namespace_marker(&self) -> Option<&str> {
        Some(&self.0)
    }

    fn as_fixer(&self) -> Option<&dyn AssertionFixer<ObjectMeta>> {
        Some(self)
    }
}

impl AssertionFixer<ObjectMeta> for InNamespace {
    fn adapt_to_match(&self, obj: &mut ObjectMeta) {
        obj.namespace = Some(self.0.clone());
    }
}

/// A label is set to a value
#[derive(Debug, Clone, PartialEq)]
pub struct HasLabel {
    /// Label key
    pub key: String,
    /// Expected value
    pub value: String,
}

impl Assertion<ObjectMeta> for HasLabel {
    fn test(&self, sink: &mut dyn FailureSink, obj: &ObjectMeta) {
        match obj.labels.get(&self.key) {
            Some(v) if *v == self.value => {}
            Some(v) => sink.error(format!(
                "expected label '{}' to be '{}', got '{}'",
                self.key, self.value, v
            )),
            None => sink.error(format!("missing label '{}'", self.key)),
        }
    }

    fn describe(&self) -> String {
        format!("label {}={}", self.key, self.value)
    }

    fn as_fixer(&self) -> Option<&dyn AssertionFixer<ObjectMeta>> {
        Some(self)
    }
}

impl AssertionFixer<ObjectMeta> for HasLabel {
    fn adapt_to_match(&self, obj: &mut ObjectMeta) {
        obj.labels.insert(self.key.clone(), self.value.clone());
    }
}

/// A label is absent
#[derive(Debug, Clone, PartialEq)]
pub struct LacksLabel(pub String);

impl Assertion<ObjectMeta> for LacksLabel {
    fn test(&self, sink: &mut dyn FailureSink, obj: &ObjectMeta) {
        if let Some(v) = obj.labels.get(&self.0) {
            sink.error(format!("expected no label '{}', got '{}'", self.0, v));
        }
    }

    fn describe(&self) -> String {
        format!("no label {}", self.0)
    }

    fn as_fixer(&self) -> Option<&dyn AssertionFixer<ObjectMeta>> {
        Some(self)
    }
}

impl AssertionFixer<ObjectMeta> for LacksLabel {
    fn adapt_to_match(&self, obj: &mut ObjectMeta) {
        obj.labels.remove(&self.0);
    }
}

/// An annotation is set to a value
#[derive(Debug, Clone, PartialEq)]
pub struct HasAnnotation {
    /// Annotation key
    pub key: String,
    /// Expected value
    pub value: String,
}

impl Assertion<ObjectMeta> for HasAnnotation {
    fn test(&self, sink: &mut dyn FailureSink, obj: &ObjectMeta) {
        match obj.annotations.get(&self.key) {
            Some(v) if *v == self.value => {}
            Some(v) => sink.error(format!(
                "expected annotation '{}' to be '{}', got '{}'",
                self.key, self.value, v
            )),
            None => sink.error(format!("missing annotation '{}'", self.key)),
        }
    }

    fn describe(&self) -> String {
        format!("annotation {}={}", self.key, self.value)
    }

    fn as_fixer(&self) -> Option<&dyn AssertionFixer<ObjectMeta>> {
        Some(self)
    }
}

impl AssertionFixer<ObjectMeta> for HasAnnotation {
    fn adapt_to_match(&self, obj: &mut ObjectMeta) {
        obj.annotations.insert(self.key.clone(), self.value.clone());
    }
}

/// A finalizer is present
#[derive(Debug, Clone, PartialEq)]
pub struct HasFinalizer(pub String);

impl Assertion<ObjectMeta> for HasFinalizer {
    fn test(&self, sink: &mut dyn FailureSink, obj: &ObjectMeta) {
        if !obj.finalizers.contains(&self.0) {
            sink.error(format!("missing finalizer '{}'", self.0));
        }
    }

    fn describe(&self) -> String {
        format!("finalizer {}", self.0)
    }

    fn as_fixer(&self) -> Option<&dyn AssertionFixer<ObjectMeta>> {
        Some(self)
    }
}

impl AssertionFixer<ObjectMeta> for HasFinalizer {
    fn adapt_to_match(&self, obj: &mut ObjectMeta) {
        if !obj.finalizers.contains(&self.0) {
            obj.finalizers.push(self.0.clone());
        }
    }
}

/// Lift a metadata assertion onto any kind carrying metadata.
///
/// Markers and fixers of `assertion` are preserved.
pub fn on_metadata<T>(assertion: impl Assertion<ObjectMeta> + 'static) -> Lifted<ObjectMeta, T>
where
    T: HasMetadata + ?Sized + 'static,
{
    convert_with_lens(
        |obj: &T| Some(obj.metadata()),
        |obj: &mut T| Some(obj.metadata_mut()),
        assertion,
    )
}

/// Metadata mixin, mounted with `FluentAssertions::embed`.
pub struct MetadataAssertions<S, T: ?Sized> {
    inner: EmbeddableAssertions<S, T>,
}

impl<S, T: ?Sized> From<EmbeddableAssertions<S, T>> for MetadataAssertions<S, T> {
    fn from(inner: EmbeddableAssertions<S, T>) -> Self {
        Self { inner }
    }
}

impl<S, T> MetadataAssertions<S, T>
where
    T: HasMetadata + ?Sized + 'static,
{
    fn lift(self, assertion: impl Assertion<ObjectMeta> + 'static) -> S {
        self.inner.then(on_metadata::<T>(assertion))
    }

    /// Expect the given name
    pub fn has_name(self, name: impl Into<String>) -> S {
        self.lift(HasName(name.into()))
    }

    /// Expect the given namespace
    pub fn in_namespace(self, namespace: impl Into<String>) -> S {
        self.lift(InNamespace(namespace.into()))
    }

    /// Expect label `key` to be `value`
    pub fn has_label(self, key: impl Into<String>, value: impl Into<String>) -> S {
        self.lift(HasLabel {
            key: key.into(),
            value: value.into(),
        })
    }

    /// Expect label `key` to be absent
    pub fn lacks_label(self, key: impl Into<String>) -> S {
        self.lift(LacksLabel(key.into()))
    }

    /// Expect annotation `key` to be `value`
    pub fn has_annotation(self, key: impl Into<String>, value: impl Into<String>) -> S {
        self.lift(HasAnnotation {
            key: key.into(),
            value: value.into(),
        })
    }

    /// Expect the finalizer to be present
    pub fn has_finalizer(self, finalizer: impl Into<String>) -> S {
        self.lift(HasFinalizer(finalizer.into()))
    }
}
