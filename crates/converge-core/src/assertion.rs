//! The assertion contract and the ordered list combinator.

use std::fmt;
use std::sync::Arc;

use crate::explain::AssertionFixer;
use crate::sink::{Collector, FailureSink};

/// A stateless predicate over `T`.
///
/// `test` reports zero or more failures to the sink and must not mutate the
/// object or block. Implementations may additionally expose identity markers
/// and a fixer through the provided capability methods.
pub trait Assertion<T: ?Sized>: Send + Sync {
    /// Check `obj` and report every mismatch to `sink`.
    fn test(&self, sink: &mut dyn FailureSink, obj: &T);

    /// Human readable description used in diagnostics.
    fn describe(&self) -> String {
        short_type_name::<Self>()
    }

    /// The object name this assertion pins down, if any.
    fn name_marker(&self) -> Option<&str> {
        None
    }

    /// The object namespace this assertion pins down, if any.
    fn namespace_marker(&self) -> Option<&str> {
        None
    }

    /// The fixer capability, if this assertion can adapt an object to satisfy itself.
    fn as_fixer(&self) -> Option<&dyn AssertionFixer<T>> {
        None
    }

    /// Nested members when this assertion is itself a list.
    fn members(&self) -> Option<&[Arc<dyn Assertion<T>>]> {
        None
    }

    /// Every name marker reachable from this assertion, through nested lists
    /// and conversion wrappers. Disagreeing values are all kept.
    fn name_markers(&self) -> Vec<&str> {
        self.name_marker().into_iter().collect()
    }

    /// Every namespace marker reachable from this assertion.
    fn namespace_markers(&self) -> Vec<&str> {
        self.namespace_marker().into_iter().collect()
    }

    /// Descriptions of the leaf assertions behind this one.
    fn leaf_descriptions(&self) -> Vec<String> {
        vec![self.describe()]
    }

    /// Apply every fixer reachable from this assertion to `obj` and record the
    /// leaves that have none in `unexplained`.
    fn adapt_partially(&self, obj: &mut T, unexplained: &mut Vec<String>) {
        match self.as_fixer() {
            Some(fixer) => fixer.adapt_to_match(obj),
            None => unexplained.extend(self.leaf_descriptions()),
        }
    }
}

impl<T: ?Sized, A: Assertion<T> + ?Sized> Assertion<T> for Arc<A> {
    fn test(&self, sink: &mut dyn FailureSink, obj: &T) {
        (**self).test(sink, obj)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }

    fn name_marker(&self) -> Option<&str> {
        (**self).name_marker()
    }

    fn namespace_marker(&self) -> Option<&str> {
        (**self).namespace_marker()
    }

    fn as_fixer(&self) -> Option<&dyn AssertionFixer<T>> {
        (**self).as_fixer()
    }

    fn members(&self) -> Option<&[Arc<dyn Assertion<T>>]> {
        (**self).members()
    }

    fn name_markers(&self) -> Vec<&str> {
        (**self).name_markers()
    }

    fn namespace_markers(&self) -> Vec<&str> {
        (**self).namespace_markers()
    }

    fn leaf_descriptions(&self) -> Vec<String> {
        (**self).leaf_descriptions()
    }

    fn adapt_partially(&self, obj: &mut T, unexplained: &mut Vec<String>) {
        (**self).adapt_partially(obj, unexplained)
    }
}

/// Type name without its module path, e.g. `HasLabel` or `Lifted<ObjectMeta, Space>`.
pub fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for c in full.chars() {
        match c {
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | '&' => {
                out.push_str(segment.rsplit("::").next().unwrap_or_default());
                segment.clear();
                out.push(c);
            }
            _ => segment.push(c),
        }
    }
    out.push_str(segment.rsplit("::").next().unwrap_or_default());
    out
}

/// An assertion backed by a closure.
pub struct AssertionFn<F> {
    description: String,
    check: F,
}

/// Wrap a closure as an [`Assertion`].
pub fn assertion_fn<T, F>(description: impl Into<String>, check: F) -> AssertionFn<F>
where
    T: ?Sized,
    F: Fn(&mut dyn FailureSink, &T) + Send + Sync,
{
    AssertionFn {
        description: description.into(),
        check,
    }
}

impl<T, F> Assertion<T> for AssertionFn<F>
where
    T: ?Sized,
    F: Fn(&mut dyn FailureSink, &T) + Send + Sync,
{
    fn test(&self, sink: &mut dyn FailureSink, obj: &T) {
        (self.check)(sink, obj)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// Ordered sequence of assertions.
///
/// Testing a list runs every member even after earlier failures, so one
/// evaluation surfaces every mismatch. Declaration order is kept for
/// diagnostics and for fixer application.
pub struct AssertionList<T: ?Sized> {
    assertions: Vec<Arc<dyn Assertion<T>>>,
}

impl<T: ?Sized> AssertionList<T> {
    /// Create an empty list
    pub fn new() -> Self {
        Self {
            assertions: Vec::new(),
        }
    }

    /// Append an assertion, builder style
    pub fn with(mut self, assertion: impl Assertion<T> + 'static) -> Self {
        self.push(assertion);
        self
    }

    /// Append an assertion
    pub fn push(&mut self, assertion: impl Assertion<T> + 'static) {
        self.assertions.push(Arc::new(assertion));
    }

    /// Append an already shared assertion
    pub fn push_shared(&mut self, assertion: Arc<dyn Assertion<T>>) {
        self.assertions.push(assertion);
    }

    /// Append a closure assertion
    pub fn push_fn<F>(&mut self, description: impl Into<String>, check: F)
    where
        F: Fn(&mut dyn FailureSink, &T) + Send + Sync + 'static,
    {
        self.push(assertion_fn(description, check));
    }

    /// Append every member of `other`, keeping its order
    pub fn extend_from(&mut self, other: &AssertionList<T>) {
        self.assertions.extend(other.assertions.iter().cloned());
    }

    /// Number of direct members
    pub fn len(&self) -> usize {
        self.assertions.len()
    }

    /// Whether the list has no members
    pub fn is_empty(&self) -> bool {
        self.assertions.is_empty()
    }

    /// Iterate over the direct members
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Assertion<T>>> {
        self.assertions.iter()
    }

    /// All leaf assertions in declaration order, descending into nested lists.
    pub fn flatten(&self) -> Vec<&dyn Assertion<T>> {
        fn visit<'a, T: ?Sized>(assertion: &'a dyn Assertion<T>, out: &mut Vec<&'a dyn Assertion<T>>) {
            match assertion.members() {
                Some(members) => {
                    for member in members {
                        visit(&**member, out);
                    }
                }
                None => out.push(assertion),
            }
        }

        let mut out = Vec::new();
        for assertion in &self.assertions {
            visit(&**assertion, &mut out);
        }
        out
    }

    /// Evaluate against `obj` and return the failure messages
    pub fn failures(&self, obj: &T) -> Vec<String> {
        let mut sink = Collector::new();
        self.test(&mut sink, obj);
        sink.into_failures()
    }

    /// Whether `obj` satisfies every member
    pub fn passes(&self, obj: &T) -> bool {
        let mut sink = Collector::new();
        self.test(&mut sink, obj);
        !sink.failed()
    }
}

fn agreed(values: Vec<&str>) -> Option<&str> {
    let first = *values.first()?;
    values.iter().all(|v| *v == first).then_some(first)
}

impl<T: ?Sized> Default for AssertionList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for AssertionList<T> {
    fn clone(&self) -> Self {
        Self {
            assertions: self.assertions.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for AssertionList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.assertions.iter().map(|a| a.describe()))
            .finish()
    }
}

impl<T: ?Sized> Assertion<T> for AssertionList<T> {
    fn test(&self, sink: &mut dyn FailureSink, obj: &T) {
        sink.helper();
        for assertion in &self.assertions {
            assertion.test(sink, obj);
        }
    }

    fn describe(&self) -> String {
        let parts: Vec<String> = self.assertions.iter().map(|a| a.describe()).collect();
        format!("all of [{}]", parts.join(", "))
    }

    // A list identifies an object only when its members agree.
    fn name_marker(&self) -> Option<&str> {
        agreed(self.name_markers())
    }

    fn namespace_marker(&self) -> Option<&str> {
        agreed(self.namespace_markers())
    }

    fn as_fixer(&self) -> Option<&dyn AssertionFixer<T>> {
        if self.flatten().iter().all(|a| a.as_fixer().is_some()) {
            Some(self)
        } else {
            None
        }
    }

    fn members(&self) -> Option<&[Arc<dyn Assertion<T>>]> {
        Some(&self.assertions)
    }

    fn name_markers(&self) -> Vec<&str> {
        self.assertions.iter().flat_map(|a| a.name_markers()).collect()
    }

    fn namespace_markers(&self) -> Vec<&str> {
        self.assertions.iter().flat_map(|a| a.namespace_markers()).collect()
    }

    fn leaf_descriptions(&self) -> Vec<String> {
        self.assertions.iter().flat_map(|a| a.leaf_descriptions()).collect()
    }

    fn adapt_partially(&self, obj: &mut T, unexplained: &mut Vec<String>) {
        for assertion in &self.assertions {
            assertion.adapt_partially(obj, unexplained);
        }
    }
}

impl<T: ?Sized> AssertionFixer<T> for AssertionList<T> {
    fn adapt_to_match(&self, obj: &mut T) {
        for assertion in self.flatten() {
            if let Some(fixer) = assertion.as_fixer() {
                fixer.adapt_to_match(obj);
            }
        }
    }
}
