//! Conversion and lifting of assertions across types.
//!
//! An `Assertion<From>` is reused as an `Assertion<To>` through an accessor
//! projecting `To` onto `From`. When the accessor cannot project the object the
//! wrapper reports an invalid conversion instead of passing silently.
//!
//! Identity markers survive the conversion. The wrapper variant is picked once,
//! when the assertion is lifted, from the markers the wrapped assertion
//! carries, and the chosen variant forwards `name_marker` / `namespace_marker`
//! to it.

use std::any::Any;
use std::sync::Arc;

use crate::assertion::{short_type_name, Assertion};
use crate::error::ConversionError;
use crate::explain::AssertionFixer;
use crate::sink::FailureSink;
use crate::util::AsAny;

type Getter<From, To> = Box<dyn Fn(&To) -> Option<&From> + Send + Sync>;
type GetterMut<From, To> = Box<dyn Fn(&mut To) -> Option<&mut From> + Send + Sync>;

/// An assertion plus the accessor that feeds it.
pub struct Converted<From: ?Sized, To: ?Sized> {
    inner: Arc<dyn Assertion<From>>,
    get: Getter<From, To>,
    get_mut: Option<GetterMut<From, To>>,
}

impl<From: ?Sized, To: ?Sized> Converted<From, To> {
    /// The wrapped assertion
    pub fn inner(&self) -> &dyn Assertion<From> {
        &*self.inner
    }

    fn check(&self, sink: &mut dyn FailureSink, obj: &To) {
        match (self.get)(obj) {
            Some(from) => self.inner.test(sink, from),
            None => sink.invalid_conversion(ConversionError::new(
                self.inner.describe(),
                short_type_name::<To>(),
                short_type_name::<From>(),
            )),
        }
    }

    fn fixer(&self) -> Option<(&GetterMut<From, To>, &dyn AssertionFixer<From>)> {
        let get_mut = self.get_mut.as_ref()?;
        let fixer = self.inner.as_fixer()?;
        Some((get_mut, fixer))
    }
}

/// A converted assertion, tagged with the identity markers it re-exposes.
pub enum Lifted<From: ?Sized, To: ?Sized> {
    /// Wrapped assertion carries no marker
    Plain(Converted<From, To>),
    /// Wrapped assertion carries a name
    Named(Converted<From, To>),
    /// Wrapped assertion carries a namespace
    Namespaced(Converted<From, To>),
    /// Wrapped assertion carries both
    Identified(Converted<From, To>),
}

impl<From: ?Sized, To: ?Sized> Lifted<From, To> {
    fn from_converted(converted: Converted<From, To>) -> Self {
        let name = !converted.inner.name_markers().is_empty();
        let namespace = !converted.inner.namespace_markers().is_empty();
        match (name, namespace) {
            (false, false) => Lifted::Plain(converted),
            (true, false) => Lifted::Named(converted),
            (false, true) => Lifted::Namespaced(converted),
            (true, true) => Lifted::Identified(converted),
        }
    }

    /// The underlying conversion
    pub fn converted(&self) -> &Converted<From, To> {
        match self {
            Lifted::Plain(c) | Lifted::Named(c) | Lifted::Namespaced(c) | Lifted::Identified(c) => c,
        }
    }
}

impl<From: ?Sized, To: ?Sized> Assertion<To> for Lifted<From, To> {
    fn test(&self, sink: &mut dyn FailureSink, obj: &To) {
        self.converted().check(sink, obj)
    }

    fn describe(&self) -> String {
        self.converted().inner.describe()
    }

    fn name_marker(&self) -> Option<&str> {
        match self {
            Lifted::Named(c) | Lifted::Identified(c) => c.inner.name_marker(),
            Lifted::Plain(_) | Lifted::Namespaced(_) => None,
        }
    }

    fn namespace_marker(&self) -> Option<&str> {
        match self {
            Lifted::Namespaced(c) | Lifted::Identified(c) => c.inner.namespace_marker(),
            Lifted::Plain(_) | Lifted::Named(_) => None,
        }
    }

    fn as_fixer(&self) -> Option<&dyn AssertionFixer<To>> {
        self.converted().fixer().map(|_| self as &dyn AssertionFixer<To>)
    }

    fn name_markers(&self) -> Vec<&str> {
        match self {
            Lifted::Named(c) | Lifted::Identified(c) => c.inner.name_markers(),
            Lifted::Plain(_) | Lifted::Namespaced(_) => Vec::new(),
        }
    }

    fn namespace_markers(&self) -> Vec<&str> {
        match self {
            Lifted::Namespaced(c) | Lifted::Identified(c) => c.inner.namespace_markers(),
            Lifted::Plain(_) | Lifted::Named(_) => Vec::new(),
        }
    }

    fn leaf_descriptions(&self) -> Vec<String> {
        self.converted().inner.leaf_descriptions()
    }

    // Fixable parts of a wrapped list still contribute when other parts cannot be fixed.
    fn adapt_partially(&self, obj: &mut To, unexplained: &mut Vec<String>) {
        let converted = self.converted();
        let projected = match &converted.get_mut {
            Some(get_mut) => get_mut(obj),
            None => None,
        };
        match projected {
            Some(from) => converted.inner.adapt_partially(from, unexplained),
            None => unexplained.extend(converted.inner.leaf_descriptions()),
        }
    }
}

impl<From: ?Sized, To: ?Sized> AssertionFixer<To> for Lifted<From, To> {
    fn adapt_to_match(&self, obj: &mut To) {
        if let Some((get_mut, fixer)) = self.converted().fixer() {
            if let Some(from) = get_mut(obj) {
                fixer.adapt_to_match(from);
            }
        }
    }
}

/// Reuse `assertion` on `To` through a read-only accessor.
///
/// The result has no fixer; use [`convert_with_lens`] when the projected field
/// can also be reached mutably.
pub fn convert<From, To, F>(accessor: F, assertion: impl Assertion<From> + 'static) -> Lifted<From, To>
where
    From: ?Sized,
    To: ?Sized,
    F: Fn(&To) -> Option<&From> + Send + Sync + 'static,
{
    Lifted::from_converted(Converted {
        inner: Arc::new(assertion),
        get: Box::new(accessor),
        get_mut: None,
    })
}

/// Reuse `assertion` on `To` through a pair of accessors.
///
/// The mutable accessor lets the wrapped assertion's fixer run on the
/// projected field of a working copy.
pub fn convert_with_lens<From, To, F, G>(
    get: F,
    get_mut: G,
    assertion: impl Assertion<From> + 'static,
) -> Lifted<From, To>
where
    From: ?Sized,
    To: ?Sized,
    F: Fn(&To) -> Option<&From> + Send + Sync + 'static,
    G: Fn(&mut To) -> Option<&mut From> + Send + Sync + 'static,
{
    Lifted::from_converted(Converted {
        inner: Arc::new(assertion),
        get: Box::new(get),
        get_mut: Some(Box::new(get_mut)),
    })
}

/// Apply an assertion written for the concrete type `Target` to objects seen
/// as `Source`, typically a trait object such as `dyn Resource`.
///
/// Objects that do not downcast to `Target` fail with an invalid conversion.
pub fn cast<Target, Source>(assertion: impl Assertion<Target> + 'static) -> Lifted<Target, Source>
where
    Target: Any,
    Source: AsAny + ?Sized,
{
    convert_with_lens(
        |obj: &Source| obj.as_any().downcast_ref::<Target>(),
        |obj: &mut Source| obj.as_any_mut().downcast_mut::<Target>(),
        assertion,
    )
}
