//! Converge Core - typed assertions for eventually consistent stores
//!
//! This crate defines the assertion contract, the ordered list combinator,
//! the fix/explain engine that turns failures into an expected-vs-actual diff,
//! the conversion layer that reuses assertions across types while keeping
//! their identity markers, and the embeddable mixins used to build fluent
//! per-resource assertion builders.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// The assertion contract and list combinator
pub mod assertion;

/// Conversion and lifting across types
pub mod convert;

/// Structural diffing of serialised objects
pub mod diff;

/// Embeddable fluent builder mixins
pub mod embed;

/// Error types
pub mod error;

/// Fixers and failure explanations
pub mod explain;

/// Identity markers and lookup keys
pub mod identity;

/// Failure sinks
pub mod sink;

/// Utility traits
pub mod util;

pub use assertion::{assertion_fn, short_type_name, Assertion, AssertionFn, AssertionList};
pub use convert::{cast, convert, convert_with_lens, Converted, Lifted};
pub use diff::{diff_values, FieldChange};
pub use embed::{shared_list, EmbeddableAssertions, FluentAssertions, SharedAssertions};
pub use error::{ConversionError, CoreError, CoreResult, IdentityError};
pub use explain::{adapted_copy, explain, AssertionFixer, Explanation};
pub use identity::{namespace_hint, resolve_key, Keyed, ObjectKey};
pub use sink::{Collector, FailureSink};
pub use util::AsAny;
