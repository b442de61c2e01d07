//! Fix / explain engine.
//!
//! When an object fails a list of assertions, every member that can fix the
//! object is applied in declaration order to one working copy. The diff
//! between the original and the adapted copy shows what would have to change
//! for the object to pass. Members without a fixer are listed by description
//! so no requirement is silently dropped from a failure report.

use std::fmt;

use serde::Serialize;

use crate::assertion::{Assertion, AssertionList};
use crate::diff::{diff_values, FieldChange};
use crate::error::CoreResult;

/// Optional capability of an assertion: adapt an object so it satisfies that
/// one assertion.
///
/// Only ever called on a working copy owned by the caller. Later fixers see the
/// edits of earlier ones, so two fixers constraining the same field resolve in
/// favour of the one declared last.
pub trait AssertionFixer<T: ?Sized> {
    /// Make the smallest change to `obj` that satisfies the assertion.
    fn adapt_to_match(&self, obj: &mut T);
}

/// Deep-copy `obj` once and apply every fixer in `list` to the copy, in order.
///
/// Returns the adapted copy and the descriptions of members that have no fixer.
pub fn adapted_copy<T: Clone>(obj: &T, list: &AssertionList<T>) -> (T, Vec<String>) {
    let mut copy = obj.clone();
    let mut unexplained = Vec::new();
    list.adapt_partially(&mut copy, &mut unexplained);
    (copy, unexplained)
}

/// Expected-vs-actual diagnostic for a failed assertion list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Explanation {
    /// Changes that turn the actual object into the adapted one
    pub changes: Vec<FieldChange>,
    /// Assertions that could not contribute to the diff
    pub unexplained: Vec<String>,
}

impl Explanation {
    /// Whether there is nothing to report
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.unexplained.is_empty()
    }

    /// The rendered diff without the unexplained notes
    pub fn diff_text(&self) -> String {
        self.changes
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "no differences");
        }
        let mut lines: Vec<String> = self.changes.iter().map(|c| c.to_string()).collect();
        lines.extend(self.unexplained.iter().map(|name| format!("unexplained: {}", name)));
        write!(f, "{}", lines.join("\n"))
    }
}

/// Explain why `obj` fails `list`.
pub fn explain<T>(obj: &T, list: &AssertionList<T>) -> CoreResult<Explanation>
where
    T: Clone + Serialize,
{
    let (adapted, unexplained) = adapted_copy(obj, list);
    let actual = serde_json::to_value(obj)?;
    let expected = serde_json::to_value(&adapted)?;
    Ok(Explanation {
        changes: diff_values(&actual, &expected),
        unexplained,
    })
}
