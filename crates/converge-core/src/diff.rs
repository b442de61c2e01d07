//! Structural diff between two serialised objects.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// One difference between the actual object and its adapted copy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FieldChange {
    /// Present only in the adapted copy
    Added {
        /// Field path
        path: String,
        /// Expected value
        value: Value,
    },
    /// Present only in the actual object
    Removed {
        /// Field path
        path: String,
        /// Actual value
        value: Value,
    },
    /// Present in both with different values
    Changed {
        /// Field path
        path: String,
        /// Actual value
        from: Value,
        /// Expected value
        to: Value,
    },
}

impl FieldChange {
    /// Dotted path of the field, empty for the root
    pub fn path(&self) -> &str {
        match self {
            FieldChange::Added { path, .. }
            | FieldChange::Removed { path, .. }
            | FieldChange::Changed { path, .. } => path,
        }
    }
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = |path: &str| if path.is_empty() { "(root)".to_string() } else { path.to_string() };
        match self {
            FieldChange::Added { path, value } => write!(f, "+ {}: {}", shown(path), value),
            FieldChange::Removed { path, value } => write!(f, "- {}: {}", shown(path), value),
            FieldChange::Changed { path, from, to } => {
                write!(f, "~ {}: {} -> {}", shown(path), from, to)
            }
        }
    }
}

/// Compare `actual` with `expected` and list the changes that turn one into the other.
///
/// Objects are compared key by key, arrays index by index. Everything else is
/// compared by value.
pub fn diff_values(actual: &Value, expected: &Value) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    walk("", actual, expected, &mut changes);
    changes
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn walk(path: &str, actual: &Value, expected: &Value, changes: &mut Vec<FieldChange>) {
    match (actual, expected) {
        (Value::Object(a), Value::Object(e)) => {
            for (key, a_value) in a {
                let path = child_path(path, key);
                match e.get(key) {
                    Some(e_value) => walk(&path, a_value, e_value, changes),
                    None => changes.push(FieldChange::Removed {
                        path,
                        value: a_value.clone(),
                    }),
                }
            }
            for (key, e_value) in e {
                if !a.contains_key(key) {
                    changes.push(FieldChange::Added {
                        path: child_path(path, key),
                        value: e_value.clone(),
                    });
                }
            }
        }
        (Value::Array(a), Value::Array(e)) => {
            for i in 0..a.len().max(e.len()) {
                let path = format!("{}[{}]", path, i);
                match (a.get(i), e.get(i)) {
                    (Some(a_value), Some(e_value)) => walk(&path, a_value, e_value, changes),
                    (Some(a_value), None) => changes.push(FieldChange::Removed {
                        path,
                        value: a_value.clone(),
                    }),
                    (None, Some(e_value)) => changes.push(FieldChange::Added {
                        path,
                        value: e_value.clone(),
                    }),
                    (None, None) => {}
                }
            }
        }
        _ if actual != expected => changes.push(FieldChange::Changed {
            path: path.to_string(),
            from: actual.clone(),
            to: expected.clone(),
        }),
        _ => {}
    }
}
