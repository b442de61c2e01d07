//! Identity markers and lookup key resolution.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assertion::{Assertion, AssertionList};
use crate::error::IdentityError;

/// Lookup key of a resource in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey {
    /// Namespace, `None` for cluster scoped resources
    pub namespace: Option<String>,
    /// Resource name
    pub name: String,
}

impl ObjectKey {
    /// Key of a namespaced resource
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    /// Key of a cluster scoped resource
    pub fn cluster(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{}/{}", namespace, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Objects that know their own store key.
pub trait Keyed {
    /// The key this object is stored under
    fn object_key(&self) -> ObjectKey;
}

fn distinct(values: Vec<&str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}

/// The namespace named by the list's namespace markers, if they agree on one.
pub fn namespace_hint<T: ?Sized>(list: &AssertionList<T>) -> Result<Option<String>, IdentityError> {
    let namespaces = distinct(list.namespace_markers());
    if namespaces.len() > 1 {
        return Err(IdentityError::AmbiguousNamespace(namespaces));
    }
    Ok(namespaces.into_iter().next())
}

/// Derive the lookup key from the list's identity markers.
///
/// Exactly one name and one namespace must be pinned down. Several assertions
/// naming the same value count as one.
pub fn resolve_key<T: ?Sized>(list: &AssertionList<T>) -> Result<ObjectKey, IdentityError> {
    let names = distinct(list.name_markers());
    if names.len() > 1 {
        return Err(IdentityError::AmbiguousName(names));
    }
    let name = names.into_iter().next().ok_or(IdentityError::MissingName)?;
    let namespace = namespace_hint(list)?.ok_or(IdentityError::MissingNamespace)?;
    Ok(ObjectKey::new(namespace, name))
}
