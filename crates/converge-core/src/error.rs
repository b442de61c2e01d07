//! Error types for the assertion core

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum CoreError {
    /// The assertion set does not identify a single object
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// An accessor could not project the object onto the assertion's type
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Object could not be serialised for diffing
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Raised when no lookup key can be derived from an assertion set.
///
/// These are construction errors and are reported before any polling starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// No assertion carries a name marker
    #[error("no assertion identifies the object name; add a name assertion or pass an explicit key")]
    MissingName,

    /// No assertion carries a namespace marker
    #[error("no assertion identifies the object namespace; add a namespace assertion or pass an explicit key")]
    MissingNamespace,

    /// More than one distinct name marker
    #[error("assertions disagree on the object name: {0:?}")]
    AmbiguousName(Vec<String>),

    /// More than one distinct namespace marker
    #[error("assertions disagree on the object namespace: {0:?}")]
    AmbiguousNamespace(Vec<String>),
}

/// An accessor reported that the object does not convert to the type an
/// assertion was written for. Retrying cannot fix this.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid conversion: cannot view {from} as {to} for assertion '{assertion}'")]
pub struct ConversionError {
    /// Description of the wrapped assertion
    pub assertion: String,
    /// Type of the object under test
    pub from: String,
    /// Type the wrapped assertion expects
    pub to: String,
}

impl ConversionError {
    /// Create a new conversion error
    pub fn new(assertion: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            assertion: assertion.into(),
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Result alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
