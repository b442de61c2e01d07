//! Error taxonomy of the polling engine

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use converge_core::{ConversionError, Explanation, IdentityError};

use crate::store::StoreError;

/// Poll errors
#[derive(Debug, Error)]
pub enum PollError {
    /// No lookup key could be derived; raised before polling starts
    #[error("cannot determine what to wait for: {0}")]
    Identity(#[from] IdentityError),

    /// An assertion could not be applied to the fetched object; never retried
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// A store error that polling cannot recover from
    #[error("store error while waiting for {awaited} after {elapsed:?}: {source}")]
    Store {
        /// What was awaited
        awaited: String,
        /// Time spent before the error
        elapsed: Duration,
        /// Underlying store error
        #[source]
        source: StoreError,
    },

    /// The deadline passed before the condition held
    #[error("{0}")]
    Timeout(Box<TimeoutError>),
}

impl PollError {
    /// The timeout details, if this is a timeout
    pub fn as_timeout(&self) -> Option<&TimeoutError> {
        match self {
            PollError::Timeout(timeout) => Some(timeout),
            _ => None,
        }
    }
}

impl From<TimeoutError> for PollError {
    fn from(err: TimeoutError) -> Self {
        PollError::Timeout(Box::new(err))
    }
}

/// Everything known about a poll that ran out of time
#[derive(Debug, Clone)]
pub struct TimeoutError {
    /// What was awaited
    pub awaited: String,
    /// Time spent polling
    pub elapsed: Duration,
    /// The store error seen on the last attempt, if any
    pub last_error: Option<String>,
    /// Failures of the last evaluated object
    pub failures: Vec<String>,
    /// Expected-vs-actual diff of the last evaluated object
    pub explanation: Option<Explanation>,
}

impl TimeoutError {
    /// Create a timeout error without diagnostics
    pub fn new(awaited: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            awaited: awaited.into(),
            elapsed,
            last_error: None,
            failures: Vec::new(),
            explanation: None,
        }
    }
}

impl fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timed out after {:?} waiting for {}", self.elapsed, self.awaited)?;
        if let Some(err) = &self.last_error {
            write!(f, "\nlast store error: {}", err)?;
        }
        if !self.failures.is_empty() {
            write!(f, "\nfailures:")?;
            for failure in &self.failures {
                write!(f, "\n  - {}", failure)?;
            }
        }
        if let Some(explanation) = self.explanation.as_ref().filter(|e| !e.is_empty()) {
            write!(f, "\nactual -> expected:")?;
            for line in explanation.to_string().lines() {
                write!(f, "\n  {}", line)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for TimeoutError {}

/// Result alias for poll operations
pub type PollResult<T> = Result<T, PollError>;
