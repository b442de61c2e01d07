//! Failure sinks.
//!
//! Assertions never panic or return early on a mismatch. They report every
//! problem they see to a [`FailureSink`], which remembers whether anything
//! failed. Any test runner's reporting object can sit behind this trait.

use tracing::debug;

use crate::error::ConversionError;

/// Minimal reporting surface handed to [`Assertion::test`](crate::Assertion::test).
pub trait FailureSink {
    /// Record a failure. Must not abort the caller.
    fn error(&mut self, message: String);

    /// Record an informational message.
    fn log(&mut self, message: String);

    /// Mark the calling frame as a helper. Most sinks ignore it.
    fn helper(&mut self) {}

    /// Record a structural conversion failure.
    ///
    /// The default implementation reports it as a plain failure. Sinks used by
    /// the polling engine override it so the failure is treated as fatal.
    fn invalid_conversion(&mut self, err: ConversionError) {
        self.error(err.to_string());
    }

    /// Whether any failure has been recorded so far.
    fn failed(&self) -> bool;
}

/// A sink that records everything it is told.
#[derive(Debug, Default, Clone)]
pub struct Collector {
    failures: Vec<String>,
    logs: Vec<String>,
    conversion: Option<ConversionError>,
}

impl Collector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Failure messages in the order they were reported
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    /// Log messages in the order they were reported
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    /// The first conversion error reported, if any
    pub fn conversion_error(&self) -> Option<&ConversionError> {
        self.conversion.as_ref()
    }

    /// Consume the collector and return its failures
    pub fn into_failures(self) -> Vec<String> {
        self.failures
    }
}

impl FailureSink for Collector {
    fn error(&mut self, message: String) {
        self.failures.push(message);
    }

    fn log(&mut self, message: String) {
        debug!(target: "converge::sink", "{}", message);
        self.logs.push(message);
    }

    fn invalid_conversion(&mut self, err: ConversionError) {
        self.failures.push(err.to_string());
        if self.conversion.is_none() {
            self.conversion = Some(err);
        }
    }

    fn failed(&self) -> bool {
        !self.failures.is_empty()
    }
}
