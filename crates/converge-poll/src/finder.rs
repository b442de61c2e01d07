//! The polling engine.
//!
//! A [`Finder`] waits for an eventually consistent [`Store`] to reach a state
//! satisfying an [`AssertionList`]. Three terminal conditions are supported:
//!
//! - [`Finder::matching`]: the object under one key exists and passes every assertion.
//! - [`Finder::first_matching`]: some listed object passes every assertion.
//! - [`Finder::deleted`]: the object under one key is gone.
//!
//! Every mode checks immediately and then once per tick until the deadline.
//! The engine spawns nothing; the only await points are the store call and the
//! sleep between ticks.

use std::time::Duration;

use anyhow::anyhow;
use serde::Serialize;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use converge_core::{
    explain, namespace_hint, resolve_key, short_type_name, Assertion, AssertionList, Collector,
    ConversionError, Explanation, ObjectKey,
};

use crate::config::PollConfig;
use crate::error::{PollError, PollResult, TimeoutError};
use crate::store::{ListScope, Store, StoreError};

/// Waits for a store to converge to a state satisfying a set of assertions
pub struct Finder<'s, T, S: ?Sized> {
    store: &'s S,
    assertions: AssertionList<T>,
    config: PollConfig,
    key: Option<ObjectKey>,
    namespace: Option<String>,
    kind: String,
}

/// Start a poll against `store` for objects satisfying `assertions`
pub fn find<T, S>(store: &S, assertions: AssertionList<T>) -> Finder<'_, T, S>
where
    T: Clone + Serialize + Send + Sync + 'static,
    S: Store<T> + ?Sized,
{
    Finder::new(store, assertions)
}

enum Scan<T> {
    Matched(T),
    Unmatched {
        candidates: usize,
        closest: Option<(T, Vec<String>)>,
    },
    Unavailable(StoreError),
}

impl<'s, T, S> Finder<'s, T, S>
where
    T: Clone + Serialize + Send + Sync + 'static,
    S: Store<T> + ?Sized,
{
    /// Create a finder with the default [`PollConfig`]
    pub fn new(store: &'s S, assertions: AssertionList<T>) -> Self {
        Self {
            store,
            assertions,
            config: PollConfig::default(),
            key: None,
            namespace: None,
            kind: short_type_name::<T>(),
        }
    }

    /// Replace the poll timing
    pub fn with_config(mut self, config: PollConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Replace the tick
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.config.tick = tick;
        self
    }

    /// Look the object up under `key` instead of deriving it from the assertions
    pub fn with_key(mut self, key: ObjectKey) -> Self {
        self.key = Some(key);
        self
    }

    /// List in `namespace` instead of deriving it from the assertions
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Name used for the awaited kind in diagnostics
    pub fn describe_as(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Effective poll timing
    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Wait until the object under the key exists and satisfies every assertion.
    ///
    /// Not-found and other store errors are retried until the deadline. On
    /// timeout the object is fetched once more and explained; if that fetch
    /// fails the last object seen is explained instead. No store call runs
    /// past one tick after the deadline.
    pub async fn matching(self) -> PollResult<T> {
        let key = self.resolve_key()?;
        let awaited = format!(
            "{} {} matching {} assertion(s)",
            self.kind,
            key,
            self.assertions.len()
        );
        let tick = self.config.effective_tick();
        let start = Instant::now();
        let mut attempt: u32 = 0;
        let mut failures = Vec::new();
        let mut last_seen = None;

        loop {
            attempt += 1;
            match self.get(&key, start).await {
                Ok(obj) => {
                    let found = self.evaluate(&obj).map_err(|err| self.fatal_conversion(err, &awaited))?;
                    if found.is_empty() {
                        info!(awaited = %awaited, attempt, elapsed_ms = elapsed_ms(start), "Object converged");
                        return Ok(obj);
                    }
                    debug!(
                        awaited = %awaited,
                        attempt,
                        failures = found.len(),
                        "Object does not match yet"
                    );
                    failures = found;
                    last_seen = Some(obj);
                }
                Err(err) => {
                    debug!(awaited = %awaited, attempt, error = %err, "Object not available yet");
                }
            }
            if start.elapsed() >= self.config.timeout {
                break;
            }
            sleep(tick).await;
        }

        let mut report = TimeoutError::new(awaited.as_str(), Duration::ZERO);
        match self.get(&key, start).await {
            Ok(obj) => {
                let found = self.evaluate(&obj).map_err(|err| self.fatal_conversion(err, &awaited))?;
                if found.is_empty() {
                    info!(awaited = %awaited, attempt, elapsed_ms = elapsed_ms(start), "Object converged");
                    return Ok(obj);
                }
                report.explanation = self.explanation(&obj);
                report.failures = found;
            }
            Err(err) => {
                report.last_error = Some(err.to_string());
                report.failures = failures;
                report.explanation = last_seen.and_then(|obj| self.explanation(&obj));
            }
        }
        report.elapsed = start.elapsed();
        warn!(awaited = %awaited, attempt, elapsed_ms = elapsed_ms(start), "Timed out");
        Err(report.into())
    }

    /// Wait until some listed object satisfies every assertion and return the
    /// first one in store order.
    ///
    /// Candidates are evaluated independently; a failing candidate does not
    /// stop the scan. On timeout the candidate with the fewest failures is
    /// explained.
    pub async fn first_matching(self) -> PollResult<T> {
        let scope = ListScope {
            namespace: match &self.namespace {
                Some(namespace) => Some(namespace.clone()),
                None => namespace_hint(&self.assertions)?,
            },
        };
        let awaited = format!(
            "any {} in {} matching {} assertion(s)",
            self.kind,
            scope
                .namespace
                .as_deref()
                .map(|ns| format!("namespace {}", ns))
                .unwrap_or_else(|| "all namespaces".to_string()),
            self.assertions.len()
        );
        let tick = self.config.effective_tick();
        let start = Instant::now();
        let mut attempt: u32 = 0;
        let mut last_closest = None;

        loop {
            attempt += 1;
            match self.scan(&scope, start).await.map_err(|err| self.fatal_conversion(err, &awaited))? {
                Scan::Matched(obj) => {
                    info!(awaited = %awaited, attempt, elapsed_ms = elapsed_ms(start), "Matching object found");
                    return Ok(obj);
                }
                Scan::Unmatched { candidates, closest } => {
                    debug!(awaited = %awaited, attempt, candidates, "No candidate matches yet");
                    last_closest = closest;
                }
                Scan::Unavailable(err) => {
                    debug!(awaited = %awaited, attempt, error = %err, "List failed");
                }
            }
            if start.elapsed() >= self.config.timeout {
                break;
            }
            sleep(tick).await;
        }

        let mut report = TimeoutError::new(awaited.as_str(), Duration::ZERO);
        match self.scan(&scope, start).await.map_err(|err| self.fatal_conversion(err, &awaited))? {
            Scan::Matched(obj) => {
                info!(awaited = %awaited, attempt, elapsed_ms = elapsed_ms(start), "Matching object found");
                return Ok(obj);
            }
            Scan::Unmatched { closest, .. } => last_closest = closest,
            Scan::Unavailable(err) => report.last_error = Some(err.to_string()),
        }
        if let Some((obj, failures)) = last_closest {
            report.explanation = self.explanation(&obj);
            report.failures = failures;
        }
        report.elapsed = start.elapsed();
        warn!(awaited = %awaited, attempt, elapsed_ms = elapsed_ms(start), "Timed out");
        Err(report.into())
    }

    /// Wait until the object under the key no longer exists.
    ///
    /// Only not-found counts as success. Any other store error is returned at
    /// once, since it says nothing about the object going away.
    pub async fn deleted(self) -> PollResult<()> {
        let key = self.resolve_key()?;
        let awaited = format!("{} {} to be deleted", self.kind, key);
        let tick = self.config.effective_tick();
        let start = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match self.get(&key, start).await {
                Err(StoreError::NotFound(_)) => {
                    info!(awaited = %awaited, attempt, elapsed_ms = elapsed_ms(start), "Object deleted");
                    return Ok(());
                }
                Err(source) => {
                    warn!(awaited = %awaited, attempt, error = %source, "Store error while waiting for deletion");
                    return Err(PollError::Store {
                        awaited,
                        elapsed: start.elapsed(),
                        source,
                    });
                }
                Ok(_) => debug!(awaited = %awaited, attempt, "Object still present"),
            }
            if start.elapsed() >= self.config.timeout {
                break;
            }
            sleep(tick).await;
        }

        warn!(awaited = %awaited, attempt, elapsed_ms = elapsed_ms(start), "Timed out");
        let mut report = TimeoutError::new(awaited.as_str(), start.elapsed());
        report.failures.push(format!("{} still exists", key));
        Err(report.into())
    }

    fn resolve_key(&self) -> PollResult<ObjectKey> {
        match &self.key {
            Some(key) => Ok(key.clone()),
            None => Ok(resolve_key(&self.assertions)?),
        }
    }

    fn evaluate(&self, obj: &T) -> Result<Vec<String>, ConversionError> {
        let mut sink = Collector::new();
        self.assertions.test(&mut sink, obj);
        for message in sink.logs() {
            debug!(kind = %self.kind, "{}", message);
        }
        match sink.conversion_error() {
            Some(err) => Err(err.clone()),
            None => Ok(sink.into_failures()),
        }
    }

    fn explanation(&self, obj: &T) -> Option<Explanation> {
        match explain(obj, &self.assertions) {
            Ok(explanation) => Some(explanation),
            Err(err) => {
                warn!(kind = %self.kind, error = %err, "Could not explain failures");
                None
            }
        }
    }

    fn fatal_conversion(&self, err: ConversionError, awaited: &str) -> PollError {
        warn!(awaited = %awaited, error = %err, "Assertion cannot be applied, giving up");
        PollError::Conversion(err)
    }

    // A store call may use whatever is left of the deadline, and at least one
    // tick, but never runs past one tick after the deadline.
    fn call_budget(&self, start: Instant) -> Duration {
        let elapsed = start.elapsed();
        let tick = self.config.effective_tick();
        let remaining = self.config.timeout.saturating_sub(elapsed);
        let hard_limit = (self.config.timeout + tick).saturating_sub(elapsed);
        remaining.max(tick).min(hard_limit)
    }

    async fn get(&self, key: &ObjectKey, start: Instant) -> Result<T, StoreError> {
        let budget = self.call_budget(start);
        match timeout(budget, self.store.get(key)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Backend(anyhow!(
                "get {} did not complete within {:?}",
                key,
                budget
            ))),
        }
    }

    async fn scan(&self, scope: &ListScope, start: Instant) -> Result<Scan<T>, ConversionError> {
        let budget = self.call_budget(start);
        let candidates = match timeout(budget, self.store.list(scope)).await {
            Ok(Ok(candidates)) => candidates,
            Ok(Err(err)) => return Ok(Scan::Unavailable(err)),
            Err(_) => {
                return Ok(Scan::Unavailable(StoreError::Backend(anyhow!(
                    "list did not complete within {:?}",
                    budget
                ))))
            }
        };

        let count = candidates.len();
        let mut closest: Option<(T, Vec<String>)> = None;
        for candidate in candidates {
            let failures = self.evaluate(&candidate)?;
            if failures.is_empty() {
                return Ok(Scan::Matched(candidate));
            }
            let closer = closest
                .as_ref()
                .map_or(true, |(_, best)| failures.len() < best.len());
            if closer {
                closest = Some((candidate, failures));
            }
        }
        Ok(Scan::Unmatched {
            candidates: count,
            closest,
        })
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
