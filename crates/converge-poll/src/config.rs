//! Poll timing configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::warn;

/// Environment variable overriding the poll timeout, in milliseconds
pub const TIMEOUT_ENV: &str = "CONVERGE_POLL_TIMEOUT_MS";

/// Environment variable overriding the poll interval, in milliseconds
pub const TICK_ENV: &str = "CONVERGE_POLL_TICK_MS";

const MIN_TICK: Duration = Duration::from_millis(1);

/// How long to wait and how often to look
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Deadline measured from the start of the poll
    pub timeout: Duration,
    /// Pause between two checks
    pub tick: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            tick: Duration::from_secs(1),
        }
    }
}

impl PollConfig {
    /// Create a config with the given timeout and tick
    pub fn new(timeout: Duration, tick: Duration) -> Self {
        Self { timeout, tick }
    }

    /// Load defaults, then apply environment overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(timeout) = duration_from_env(TIMEOUT_ENV) {
            config.timeout = timeout;
        }

        if let Some(tick) = duration_from_env(TICK_ENV) {
            config.tick = tick;
        }

        config
    }

    /// Replace the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the tick
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// The tick actually slept, never zero
    pub fn effective_tick(&self) -> Duration {
        self.tick.max(MIN_TICK)
    }
}

fn duration_from_env(name: &str) -> Option<Duration> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            warn!("Invalid {} value: {}", name, raw);
            None
        }
    }
}
