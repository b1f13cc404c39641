//! # Configuration
//!
//! Timings and wiring for a tracking session. Everything has a default matching the
//! mobile app's behaviour (poll every 5 s, history every 10 s, a 10 s flight in 100
//! steps), so `TrackerConfig::default()` is what production uses.
//!
//! A config can also be loaded from JSON, with durations in milliseconds:
//!
//! ```json
//! { "poll_interval": 5000, "flight_steps": 100 }
//! ```

use serde::{Deserialize, Deserializer};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_HISTORY_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_FLIGHT_DURATION: Duration = Duration::from_secs(10);
pub const DEFAULT_FLIGHT_STEPS: u32 = 100;
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Timings of the tracker and history actors.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Period of the current-order poll.
    #[serde(deserialize_with = "millis")]
    pub poll_interval: Duration,
    /// Period of the order-history refresh.
    #[serde(deserialize_with = "millis")]
    pub history_interval: Duration,
    /// Total length of a simulated flight.
    #[serde(deserialize_with = "millis")]
    pub flight_duration: Duration,
    /// Number of discrete steps a flight is split into.
    pub flight_steps: u32,
    /// Mailbox size of each actor.
    pub channel_capacity: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            history_interval: DEFAULT_HISTORY_INTERVAL,
            flight_duration: DEFAULT_FLIGHT_DURATION,
            flight_steps: DEFAULT_FLIGHT_STEPS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl TrackerConfig {
    /// Parses a JSON config; missing keys keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Time between two flight steps.
    pub fn step_interval(&self) -> Duration {
        self.flight_duration / self.flight_steps.max(1)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.flight_steps == 0 {
            return Err(ConfigError::Invalid("flight_steps must be positive".into()));
        }
        if self.poll_interval.is_zero() || self.history_interval.is_zero() {
            return Err(ConfigError::Invalid("intervals must be positive".into()));
        }
        if self.flight_duration < Duration::from_millis(u64::from(self.flight_steps)) {
            return Err(ConfigError::Invalid(
                "flight_duration must allow at least 1 ms per step".into(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid("channel_capacity must be positive".into()));
        }
        Ok(())
    }
}

/// Where the REST backend lives.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    /// Overrides the default `<crate>/<version>` user agent.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            user_agent: None,
        }
    }
}

fn millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_millis)
}
