//! Configuration for overlap estimation.
//!
//! Values are resolved in this order (later wins):
//! 1. Defaults
//! 2. YAML configuration file
//! 3. Environment variables (`FISHERMAN_` prefix)

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{OverlapError, OverlapResult};

const ENV_SHOTS: &str = "FISHERMAN_SHOTS";
const ENV_POLL_INTERVAL_MS: &str = "FISHERMAN_POLL_INTERVAL_MS";

/// Settings for the sampling strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapConfig {
    /// Shots per compute-uncompute circuit.
    ///
    /// Capped at the backend's `max_shots`.
    #[serde(default = "default_shots")]
    pub shots: u32,

    /// Interval between job status polls, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_shots() -> u32 {
    8192
}

fn default_poll_interval_ms() -> u64 {
    50
}

impl Default for OverlapConfig {
    fn default() -> Self {
        Self {
            shots: default_shots(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl OverlapConfig {
    /// Set the shot count.
    #[must_use]
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    /// Set the poll interval, rounded down to whole milliseconds and at least 1 ms.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = u64::try_from(interval.as_millis())
            .unwrap_or(u64::MAX)
            .max(1);
        self
    }

    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Parse a YAML document; absent keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> OverlapResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)
            .map_err(|e| OverlapError::Config(format!("invalid YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> OverlapResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| OverlapError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_yaml_str(&contents)
    }

    /// Load defaults, then the file if given, then environment overrides.
    pub fn load(config_file: Option<&Path>) -> OverlapResult<Self> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.merge_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    ///
    /// Only variables that are present override the current values.
    pub fn merge_env_with(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> OverlapResult<Self> {
        if let Some(v) = lookup(ENV_SHOTS) {
            self.shots = parse_env(ENV_SHOTS, &v)?;
        }
        if let Some(v) = lookup(ENV_POLL_INTERVAL_MS) {
            self.poll_interval_ms = parse_env(ENV_POLL_INTERVAL_MS, &v)?;
        }
        Ok(self)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> OverlapResult<()> {
        if self.shots == 0 {
            return Err(OverlapError::Config("shots must be at least 1".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(OverlapError::Config(
                "poll_interval_ms must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> OverlapResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| OverlapError::Config(format!("{key}={value:?} is not a valid number")))
}
