//! Temporal layer settings

use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::errors::{TemporalError, TemporalResult};

/// Runtime settings.
///
/// Configured externally (file or embedder), immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalSettings {
    /// Attempts for every load→mutate→save loop before giving up
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,

    /// The scheduler never sleeps longer than this
    #[serde(default = "default_max_wake_interval_secs")]
    pub max_wake_interval_secs: u64,

    /// Keys under this prefix are never versioned
    #[serde(default = "default_system_prefix")]
    pub system_prefix: String,

    /// Where versioning configuration documents live
    #[serde(default = "default_configuration_prefix")]
    pub configuration_prefix: String,
}

/// Upper bound on the scheduler sleep ceiling (30 days)
const MAX_WAKE_INTERVAL_LIMIT_SECS: u64 = 30 * 24 * 60 * 60;

fn default_max_conflict_retries() -> u32 {
    16
}

fn default_max_wake_interval_secs() -> u64 {
    3600
}

fn default_system_prefix() -> String {
    "sys/".to_string()
}

fn default_configuration_prefix() -> String {
    "sys/temporal-versioning/".to_string()
}

impl Default for TemporalSettings {
    fn default() -> Self {
        Self {
            max_conflict_retries: default_max_conflict_retries(),
            max_wake_interval_secs: default_max_wake_interval_secs(),
            system_prefix: default_system_prefix(),
            configuration_prefix: default_configuration_prefix(),
        }
    }
}

impl TemporalSettings {
    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> TemporalResult<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> TemporalResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TemporalError::validation(format!(
                "cannot read settings file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&raw)
    }

    /// Scheduler sleep ceiling
    pub fn max_wake_interval(&self) -> Duration {
        Duration::seconds(self.max_wake_interval_secs.min(MAX_WAKE_INTERVAL_LIMIT_SECS) as i64)
    }

    /// Validate the settings.
    pub fn validate(&self) -> TemporalResult<()> {
        if self.max_conflict_retries == 0 {
            return Err(TemporalError::validation(
                "max_conflict_retries must be at least 1",
            ));
        }
        if self.max_wake_interval_secs == 0 {
            return Err(TemporalError::validation(
                "max_wake_interval_secs must be at least 1",
            ));
        }
        if self.max_wake_interval_secs > MAX_WAKE_INTERVAL_LIMIT_SECS {
            return Err(TemporalError::validation(format!(
                "max_wake_interval_secs must be at most {}",
                MAX_WAKE_INTERVAL_LIMIT_SECS
            )));
        }
        if self.system_prefix.is_empty() {
            return Err(TemporalError::validation("system_prefix must not be empty"));
        }
        if !self.configuration_prefix.starts_with(&self.system_prefix) {
            return Err(TemporalError::validation(
                "configuration_prefix must live under system_prefix",
            ));
        }
        Ok(())
    }
}
