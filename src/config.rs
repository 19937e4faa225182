//! Monitor configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What `check_updates` does when a category's poll function fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Keep polling the remaining categories, then return the first poll error.
    #[default]
    Continue,
    /// Return the poll error immediately; later categories are not polled.
    Abort,
}

/// Monitor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    /// Poll failure handling within one `check_updates` batch.
    pub poll_failure_policy: FailurePolicy,
    /// Per-subscription stream buffer capacity.
    pub stream_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_failure_policy: FailurePolicy::Continue,
            stream_capacity: 1024,
        }
    }
}

impl MonitorConfig {
    /// Checks field ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stream_capacity == 0 {
            return Err(ConfigError::InvalidField {
                field: "stream_capacity".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = parse_json(json)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(json: &str) -> Result<T, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::Parse {
        message: e.to_string(),
    })
}

pub(crate) fn read_to_string(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
