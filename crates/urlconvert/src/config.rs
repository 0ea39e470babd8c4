//! Settings
//!
//! Same shape as the editor's JSON settings file. `timeout_seconds` is kept
//! as a raw JSON value so a wrongly typed entry surfaces as a
//! [`ConfigError`] when the fetch options are built, instead of making the
//! whole file unreadable.

use crate::client::FetchOptions;
use crate::error::ConfigError;
use crate::template::DEFAULT_FALLBACK_TEMPLATE;
use crate::{DEFAULT_MAX_CONCURRENCY, DEFAULT_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// User settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Batch timeout in seconds
    pub timeout_seconds: Value,
    /// Template for custom conversion when none is given explicitly
    pub fallback_template: Option<String>,
    pub max_concurrency: usize,
    pub user_agent: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_seconds: Value::from(DEFAULT_TIMEOUT_SECS),
            fallback_template: Some(DEFAULT_FALLBACK_TEMPLATE.to_string()),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            user_agent: None,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        Self::from_json(&content)
    }

    /// Parse settings from JSON text; missing keys take their defaults
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(ConfigError::Parse)
    }

    /// The batch timeout, if `timeout_seconds` is a non-negative finite number
    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        let invalid = || ConfigError::InvalidTimeout(self.timeout_seconds.to_string());
        let seconds = self.timeout_seconds.as_f64().ok_or_else(invalid)?;
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(invalid());
        }
        Duration::try_from_secs_f64(seconds).map_err(|_| invalid())
    }

    /// Build fetch options, validating the numeric settings
    pub fn fetch_options(&self) -> Result<FetchOptions, ConfigError> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }

        Ok(FetchOptions {
            timeout: self.timeout()?,
            max_concurrency: self.max_concurrency,
            user_agent: self.user_agent.clone(),
        })
    }
}
