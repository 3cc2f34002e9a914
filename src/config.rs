//! Engine configuration.
//!
//! Composition roots can describe the backend choice, the date clamp
//! bounds, and the file-retry policy in a TOML or JSON file instead of
//! code. Everything here has working defaults; a missing file section
//! falls back to them.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::date_range::DateBounds;
use crate::io::RetryPolicy;
use crate::quickxml::QuickXmlBackend;
use crate::roxml::RoxmlBackend;
use crate::xpath::XmlBackend;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Which navigation backend the engine drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    QuickXml,
    Roxml,
}

impl BackendKind {
    /// Construct the backend this kind names.
    pub fn backend(&self) -> Arc<dyn XmlBackend> {
        match self {
            BackendKind::QuickXml => Arc::new(QuickXmlBackend),
            BackendKind::Roxml => Arc::new(RoxmlBackend),
        }
    }
}

/// Main engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub backend: BackendKind,
    pub dates: DateConfig,
    pub retry: RetryConfig,
}

/// Date clamp bounds applied to `DateRange` construction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DateConfig {
    pub min_date: NaiveDateTime,
    pub max_date: NaiveDateTime,
}

impl Default for DateConfig {
    fn default() -> Self {
        let bounds = DateBounds::default();
        Self {
            min_date: bounds.min,
            max_date: bounds.max,
        }
    }
}

impl From<DateConfig> for DateBounds {
    fn from(config: DateConfig) -> Self {
        DateBounds {
            min: config.min_date,
            max: config.max_date,
        }
    }
}

/// Retry policy for the file-open collaborator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryConfig {
    /// Number of open attempts before giving up on a locked file
    pub max_attempts: u32,
    /// Delay between attempts in milliseconds
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 100,
        }
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        RetryPolicy {
            max_attempts: config.max_attempts,
            delay: Duration::from_millis(config.delay_ms),
        }
    }
}

impl EngineConfig {
    /// Parse a TOML configuration document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON configuration document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, dispatching on its extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.dates.min_date >= self.dates.max_date {
            return Err(ConfigError::Validation(
                "dates.min_date must precede dates.max_date".to_string(),
            ));
        }
        Ok(())
    }

    pub fn date_bounds(&self) -> DateBounds {
        self.dates.into()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.into()
    }
}
