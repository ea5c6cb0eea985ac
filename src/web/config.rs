use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::telemetry::{FetcherSettings, FutureLimits, PollerSettings, SampleLog};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub web: WebConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub latest_url: String,
    pub positions_url: String,
    #[serde(deserialize_with = "deserialize_duration")]
    pub poll_interval: Duration,
    pub history_max: usize,
    #[serde(deserialize_with = "deserialize_duration")]
    pub latest_timeout: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub future_timeout: Duration,
    pub sample_log: Option<PathBuf>,
    pub future: FutureLimits,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            latest_url: "https://api.wheretheiss.at/v1/satellites/25544".to_string(),
            positions_url: "https://api.wheretheiss.at/v1/satellites/25544/positions".to_string(),
            poll_interval: Duration::from_secs(3),
            history_max: 2000,
            latest_timeout: Duration::from_secs(8),
            future_timeout: Duration::from_secs(10),
            sample_log: None,
            future: FutureLimits::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise fall back to built-in defaults.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.telemetry;
        if t.history_max == 0 {
            return Err(ConfigError::Invalid("history_max must be at least 1".into()));
        }
        if t.poll_interval.is_zero() {
            return Err(ConfigError::Invalid("poll_interval must be positive".into()));
        }
        let limits = &t.future;
        if limits.min_minutes > limits.max_minutes {
            return Err(ConfigError::Invalid(
                "future.min_minutes exceeds future.max_minutes".into(),
            ));
        }
        if limits.min_step_seconds < 1 || limits.min_step_seconds > limits.max_step_seconds {
            return Err(ConfigError::Invalid(
                "future step range must be positive and ordered".into(),
            ));
        }
        Ok(())
    }
}

impl TelemetryConfig {
    pub fn fetcher_settings(&self) -> FetcherSettings {
        FetcherSettings {
            latest_url: self.latest_url.clone(),
            positions_url: self.positions_url.clone(),
            latest_timeout: self.latest_timeout,
            future_timeout: self.future_timeout,
            limits: self.future,
        }
    }

    pub fn poller_settings(&self) -> PollerSettings {
        PollerSettings {
            interval: self.poll_interval,
            sample_log: self.sample_log.clone().map(SampleLog::new),
        }
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}
