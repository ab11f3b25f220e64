//! Configuration for the readio-player service
//!
//! A single minimal TOML file covers bootstrap concerns; anything not
//! present falls back to built-in defaults defined here. CLI flags and
//! environment variables (see `main.rs`) override the file.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL of the content/synthesis backend
    /// (`GET {base}/content/{slug}`, `POST {base}/speak`)
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Maximum characters of resolved article text sent to synthesis
    #[serde(default = "default_max_utterance_chars")]
    pub max_utterance_chars: usize,

    /// Progress poll interval in milliseconds.
    ///
    /// Coarser than ~500 ms makes the progress bar feel sluggish.
    #[serde(default = "default_progress_poll_ms")]
    pub progress_poll_ms: u64,

    /// HTTP client timeout for backend requests, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Event bus capacity (events buffered per slow subscriber)
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_port() -> u16 {
    5750
}

fn default_backend_url() -> String {
    "http://localhost:4000".to_string()
}

fn default_max_utterance_chars() -> usize {
    4000
}

fn default_progress_poll_ms() -> u64 {
    200
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_event_bus_capacity() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        // Deserializing an empty table applies every serde default
        toml::from_str("").expect("empty config must deserialize")
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("invalid TOML in {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.backend_url.is_empty() {
            return Err(Error::Config("backend_url must not be empty".into()));
        }
        if self.max_utterance_chars == 0 {
            return Err(Error::Config("max_utterance_chars must be positive".into()));
        }
        if self.progress_poll_ms == 0 {
            return Err(Error::Config("progress_poll_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn progress_poll_interval(&self) -> Duration {
        Duration::from_millis(self.progress_poll_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
