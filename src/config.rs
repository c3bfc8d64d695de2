//! Configuration file support.
//!
//! Everything is optional; file values fill in whatever the CLI didn't set,
//! and engine defaults cover the rest.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::EngineSettings;

/// Configuration file structure (TOML).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Directory images and logs are written to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// Delay between requests in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_delay_ms: Option<u64>,
    /// Attempts per request for 403s and transport failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_attempts: Option<u32>,
}

impl Config {
    /// Load from a TOML file path.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        toml::from_str(&contents).map_err(|e| format!("Failed to parse TOML config: {}", e))
    }

    /// Load `apparelscrape.toml` from the working directory when present;
    /// defaults otherwise.
    pub async fn load() -> Self {
        let path = PathBuf::from("apparelscrape.toml");
        if path.is_file() {
            Self::load_from_path(&path).await.unwrap_or_default()
        } else {
            Self::default()
        }
    }

    /// Fold file values into engine settings. Settings already set by the
    /// caller win; this only fills fields the file specifies.
    pub fn apply_to_settings(&self, settings: &mut EngineSettings) {
        if let Some(ref output_dir) = self.output_dir {
            settings.output_dir = PathBuf::from(output_dir);
        }
        if let Some(timeout) = self.request_timeout {
            settings.request.timeout = Duration::from_secs(timeout);
        }
        if let Some(delay_ms) = self.request_delay_ms {
            settings.request.request_delay = Duration::from_millis(delay_ms);
        }
        if let Some(attempts) = self.retry_attempts {
            settings.request.retry_attempts = attempts;
        }
    }
}
