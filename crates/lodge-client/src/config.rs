//! Client configuration loaded from environment variables.
//!
//! All settings have defaults so the client can start with zero
//! configuration against a local backend.

use std::path::PathBuf;
use std::time::Duration;

use lodge_shared::constants::DEFAULT_API_URL;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST backend. Always ends with `/`.
    /// Env: `LODGE_API_URL`
    /// Default: `http://localhost:8000/`
    pub api_url: String,

    /// Path of the persisted storage database.
    /// Env: `LODGE_STORAGE_PATH`
    /// Default: `None` (platform data directory).
    pub storage_path: Option<PathBuf>,

    /// Per-request timeout.
    /// Env: `LODGE_REQUEST_TIMEOUT_SECS`
    /// Default: 30 seconds.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            storage_path: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("LODGE_API_URL") {
            if url.starts_with("http://") || url.starts_with("https://") {
                config.api_url = normalize_base_url(&url);
            } else {
                tracing::warn!(value = %url, "Invalid LODGE_API_URL, using default");
            }
        }

        if let Ok(path) = std::env::var("LODGE_STORAGE_PATH") {
            if !path.is_empty() {
                config.storage_path = Some(PathBuf::from(path));
            }
        }

        if let Ok(val) = std::env::var("LODGE_REQUEST_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
                _ => tracing::warn!(value = %val, "Invalid LODGE_REQUEST_TIMEOUT_SECS, using default"),
            }
        }

        config
    }

    /// Override the API base URL (CLI flag, tests).
    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = normalize_base_url(url);
        self
    }

    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = Some(path.into());
        self
    }
}

/// Relative endpoint paths are joined onto the base, so it must end in `/`.
fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}
