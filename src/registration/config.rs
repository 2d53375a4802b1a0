//! Configuration for the account client

use crate::registration::error::ClientError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Largest profile picture accepted by the registration form. A config may
/// lower the limit but never raise it.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the account API, without the `/api/auth` prefix
    pub api_base_url: String,
    pub max_upload_bytes: u64,
    /// Pause between a successful registration and the redirect to login
    pub redirect_delay_ms: u64,
    /// Where the session token is kept between runs
    pub session_file: PathBuf,
    /// No timeout unless set
    pub request_timeout_ms: Option<u64>,
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    /// Replace the base URL, rejecting values `load` would reject.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Result<Self, ClientError> {
        self.api_base_url = url.into();
        self.check()?;
        Ok(self)
    }

    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = path.into();
        self
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ClientError> {
        let cfg: ClientConfig = toml::from_str(text)
            .map_err(|e| ClientError::ConfigError(format!("Failed to parse config: {}", e)))?;
        cfg.check()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ClientError::ConfigError(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&text)
    }

    fn check(&self) -> Result<(), ClientError> {
        let url = self.api_base_url.trim();
        if url.is_empty() {
            return Err(ClientError::ConfigError("api_base_url cannot be empty".to_string()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ClientError::ConfigError(format!(
                "api_base_url must start with http:// or https:// (got '{}')",
                url
            )));
        }
        if self.max_upload_bytes == 0 {
            return Err(ClientError::ConfigError("max_upload_bytes must be positive".to_string()));
        }
        if self.max_upload_bytes > DEFAULT_MAX_UPLOAD_BYTES {
            return Err(ClientError::ConfigError(format!(
                "max_upload_bytes cannot exceed {} bytes (got {})",
                DEFAULT_MAX_UPLOAD_BYTES, self.max_upload_bytes
            )));
        }
        Ok(())
    }

    /// Full URL for an `/api/auth/...` endpoint.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/api/auth/{}",
            self.api_base_url.trim().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:4600".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            redirect_delay_ms: 2000,
            session_file: PathBuf::from("data/session.json"),
            request_timeout_ms: None,
        }
    }
}
