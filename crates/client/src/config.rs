//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `APPETIT_API_BASE` - Base URL of the REST API (default: `http://localhost:8000/api/v1`)
//! - `APPETIT_STATE_FILE` - Key/value state file for the session and presets
//!   (default: `.appetit/state.json`)
//! - `APPETIT_HTTP_TIMEOUT_SECS` - Per-request timeout in seconds (default: none)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default REST API base URL.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api/v1";

/// Default location of the durable key/value state.
pub const DEFAULT_STATE_FILE: &str = ".appetit/state.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// API client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to, without a trailing slash
    pub api_base: String,
    /// Where the session token, role, and filter presets are persisted
    pub state_file: PathBuf,
    /// Optional per-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base = match lookup("APPETIT_API_BASE") {
            Some(raw) => parse_api_base(&raw)
                .map_err(|e| ConfigError::InvalidEnvVar("APPETIT_API_BASE".to_string(), e))?,
            None => DEFAULT_API_BASE.to_string(),
        };

        let state_file = lookup("APPETIT_STATE_FILE")
            .filter(|s| !s.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_STATE_FILE), PathBuf::from);

        let timeout = lookup("APPETIT_HTTP_TIMEOUT_SECS")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs)
                    .ok_or_else(|| {
                        ConfigError::InvalidEnvVar(
                            "APPETIT_HTTP_TIMEOUT_SECS".to_string(),
                            format!("expected a positive number of seconds, got {raw:?}"),
                        )
                    })
            })
            .transpose()?;

        Ok(Self {
            api_base,
            state_file,
            timeout,
        })
    }

    /// Override the API base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL is not http(s).
    pub fn with_api_base(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.api_base = parse_api_base(raw)
            .map_err(|e| ConfigError::InvalidEnvVar("--api-base".to_string(), e))?;
        Ok(self)
    }

    /// Override the state file location.
    #[must_use]
    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = path.into();
        self
    }
}

/// Parse and validate an API base URL.
///
/// The trailing slash is dropped so endpoint paths can be appended verbatim.
///
/// # Errors
///
/// Returns a description of the problem if the URL does not parse or is not
/// http(s).
pub fn parse_api_base(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| e.to_string())?;

    match url.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(format!("unsupported scheme {other:?}, expected http or https")),
    }
}
