//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_STATE_DIR: &str = ".eduagent";
pub const DEFAULT_STORAGE_PREFIX: &str = "eduagent";

/// Errors produced while building a [`ClientConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid API base URL '{0}': expected http:// or https://")]
    InvalidBaseUrl(String),

    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request: Duration,
    pub connect: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root without a trailing slash, e.g. `http://host/api`.
    pub api_base_url: String,
    pub timeouts: Timeouts,
    /// Directory backing the durable session mirror.
    pub state_dir: PathBuf,
    /// Prefix for the two storage keys (`<prefix>_token`, `<prefix>_user`).
    pub storage_prefix: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            timeouts: Timeouts::default(),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_owned(),
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `EDUAGENT_API_BASE_URL`: default `http://127.0.0.1:8000/api`
    /// - `EDUAGENT_REQUEST_TIMEOUT_SECS`: default 60
    /// - `EDUAGENT_CONNECT_TIMEOUT_SECS`: default 10
    /// - `EDUAGENT_STATE_DIR`: default `.eduagent`
    /// - `EDUAGENT_STORAGE_PREFIX`: default `eduagent`
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not http(s) or a timeout is not a
    /// positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = normalize_base_url(
            &std::env::var("EDUAGENT_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_owned()),
        )?;
        let timeouts = Timeouts {
            request: Duration::from_secs(env_secs("EDUAGENT_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?),
            connect: Duration::from_secs(env_secs("EDUAGENT_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?),
        };
        let state_dir = std::env::var("EDUAGENT_STATE_DIR").map_or_else(|_| PathBuf::from(DEFAULT_STATE_DIR), PathBuf::from);
        let storage_prefix = std::env::var("EDUAGENT_STORAGE_PREFIX")
            .ok()
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_STORAGE_PREFIX.to_owned());

        Ok(Self { api_base_url, timeouts, state_dir, storage_prefix })
    }

    /// Absolute URL for an API path such as `/auth/me`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

/// Validate and strip trailing slashes from an API base URL.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBaseUrl`] for anything that is not http(s).
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

fn env_secs(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    let Ok(raw) = std::env::var(var) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidValue { var, value: raw }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
