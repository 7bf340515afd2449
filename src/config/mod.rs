//! Configuration module - environment variable parsing

use std::env;
use std::path::PathBuf;

use reqwest::Url;

/// Default API base, matching the local development server
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Default location of the persisted session tokens
pub const DEFAULT_SESSION_FILE: &str = ".powerdealer/session.json";

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL every API path is joined onto
    pub api_url: Url,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// File backing the persisted access/refresh tokens
    pub session_file: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Ok(Self {
            api_url: parse_base_url(&api_url)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            session_file: env::var("SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SESSION_FILE)),
        })
    }

    /// Build a configuration pointing at `api_url` with the remaining
    /// fields at their defaults.
    pub fn for_api(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_base_url(api_url)?,
            log_level: "info".to_string(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
        })
    }
}

/// Parse the API base, normalizing it to end in `/` so that relative
/// joins keep the path prefix (`/api` + `auth/me/` → `/api/auth/me/`).
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };

    let url = Url::parse(&normalized).map_err(|_| ConfigError::InvalidUrl(raw.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(raw.to_string()));
    }
    Ok(url)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid API base URL: {0}")]
    InvalidUrl(String),
}
