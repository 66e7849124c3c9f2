//! Configuration for connecting to a OneView appliance.
//!
//! This module handles loading configuration from environment variables,
//! with validation to ensure all required values are present.

use std::env;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::OneViewError;

/// REST API version sent in the `X-API-Version` header by default.
pub const DEFAULT_API_VERSION: u32 = 300;

/// Initial delay between task polls (milliseconds).
pub const DEFAULT_TASK_POLL_MS: u64 = 1_000;

/// Upper bound for the delay between task polls (milliseconds).
pub const DEFAULT_TASK_MAX_POLL_MS: u64 = 10_000;

/// Configuration for connecting to OneView.
///
/// The session id is stored but never logged or exposed in error messages.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the appliance (e.g., `https://oneview.example.com`).
    pub base_url: String,

    /// Session id obtained from `/rest/login-sessions`.
    /// This value must never be logged or included in error messages.
    session_id: String,

    /// Value of the `X-API-Version` header.
    pub api_version: u32,

    /// Initial delay between task status polls.
    pub task_poll_interval: Duration,

    /// Maximum delay between task status polls.
    pub task_max_poll_interval: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("session_id", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("task_poll_interval", &self.task_poll_interval)
            .field("task_max_poll_interval", &self.task_max_poll_interval)
            .finish()
    }
}

impl Config {
    /// Creates a configuration with default API version and polling settings.
    ///
    /// # Errors
    ///
    /// Returns `OneViewError::Config` if the base URL is not a valid
    /// `http`/`https` URL.
    pub fn new(base_url: impl Into<String>, session_id: impl Into<String>) -> Result<Self, OneViewError> {
        Ok(Config {
            base_url: Self::validate_base_url(base_url.into())?,
            session_id: session_id.into(),
            api_version: DEFAULT_API_VERSION,
            task_poll_interval: Duration::from_millis(DEFAULT_TASK_POLL_MS),
            task_max_poll_interval: Duration::from_millis(DEFAULT_TASK_MAX_POLL_MS),
        })
    }

    /// Loads a `.env` file if present, then reads the environment.
    pub fn load() -> Result<Self, OneViewError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Loads configuration from environment variables.
    ///
    /// # Required Environment Variables
    ///
    /// - `ONEVIEW_BASE_URL`: The base URL of the appliance
    /// - `ONEVIEW_SESSION_ID`: A session id from a prior login
    ///
    /// # Optional Environment Variables
    ///
    /// - `ONEVIEW_API_VERSION`: defaults to 300
    /// - `ONEVIEW_TASK_POLL_MS`: initial task poll delay, defaults to 1000
    /// - `ONEVIEW_TASK_MAX_POLL_MS`: task poll delay ceiling, defaults to 10000
    ///
    /// # Errors
    ///
    /// Returns `OneViewError::Config` if any required variable is missing
    /// or if values fail validation.
    pub fn from_env() -> Result<Self, OneViewError> {
        let base_url = Self::get_required_env("ONEVIEW_BASE_URL")?;
        let session_id = Self::get_required_env("ONEVIEW_SESSION_ID")?;

        Self::validate_session_id(&session_id)?;

        let mut config = Self::new(base_url, session_id)?;

        if let Some(version) = Self::get_optional_number("ONEVIEW_API_VERSION")? {
            config.api_version = u32::try_from(version).map_err(|_| {
                OneViewError::invalid_config("ONEVIEW_API_VERSION is out of range")
            })?;
        }
        if let Some(ms) = Self::get_optional_number("ONEVIEW_TASK_POLL_MS")? {
            config.task_poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = Self::get_optional_number("ONEVIEW_TASK_MAX_POLL_MS")? {
            config.task_max_poll_interval = Duration::from_millis(ms);
        }

        Ok(config)
    }

    /// Returns the session id for request headers.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Gets a required environment variable, returning an error if missing or empty.
    fn get_required_env(name: &str) -> Result<String, OneViewError> {
        env::var(name)
            .map_err(|_| OneViewError::missing_env(name))
            .and_then(|value| {
                if value.trim().is_empty() {
                    Err(OneViewError::missing_env(name))
                } else {
                    Ok(value)
                }
            })
    }

    fn get_optional_number(name: &str) -> Result<Option<u64>, OneViewError> {
        match env::var(name) {
            Ok(value) if !value.trim().is_empty() => value
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| OneViewError::invalid_config(format!("{} must be a number", name))),
            _ => Ok(None),
        }
    }

    /// Validates and normalizes the base URL.
    fn validate_base_url(url: String) -> Result<String, OneViewError> {
        let url = url.trim().trim_end_matches('/').to_string();

        let parsed = Url::parse(&url)
            .map_err(|e| OneViewError::invalid_config(format!("ONEVIEW_BASE_URL is invalid: {}", e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(OneViewError::invalid_config(
                "ONEVIEW_BASE_URL must start with http:// or https://",
            ));
        }

        Ok(url)
    }

    /// Validates the session id is not a placeholder value.
    ///
    /// Only whole-value matches are rejected. Real session ids are random
    /// base64 and may contain any of these words as a substring.
    fn validate_session_id(id: &str) -> Result<(), OneViewError> {
        const PLACEHOLDERS: [&str; 7] = [
            "your_session_id",
            "your_session_id_here",
            "your-session-id",
            "session_id",
            "placeholder",
            "changeme",
            "xxx",
        ];

        let id_lower = id.trim().to_lowercase();
        if PLACEHOLDERS.contains(&id_lower.as_str()) {
            return Err(OneViewError::invalid_config(
                "ONEVIEW_SESSION_ID appears to be a placeholder value",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tests that touch the process environment are kept out of this module;
    // they would race with each other under the default parallel runner.

    #[test]
    fn test_validate_base_url_removes_trailing_slash() {
        let result = Config::validate_base_url("https://oneview.example.com/".to_string()).unwrap();
        assert_eq!(result, "https://oneview.example.com");
    }

    #[test]
    fn test_validate_base_url_requires_scheme() {
        assert!(Config::validate_base_url("oneview.example.com".to_string()).is_err());
        assert!(Config::validate_base_url("ftp://oneview.example.com".to_string()).is_err());
    }

    #[test]
    fn test_validate_session_id_rejects_placeholder() {
        assert!(Config::validate_session_id("your_session_id_here").is_err());
        assert!(Config::validate_session_id("CHANGEME").is_err());
        assert!(Config::validate_session_id("xxx").is_err());
    }

    #[test]
    fn test_validate_session_id_accepts_placeholder_substrings() {
        assert!(Config::validate_session_id("LTIxNjUzMjc0OTUzXxXoF7eEkZLEUWVA").is_ok());
        assert!(Config::validate_session_id("QcHaNgEmE9fPlAcEhOlDeR0").is_ok());
    }

    #[test]
    fn test_validate_session_id_accepts_real_id() {
        assert!(Config::validate_session_id("LTU2NzI4NTk3MjU2tqxW").is_ok());
    }

    #[test]
    fn test_new_applies_defaults() {
        let config = Config::new("https://10.0.0.5", "abc").unwrap();
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.task_poll_interval, Duration::from_secs(1));
        assert_eq!(config.task_max_poll_interval, Duration::from_secs(10));
        assert_eq!(config.session_id(), "abc");
    }

    #[test]
    fn test_debug_redacts_session_id() {
        let config = Config::new("https://10.0.0.5", "very-secret-session").unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("very-secret-session"));
        assert!(debug.contains("[REDACTED]"));
    }
}
