//! Configuration management for Quill
//!
//! Defaults, a TOML file, or `QUILL_<SECTION>_<KEY>` environment variables.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

mod error;

pub use error::ConfigError;

const DEFAULT_BASE_URL: &str = "https://stories.techzilla.site/api";

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// REST endpoints
    pub api: ApiConfig,

    /// Token persistence
    pub session: SessionConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// REST endpoints
///
/// Authentication and content may be served from different hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL for login, registration and the current user
    pub auth_base_url: String,

    /// Base URL for posts and authors
    pub content_base_url: String,

    /// User-Agent sent with every request
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Where the bearer token is kept between runs
    pub token_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Include timestamps
    pub with_timestamp: bool,

    /// Include target module
    pub with_target: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            auth_base_url: DEFAULT_BASE_URL.to_string(),
            content_base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!("quill/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json_format: false,
            with_timestamp: true,
            with_target: true,
        }
    }
}

impl SessionConfig {
    /// Configured token path, or `<data dir>/quill/token`
    pub fn resolved_token_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.token_path {
            return Ok(path.clone());
        }
        dirs::data_local_dir()
            .map(|dir| dir.join("quill").join("token"))
            .ok_or(ConfigError::NoTokenPath)
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables follow the pattern: QUILL_<SECTION>_<KEY>
    /// Example: QUILL_API_CONTENT_BASE_URL=http://localhost:8000/api
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay values found through `lookup` onto this configuration
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        // API config
        if let Some(url) = lookup("QUILL_API_AUTH_BASE_URL") {
            self.api.auth_base_url = url;
        }
        if let Some(url) = lookup("QUILL_API_CONTENT_BASE_URL") {
            self.api.content_base_url = url;
        }
        if let Some(agent) = lookup("QUILL_API_USER_AGENT") {
            self.api.user_agent = agent;
        }

        // Session config
        if let Some(path) = lookup("QUILL_SESSION_TOKEN_PATH") {
            self.session.token_path = Some(PathBuf::from(path));
        }

        // Logging config
        if let Some(level) = lookup("QUILL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("QUILL_LOG_JSON") {
            self.logging.json_format = parse_flag("QUILL_LOG_JSON", &json)?;
        }
        if let Some(timestamp) = lookup("QUILL_LOG_TIMESTAMP") {
            self.logging.with_timestamp = parse_flag("QUILL_LOG_TIMESTAMP", &timestamp)?;
        }

        Ok(())
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_base_url("api.auth_base_url", &self.api.auth_base_url)?;
        validate_base_url("api.content_base_url", &self.api.content_base_url)?;

        if self.api.user_agent.trim().is_empty() {
            return Err(ConfigError::invalid("api.user_agent", "must not be empty"));
        }

        if let Some(path) = &self.session.token_path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::invalid("session.token_path", "must not be empty"));
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid(
                "logging.level",
                format!("unknown level {:?}", self.logging.level),
            ));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)?;

        std::fs::write(path, contents).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse().map_err(|e: std::str::ParseBoolError| ConfigError::Override {
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn validate_base_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::invalid(field, format!("{:?} is not a URL: {}", value, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::invalid(
            field,
            format!("must use http or https, got {}", other),
        )),
    }
}
