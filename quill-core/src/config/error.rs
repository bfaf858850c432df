//! Errors from loading, overlaying and checking a Quill config

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write config file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config file {} is not valid: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot encode config as TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// An environment override that does not parse
    #[error("{key}={value:?}: {reason}")]
    Override {
        key: String,
        value: String,
        reason: String,
    },

    /// A loaded setting Quill cannot work with
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// No platform data directory and no explicit `session.token_path`
    #[error("no data directory to keep the token in; set session.token_path")]
    NoTokenPath,
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
