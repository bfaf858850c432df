//! Error taxonomy shared by every API wrapper

use crate::session::TokenStoreError;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

use super::client::RequestPolicy;

/// Field name -> human-readable messages, as served with a 422
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Result type for API calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Normalized failure of an API call
///
/// Stores keep the last error as rejection state, so the type is `Clone`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response
    #[error("Network error: {0}")]
    Transport(String),

    /// 401 on an operation that reports it
    #[error("Unauthorized")]
    Unauthorized,

    /// 403 translated into a fixed ownership message
    #[error("{0}")]
    Forbidden(String),

    /// 422 with a field-keyed message map
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// Any other non-2xx response
    #[error("{message}")]
    Server {
        status: u16,
        message: String,
        payload: Option<serde_json::Value>,
    },

    /// 2xx response whose body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The bearer token could not be read or written
    #[error("Session storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// HTTP status behind this error, when one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::Validation(_) => Some(422),
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ApiError::Validation(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn is_ownership_violation(&self) -> bool {
        matches!(self, ApiError::Forbidden(_))
    }
}

impl From<TokenStoreError> for ApiError {
    fn from(err: TokenStoreError) -> Self {
        ApiError::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

#[derive(Deserialize)]
struct ValidationBody {
    errors: FieldErrors,
}

/// Map a non-2xx response onto the taxonomy according to `policy`
pub(crate) fn classify(status: StatusCode, body: &[u8], policy: &RequestPolicy) -> ApiError {
    match status.as_u16() {
        401 if policy.unauthorized => return ApiError::Unauthorized,
        403 => {
            if let Some(message) = policy.forbidden {
                return ApiError::Forbidden(message.to_string());
            }
        }
        422 if policy.validation => {
            if let Ok(parsed) = serde_json::from_slice::<ValidationBody>(body) {
                return ApiError::Validation(parsed.errors);
            }
        }
        _ => {}
    }

    let payload = serde_json::from_slice::<serde_json::Value>(body).ok();
    let message = payload
        .as_ref()
        .and_then(|value| {
            value
                .get("error")
                .or_else(|| value.get("message"))
                .and_then(|m| m.as_str())
        })
        .filter(|m| !m.is_empty())
        .unwrap_or(policy.fallback)
        .to_string();

    ApiError::Server {
        status: status.as_u16(),
        message,
        payload,
    }
}
