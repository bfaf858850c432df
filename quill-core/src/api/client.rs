//! Shared request plumbing for the resource wrappers

use super::error::{classify, ApiError, ApiResult};
use crate::config::ApiConfig;
use crate::metrics::{record_request, Timer};
use crate::session::Session;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Which base URL a path is resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Login, registration and the current-user profile
    Auth,
    /// Posts and authors
    Content,
}

/// How one operation treats failures
///
/// Built with `const` chaining so each wrapper declares its operations as
/// constants next to the calls that use them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPolicy {
    /// Stable operation name used in logs and metrics
    pub operation: &'static str,
    /// Message used when the server gives none
    pub fallback: &'static str,
    /// Attach the bearer token
    pub authenticated: bool,
    /// Report 401 as [`ApiError::Unauthorized`]
    pub unauthorized: bool,
    /// Report 403 as [`ApiError::Forbidden`] with this message
    pub forbidden: Option<&'static str>,
    /// Report 422 as [`ApiError::Validation`]
    pub validation: bool,
}

impl RequestPolicy {
    pub const fn new(operation: &'static str, fallback: &'static str) -> Self {
        Self {
            operation,
            fallback,
            authenticated: true,
            unauthorized: false,
            forbidden: None,
            validation: false,
        }
    }

    pub const fn anonymous(self) -> Self {
        Self {
            authenticated: false,
            ..self
        }
    }

    pub const fn map_unauthorized(self) -> Self {
        Self {
            unauthorized: true,
            ..self
        }
    }

    pub const fn forbidden(self, message: &'static str) -> Self {
        Self {
            forbidden: Some(message),
            ..self
        }
    }

    pub const fn validation(self) -> Self {
        Self {
            validation: true,
            ..self
        }
    }
}

/// HTTP client bound to a session
///
/// Cheap to clone; every wrapper holds its own copy. Requests are sent once:
/// there is no retry, and no timeout beyond the transport's own.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    auth_base: String,
    content_base: String,
    session: Session,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Session) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            http,
            auth_base: config.auth_base_url.trim_end_matches('/').to_string(),
            content_base: config.content_base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn url(&self, service: Service, path: &str) -> String {
        let base = match service {
            Service::Auth => &self.auth_base,
            Service::Content => &self.content_base,
        };
        format!("{}/{}", base, path.trim_start_matches('/'))
    }

    /// Start a request with the headers every call carries
    pub(crate) fn request(
        &self,
        method: Method,
        service: Service,
        path: &str,
        policy: &RequestPolicy,
    ) -> ApiResult<RequestBuilder> {
        let url = self.url(service, path);
        let mut builder = self
            .http
            .request(method, url)
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if policy.authenticated {
            if let Some(token) = self.session.token()? {
                builder = builder.bearer_auth(token);
            }
        }

        Ok(builder)
    }

    /// Send and decode a JSON body
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        policy: &RequestPolicy,
    ) -> ApiResult<T> {
        let body = self.execute(builder, policy).await?;
        serde_json::from_slice(&body).map_err(|e| {
            warn!(operation = policy.operation, error = %e, "response body did not decode");
            ApiError::Decode(e.to_string())
        })
    }

    /// Send and discard whatever body comes back
    pub(crate) async fn send_empty(
        &self,
        builder: RequestBuilder,
        policy: &RequestPolicy,
    ) -> ApiResult<()> {
        self.execute(builder, policy).await.map(|_| ())
    }

    async fn execute(&self, builder: RequestBuilder, policy: &RequestPolicy) -> ApiResult<Vec<u8>> {
        let request = builder.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        let has_auth = request.headers().contains_key(AUTHORIZATION);
        debug!(
            operation = policy.operation,
            %method,
            %path,
            authenticated = has_auth,
            "sending request"
        );

        let timer = Timer::new(policy.operation);
        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                timer.stop();
                record_request(policy.operation, false);
                warn!(operation = policy.operation, error = %e, "request failed to complete");
                return Err(ApiError::Transport(e.to_string()));
            }
        };

        let status = response.status();
        let body = response.bytes().await;
        timer.stop();
        let body = body?;

        if status.is_success() {
            record_request(policy.operation, true);
            debug!(operation = policy.operation, status = status.as_u16(), "request succeeded");
            Ok(body.to_vec())
        } else {
            record_request(policy.operation, false);
            let err = classify(status, &body, policy);
            warn!(
                operation = policy.operation,
                status = status.as_u16(),
                error = %err,
                "request rejected"
            );
            Err(err)
        }
    }
}
