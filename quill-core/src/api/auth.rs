//! Auth-service wrapper: login, registration, logout, current user

use super::client::{ApiClient, RequestPolicy, Service};
use super::error::ApiResult;
use crate::model::{AuthResponse, Credentials, SignupRequest, User};
use reqwest::Method;

const LOGIN: RequestPolicy = RequestPolicy::new("auth.login", "Login failed")
    .anonymous()
    .map_unauthorized();
const SIGNUP: RequestPolicy = RequestPolicy::new("auth.signup", "Registration failed")
    .anonymous()
    .validation();
const LOGOUT: RequestPolicy = RequestPolicy::new("auth.logout", "Logout failed");
const CURRENT_USER: RequestPolicy = RequestPolicy::new("auth.current_user", "Failed to get user data");
const VERIFY: RequestPolicy = RequestPolicy::new("auth.verify", "Token verification failed");

#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `POST /login`; a 401 is reported as [`ApiError::Unauthorized`](super::ApiError::Unauthorized)
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<AuthResponse> {
        let request = self
            .client
            .request(Method::POST, Service::Auth, "login", &LOGIN)?
            .json(credentials);
        self.client.send_json(request, &LOGIN).await
    }

    /// `POST /register`; a 422 carries the field errors
    pub async fn signup(&self, user: &SignupRequest) -> ApiResult<AuthResponse> {
        let request = self
            .client
            .request(Method::POST, Service::Auth, "register", &SIGNUP)?
            .json(user);
        self.client.send_json(request, &SIGNUP).await
    }

    pub async fn logout(&self) -> ApiResult<()> {
        let request = self
            .client
            .request(Method::POST, Service::Auth, "logout", &LOGOUT)?;
        self.client.send_empty(request, &LOGOUT).await
    }

    pub async fn current_user(&self) -> ApiResult<User> {
        let request = self
            .client
            .request(Method::GET, Service::Auth, "user", &CURRENT_USER)?;
        self.client.send_json(request, &CURRENT_USER).await
    }

    /// `GET /auth/verify`; the body is returned as-is
    pub async fn verify_token(&self) -> ApiResult<serde_json::Value> {
        let request = self
            .client
            .request(Method::GET, Service::Auth, "auth/verify", &VERIFY)?;
        self.client.send_json(request, &VERIFY).await
    }
}
