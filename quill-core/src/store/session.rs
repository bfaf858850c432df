//! Session store: the logged-in user and the token
//!
//! The authenticated flag is derived from the token and never stored, so it
//! cannot drift from it. Loading the profile does not change it.

use super::lifecycle::{dispatch, Lifecycle, Reducer, RequestStatus};
use crate::api::{ApiError, ApiResult, AuthApi};
use crate::model::{AuthResponse, Credentials, SignupRequest, User};
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    user: Option<User>,
    token: Option<String>,
    status: RequestStatus,
}

impl SessionState {
    /// State rehydrated from a persisted token
    pub fn with_token(token: Option<String>) -> Self {
        Self {
            token,
            ..Default::default()
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|token| !token.is_empty())
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.status.error()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Login(Lifecycle<AuthResponse>),
    Signup(Lifecycle<AuthResponse>),
    Logout(Lifecycle<()>),
    CurrentUser(Lifecycle<User>),
    Verify(Lifecycle<serde_json::Value>),
    ClearError,
}

impl Reducer for SessionState {
    type Event = SessionEvent;

    fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Login(phase) | SessionEvent::Signup(phase) => {
                trace!(phase = phase.phase(), "session sign-in");
                if let Some(response) = self.status.track(phase) {
                    self.user = Some(response.user);
                    self.token = Some(response.token);
                }
            }
            SessionEvent::Logout(phase) => {
                trace!(phase = phase.phase(), "session logout");
                if self.status.track(phase).is_some() {
                    self.user = None;
                    self.token = None;
                }
            }
            SessionEvent::CurrentUser(phase) => {
                if let Some(user) = self.status.track(phase) {
                    self.user = Some(user);
                }
            }
            SessionEvent::Verify(phase) => {
                self.status.track(phase);
            }
            SessionEvent::ClearError => self.status.clear_error(),
        }
    }
}

pub struct SessionStore {
    api: AuthApi,
    session: Session,
    state: Arc<RwLock<SessionState>>,
}

impl SessionStore {
    /// Build the store, rehydrating the token from durable storage
    pub fn new(api: AuthApi, session: Session) -> Self {
        let token = session.token().unwrap_or_else(|e| {
            warn!(error = %e, "could not read persisted token; starting logged out");
            None
        });
        debug!(authenticated = token.is_some(), "session rehydrated");

        Self {
            api,
            session,
            state: Arc::new(RwLock::new(SessionState::with_token(token))),
        }
    }

    pub async fn state(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().await
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    /// Log in, persist the token, then load the full profile
    ///
    /// The login settles only once the profile fetch has finished. A failed
    /// profile fetch keeps the login and the user from the login response.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<AuthResponse> {
        let request = async {
            let mut response = self.api.login(credentials).await?;
            self.session.persist(&response.token)?;
            info!(user = %response.user.id, "logged in");

            match self.fetch_current_user().await {
                Ok(user) => response.user = user,
                Err(e) => warn!(error = %e, "profile fetch after login failed"),
            }
            Ok(response)
        };
        dispatch(&self.state, SessionEvent::Login, request).await
    }

    /// Register and persist the token from the response
    pub async fn signup(&self, user: &SignupRequest) -> ApiResult<AuthResponse> {
        let request = async {
            let response = self.api.signup(user).await?;
            self.session.persist(&response.token)?;
            info!(user = %response.user.id, "registered");
            Ok(response)
        };
        dispatch(&self.state, SessionEvent::Signup, request).await
    }

    /// Log out; local state is only reset once the server confirms
    pub async fn logout(&self) -> ApiResult<()> {
        let request = async {
            self.api.logout().await?;
            self.session.clear()?;
            info!("logged out");
            Ok(())
        };
        dispatch(&self.state, SessionEvent::Logout, request).await
    }

    pub async fn fetch_current_user(&self) -> ApiResult<User> {
        dispatch(&self.state, SessionEvent::CurrentUser, self.api.current_user()).await
    }

    pub async fn verify_token(&self) -> ApiResult<serde_json::Value> {
        dispatch(&self.state, SessionEvent::Verify, self.api.verify_token()).await
    }

    /// Load the profile when a token was rehydrated but no user is held yet
    pub async fn restore(&self) -> ApiResult<Option<User>> {
        let needs_profile = {
            let state = self.state.read().await;
            state.is_authenticated() && state.user().is_none()
        };
        if needs_profile {
            self.fetch_current_user().await.map(Some)
        } else {
            Ok(self.state.read().await.user().cloned())
        }
    }

    pub async fn clear_error(&self) {
        self.state.write().await.apply(SessionEvent::ClearError);
    }
}
