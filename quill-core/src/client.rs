//! Composition root: one session, one HTTP client, three stores

use crate::api::{ApiClient, ApiError, AuthApi, AuthorsApi, PostsApi};
use crate::config::{Config, ConfigError};
use crate::session::{FileTokenStore, Session};
use crate::store::{AuthorsStore, PostsStore, SessionStore};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Stores wired to a shared session
pub struct Client {
    session: Session,
    session_store: SessionStore,
    posts: PostsStore,
    authors: AuthorsStore,
}

impl Client {
    /// Build from configuration, keeping the token in a file
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        config.validate()?;
        let path = config.session.resolved_token_path()?;
        debug!(path = %path.display(), "using file token store");
        Self::with_session(config, Session::new(FileTokenStore::new(path)))
    }

    /// Build around an existing session, e.g. an in-memory one
    pub fn with_session(config: &Config, session: Session) -> Result<Self, ClientError> {
        let http = ApiClient::new(&config.api, session.clone())?;

        Ok(Self {
            session_store: SessionStore::new(AuthApi::new(http.clone()), session.clone()),
            posts: PostsStore::new(PostsApi::new(http.clone())),
            authors: AuthorsStore::new(AuthorsApi::new(http)),
            session,
        })
    }

    /// The raw token slot
    pub fn token_slot(&self) -> &Session {
        &self.session
    }

    pub fn session(&self) -> &SessionStore {
        &self.session_store
    }

    pub fn posts(&self) -> &PostsStore {
        &self.posts
    }

    pub fn authors(&self) -> &AuthorsStore {
        &self.authors
    }
}
