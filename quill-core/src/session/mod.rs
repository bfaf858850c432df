//! Session context
//!
//! The session is the single slot holding the bearer token. It is created at
//! login or signup, rehydrated from durable storage at start-up, and cleared
//! at logout. Token presence is the only signal that a user is logged in.
//!
//! A [`Session`] is an explicit value handed to whoever dispatches requests;
//! there is no process-global token.

mod token_store;

pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreError};

use std::sync::Arc;
use tracing::debug;

/// Shared handle to the token slot
#[derive(Debug, Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
}

impl Session {
    pub fn new(store: impl TokenStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Session backed by process memory only
    pub fn in_memory() -> Self {
        Self::new(MemoryTokenStore::default())
    }

    /// Current bearer token; empty tokens count as absent
    pub fn token(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.store.load()?.filter(|token| !token.is_empty()))
    }

    pub fn is_authenticated(&self) -> Result<bool, TokenStoreError> {
        Ok(self.token()?.is_some())
    }

    pub fn persist(&self, token: &str) -> Result<(), TokenStoreError> {
        debug!("persisting session token");
        self.store.save(token)
    }

    pub fn clear(&self) -> Result<(), TokenStoreError> {
        debug!("clearing session token");
        self.store.clear()
    }
}
