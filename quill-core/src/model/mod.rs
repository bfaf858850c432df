//! Domain types exchanged with the blogging API
//!
//! All types mirror the JSON the API produces. Field names follow the wire
//! format through serde attributes, so the Rust side stays snake_case.

pub mod filters;
pub mod post;
pub mod user;

pub use filters::{FilterPatch, PostFilters, SortKey, SortOrder};
pub use post::{AuthorRef, LikeOutcome, NewPost, Post, PostId, PostUpdate};
pub use user::{
    Author, AuthorStats, AuthorUpdate, AuthResponse, Credentials, SignupRequest, User, UserId,
};

use serde::{Deserialize, Serialize};

/// `{"data": ...}` wrapper used by the content service for post resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        self.data
    }
}
