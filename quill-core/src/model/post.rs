//! Posts and the like counter

use super::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned post identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub u64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot of the author embedded in a post
///
/// Taken when the post was served; it is not refreshed when the author's
/// profile changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub user: AuthorRef,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default)]
    pub is_liked: bool,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Apply a confirmed like/unlike result
    ///
    /// `is_liked` and `likes_count` are only ever written together.
    pub fn apply_like(&mut self, outcome: &LikeOutcome) {
        self.is_liked = outcome.liked;
        self.likes_count = outcome.likes_count;
    }

    pub fn is_written_by(&self, user: UserId) -> bool {
        self.user.id == user
    }
}

/// Body of `POST /posts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

/// Body of `PUT /posts/:id`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Result of a like or unlike
///
/// The wire body only carries the new count; the direction comes from
/// which endpoint answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    pub post_id: PostId,
    pub liked: bool,
    pub likes_count: u64,
}

/// `{"likes_count": n}`
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct LikeCount {
    pub likes_count: u64,
}
