//! Users, authors and the authentication payloads

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered user
///
/// The same shape is served for the session's current user and for the
/// author directory. The two copies are cached independently and are not
/// reconciled with each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    /// Denormalized count of posts written
    #[serde(rename = "postsCount", default)]
    pub posts_count: u64,
    /// Denormalized sum of likes across the user's posts
    #[serde(rename = "totalLikes", default)]
    pub total_likes: u64,
}

/// Authors are users seen through the directory endpoints
pub type Author = User;

/// Aggregate counters served by `GET /authors/:id/stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorStats {
    #[serde(rename = "postsCount", alias = "posts_count", default)]
    pub posts_count: u64,
    #[serde(rename = "totalLikes", alias = "total_likes", default)]
    pub total_likes: u64,
}

/// Login form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Registration form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Body returned by both `/login` and `/register`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Partial profile update; absent fields are left untouched by the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl AuthorUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.bio.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_reads_camel_case_counters() {
        let user: User = serde_json::from_value(json!({
            "id": 7,
            "name": "Ada",
            "email": "ada@example.com",
            "bio": null,
            "postsCount": 3,
            "totalLikes": 12
        }))
        .unwrap();

        assert_eq!(user.id, UserId(7));
        assert_eq!(user.posts_count, 3);
        assert_eq!(user.total_likes, 12);
        assert!(user.avatar.is_none());
    }

    #[test]
    fn test_user_counters_default_to_zero() {
        let user: User = serde_json::from_value(json!({
            "id": 1,
            "name": "A",
            "email": "a@x.com"
        }))
        .unwrap();

        assert_eq!(user.posts_count, 0);
        assert_eq!(user.total_likes, 0);
    }

    #[test]
    fn test_author_update_skips_missing_fields() {
        let update = AuthorUpdate {
            bio: Some("hello".to_string()),
            ..Default::default()
        };

        assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "bio": "hello" }));
        assert!(!update.is_empty());
        assert!(AuthorUpdate::default().is_empty());
    }

    #[test]
    fn test_author_stats_accepts_both_spellings() {
        let camel: AuthorStats =
            serde_json::from_value(json!({ "postsCount": 2, "totalLikes": 5 })).unwrap();
        let snake: AuthorStats =
            serde_json::from_value(json!({ "posts_count": 2, "total_likes": 5 })).unwrap();

        assert_eq!(camel, snake);
    }
}
