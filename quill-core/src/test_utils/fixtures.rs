//! Test fixtures for creating common test objects
//!
//! Builders produce deterministic values: timestamps are offsets from a fixed
//! instant, never the wall clock.

use crate::model::{AuthResponse, AuthorRef, Post, PostId, User, UserId};
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};

/// 2024-01-01T12:00:00Z
pub fn reference_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_704_110_400, 0).unwrap_or_default()
}

/// Builder for creating test posts
pub struct PostBuilder {
    id: u64,
    title: String,
    content: String,
    author: AuthorRef,
    likes_count: u64,
    is_liked: bool,
    created_at: DateTime<Utc>,
}

impl PostBuilder {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            title: format!("Post {}", id),
            content: format!("Body of post {}", id),
            author: AuthorRef {
                id: UserId(1),
                name: "Test Author".to_string(),
            },
            likes_count: 0,
            is_liked: false,
            created_at: reference_time(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn author(mut self, id: u64, name: impl Into<String>) -> Self {
        self.author = AuthorRef {
            id: UserId(id),
            name: name.into(),
        };
        self
    }

    pub fn likes(mut self, count: u64) -> Self {
        self.likes_count = count;
        self
    }

    pub fn liked(mut self, liked: bool) -> Self {
        self.is_liked = liked;
        self
    }

    pub fn created_minutes_ago(mut self, minutes: i64) -> Self {
        self.created_at = reference_time() - Duration::minutes(minutes);
        self
    }

    pub fn build(self) -> Post {
        Post {
            id: PostId(self.id),
            title: self.title,
            content: self.content,
            user: self.author,
            likes_count: self.likes_count,
            is_liked: self.is_liked,
            created_at: self.created_at,
        }
    }
}

/// Builder for creating test users and authors
pub struct UserBuilder {
    id: u64,
    name: String,
    email: String,
    bio: Option<String>,
    posts_count: u64,
    total_likes: u64,
}

impl UserBuilder {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            name: format!("User {}", id),
            email: format!("user{}@example.com", id),
            bio: None,
            posts_count: 0,
            total_likes: 0,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    pub fn counters(mut self, posts: u64, likes: u64) -> Self {
        self.posts_count = posts;
        self.total_likes = likes;
        self
    }

    pub fn build(self) -> User {
        User {
            id: UserId(self.id),
            name: self.name,
            email: self.email,
            bio: self.bio,
            avatar: None,
            posts_count: self.posts_count,
            total_likes: self.total_likes,
        }
    }
}

/// Wire form of a value, as the API would serve it
pub fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// `{"data": value}` as served for post resources
pub fn enveloped(value: Value) -> Value {
    json!({ "data": value })
}

/// Body of a successful login or registration
pub fn auth_body(token: &str, user: &User) -> Value {
    to_json(&AuthResponse {
        token: token.to_string(),
        user: user.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_builder_defaults() {
        let post = PostBuilder::new(3).build();
        assert_eq!(post.id, PostId(3));
        assert_eq!(post.likes_count, 0);
        assert!(!post.is_liked);
        assert_eq!(post.created_at, reference_time());
    }

    #[test]
    fn test_created_minutes_ago_is_ordered() {
        let older = PostBuilder::new(1).created_minutes_ago(10).build();
        let newer = PostBuilder::new(2).created_minutes_ago(1).build();
        assert!(older.created_at < newer.created_at);
    }

    #[test]
    fn test_wire_helpers_parse_back() {
        let post = PostBuilder::new(5).likes(2).liked(true).build();
        let body = enveloped(to_json(&post));
        let parsed: crate::model::Envelope<Post> = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.into_inner(), post);

        let user = UserBuilder::new(9).counters(3, 12).build();
        let parsed: AuthResponse = serde_json::from_value(auth_body("tok", &user)).unwrap();
        assert_eq!(parsed.user, user);
        assert_eq!(parsed.token, "tok");
    }
}
