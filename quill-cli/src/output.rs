//! Terminal rendering of command results

use quill_core::model::{Author, AuthorStats, LikeOutcome, Post, User};
use serde::Serialize;
use serde_json::json;

/// Text for people, JSON for scripts
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) {
        if self.json {
            match serde_json::to_string_pretty(value) {
                Ok(rendered) => println!("{}", rendered),
                Err(e) => eprintln!("Failed to render JSON: {}", e),
            }
        } else {
            println!("{}", text());
        }
    }

    pub fn message(&self, message: &str) {
        self.emit(&json!({ "message": message }), || message.to_string());
    }

    pub fn value(&self, value: &serde_json::Value) {
        self.emit(value, || value.to_string());
    }

    pub fn user(&self, user: &User) {
        self.emit(user, || user_line(user));
    }

    pub fn post(&self, post: &Post) {
        self.emit(post, || {
            format!(
                "{}\n\n{}\n\n{} likes{}",
                post_line(post),
                post.content,
                post.likes_count,
                if post.is_liked { " (liked)" } else { "" }
            )
        });
    }

    pub fn posts(&self, posts: &[Post]) {
        self.emit(&posts, || {
            if posts.is_empty() {
                return "No posts".to_string();
            }
            posts.iter().map(post_line).collect::<Vec<_>>().join("\n")
        });
    }

    pub fn authors(&self, authors: &[Author]) {
        self.emit(&authors, || {
            if authors.is_empty() {
                return "No authors".to_string();
            }
            authors.iter().map(user_line).collect::<Vec<_>>().join("\n")
        });
    }

    pub fn stats(&self, stats: &AuthorStats) {
        self.emit(stats, || {
            format!("{} posts, {} likes", stats.posts_count, stats.total_likes)
        });
    }

    pub fn like(&self, outcome: &LikeOutcome) {
        let value = json!({
            "post_id": outcome.post_id,
            "liked": outcome.liked,
            "likes_count": outcome.likes_count,
        });
        self.emit(&value, || like_line(outcome));
    }
}

fn post_line(post: &Post) -> String {
    format!(
        "#{} {} by {} ({}, {} likes)",
        post.id,
        post.title,
        post.user.name,
        post.created_at.format("%Y-%m-%d %H:%M"),
        post.likes_count
    )
}

fn user_line(user: &User) -> String {
    format!(
        "#{} {} <{}>: {} posts, {} likes",
        user.id, user.name, user.email, user.posts_count, user.total_likes
    )
}

fn like_line(outcome: &LikeOutcome) -> String {
    let verb = if outcome.liked { "Liked" } else { "Unliked" };
    format!("{} post #{} ({} likes)", verb, outcome.post_id, outcome.likes_count)
}
