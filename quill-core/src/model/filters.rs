//! Post list filters
//!
//! Filters are view state owned by the posts store. They are sent verbatim as
//! the query string of `GET /posts`.

use super::post::Post;
use super::user::UserId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    CreatedAt,
    LikesCount,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::CreatedAt => "created_at",
            SortKey::LikesCount => "likes_count",
        }
    }

    fn compare(&self, a: &Post, b: &Post) -> Ordering {
        match self {
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::LikesCount => a.likes_count.cmp(&b.likes_count),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" | "latest" => Ok(SortKey::CreatedAt),
            "likes_count" | "likes" => Ok(SortKey::LikesCount),
            other => Err(format!("unknown sort key '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Active list filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFilters {
    /// Restrict to one author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<UserId>,
    /// Restrict to the current user's posts
    #[serde(default, skip_serializing_if = "is_false")]
    pub mine: bool,
    pub sort: SortKey,
    pub order: SortOrder,
}

/// Partial filter update; `None` leaves the field as it is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    /// `Some(None)` clears the author scope
    pub author: Option<Option<UserId>>,
    pub mine: Option<bool>,
    pub sort: Option<SortKey>,
    pub order: Option<SortOrder>,
}

impl FilterPatch {
    pub fn sort(sort: SortKey) -> Self {
        Self {
            sort: Some(sort),
            ..Default::default()
        }
    }

    pub fn mine(mine: bool) -> Self {
        Self {
            mine: Some(mine),
            ..Default::default()
        }
    }

    pub fn author(author: Option<UserId>) -> Self {
        Self {
            author: Some(author),
            ..Default::default()
        }
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }
}

impl PostFilters {
    /// Shallow merge of `patch` into the current filters
    pub fn merge(&mut self, patch: &FilterPatch) {
        if let Some(author) = patch.author {
            self.author = author;
        }
        if let Some(mine) = patch.mine {
            self.mine = mine;
        }
        if let Some(sort) = patch.sort {
            self.sort = sort;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
    }

    /// Where a freshly created post belongs in a list fetched with these filters
    ///
    /// Returns `None` when the author scope excludes the post.
    pub fn insertion_index(&self, items: &[Post], post: &Post) -> Option<usize> {
        if let Some(author) = self.author {
            if !post.is_written_by(author) {
                return None;
            }
        }

        // A new post goes ahead of its equals: it is the most recent of them.
        let index = items
            .iter()
            .position(|item| match self.order {
                SortOrder::Desc => self.sort.compare(post, item) != Ordering::Less,
                SortOrder::Asc => self.sort.compare(post, item) == Ordering::Less,
            })
            .unwrap_or(items.len());
        Some(index)
    }
}
