//! Content-service wrapper for posts
//!
//! Every post resource comes wrapped in a `{"data": ...}` envelope, which is
//! stripped here.

use super::client::{ApiClient, RequestPolicy, Service};
use super::error::ApiResult;
use crate::model::post::LikeCount;
use crate::model::{Envelope, LikeOutcome, NewPost, Post, PostFilters, PostId, PostUpdate, UserId};
use reqwest::Method;

const LIST: RequestPolicy = RequestPolicy::new("posts.list", "Failed to fetch posts");
const BY_AUTHOR: RequestPolicy = RequestPolicy::new("posts.by_author", "Failed to fetch author posts");
const GET: RequestPolicy = RequestPolicy::new("posts.get", "Failed to fetch post");
const CREATE: RequestPolicy = RequestPolicy::new("posts.create", "Failed to create post").validation();
const UPDATE: RequestPolicy = RequestPolicy::new("posts.update", "Failed to update post")
    .forbidden("You cannot edit another user's post")
    .validation();
const DELETE: RequestPolicy = RequestPolicy::new("posts.delete", "Failed to delete post")
    .forbidden("You cannot delete another user's post");
const LIKE: RequestPolicy = RequestPolicy::new("posts.like", "Failed to like post");
const UNLIKE: RequestPolicy = RequestPolicy::new("posts.unlike", "Failed to unlike post");

#[derive(Debug, Clone)]
pub struct PostsApi {
    client: ApiClient,
}

impl PostsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /posts` with the filters as query parameters
    pub async fn list(&self, filters: &PostFilters) -> ApiResult<Vec<Post>> {
        let request = self
            .client
            .request(Method::GET, Service::Content, "posts", &LIST)?
            .query(filters);
        let envelope: Envelope<Vec<Post>> = self.client.send_json(request, &LIST).await?;
        Ok(envelope.into_inner())
    }

    pub async fn list_by_author(&self, author: UserId) -> ApiResult<Vec<Post>> {
        let path = format!("posts/author/{}", author);
        let request = self
            .client
            .request(Method::GET, Service::Content, &path, &BY_AUTHOR)?;
        let envelope: Envelope<Vec<Post>> = self.client.send_json(request, &BY_AUTHOR).await?;
        Ok(envelope.into_inner())
    }

    pub async fn get(&self, id: PostId) -> ApiResult<Post> {
        let path = format!("posts/{}", id);
        let request = self.client.request(Method::GET, Service::Content, &path, &GET)?;
        let envelope: Envelope<Post> = self.client.send_json(request, &GET).await?;
        Ok(envelope.into_inner())
    }

    pub async fn create(&self, post: &NewPost) -> ApiResult<Post> {
        let request = self
            .client
            .request(Method::POST, Service::Content, "posts", &CREATE)?
            .json(post);
        let envelope: Envelope<Post> = self.client.send_json(request, &CREATE).await?;
        Ok(envelope.into_inner())
    }

    pub async fn update(&self, id: PostId, update: &PostUpdate) -> ApiResult<Post> {
        let path = format!("posts/{}", id);
        let request = self
            .client
            .request(Method::PUT, Service::Content, &path, &UPDATE)?
            .json(update);
        let envelope: Envelope<Post> = self.client.send_json(request, &UPDATE).await?;
        Ok(envelope.into_inner())
    }

    pub async fn delete(&self, id: PostId) -> ApiResult<()> {
        let path = format!("posts/{}", id);
        let request = self
            .client
            .request(Method::DELETE, Service::Content, &path, &DELETE)?;
        self.client.send_empty(request, &DELETE).await
    }

    pub async fn like(&self, id: PostId) -> ApiResult<LikeOutcome> {
        self.toggle_like(id, true).await
    }

    pub async fn unlike(&self, id: PostId) -> ApiResult<LikeOutcome> {
        self.toggle_like(id, false).await
    }

    async fn toggle_like(&self, id: PostId, liked: bool) -> ApiResult<LikeOutcome> {
        let (method, policy) = if liked {
            (Method::POST, &LIKE)
        } else {
            (Method::DELETE, &UNLIKE)
        };
        let path = format!("posts/{}/like", id);
        let mut request = self.client.request(method, Service::Content, &path, policy)?;
        if liked {
            request = request.json(&serde_json::json!({}));
        }

        let envelope: Envelope<LikeCount> = self.client.send_json(request, policy).await?;
        Ok(LikeOutcome {
            post_id: id,
            liked,
            likes_count: envelope.data.likes_count,
        })
    }
}
