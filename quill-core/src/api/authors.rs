//! Content-service wrapper for the author directory

use super::client::{ApiClient, RequestPolicy, Service};
use super::error::ApiResult;
use crate::model::{Author, AuthorStats, AuthorUpdate, UserId};
use reqwest::Method;

const LIST: RequestPolicy = RequestPolicy::new("authors.list", "Failed to fetch authors");
const GET: RequestPolicy = RequestPolicy::new("authors.get", "Failed to fetch author");
const STATS: RequestPolicy = RequestPolicy::new("authors.stats", "Failed to fetch author stats");
const UPDATE: RequestPolicy = RequestPolicy::new("authors.update", "Failed to update author")
    .forbidden("You cannot edit another user's profile")
    .validation();
const DELETE: RequestPolicy = RequestPolicy::new("authors.delete", "Failed to delete author")
    .forbidden("You cannot delete another user's profile");

#[derive(Debug, Clone)]
pub struct AuthorsApi {
    client: ApiClient,
}

impl AuthorsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ApiResult<Vec<Author>> {
        let request = self.client.request(Method::GET, Service::Content, "authors", &LIST)?;
        self.client.send_json(request, &LIST).await
    }

    pub async fn get(&self, id: UserId) -> ApiResult<Author> {
        let path = format!("authors/{}", id);
        let request = self.client.request(Method::GET, Service::Content, &path, &GET)?;
        self.client.send_json(request, &GET).await
    }

    pub async fn stats(&self, id: UserId) -> ApiResult<AuthorStats> {
        let path = format!("authors/{}/stats", id);
        let request = self.client.request(Method::GET, Service::Content, &path, &STATS)?;
        self.client.send_json(request, &STATS).await
    }

    pub async fn update(&self, id: UserId, update: &AuthorUpdate) -> ApiResult<Author> {
        let path = format!("authors/{}", id);
        let request = self
            .client
            .request(Method::PUT, Service::Content, &path, &UPDATE)?
            .json(update);
        self.client.send_json(request, &UPDATE).await
    }

    pub async fn delete(&self, id: UserId) -> ApiResult<()> {
        let path = format!("authors/{}", id);
        let request = self
            .client
            .request(Method::DELETE, Service::Content, &path, &DELETE)?;
        self.client.send_empty(request, &DELETE).await
    }
}
