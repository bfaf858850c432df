//! Authors store: the author directory and the profile detail slot
//!
//! Author records carry aggregate counters (posts, likes) that are not kept
//! in step with the posts store. They refresh on the next fetch or an
//! explicit [`AuthorsStore::fetch_stats`].

use super::lifecycle::{dispatch, Lifecycle, Reducer, RequestStatus};
use crate::api::{ApiError, ApiResult, AuthorsApi};
use crate::model::{Author, AuthorStats, AuthorUpdate, UserId};
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::trace;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorsState {
    items: Vec<Author>,
    current: Option<Author>,
    status: RequestStatus,
}

impl AuthorsState {
    pub fn items(&self) -> &[Author] {
        &self.items
    }

    pub fn get(&self, id: UserId) -> Option<&Author> {
        self.items.iter().find(|author| author.id == id)
    }

    pub fn current(&self) -> Option<&Author> {
        self.current.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.status.error()
    }

    fn patch(&mut self, id: UserId, mut f: impl FnMut(&mut Author)) {
        if let Some(author) = self.items.iter_mut().find(|author| author.id == id) {
            f(author);
        }
        if let Some(author) = self.current.as_mut().filter(|author| author.id == id) {
            f(author);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthorsEvent {
    FetchAll(Lifecycle<Vec<Author>>),
    FetchOne(Lifecycle<Author>),
    Stats(Lifecycle<(UserId, AuthorStats)>),
    Update(Lifecycle<Author>),
    Delete(Lifecycle<UserId>),
    ClearError,
}

impl Reducer for AuthorsState {
    type Event = AuthorsEvent;

    fn apply(&mut self, event: AuthorsEvent) {
        match event {
            AuthorsEvent::FetchAll(phase) => {
                trace!(phase = phase.phase(), "authors fetch_all");
                if let Some(authors) = self.status.track(phase) {
                    self.items = authors;
                }
            }
            AuthorsEvent::FetchOne(phase) => {
                trace!(phase = phase.phase(), "authors fetch_one");
                if let Some(author) = self.status.track(phase) {
                    self.current = Some(author);
                }
            }
            AuthorsEvent::Stats(phase) => {
                if let Some((id, stats)) = self.status.track(phase) {
                    self.patch(id, |author| {
                        author.posts_count = stats.posts_count;
                        author.total_likes = stats.total_likes;
                    });
                }
            }
            AuthorsEvent::Update(phase) => {
                trace!(phase = phase.phase(), "authors update");
                if let Some(author) = self.status.track(phase) {
                    let id = author.id;
                    self.patch(id, |held| *held = author.clone());
                }
            }
            AuthorsEvent::Delete(phase) => {
                trace!(phase = phase.phase(), "authors delete");
                if let Some(id) = self.status.track(phase) {
                    self.items.retain(|author| author.id != id);
                    if self.current.as_ref().is_some_and(|author| author.id == id) {
                        self.current = None;
                    }
                }
            }
            AuthorsEvent::ClearError => self.status.clear_error(),
        }
    }
}

pub struct AuthorsStore {
    api: AuthorsApi,
    state: Arc<RwLock<AuthorsState>>,
}

impl AuthorsStore {
    pub fn new(api: AuthorsApi) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(AuthorsState::default())),
        }
    }

    pub async fn state(&self) -> RwLockReadGuard<'_, AuthorsState> {
        self.state.read().await
    }

    pub async fn snapshot(&self) -> AuthorsState {
        self.state.read().await.clone()
    }

    pub async fn fetch_all(&self) -> ApiResult<Vec<Author>> {
        dispatch(&self.state, AuthorsEvent::FetchAll, self.api.list()).await
    }

    pub async fn fetch_one(&self, id: UserId) -> ApiResult<Author> {
        dispatch(&self.state, AuthorsEvent::FetchOne, self.api.get(id)).await
    }

    /// Refresh the counters of the cached copies of one author
    pub async fn fetch_stats(&self, id: UserId) -> ApiResult<AuthorStats> {
        let request = async { Ok::<_, ApiError>((id, self.api.stats(id).await?)) };
        dispatch(&self.state, AuthorsEvent::Stats, request)
            .await
            .map(|(_, stats)| stats)
    }

    pub async fn update(&self, id: UserId, update: &AuthorUpdate) -> ApiResult<Author> {
        dispatch(&self.state, AuthorsEvent::Update, self.api.update(id, update)).await
    }

    pub async fn delete(&self, id: UserId) -> ApiResult<()> {
        let request = async {
            self.api.delete(id).await?;
            Ok::<_, ApiError>(id)
        };
        dispatch(&self.state, AuthorsEvent::Delete, request).await.map(|_| ())
    }

    pub async fn clear_error(&self) {
        self.state.write().await.apply(AuthorsEvent::ClearError);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::UserBuilder;

    fn loaded(items: Vec<Author>) -> AuthorsState {
        let mut state = AuthorsState::default();
        state.apply(AuthorsEvent::FetchAll(Lifecycle::Fulfilled(items)));
        state
    }

    #[test]
    fn test_fetch_all_replaces_directory() {
        let mut state = loaded(vec![UserBuilder::new(1).build()]);
        let fresh = vec![UserBuilder::new(2).build(), UserBuilder::new(3).build()];

        state.apply(AuthorsEvent::FetchAll(Lifecycle::Pending));
        assert!(state.is_loading());
        state.apply(AuthorsEvent::FetchAll(Lifecycle::Fulfilled(fresh.clone())));

        assert_eq!(state.items(), fresh.as_slice());
        assert!(!state.is_loading());
    }

    #[test]
    fn test_update_patches_list_and_detail() {
        let author = UserBuilder::new(1).name("Ada").build();
        let mut state = loaded(vec![author.clone(), UserBuilder::new(2).build()]);
        state.apply(AuthorsEvent::FetchOne(Lifecycle::Fulfilled(author)));

        let renamed = UserBuilder::new(1).name("Ada L.").build();
        state.apply(AuthorsEvent::Update(Lifecycle::Fulfilled(renamed.clone())));

        assert_eq!(state.get(UserId(1)), Some(&renamed));
        assert_eq!(state.current(), Some(&renamed));
        assert_eq!(state.items().len(), 2);
    }

    #[test]
    fn test_forbidden_update_keeps_profile() {
        let author = UserBuilder::new(1).build();
        let mut state = loaded(vec![author.clone()]);

        state.apply(AuthorsEvent::Update(Lifecycle::Pending));
        state.apply(AuthorsEvent::Update(Lifecycle::Rejected(ApiError::Forbidden(
            "You cannot edit another user's profile".to_string(),
        ))));

        assert_eq!(state.get(UserId(1)), Some(&author));
        assert!(state.error().unwrap().is_ownership_violation());
    }

    #[test]
    fn test_delete_clears_matching_detail() {
        let author = UserBuilder::new(1).build();
        let mut state = loaded(vec![author.clone()]);
        state.apply(AuthorsEvent::FetchOne(Lifecycle::Fulfilled(author)));

        state.apply(AuthorsEvent::Delete(Lifecycle::Fulfilled(UserId(1))));

        assert!(state.items().is_empty());
        assert!(state.current().is_none());
    }

    #[test]
    fn test_stats_refresh_counters_only() {
        let author = UserBuilder::new(1).name("Ada").counters(1, 1).build();
        let mut state = loaded(vec![author.clone()]);
        state.apply(AuthorsEvent::FetchOne(Lifecycle::Fulfilled(author)));

        let stats = AuthorStats {
            posts_count: 4,
            total_likes: 20,
        };
        state.apply(AuthorsEvent::Stats(Lifecycle::Fulfilled((UserId(1), stats))));

        for held in [state.get(UserId(1)).unwrap(), state.current().unwrap()] {
            assert_eq!(held.posts_count, 4);
            assert_eq!(held.total_likes, 20);
            assert_eq!(held.name, "Ada");
        }
    }
}
