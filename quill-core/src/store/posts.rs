//! Posts store: the post list, the detail slot, and list filters
//!
//! The store only changes on confirmed server responses. A failed request
//! leaves the list and the detail slot exactly as they were and records the
//! error.
//!
//! Like and unlike requests for the same post are serialized: a second
//! toggle is not sent until the first has settled and been applied, so the
//! final state always reflects the operation invoked last.

use super::lifecycle::{dispatch, Lifecycle, Reducer, RequestStatus};
use crate::api::{ApiError, ApiResult, PostsApi};
use crate::model::{
    FilterPatch, LikeOutcome, NewPost, Post, PostFilters, PostId, PostUpdate, UserId,
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::trace;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostsState {
    items: Vec<Post>,
    current: Option<Post>,
    filters: PostFilters,
    list_author: Option<UserId>,
    status: RequestStatus,
}

impl PostsState {
    pub fn items(&self) -> &[Post] {
        &self.items
    }

    pub fn get(&self, id: PostId) -> Option<&Post> {
        self.items.iter().find(|post| post.id == id)
    }

    /// Post held by the detail view, if any
    pub fn current(&self) -> Option<&Post> {
        self.current.as_ref()
    }

    pub fn filters(&self) -> &PostFilters {
        &self.filters
    }

    /// Author the list was last fetched for, when it holds one author's posts
    pub fn list_author(&self) -> Option<UserId> {
        self.list_author
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.status.error()
    }

    fn patch(&mut self, id: PostId, mut f: impl FnMut(&mut Post)) {
        if let Some(post) = self.items.iter_mut().find(|post| post.id == id) {
            f(post);
        }
        if let Some(post) = self.current.as_mut().filter(|post| post.id == id) {
            f(post);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PostsEvent {
    FetchAll(Lifecycle<Vec<Post>>),
    FetchByAuthor(Lifecycle<(UserId, Vec<Post>)>),
    FetchOne(Lifecycle<Post>),
    Create(Lifecycle<Post>),
    Update(Lifecycle<Post>),
    Delete(Lifecycle<PostId>),
    Like(Lifecycle<LikeOutcome>),
    Unlike(Lifecycle<LikeOutcome>),
    SetFilters(FilterPatch),
    ClearFilters,
    ClearError,
}

impl PostsEvent {
    fn name(&self) -> &'static str {
        match self {
            PostsEvent::FetchAll(_) => "fetch_all",
            PostsEvent::FetchByAuthor(_) => "fetch_by_author",
            PostsEvent::FetchOne(_) => "fetch_one",
            PostsEvent::Create(_) => "create",
            PostsEvent::Update(_) => "update",
            PostsEvent::Delete(_) => "delete",
            PostsEvent::Like(_) => "like",
            PostsEvent::Unlike(_) => "unlike",
            PostsEvent::SetFilters(_) => "set_filters",
            PostsEvent::ClearFilters => "clear_filters",
            PostsEvent::ClearError => "clear_error",
        }
    }
}

impl Reducer for PostsState {
    type Event = PostsEvent;

    fn apply(&mut self, event: PostsEvent) {
        trace!(event = event.name(), "posts event");

        match event {
            PostsEvent::FetchAll(phase) => {
                if let Some(posts) = self.status.track(phase) {
                    self.items = posts;
                    self.list_author = None;
                }
            }
            PostsEvent::FetchByAuthor(phase) => {
                if let Some((author, posts)) = self.status.track(phase) {
                    self.items = posts;
                    self.list_author = Some(author);
                }
            }
            PostsEvent::FetchOne(phase) => {
                if let Some(post) = self.status.track(phase) {
                    self.current = Some(post);
                }
            }
            PostsEvent::Create(phase) => {
                if let Some(post) = self.status.track(phase) {
                    let in_scope = self
                        .list_author
                        .map_or(true, |author| post.is_written_by(author));
                    let index = self.filters.insertion_index(&self.items, &post);
                    if let Some(index) = index.filter(|_| in_scope) {
                        self.items.insert(index, post);
                    }
                }
            }
            PostsEvent::Update(phase) => {
                if let Some(post) = self.status.track(phase) {
                    let id = post.id;
                    self.patch(id, |held| *held = post.clone());
                }
            }
            PostsEvent::Delete(phase) => {
                if let Some(id) = self.status.track(phase) {
                    self.items.retain(|post| post.id != id);
                    if self.current.as_ref().is_some_and(|post| post.id == id) {
                        self.current = None;
                    }
                }
            }
            PostsEvent::Like(phase) | PostsEvent::Unlike(phase) => {
                if let Some(outcome) = self.status.track(phase) {
                    self.patch(outcome.post_id, |post| post.apply_like(&outcome));
                }
            }
            PostsEvent::SetFilters(patch) => self.filters.merge(&patch),
            PostsEvent::ClearFilters => self.filters = PostFilters::default(),
            PostsEvent::ClearError => self.status.clear_error(),
        }
    }
}

type Lane = Arc<tokio::sync::Mutex<()>>;

/// One FIFO lane per post for like/unlike
#[derive(Debug, Default)]
struct LikeLanes {
    lanes: Mutex<HashMap<PostId, Lane>>,
}

impl LikeLanes {
    async fn run<T>(&self, id: PostId, work: impl Future<Output = T>) -> T {
        let ticket = self.ticket(id);
        let _turn = ticket.lane.lock().await;
        work.await
    }

    fn ticket(&self, id: PostId) -> LaneTicket<'_> {
        let lane = self
            .lanes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .or_default()
            .clone();
        LaneTicket {
            lanes: &self.lanes,
            id,
            lane,
        }
    }

    #[cfg(test)]
    fn is_idle(&self) -> bool {
        self.lanes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

/// A caller's hold on a lane; the last holder removes it from the map
struct LaneTicket<'a> {
    lanes: &'a Mutex<HashMap<PostId, Lane>>,
    id: PostId,
    lane: Lane,
}

impl Drop for LaneTicket<'_> {
    fn drop(&mut self) {
        let mut lanes = self.lanes.lock().unwrap_or_else(PoisonError::into_inner);
        // The map and this ticket are the only holders left
        let last = lanes
            .get(&self.id)
            .is_some_and(|lane| Arc::ptr_eq(lane, &self.lane) && Arc::strong_count(lane) == 2);
        if last {
            lanes.remove(&self.id);
        }
    }
}

pub struct PostsStore {
    api: PostsApi,
    state: Arc<RwLock<PostsState>>,
    likes: LikeLanes,
}

impl PostsStore {
    pub fn new(api: PostsApi) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(PostsState::default())),
            likes: LikeLanes::default(),
        }
    }

    pub async fn state(&self) -> RwLockReadGuard<'_, PostsState> {
        self.state.read().await
    }

    pub async fn snapshot(&self) -> PostsState {
        self.state.read().await.clone()
    }

    /// Apply an event directly, without a request
    pub async fn apply(&self, event: PostsEvent) {
        self.state.write().await.apply(event);
    }

    /// Replace the list with the posts matching the current filters
    pub async fn fetch_all(&self) -> ApiResult<Vec<Post>> {
        let filters = self.state.read().await.filters.clone();
        dispatch(&self.state, PostsEvent::FetchAll, self.api.list(&filters)).await
    }

    /// Replace the list with one author's posts
    ///
    /// Until the next `fetch_all`, created posts by anyone else stay out of
    /// the list.
    pub async fn fetch_by_author(&self, author: UserId) -> ApiResult<Vec<Post>> {
        let request = async {
            let posts = self.api.list_by_author(author).await?;
            Ok::<_, ApiError>((author, posts))
        };
        dispatch(&self.state, PostsEvent::FetchByAuthor, request)
            .await
            .map(|(_, posts)| posts)
    }

    /// Load one post into the detail slot
    pub async fn fetch_one(&self, id: PostId) -> ApiResult<Post> {
        dispatch(&self.state, PostsEvent::FetchOne, self.api.get(id)).await
    }

    pub async fn create(&self, post: &NewPost) -> ApiResult<Post> {
        dispatch(&self.state, PostsEvent::Create, self.api.create(post)).await
    }

    pub async fn update(&self, id: PostId, update: &PostUpdate) -> ApiResult<Post> {
        dispatch(&self.state, PostsEvent::Update, self.api.update(id, update)).await
    }

    pub async fn delete(&self, id: PostId) -> ApiResult<()> {
        let request = async {
            self.api.delete(id).await?;
            Ok::<_, ApiError>(id)
        };
        dispatch(&self.state, PostsEvent::Delete, request).await.map(|_| ())
    }

    pub async fn like(&self, id: PostId) -> ApiResult<LikeOutcome> {
        self.likes
            .run(id, dispatch(&self.state, PostsEvent::Like, self.api.like(id)))
            .await
    }

    pub async fn unlike(&self, id: PostId) -> ApiResult<LikeOutcome> {
        self.likes
            .run(id, dispatch(&self.state, PostsEvent::Unlike, self.api.unlike(id)))
            .await
    }

    /// Merge into the filters; the caller decides when to re-fetch
    pub async fn set_filters(&self, patch: FilterPatch) {
        self.apply(PostsEvent::SetFilters(patch)).await;
    }

    pub async fn clear_filters(&self) {
        self.apply(PostsEvent::ClearFilters).await;
    }

    pub async fn clear_error(&self) {
        self.apply(PostsEvent::ClearError).await;
    }
}
