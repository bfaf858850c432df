//! Client-side state containers
//!
//! Each store owns one slice of state behind a `tokio` lock and changes it
//! only through its [`Reducer`] in response to [`Lifecycle`] events. An async
//! operation emits `Pending` before its request and exactly one of
//! `Fulfilled` or `Rejected` after it.

pub mod authors;
pub mod lifecycle;
pub mod posts;
pub mod session;

pub use authors::{AuthorsEvent, AuthorsState, AuthorsStore};
pub use lifecycle::{Lifecycle, Reducer, RequestStatus};
pub use posts::{PostsEvent, PostsState, PostsStore};
pub use session::{SessionEvent, SessionState, SessionStore};
