//! HTTP wrappers for the blogging REST API
//!
//! One wrapper per resource ([`AuthApi`], [`PostsApi`], [`AuthorsApi`]), all
//! sharing an [`ApiClient`] that attaches the session's bearer token and
//! normalizes failures into [`ApiError`].
//!
//! Non-2xx responses are always failures. Only 401, 403 and 422 get special
//! treatment, and only where an operation's [`RequestPolicy`] asks for it.

pub mod auth;
pub mod authors;
pub mod client;
pub mod error;
pub mod posts;

pub use auth::AuthApi;
pub use authors::AuthorsApi;
pub use client::{ApiClient, RequestPolicy, Service};
pub use error::{ApiError, ApiResult, FieldErrors};
pub use posts::PostsApi;
