//! Client library for the Quill blogging platform
//!
//! [`api`] wraps the REST endpoints, [`session`] holds the bearer token and
//! [`store`] keeps client-side state for the session, posts and authors.
//! [`Client`] wires them together from a [`Config`].

pub mod api;
pub mod client;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod session;
pub mod store;
pub mod test_utils;

pub use api::{ApiError, ApiResult};
pub use client::{Client, ClientError};
pub use config::Config;
pub use logging::{init_logging, LogConfig, LogLevel};
pub use session::Session;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let _ = LogLevel::Info;
        let _ = Config::default();
        let _: ApiResult<()> = Err(ApiError::Unauthorized);
    }
}
