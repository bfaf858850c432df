//! Shared setup for the HTTP-level tests

#![allow(dead_code)]

use quill_core::config::Config;
use quill_core::session::{MemoryTokenStore, Session};
use quill_core::Client;
use wiremock::MockServer;

/// A mock API plus a client pointed at it
pub struct TestApi {
    pub server: MockServer,
    pub client: Client,
}

/// Both services served under `/api` of one mock server
pub fn config_for(server: &MockServer) -> Config {
    config_at(&server.uri())
}

/// Both services under `/api` of `origin`
pub fn config_at(origin: &str) -> Config {
    let mut config = Config::default();
    config.api.auth_base_url = format!("{}/api", origin);
    config.api.content_base_url = format!("{}/api", origin);
    config
}

/// An origin on a local port nothing listens on
pub fn closed_origin() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

pub async fn logged_out() -> TestApi {
    start(Session::in_memory()).await
}

pub async fn logged_in(token: &str) -> TestApi {
    start(Session::new(MemoryTokenStore::with_token(token))).await
}

async fn start(session: Session) -> TestApi {
    let server = MockServer::start().await;
    let client = Client::with_session(&config_for(&server), session).expect("client build");
    TestApi { server, client }
}
