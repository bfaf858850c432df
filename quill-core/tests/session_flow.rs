use quill_core::api::ApiError;
use quill_core::config::Config;
use quill_core::model::{Credentials, SignupRequest};
use quill_core::session::{FileTokenStore, TokenStore};
use quill_core::test_utils::{auth_body, to_json, UserBuilder};
use quill_core::Client;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

#[tokio::test]
async fn test_signup_logs_in_and_persists_token() {
    let api = common::logged_out().await;
    let user = UserBuilder::new(1).name("A").email("a@x.com").build();

    Mock::given(method("POST"))
        .and(path("/api/register"))
        .and(body_json(json!({
            "name": "A",
            "email": "a@x.com",
            "password": "secret1",
            "password_confirmation": "secret1"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(auth_body("tok-1", &user)))
        .expect(1)
        .mount(&api.server)
        .await;

    let request = SignupRequest {
        name: "A".to_string(),
        email: "a@x.com".to_string(),
        password: "secret1".to_string(),
        password_confirmation: "secret1".to_string(),
    };
    let response = api.client.session().signup(&request).await.unwrap();
    assert_eq!(response.token, "tok-1");

    let state = api.client.session().snapshot().await;
    assert!(state.is_authenticated());
    assert_eq!(state.user(), Some(&user));
    assert!(!state.is_loading());
    assert_eq!(api.client.token_slot().token().unwrap().as_deref(), Some("tok-1"));
}

#[tokio::test]
async fn test_signup_validation_errors_are_kept() {
    let api = common::logged_out().await;

    Mock::given(method("POST"))
        .and(path("/api/register"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "The given data was invalid.",
            "errors": { "email": ["The email has already been taken."] }
        })))
        .mount(&api.server)
        .await;

    let request = SignupRequest {
        name: "A".to_string(),
        email: "a@x.com".to_string(),
        password: "secret1".to_string(),
        password_confirmation: "secret1".to_string(),
    };
    let err = api.client.session().signup(&request).await.unwrap_err();
    let fields = err.field_errors().expect("field errors");
    assert_eq!(fields["email"], vec!["The email has already been taken.".to_string()]);

    let state = api.client.session().snapshot().await;
    assert!(!state.is_authenticated());
    assert_eq!(state.error(), Some(&err));
}

#[tokio::test]
async fn test_login_rejected_with_401() {
    let api = common::logged_out().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid credentials" })),
        )
        .mount(&api.server)
        .await;

    let err = api
        .client
        .session()
        .login(&Credentials::new("a@x.com", "wrong"))
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);

    let state = api.client.session().snapshot().await;
    assert!(!state.is_authenticated());
    assert!(state.user().is_none());
    assert_eq!(state.error().map(|e| e.to_string()).as_deref(), Some("Unauthorized"));
    assert_eq!(api.client.token_slot().token().unwrap(), None);
}

#[tokio::test]
async fn test_login_loads_full_profile() {
    let api = common::logged_out().await;
    let summary = UserBuilder::new(7).name("Ada").build();
    let profile = UserBuilder::new(7).name("Ada").counters(3, 9).build();

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({ "email": "ada@x.com", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("tok-7", &summary)))
        .mount(&api.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/user"))
        .and(header("authorization", "Bearer tok-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(to_json(&profile)))
        .expect(1)
        .mount(&api.server)
        .await;

    let response = api
        .client
        .session()
        .login(&Credentials::new("ada@x.com", "pw"))
        .await
        .unwrap();
    assert_eq!(response.user, profile);

    let state = api.client.session().snapshot().await;
    assert!(state.is_authenticated());
    assert_eq!(state.user().map(|u| u.total_likes), Some(9));
    assert!(state.error().is_none());
    assert!(!state.is_loading());
}

#[tokio::test]
async fn test_login_survives_failed_profile_fetch() {
    let api = common::logged_out().await;
    let summary = UserBuilder::new(7).name("Ada").build();

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("tok-7", &summary)))
        .mount(&api.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/user"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&api.server)
        .await;

    let response = api
        .client
        .session()
        .login(&Credentials::new("ada@x.com", "pw"))
        .await
        .unwrap();
    assert_eq!(response.user, summary);

    let state = api.client.session().snapshot().await;
    assert!(state.is_authenticated());
    assert_eq!(state.user(), Some(&summary));
    assert_eq!(state.error().and_then(|e| e.status()), Some(500));
    assert!(!state.is_loading());
}

#[tokio::test]
async fn test_logout_resets_after_server_confirms() {
    let api = common::logged_in("tok-1").await;

    Mock::given(method("POST"))
        .and(path("/api/logout"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "bye" })))
        .expect(1)
        .mount(&api.server)
        .await;

    assert!(api.client.session().is_authenticated().await);
    api.client.session().logout().await.unwrap();

    let state = api.client.session().snapshot().await;
    assert!(!state.is_authenticated());
    assert!(state.user().is_none());
    assert_eq!(api.client.token_slot().token().unwrap(), None);
}

#[tokio::test]
async fn test_failed_logout_keeps_token() {
    let api = common::logged_in("tok-1").await;

    Mock::given(method("POST"))
        .and(path("/api/logout"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "message": "down" })))
        .mount(&api.server)
        .await;

    let err = api.client.session().logout().await.unwrap_err();
    assert_eq!(err.to_string(), "down");

    assert!(api.client.session().is_authenticated().await);
    assert_eq!(api.client.token_slot().token().unwrap().as_deref(), Some("tok-1"));
}

#[tokio::test]
async fn test_verify_returns_body_verbatim() {
    let api = common::logged_in("tok-1").await;
    let body = json!({ "valid": true, "user_id": 1 });

    Mock::given(method("GET"))
        .and(path("/api/auth/verify"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .mount(&api.server)
        .await;

    assert_eq!(api.client.session().verify_token().await.unwrap(), body);
}

#[tokio::test]
async fn test_token_file_rehydrates_session() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("quill").join("token");
    FileTokenStore::new(&token_path).save("persisted").unwrap();

    let mut config: Config = common::config_for(&server);
    config.session.token_path = Some(token_path.clone());

    let user = UserBuilder::new(2).build();
    Mock::given(method("GET"))
        .and(path("/api/user"))
        .and(header("authorization", "Bearer persisted"))
        .respond_with(ResponseTemplate::new(200).set_body_json(to_json(&user)))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::new(&config).unwrap();
    assert!(client.session().is_authenticated().await);

    assert_eq!(client.session().restore().await.unwrap(), Some(user.clone()));
    // Already loaded: no second request
    assert_eq!(client.session().restore().await.unwrap(), Some(user));

    Mock::given(method("POST"))
        .and(path("/api/logout"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    client.session().logout().await.unwrap();
    assert!(!token_path.exists());
}
