//! End-to-end authentication flow tests driven through the HTTP surface.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum_test::TestServer;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;

use taskease::{
    api::{build_router, ApiState},
    auth::{LoginService, RegistrationService, SessionService},
    config::ServerConfig,
    notifier::Notifier,
    storage::{repositories::SqlxUserRepository, run_migrations},
};

/// Captures verification tokens instead of sending email.
#[derive(Debug, Default)]
struct CapturingNotifier {
    tokens: Mutex<Vec<String>>,
}

impl CapturingNotifier {
    fn last_token(&self) -> String {
        self.tokens.lock().unwrap().last().cloned().expect("a verification email was sent")
    }

    fn sent_count(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for CapturingNotifier {
    async fn send_verification(
        &self,
        _to_email: &str,
        _username: &str,
        token: &str,
    ) -> taskease::Result<()> {
        self.tokens.lock().unwrap().push(token.to_string());
        Ok(())
    }
}

async fn spawn_app() -> (TestServer, Arc<CapturingNotifier>) {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect("sqlite::memory:")
        .await
        .expect("create sqlite pool");
    run_migrations(&pool).await.expect("run migrations");

    let users = Arc::new(SqlxUserRepository::new(pool));
    let notifier = Arc::new(CapturingNotifier::default());
    let session = Arc::new(SessionService::new(b"integration-test-secret-32-bytes!!"));

    let state = ApiState {
        registration: RegistrationService::new(users.clone(), notifier.clone()),
        login: LoginService::new(users.clone(), session.clone(), notifier.clone()),
        session,
        users,
    };

    let router = build_router(state, &ServerConfig::default());
    let server = TestServer::new(router).expect("start test server");

    (server, notifier)
}

fn register_body(username: &str, email: &str, password: &str) -> Value {
    json!({ "username": username, "email": email, "password": password })
}

/// Pull the session credential out of a Set-Cookie header.
fn session_token_from(response: &axum_test::TestResponse) -> String {
    let headers = response.headers();
    let header = headers
        .get(SET_COOKIE)
        .expect("Set-Cookie header present")
        .to_str()
        .expect("header is ascii")
        .to_string();
    let pair = header.split(';').next().expect("cookie pair");
    let (name, value) = pair.split_once('=').expect("name=value");
    assert_eq!(name, "taskease_token");
    value.to_string()
}

#[tokio::test]
async fn full_lifecycle_register_verify_login_me_logout() {
    let (server, notifier) = spawn_app().await;

    // Register: identity created unverified, token issued.
    let response =
        server.post("/register").json(&register_body("alice", "alice@x.com", "pw123")).await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let token = notifier.last_token();

    // Verify: succeeds once, then the token is gone.
    let response = server.post("/verify-email").json(&json!({ "token": token })).await;
    response.assert_status_ok();
    let response = server.post("/verify-email").json(&json!({ "token": token })).await;
    response.assert_status_not_found();

    // Login: 201 with the session cookie set.
    let response =
        server.post("/login").json(&json!({ "email": "alice@x.com", "password": "pw123" })).await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["user"], "alice");
    let session_token = session_token_from(&response);
    assert!(!session_token.is_empty());

    // /me with the cookie resolves the identity.
    let cookie_header: axum::http::HeaderValue =
        format!("taskease_token={}", session_token).parse().expect("cookie header");
    let response = server.get("/me").add_header(COOKIE, cookie_header).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["user"], "alice");

    // Logout clears the cookie client-side.
    let response = server.post("/logout").await;
    response.assert_status_ok();
    let headers = response.headers();
    let header = headers
        .get(SET_COOKIE)
        .expect("Set-Cookie header present")
        .to_str()
        .expect("header is ascii");
    assert!(header.starts_with("taskease_token="));
    assert!(header.to_lowercase().contains("max-age=0"));

    // Without the cookie the gate rejects.
    let response = server.get("/me").await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let (server, _notifier) = spawn_app().await;

    let response =
        server.post("/register").json(&register_body("alice", "alice@x.com", "pw123")).await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let response =
        server.post("/register").json(&register_body("alice2", "alice@x.com", "other")).await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn malformed_email_is_rejected() {
    let (server, notifier) = spawn_app().await;

    let response =
        server.post("/register").json(&register_body("bob", "not-an-email", "pw123")).await;
    response.assert_status_unauthorized();
    assert_eq!(notifier.sent_count(), 0);
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() {
    let (server, notifier) = spawn_app().await;

    server.post("/register").json(&register_body("alice", "alice@x.com", "pw123")).await;
    let token = notifier.last_token();
    server.post("/verify-email").json(&json!({ "token": token })).await;

    let unknown =
        server.post("/login").json(&json!({ "email": "ghost@x.com", "password": "pw123" })).await;
    let wrong =
        server.post("/login").json(&json!({ "email": "alice@x.com", "password": "nope" })).await;

    unknown.assert_status_unauthorized();
    wrong.assert_status_unauthorized();
    assert_eq!(unknown.json::<Value>(), wrong.json::<Value>());
}

#[tokio::test]
async fn unverified_login_gets_202_and_no_cookie() {
    let (server, notifier) = spawn_app().await;

    server.post("/register").json(&register_body("alice", "alice@x.com", "pw123")).await;
    assert_eq!(notifier.sent_count(), 1);

    let response =
        server.post("/login").json(&json!({ "email": "alice@x.com", "password": "pw123" })).await;
    response.assert_status(axum::http::StatusCode::ACCEPTED);
    assert!(response.headers().get(SET_COOKIE).is_none());

    // The pending token was re-sent, not reissued.
    assert_eq!(notifier.sent_count(), 2);
}

#[tokio::test]
async fn garbage_session_cookie_is_rejected() {
    let (server, _notifier) = spawn_app().await;

    let cookie_header: axum::http::HeaderValue =
        "taskease_token=garbage".parse().expect("cookie header");
    let response = server.get("/me").add_header(COOKIE, cookie_header).await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn resend_verification_is_generic_for_unknown_email() {
    let (server, notifier) = spawn_app().await;

    let response =
        server.post("/resend-verification").json(&json!({ "email": "ghost@x.com" })).await;
    response.assert_status_ok();
    assert_eq!(notifier.sent_count(), 0);
}
