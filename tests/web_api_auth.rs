//! Web API authentication tests.
//!
//! End-to-end tests for the auth endpoints, including cookie transport
//! of the refresh token.

use axum::http::header::AUTHORIZATION;
use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use devlink::config::AuthConfig;
use devlink::web::handlers::{AppState, REFRESH_COOKIE, REFRESH_COOKIE_PATH};
use devlink::web::router::create_router;
use devlink::{Database, UserRepository};
use serde_json::{json, Value};

/// Create a test auth configuration.
fn create_test_config() -> AuthConfig {
    AuthConfig {
        access_token_secret: "test-access-secret-key".to_string(),
        refresh_token_secret: "test-refresh-secret-key".to_string(),
        ..AuthConfig::default()
    }
}

/// Create a test server with an in-memory database.
async fn create_test_server() -> (TestServer, Database) {
    let db = Database::connect_in_memory()
        .await
        .expect("Failed to create test database");

    let state = AppState::new(db.clone(), &create_test_config()).expect("Failed to create state");
    let router = create_router(state, &[]);

    let mut server = TestServer::new(router).expect("Failed to create test server");
    server.save_cookies();

    (server, db)
}

/// Helper to register a test user.
async fn register_user(server: &TestServer, email: &str, password: &str) -> Value {
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "email": email,
            "password": password,
            "name": "Test User"
        }))
        .await;

    response.json::<Value>()
}

// ============================================================================
// Registration Tests
// ============================================================================

#[tokio::test]
async fn test_register_success() {
    let (server, _db) = create_test_server().await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "email": "dev@example.com",
            "password": "password123",
            "name": "Test User"
        }))
        .await;

    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body["data"]["access_token"].is_string());
    assert_eq!(body["data"]["user"]["email"], "dev@example.com");
    assert_eq!(body["data"]["user"]["role"], "member");
    // Refresh token travels only in the cookie, never the body
    assert!(body["data"]["refresh_token"].is_null());

    let cookie = response.cookie(REFRESH_COOKIE);
    assert!(!cookie.value().is_empty());
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let (server, _db) = create_test_server().await;

    register_user(&server, "dev@example.com", "password123").await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "email": "DEV@example.com",
            "password": "password123",
            "name": "Other"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let (server, _db) = create_test_server().await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "email": "dev@example.com",
            "password": "short",
            "name": "Test User"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_register_rejects_bad_email() {
    let (server, _db) = create_test_server().await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "email": "not-an-email",
            "password": "password123",
            "name": "Test User"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
}

// ============================================================================
// Login Tests
// ============================================================================

#[tokio::test]
async fn test_login_success_sets_scoped_cookie() {
    let (server, _db) = create_test_server().await;
    register_user(&server, "dev@example.com", "password123").await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({
            "email": "dev@example.com",
            "password": "password123"
        }))
        .await;

    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body["data"]["access_token"].is_string());
    assert_eq!(body["data"]["expires_in"], 900);

    let cookie = response.cookie(REFRESH_COOKIE);
    assert!(!cookie.value().is_empty());
    assert_eq!(cookie.path(), Some(REFRESH_COOKIE_PATH));
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.max_age().map(|d| d.whole_days()), Some(7));
}

#[tokio::test]
async fn test_login_wrong_password_is_generic() {
    let (server, _db) = create_test_server().await;
    register_user(&server, "dev@example.com", "password123").await;

    let wrong_password = server
        .post("/api/auth/login")
        .json(&json!({
            "email": "dev@example.com",
            "password": "nope nope nope"
        }))
        .await;
    wrong_password.assert_status(axum::http::StatusCode::UNAUTHORIZED);

    let unknown_email = server
        .post("/api/auth/login")
        .json(&json!({
            "email": "nobody@example.com",
            "password": "password123"
        }))
        .await;
    unknown_email.assert_status(axum::http::StatusCode::UNAUTHORIZED);

    // Identical bodies: no account enumeration
    let a: Value = wrong_password.json();
    let b: Value = unknown_email.json();
    assert_eq!(a["error"]["message"], b["error"]["message"]);
}

// ============================================================================
// Lockout Tests
// ============================================================================

#[tokio::test]
async fn test_lockout_scenario_end_to_end() {
    let (server, db) = create_test_server().await;
    register_user(&server, "dev@example.com", "password123").await;

    for _ in 0..5 {
        server
            .post("/api/auth/login")
            .json(&json!({
                "email": "dev@example.com",
                "password": "wrong password"
            }))
            .await
            .assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    // Sixth attempt, correct password: locked
    let locked = server
        .post("/api/auth/login")
        .json(&json!({
            "email": "dev@example.com",
            "password": "password123"
        }))
        .await;
    locked.assert_status(axum::http::StatusCode::FORBIDDEN);
    let body: Value = locked.json();
    assert_eq!(body["error"]["code"], "ACCOUNT_LOCKED");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("locked until"));

    // Simulate the lock window elapsing
    let repo = UserRepository::new(db.pool());
    let cred = repo
        .get_credential_by_email("dev@example.com")
        .await
        .unwrap()
        .unwrap();
    repo.set_lock_until(cred.id, Some(Utc::now() - Duration::minutes(1)))
        .await
        .unwrap();

    let response = server
        .post("/api/auth/login")
        .json(&json!({
            "email": "dev@example.com",
            "password": "password123"
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body["data"]["access_token"].is_string());
    let cookie = response.cookie(REFRESH_COOKIE);
    assert_eq!(cookie.max_age().map(|d| d.whole_days()), Some(7));
}

// ============================================================================
// Refresh Tests
// ============================================================================

#[tokio::test]
async fn test_refresh_returns_new_access_token() {
    let (server, _db) = create_test_server().await;
    register_user(&server, "dev@example.com", "password123").await;

    // Cookie jar now carries the refresh token from registration
    let response = server.post("/api/auth/refresh").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body["data"]["access_token"].is_string());
    assert_eq!(body["data"]["expires_in"], 900);
}

#[tokio::test]
async fn test_refresh_without_cookie_fails() {
    let (server, _db) = create_test_server().await;

    let response = server.post("/api/auth/refresh").await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_with_garbage_cookie_fails() {
    let (server, _db) = create_test_server().await;

    let response = server
        .post("/api/auth/refresh")
        .add_cookie(Cookie::new(REFRESH_COOKIE, "junk.junk.junk"))
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_stale_refresh_cookie_rejected_after_new_login() {
    let (server, _db) = create_test_server().await;
    register_user(&server, "dev@example.com", "password123").await;

    let first_login = server
        .post("/api/auth/login")
        .json(&json!({
            "email": "dev@example.com",
            "password": "password123"
        }))
        .await;
    let r1 = first_login.cookie(REFRESH_COOKIE).value().to_string();

    // Second login rotates the stored refresh token
    server
        .post("/api/auth/login")
        .json(&json!({
            "email": "dev@example.com",
            "password": "password123"
        }))
        .await
        .assert_status_ok();

    let response = server
        .post("/api/auth/refresh")
        .add_cookie(Cookie::new(REFRESH_COOKIE, r1))
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Logout Tests
// ============================================================================

#[tokio::test]
async fn test_logout_expires_cookie_and_invalidates_token() {
    let (server, _db) = create_test_server().await;
    let body = register_user(&server, "dev@example.com", "password123").await;
    let access_token = body["data"]["access_token"].as_str().unwrap().to_string();

    let login = server
        .post("/api/auth/login")
        .json(&json!({
            "email": "dev@example.com",
            "password": "password123"
        }))
        .await;
    let r1 = login.cookie(REFRESH_COOKIE).value().to_string();

    let logout = server
        .post("/api/auth/logout")
        .add_header(AUTHORIZATION, format!("Bearer {access_token}"))
        .await;
    logout.assert_status_ok();

    // Cookie overwritten with an already-expired one
    let cleared = logout.cookie(REFRESH_COOKIE);
    assert!(cleared.value().is_empty());

    // The captured token no longer refreshes, even though its
    // signature is still valid
    let response = server
        .post("/api/auth/refresh")
        .add_cookie(Cookie::new(REFRESH_COOKIE, r1))
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_requires_access_token() {
    let (server, _db) = create_test_server().await;

    let response = server.post("/api/auth/logout").await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Me / Protected Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_me_returns_current_user() {
    let (server, _db) = create_test_server().await;
    let body = register_user(&server, "dev@example.com", "password123").await;
    let access_token = body["data"]["access_token"].as_str().unwrap();

    let response = server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, format!("Bearer {access_token}"))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["data"]["email"], "dev@example.com");
    assert_eq!(body["data"]["name"], "Test User");
    // The credential fields never leak through the public projection
    assert!(body["data"]["password"].is_null());
    assert!(body["data"]["refresh_token"].is_null());
}

#[tokio::test]
async fn test_me_without_token_fails() {
    let (server, _db) = create_test_server().await;

    let response = server.get("/api/auth/me").await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_rejected_as_access_token() {
    let (server, _db) = create_test_server().await;
    register_user(&server, "dev@example.com", "password123").await;

    let login = server
        .post("/api/auth/login")
        .json(&json!({
            "email": "dev@example.com",
            "password": "password123"
        }))
        .await;
    let refresh_token = login.cookie(REFRESH_COOKIE).value().to_string();

    let response = server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, format!("Bearer {refresh_token}"))
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let (server, _db) = create_test_server().await;

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}
