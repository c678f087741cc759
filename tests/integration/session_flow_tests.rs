// ========================================
// tests/integration/session_flow_tests.rs
// ========================================
//! Authenticated requests, refresh, logout and account updates
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use elearn_backend_lib::auth::TokenService;
use elearn_backend_lib::error::TokenKind;
use elearn_backend_lib::storage::UserStore;
use serde_json::json;

use crate::test_utils::{test_settings, TestApp};

#[tokio::test]
async fn test_me_requires_access_cookie() {
    let app = TestApp::new();
    let (access, _) = app.logged_in("a@x.com", "p1").await;

    let me = app.get("/me", &[("access_token", access.as_str())]).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["success"], true);
    assert_eq!(me.body["user"]["email"], "a@x.com");

    let anonymous = app.get("/me", &[]).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.error_code(), "TOKEN_003");

    let garbage = app.get("/me", &[("access_token", "garbage")]).await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.error_code(), "TOKEN_004");
}

#[tokio::test]
async fn test_expired_access_token() {
    let app = TestApp::new();
    app.logged_in("a@x.com", "p1").await;
    let user = app.store.find_by_email("a@x.com").await.unwrap().unwrap();

    let tokens = TokenService::new(&test_settings().tokens);
    let expired = tokens
        .issue_session_token(
            TokenKind::Access,
            &user.id.to_string(),
            Utc::now() - Duration::minutes(10),
        )
        .unwrap();

    let me = app.get("/me", &[("access_token", expired.as_str())]).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
    assert_eq!(me.error_code(), "TOKEN_004");
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new();
    let (access, refresh) = app.logged_in("a@x.com", "p1").await;

    let logout = app.get("/logout", &[("access_token", access.as_str())]).await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.body["message"], "Logged out successfully");
    for name in ["access_token", "refresh_token"] {
        let cookie = logout.set_cookie(name).unwrap();
        assert!(cookie.contains("Max-Age=0"), "{cookie}");
        assert_eq!(logout.cookie(name).as_deref(), Some(""));
    }

    // The access token still verifies but the session is gone
    let me = app.get("/me", &[("access_token", access.as_str())]).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
    assert_eq!(me.error_code(), "SESSION_001");

    let refreshed = app.get("/refresh-token", &[("refresh_token", refresh.as_str())]).await;
    assert_eq!(refreshed.status, StatusCode::FORBIDDEN);
    assert_eq!(refreshed.error_code(), "SESSION_002");
}

#[tokio::test]
async fn test_refresh_rotates_both_tokens() {
    let app = TestApp::new();
    let (access, refresh) = app.logged_in("a@x.com", "p1").await;

    let refreshed = app.get("/refresh-token", &[("refresh_token", refresh.as_str())]).await;
    assert_eq!(refreshed.status, StatusCode::OK);
    assert_eq!(refreshed.body["status"], "success");

    let new_access = refreshed.cookie("access_token").unwrap();
    let new_refresh = refreshed.cookie("refresh_token").unwrap();
    assert_ne!(new_access, access);
    assert_ne!(new_refresh, refresh);
    assert_eq!(refreshed.body["accessToken"].as_str(), Some(new_access.as_str()));

    let me = app.get("/me", &[("access_token", new_access.as_str())]).await;
    assert_eq!(me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_errors() {
    let app = TestApp::new();
    let (access, _) = app.logged_in("a@x.com", "p1").await;

    let missing = app.get("/refresh-token", &[]).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.error_code(), "TOKEN_003");

    // An access token is signed with a different secret
    let wrong_kind = app.get("/refresh-token", &[("refresh_token", access.as_str())]).await;
    assert_eq!(wrong_kind.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_kind.error_code(), "TOKEN_001");
}

#[tokio::test]
async fn test_update_user() {
    let app = TestApp::new();
    app.register("b", "b@x.com", "p2").await;
    let (access, _) = app.logged_in("a@x.com", "p1").await;
    let cookies = [("access_token", access.as_str())];

    let taken = app
        .put("/update-user", json!({ "email": "b@x.com" }), &cookies)
        .await;
    assert_eq!(taken.status, StatusCode::CONFLICT);
    assert_eq!(taken.error_code(), "USER_001");

    let updated = app
        .put(
            "/update-user",
            json!({ "username": "alice", "email": "alice@x.com" }),
            &cookies,
        )
        .await;
    assert_eq!(updated.status, StatusCode::CREATED);
    assert_eq!(updated.body["user"]["username"], "alice");

    // The session snapshot follows the store
    let me = app.get("/me", &cookies).await;
    assert_eq!(me.body["user"]["email"], "alice@x.com");
    assert_eq!(app.login("alice@x.com", "p1").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::new();
    let (access, _) = app.logged_in("a@x.com", "p1").await;
    let cookies = [("access_token", access.as_str())];

    let wrong = app
        .put(
            "/change-password",
            json!({ "oldPassword": "nope", "newPassword": "p2" }),
            &cookies,
        )
        .await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong.error_code(), "AUTH_003");
    assert_eq!(app.login("a@x.com", "p1").await.status, StatusCode::OK);

    let blank = app.put("/change-password", json!({}), &cookies).await;
    assert_eq!(blank.error_code(), "AUTH_001");

    let changed = app
        .put(
            "/change-password",
            json!({ "oldPassword": "p1", "newPassword": "p2" }),
            &cookies,
        )
        .await;
    assert_eq!(changed.status, StatusCode::CREATED);
    assert_eq!(changed.body["success"], true);

    assert_eq!(app.login("a@x.com", "p2").await.status, StatusCode::OK);
    assert_eq!(
        app.login("a@x.com", "p1").await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_account_routes_need_a_session() {
    let app = TestApp::new();

    let update = app.put("/update-user", json!({ "username": "x" }), &[]).await;
    assert_eq!(update.error_code(), "TOKEN_003");

    let change = app
        .put(
            "/change-password",
            json!({ "oldPassword": "a", "newPassword": "b" }),
            &[],
        )
        .await;
    assert_eq!(change.error_code(), "TOKEN_003");

    let logout = app.get("/logout", &[]).await;
    assert_eq!(logout.error_code(), "TOKEN_003");
}
