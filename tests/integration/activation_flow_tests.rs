// ===========================================
// tests/integration/activation_flow_tests.rs
// ===========================================
//! Signup and activation over HTTP
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use elearn_backend_lib::auth::{token::PendingUser, TokenService};
use elearn_backend_lib::storage::UserStore;
use serde_json::json;

use crate::test_utils::{test_settings, TestApp};

#[tokio::test]
async fn test_signup_activate_login() {
    let app = TestApp::new();

    let signup = app.signup("a", "a@x.com", "p1").await;
    assert_eq!(signup.status, StatusCode::CREATED);
    assert_eq!(signup.body["success"], true);
    assert!(signup.body["message"].as_str().unwrap().contains("a@x.com"));
    let token = signup.body["activationToken"].as_str().unwrap().to_string();

    // Nothing is stored before confirmation
    assert!(app.store.is_empty());
    let mail = app.mailer.sent();
    assert_eq!(mail.len(), 1);
    assert_eq!(mail[0].to, "a@x.com");

    let code = app.mailer.last_code().unwrap();
    let wrong = if code == "1000" { "1001" } else { "1000" };

    let mismatch = app
        .post(
            "/activate-user",
            json!({ "activation_token": token, "activation_code": wrong }),
        )
        .await;
    assert_eq!(mismatch.status, StatusCode::BAD_REQUEST);
    assert_eq!(mismatch.error_code(), "TOKEN_002");
    assert!(app.store.is_empty());

    let activated = app
        .post(
            "/activate-user",
            json!({ "activation_token": token, "activation_code": code }),
        )
        .await;
    assert_eq!(activated.status, StatusCode::CREATED);
    assert_eq!(activated.body, json!({ "success": true }));

    let user = app.store.find_by_email("a@x.com").await.unwrap().unwrap();
    assert!(user.is_verified);
    assert_ne!(user.password_hash.as_deref(), Some("p1"));

    let login = app.login("a@x.com", "p1").await;
    assert_eq!(login.status, StatusCode::OK);
    assert!(login.cookie("access_token").is_some());
    assert!(login.cookie("refresh_token").is_some());
}

#[tokio::test]
async fn test_signup_with_taken_email() {
    let app = TestApp::new();
    app.register("a", "a@x.com", "p1").await;

    let again = app.signup("b", "A@X.com", "p2").await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.error_code(), "USER_001");
    // No second mail went out
    assert_eq!(app.mailer.sent().len(), 1);
}

#[tokio::test]
async fn test_signup_rejects_bad_input() {
    let app = TestApp::new();

    let bad_email = app.signup("a", "not-an-email", "p1").await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_email.error_code(), "VAL_001");

    let blank_name = app.signup("", "a@x.com", "p1").await;
    assert_eq!(blank_name.status, StatusCode::BAD_REQUEST);
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_expired_activation_token() {
    let app = TestApp::new();
    let tokens = TokenService::new(&test_settings().tokens);

    let ticket = tokens
        .issue_activation_token_at(
            PendingUser {
                username: "a".to_string(),
                email: "a@x.com".to_string(),
                password: "p1".to_string(),
            },
            Utc::now() - Duration::minutes(6),
        )
        .unwrap();

    let response = app
        .post(
            "/activate-user",
            json!({ "activation_token": ticket.token, "activation_code": ticket.code }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "TOKEN_001");
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_activation_token_from_other_secret() {
    let app = TestApp::new();
    let mut settings = test_settings();
    settings.tokens.activation_secret = "someone-else".to_string();
    let foreign = TokenService::new(&settings.tokens);

    let ticket = foreign
        .issue_activation_token(PendingUser {
            username: "a".to_string(),
            email: "a@x.com".to_string(),
            password: "p1".to_string(),
        })
        .unwrap();

    let response = app
        .post(
            "/activate-user",
            json!({ "activation_token": ticket.token, "activation_code": ticket.code }),
        )
        .await;
    assert_eq!(response.error_code(), "TOKEN_001");
}

#[tokio::test]
async fn test_confirming_twice_creates_one_user() {
    let app = TestApp::new();
    let signup = app.signup("a", "a@x.com", "p1").await;
    let token = signup.body["activationToken"].as_str().unwrap().to_string();
    let code = app.mailer.last_code().unwrap();
    let body = json!({ "activation_token": token, "activation_code": code });

    let first = app.post("/activate-user", body.clone()).await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = app.post("/activate-user", body).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.error_code(), "USER_001");
    assert_eq!(app.store.len(), 1);
}

#[tokio::test]
async fn test_parallel_signups_for_one_email() {
    let app = TestApp::new();
    let first = app.signup("a", "a@x.com", "p1").await;
    let first_code = app.mailer.last_code().unwrap();
    let second = app.signup("b", "a@x.com", "p2").await;
    let second_code = app.mailer.last_code().unwrap();

    let ok = app
        .post(
            "/activate-user",
            json!({
                "activation_token": first.body["activationToken"],
                "activation_code": first_code,
            }),
        )
        .await;
    assert_eq!(ok.status, StatusCode::CREATED);

    let late = app
        .post(
            "/activate-user",
            json!({
                "activation_token": second.body["activationToken"],
                "activation_code": second_code,
            }),
        )
        .await;
    assert_eq!(late.status, StatusCode::CONFLICT);
    assert_eq!(app.store.len(), 1);
}
