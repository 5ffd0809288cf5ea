mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, TestApp};
use serde_json::json;

#[tokio::test]
async fn signup_returns_user_and_token() {
    let app = TestApp::spawn().await;

    let response = app
        .request(
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({ "email": "ada@example.com", "password": "secret1", "name": "Ada" })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["user"]["email"], json!("ada@example.com"));
    assert_eq!(body["user"]["name"], json!("Ada"));
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    // The stored hash must never appear on the wire.
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn signup_defaults_name_to_email_local_part() {
    let app = TestApp::spawn().await;

    let response = app
        .request(
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({ "email": "grace@example.com", "password": "secret1" })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["user"]["name"], json!("grace"));
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = TestApp::spawn().await;
    app.signup("dup@example.com", "secret1").await;

    let response = app
        .request(
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({ "email": "dup@example.com", "password": "other-pass" })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Email already in use"));
}

#[tokio::test]
async fn invalid_signup_payloads_are_rejected() {
    let app = TestApp::spawn().await;

    let bad_email = app
        .request(
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({ "email": "not-an-email", "password": "secret1" })),
        )
        .await;
    assert_eq!(bad_email.status(), StatusCode::BAD_REQUEST);

    let short_password = app
        .request(
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({ "email": "ok@example.com", "password": "short" })),
        )
        .await;
    assert_eq!(short_password.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_rejects_bad_credentials_with_uniform_message() {
    let app = TestApp::spawn().await;
    app.signup("kay@example.com", "secret1").await;

    let unknown_email = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "secret1" })),
        )
        .await;
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    let unknown_body = body_json(unknown_email).await;

    let wrong_password = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "kay@example.com", "password": "wrong-pass" })),
        )
        .await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_body = body_json(wrong_password).await;

    // Indistinguishable responses: no account enumeration through the error.
    assert_eq!(unknown_body["error"], wrong_body["error"]);
    assert_eq!(unknown_body["error"], json!("Invalid email or password"));
}

#[tokio::test]
async fn login_returns_a_working_session_token() {
    let app = TestApp::spawn().await;
    app.signup("lin@example.com", "secret1").await;

    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "lin@example.com", "password": "secret1" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let token = body["token"].as_str().expect("token").to_string();

    let me = app
        .request(Method::GET, "/api/auth/me", Some(&token), None)
        .await;
    assert_eq!(me.status(), StatusCode::OK);
    let me_body = body_json(me).await;
    assert_eq!(me_body["user"]["email"], json!("lin@example.com"));
}

#[tokio::test]
async fn protected_routes_reject_missing_or_garbage_tokens() {
    let app = TestApp::spawn().await;

    let missing = app.request(Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let garbage = app
        .request(Method::GET, "/api/auth/me", Some("not.a.jwt"), None)
        .await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_can_be_read_and_updated() {
    let app = TestApp::spawn().await;
    let (token, _) = app.signup("maya@example.com", "secret1").await;

    let updated = app
        .request(
            Method::PUT,
            "/api/user/profile",
            Some(&token),
            Some(json!({ "name": "Maya L", "email": "maya.l@example.com" })),
        )
        .await;
    assert_eq!(updated.status(), StatusCode::OK);
    let body = body_json(updated).await;
    assert_eq!(body["user"]["name"], json!("Maya L"));
    assert_eq!(body["user"]["email"], json!("maya.l@example.com"));

    let profile = app
        .request(Method::GET, "/api/user/profile", Some(&token), None)
        .await;
    assert_eq!(profile.status(), StatusCode::OK);
    let profile_body = body_json(profile).await;
    assert_eq!(profile_body["user"]["email"], json!("maya.l@example.com"));
}

#[tokio::test]
async fn profile_update_cannot_take_anothers_email() {
    let app = TestApp::spawn().await;
    app.signup("first@example.com", "secret1").await;
    let (token, _) = app.signup("second@example.com", "secret1").await;

    let response = app
        .request(
            Method::PUT,
            "/api/user/profile",
            Some(&token),
            Some(json!({ "email": "first@example.com" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn password_change_requires_the_current_password() {
    let app = TestApp::spawn().await;
    let (token, _) = app.signup("nia@example.com", "secret1").await;

    let wrong_current = app
        .request(
            Method::PUT,
            "/api/user/password",
            Some(&token),
            Some(json!({ "currentPassword": "nope", "newPassword": "next-secret" })),
        )
        .await;
    assert_eq!(wrong_current.status(), StatusCode::UNAUTHORIZED);

    let changed = app
        .request(
            Method::PUT,
            "/api/user/password",
            Some(&token),
            Some(json!({ "currentPassword": "secret1", "newPassword": "next-secret" })),
        )
        .await;
    assert_eq!(changed.status(), StatusCode::OK);

    let old_login = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "nia@example.com", "password": "secret1" })),
        )
        .await;
    assert_eq!(old_login.status(), StatusCode::UNAUTHORIZED);

    let new_login = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "nia@example.com", "password": "next-secret" })),
        )
        .await;
    assert_eq!(new_login.status(), StatusCode::OK);
}

#[tokio::test]
async fn account_deletion_removes_keys_and_revokes_access() {
    let app = TestApp::spawn().await;
    let (token, _) = app.signup("zoe@example.com", "secret1").await;
    let (_, key) = app.create_api_key(&token, json!({ "name": "cli" })).await;

    let deleted = app
        .request(Method::DELETE, "/api/user/account", Some(&token), None)
        .await;
    assert_eq!(deleted.status(), StatusCode::OK);

    let login = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "zoe@example.com", "password": "secret1" })),
        )
        .await;
    assert_eq!(login.status(), StatusCode::UNAUTHORIZED);

    // Keys issued by the deleted account no longer authenticate.
    let key_auth = app
        .request_with_api_key(Method::GET, "/api/user/data", &key)
        .await;
    assert_eq!(key_auth.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_endpoint_reports_database_status() {
    let app = TestApp::spawn().await;

    let response = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["database"], json!("up"));
}
