//! Integration tests for sign-in, registration and sign-out.

use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use stylefinder_integration_tests::{
    TestApp, USER_EMAIL, USER_ID, auth_session, mock_catalog, mock_no_popular,
};

#[tokio::test]
async fn test_login_greets_shopper_once() {
    let mut app = TestApp::start().await;
    mock_catalog(&app.supabase, json!([])).await;
    mock_no_popular(&app.supabase).await;

    app.sign_in().await;

    let home = app.get("/").await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(home.body.contains("Welcome back, mia!"));

    let again = app.get("/").await;
    assert!(!again.body.contains("Welcome back"));
}

#[tokio::test]
async fn test_bad_credentials_rerender_login_form() {
    let mut app = TestApp::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials",
            "msg": "Invalid login credentials"
        })))
        .mount(&app.supabase)
        .await;

    let response = app
        .post_form("/auth/login", &[("email", USER_EMAIL), ("password", "wrong")])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Invalid login credentials"));
    assert!(response.body.contains(USER_EMAIL));
}

#[tokio::test]
async fn test_invalid_email_never_reaches_supabase() {
    let mut app = TestApp::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&app.supabase)
        .await;

    let response = app
        .post_form("/auth/login", &[("email", "not-an-email"), ("password", "x")])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Please enter a valid email address"));
}

#[tokio::test]
async fn test_register_with_confirmation_shows_login_notice() {
    let mut app = TestApp::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .and(body_partial_json(json!({
            "email": "new@example.com",
            "data": {"username": "newbie", "style_preference": "casual"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": USER_ID,
            "email": "new@example.com",
            "user_metadata": {"username": "newbie"}
        })))
        .expect(1)
        .mount(&app.supabase)
        .await;

    let response = app
        .post_form(
            "/auth/register",
            &[
                ("email", "new@example.com"),
                ("password", "long-enough"),
                ("username", "newbie"),
                ("gender", ""),
                ("style_preference", "casual"),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Registration successful!"));
    assert!(response.body.contains("new@example.com"));
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let mut app = TestApp::start().await;

    let response = app
        .post_form(
            "/auth/register",
            &[("email", "new@example.com"), ("password", "123")],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Password must be at least 6 characters"));
}

#[tokio::test]
async fn test_register_with_session_signs_in() {
    let mut app = TestApp::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_session()))
        .mount(&app.supabase)
        .await;

    let response = app
        .post_form(
            "/auth/register",
            &[("email", USER_EMAIL), ("password", "long-enough")],
        )
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/"));
    assert!(app.has_session());
}

#[tokio::test]
async fn test_logout_revokes_and_forgets_session() {
    let mut app = TestApp::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.supabase)
        .await;
    app.sign_in().await;

    let response = app.post_form("/auth/logout", &[]).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/"));

    let cart = app.get("/cart").await;
    assert!(cart.body.contains("Please sign in to view your cart"));
}

#[tokio::test]
async fn test_profile_requires_sign_in() {
    let mut app = TestApp::start().await;

    let response = app.get("/profile").await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/auth/login"));
}
