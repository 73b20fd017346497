//! Integration tests for the health checks and shared middleware.

use axum::http::StatusCode;

use stylefinder_integration_tests::TestApp;

#[tokio::test]
async fn test_liveness_is_always_ok() {
    let mut app = TestApp::unconfigured().await;

    let response = app.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_requires_supabase_settings() {
    let mut unconfigured = TestApp::unconfigured().await;
    let response = unconfigured.get("/health/ready").await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);

    let mut configured = TestApp::start().await;
    let response = configured.get("/health/ready").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unconfigured_home_still_renders() {
    let mut app = TestApp::unconfigured().await;

    let response = app.get("/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("The store is not configured yet"));
}

#[tokio::test]
async fn test_unknown_path_renders_not_found_page() {
    let mut app = TestApp::start().await;

    let response = app.get("/no/such/page").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.contains("Page not found"));
}
