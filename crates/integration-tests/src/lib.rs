//! Integration tests for StyleFinder.
//!
//! Each test drives the full storefront router (sessions, rate limiting,
//! templates) in process, with a `wiremock` server standing in for the
//! Supabase project. No network access or database is needed:
//!
//! ```bash
//! cargo test -p stylefinder-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog` - Home page, category filter and detail pages
//! - `auth` - Login, registration and logout
//! - `cart` - Cart page and cart forms
//! - `favorites` - Favorites page and toggles
//! - `profile` - Profile page and view history
//! - `health` - Liveness and readiness checks

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stylefinder_storefront::config::StorefrontConfig;
use stylefinder_storefront::state::AppState;

pub const ANON_KEY: &str = "anon-key";
pub const USER_TOKEN: &str = "user-token";
pub const USER_ID: &str = "8f14e45f-ceea-467f-a0e6-7f8b2d2b9c11";
pub const USER_EMAIL: &str = "mia@example.com";

/// Client address sent on every form post; the auth forms are rate limited
/// per client IP.
const CLIENT_IP: &str = "203.0.113.7";

/// Response body limit for tests.
const BODY_LIMIT: usize = 1024 * 1024;

/// A storefront wired to a mock Supabase project, with a cookie jar of one.
pub struct TestApp {
    pub supabase: MockServer,
    router: Router,
    cookie: Option<String>,
}

/// What a test needs from a response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestApp {
    /// Storefront pointed at a fresh mock Supabase server.
    pub async fn start() -> Self {
        let supabase = MockServer::start().await;
        let url = supabase.uri();
        let config = StorefrontConfig::from_lookup(|key| match key {
            "SUPABASE_URL" => Some(url.clone()),
            "SUPABASE_ANON_KEY" => Some(ANON_KEY.to_string()),
            "CATALOG_CACHE_TTL_SECS" => Some("0".to_string()),
            _ => None,
        })
        .unwrap();

        Self::with_config(supabase, config)
    }

    /// Storefront started without any Supabase settings.
    pub async fn unconfigured() -> Self {
        let supabase = MockServer::start().await;
        let config = StorefrontConfig::from_lookup(|_| None).unwrap();
        Self::with_config(supabase, config)
    }

    fn with_config(supabase: MockServer, config: StorefrontConfig) -> Self {
        let router = stylefinder_storefront::app(AppState::new(config));
        Self {
            supabase,
            router,
            cookie: None,
        }
    }

    /// Whether the jar holds a session cookie.
    #[must_use]
    pub const fn has_session(&self) -> bool {
        self.cookie.is_some()
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = self.request(Method::GET, uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = self
            .request(Method::POST, uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("x-forwarded-for", CLIENT_IP)
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Sign in as the test shopper through the login form.
    pub async fn sign_in(&mut self) {
        mock_sign_in(&self.supabase).await;
        let response = self
            .post_form(
                "/auth/login",
                &[("email", USER_EMAIL), ("password", "secret-password")],
            )
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);
        assert!(self.has_session());
    }

    fn request(&self, method: Method, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            self.store_cookie(set_cookie);
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = axum::body::to_bytes(response.into_body(), BODY_LIMIT)
            .await
            .unwrap();

        TestResponse {
            status,
            location,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    fn store_cookie(&mut self, set_cookie: &str) {
        let pair = set_cookie.split(';').next().unwrap_or_default().trim();
        let removed = set_cookie.contains("Max-Age=0") || pair.ends_with('=');
        self.cookie = (!removed).then(|| pair.to_string());
    }
}

// =============================================================================
// Supabase fixtures
// =============================================================================

/// A `clothes` row.
#[must_use]
pub fn cloth(id: i64, name: &str, price: f64, category: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "price": price,
        "category": category,
        "description": format!("{name} for everyday wear"),
        "sizes": "S,M,L",
        "colors": "black,white",
        "season": "All seasons",
        "material": "Cotton",
        "created_at": "2024-06-01T10:00:00Z"
    })
}

/// The session GoTrue returns for a password sign-in.
#[must_use]
pub fn auth_session() -> Value {
    json!({
        "access_token": USER_TOKEN,
        "refresh_token": "refresh-token",
        "expires_in": 3600,
        "token_type": "bearer",
        "user": {
            "id": USER_ID,
            "email": USER_EMAIL,
            "user_metadata": {"username": "mia"}
        }
    })
}

/// Serve `clothes` for the unfiltered catalog query.
pub async fn mock_catalog(server: &MockServer, clothes: Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/clothes"))
        .and(query_param("order", "created_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(clothes))
        .mount(server)
        .await;
}

/// Serve an empty view log for the popular picks.
pub async fn mock_no_popular(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/recommendations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

/// Accept the test shopper's password.
pub async fn mock_sign_in(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_session()))
        .mount(server)
        .await;
}
