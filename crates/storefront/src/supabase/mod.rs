//! Supabase REST and auth client.
//!
//! # Architecture
//!
//! - PostgREST (`{url}/rest/v1`) for table reads and writes
//! - GoTrue (`{url}/auth/v1`) for sign in, sign up, sign out and sessions
//! - Supabase is the source of truth: every page reads it directly, only
//!   catalog reads are cached (moka, `CATALOG_CACHE_TTL_SECS`)
//!
//! Signed-in calls pass the user's access token so row-level security
//! applies; anonymous calls use the anon key as the bearer token.
//!
//! # Example
//!
//! ```rust,ignore
//! use stylefinder_storefront::supabase::SupabaseClient;
//!
//! let client = SupabaseClient::new(&config.supabase);
//!
//! let clothes = client.get_clothes_by_category(&Category::Women).await?;
//! let session = client.sign_in(&email, "password").await?;
//! let cart = client.get_user_cart(&session.user.id, &session.access_token).await?;
//! ```

pub mod auth;
mod cache;
mod cart;
mod clothes;
mod favorites;
mod query;
mod recommendations;
mod users;

pub use auth::{AuthSession, AuthUser, SignUpOutcome, UserMetadata};
pub use query::QueryBuilder;
pub use recommendations::distinct_clothes;

use std::sync::Arc;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::config::SupabaseConfig;

use cache::{CacheKey, CacheValue};

/// Errors that can occur when talking to Supabase.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// `SUPABASE_URL` or `SUPABASE_ANON_KEY` is missing.
    #[error("Supabase is not configured")]
    NotConfigured,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Token missing, expired or rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by Supabase.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Update or delete without any row filter.
    #[error("Refusing to {0} without a filter")]
    MissingFilter(&'static str),

    /// Cart quantities start at one.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),

    /// Any other non-success response.
    #[error("Supabase API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl SupabaseError {
    /// Message suitable for showing to the shopper.
    ///
    /// Only backend-provided messages are passed through; transport and
    /// parsing failures are replaced by a generic text.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } | Self::Unauthorized(message) => message.clone(),
            Self::RateLimited(_) => "Too many requests, please try again shortly".to_string(),
            Self::NotConfigured => "The store is not configured yet".to_string(),
            Self::NotFound(_) => "Not found".to_string(),
            Self::InvalidQuantity(_) => "Quantity must be at least 1".to_string(),
            Self::Http(_) | Self::Url(_) | Self::Parse(_) | Self::MissingFilter(_) => {
                "Something went wrong, please try again".to_string()
            }
        }
    }
}

/// Tables the storefront reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Clothes,
    Cart,
    Favorites,
    Recommendations,
    Profiles,
}

impl Table {
    /// Table name as exposed by PostgREST.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clothes => "clothes",
            Self::Cart => "cart",
            Self::Favorites => "favorites",
            Self::Recommendations => "recommendations",
            Self::Profiles => "profiles",
        }
    }
}

// =============================================================================
// SupabaseClient
// =============================================================================

/// Client for a Supabase project.
///
/// Cheap to clone. When the project is not configured the client still
/// exists and every call fails with [`SupabaseError::NotConfigured`].
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    endpoints: Option<Endpoints>,
    cache: Option<Cache<CacheKey, CacheValue>>,
}

struct Endpoints {
    rest: String,
    auth: String,
    api_key: SecretString,
}

impl SupabaseClient {
    /// Create a new Supabase client.
    ///
    /// Missing settings are logged, not fatal.
    #[must_use]
    pub fn new(config: &SupabaseConfig) -> Self {
        let endpoints = match (&config.url, &config.api_key) {
            (Some(url), Some(api_key)) => {
                let base = url.as_str().trim_end_matches('/');
                Some(Endpoints {
                    rest: format!("{base}/rest/v1"),
                    auth: format!("{base}/auth/v1"),
                    api_key: api_key.clone(),
                })
            }
            _ => {
                tracing::error!(
                    missing = ?config.missing_vars(),
                    "Supabase is not configured; data calls will fail"
                );
                None
            }
        };

        let cache = (!config.catalog_cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(config.catalog_cache_ttl)
                .build()
        });

        Self {
            inner: Arc::new(SupabaseClientInner {
                client: reqwest::Client::new(),
                endpoints,
                cache,
            }),
        }
    }

    /// Whether the project URL and key are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.inner.endpoints.is_some()
    }

    /// Start a PostgREST request against `table`.
    #[must_use]
    pub fn from(&self, table: Table) -> QueryBuilder {
        QueryBuilder::new(self.clone(), table)
    }

    fn endpoints(&self) -> Result<&Endpoints, SupabaseError> {
        self.inner
            .endpoints
            .as_ref()
            .ok_or(SupabaseError::NotConfigured)
    }

    /// Build a request carrying `apikey` and a bearer token.
    ///
    /// The bearer is the user's access token when given, else the anon key.
    fn request(
        &self,
        method: reqwest::Method,
        url: url::Url,
        access_token: Option<&str>,
    ) -> Result<reqwest::RequestBuilder, SupabaseError> {
        let endpoints = self.endpoints()?;
        let api_key = endpoints.api_key.expose_secret();
        let bearer = access_token.unwrap_or(api_key);

        Ok(self
            .inner
            .client
            .request(method, url)
            .header("apikey", api_key)
            .bearer_auth(bearer))
    }

    // =========================================================================
    // Catalog cache
    // =========================================================================

    async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        let cache = self.inner.cache.as_ref()?;
        let value = cache.get(key).await;
        if value.is_some() {
            tracing::debug!(?key, "Cache hit");
        }
        value
    }

    async fn remember(&self, key: CacheKey, value: CacheValue) {
        if let Some(cache) = &self.inner.cache {
            cache.insert(key, value).await;
        }
    }
}

/// Turn a non-success response into a [`SupabaseError`].
async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, SupabaseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1);
        return Err(SupabaseError::RateLimited(retry_after));
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| status.to_string());

    tracing::debug!(
        status = %status,
        body = %body.chars().take(500).collect::<String>(),
        "Supabase returned non-success status"
    );

    Err(match status {
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            SupabaseError::Unauthorized(message)
        }
        // PostgREST answers a single-object request that matched no rows with 406
        reqwest::StatusCode::NOT_ACCEPTABLE | reqwest::StatusCode::NOT_FOUND => {
            SupabaseError::NotFound(message)
        }
        _ => SupabaseError::Api {
            status: status.as_u16(),
            message,
        },
    })
}

/// Pull the human-readable message out of a GoTrue or PostgREST error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(String::from)
}

/// Read a JSON body, logging the raw text when it does not parse.
async fn parse_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, SupabaseError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %text.chars().take(500).collect::<String>(),
            "Failed to parse Supabase response"
        );
        SupabaseError::Parse(e)
    })
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::test_support::*;
    use super::*;

    #[test]
    fn test_error_message_priority() {
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            Some("Invalid login credentials".to_string())
        );
        assert_eq!(
            error_message(r#"{"code":"23505","message":"duplicate key value","details":null}"#),
            Some("duplicate key value".to_string())
        );
        assert_eq!(
            error_message(r#"{"msg":"User already registered","code":422}"#),
            Some("User already registered".to_string())
        );
        assert_eq!(error_message("<html>bad gateway</html>"), None);
        assert_eq!(error_message(r#"{"message":"  "}"#), None);
    }

    #[tokio::test]
    async fn test_unconfigured_client_fails_without_network() {
        let config = SupabaseConfig::from_lookup(&|_: &str| None).unwrap();
        let client = SupabaseClient::new(&config);
        assert!(!client.is_configured());

        let result = client.get_all_clothes().await;
        assert!(matches!(result, Err(SupabaseError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/clothes"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/cart"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "JWT expired"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/favorites"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client(&server);

        let err = client.from(Table::Clothes).fetch::<serde_json::Value>().await;
        assert!(matches!(err, Err(SupabaseError::RateLimited(7))));

        let err = client.from(Table::Cart).fetch::<serde_json::Value>().await;
        match err {
            Err(SupabaseError::Unauthorized(message)) => assert_eq!(message, "JWT expired"),
            other => panic!("expected Unauthorized, got {other:?}"),
        }

        let err = client.from(Table::Favorites).fetch::<serde_json::Value>().await;
        match err {
            Err(SupabaseError::Api { status, .. }) => assert_eq!(status, 500),
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn test_user_message_hides_internal_errors() {
        let err = SupabaseError::Parse(serde_json::from_str::<u8>("x").unwrap_err());
        assert_eq!(err.user_message(), "Something went wrong, please try again");

        let err = SupabaseError::Api {
            status: 400,
            message: "Invalid login credentials".to_string(),
        };
        assert_eq!(err.user_message(), "Invalid login credentials");
    }

    #[test]
    fn test_cache_disabled_with_zero_ttl() {
        let url = url::Url::parse("https://demo.supabase.co").unwrap();
        let config = SupabaseConfig::new(url, SecretString::from("k"), Duration::ZERO);
        let client = SupabaseClient::new(&config);
        assert!(client.inner.cache.is_none());
        assert!(client.is_configured());
    }
}
