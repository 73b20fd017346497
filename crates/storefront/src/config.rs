//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Supabase
//! - `SUPABASE_URL` - Project URL (e.g., https://xyzcompany.supabase.co)
//! - `SUPABASE_ANON_KEY` - Anonymous (public) API key
//!
//! Missing Supabase settings are not fatal: the server starts, logs the
//! problem, and every data call fails with `SupabaseError::NotConfigured`.
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: http://localhost:3000)
//! - `CATALOG_CACHE_TTL_SECS` - Catalog cache lifetime, 0 disables (default: 60)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 60;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Supabase project settings
    pub supabase: SupabaseConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Supabase project configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project URL; `None` when `SUPABASE_URL` is unset
    pub url: Option<Url>,
    /// API key sent as `apikey`; `None` when `SUPABASE_ANON_KEY` is unset
    pub api_key: Option<SecretString>,
    /// How long catalog reads are cached; zero disables caching
    pub catalog_cache_ttl: Duration,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url.as_ref().map(Url::as_str))
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("catalog_cache_ttl", &self.catalog_cache_ttl)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = get_env_or_default(&lookup, "STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default(&lookup, "STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_env_or_default(&lookup, "STOREFRONT_BASE_URL", "http://localhost:3000");

        Ok(Self {
            host,
            port,
            base_url,
            supabase: SupabaseConfig::from_lookup(&lookup)?,
            sentry_dsn: get_optional_env(&lookup, "SENTRY_DSN"),
            sentry_environment: get_optional_env(&lookup, "SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies should be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl SupabaseConfig {
    /// Build a configuration from explicit values.
    #[must_use]
    pub fn new(url: Url, api_key: SecretString, catalog_cache_ttl: Duration) -> Self {
        Self {
            url: Some(url),
            api_key: Some(api_key),
            catalog_cache_ttl,
        }
    }

    /// Load `SUPABASE_URL`, `SUPABASE_ANON_KEY` and `CATALOG_CACHE_TTL_SECS`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL or TTL is present but malformed.
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = get_optional_env(lookup, "SUPABASE_URL")
            .map(|raw| {
                Url::parse(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar("SUPABASE_URL".to_string(), e.to_string())
                })
            })
            .transpose()?;
        let api_key = get_optional_env(lookup, "SUPABASE_ANON_KEY").map(SecretString::from);
        let ttl_secs = get_optional_env(lookup, "CATALOG_CACHE_TTL_SECS")
            .map(|raw| {
                raw.parse::<u64>().map_err(|e| {
                    ConfigError::InvalidEnvVar("CATALOG_CACHE_TTL_SECS".to_string(), e.to_string())
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_CATALOG_CACHE_TTL_SECS);

        Ok(Self {
            url,
            api_key,
            catalog_cache_ttl: Duration::from_secs(ttl_secs),
        })
    }

    /// Both the URL and the key are present.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.url.is_some() && self.api_key.is_some()
    }

    /// Names of the variables that are missing.
    #[must_use]
    pub fn missing_vars(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.url.is_none() {
            missing.push("SUPABASE_URL");
        }
        if self.api_key.is_none() {
            missing.push("SUPABASE_ANON_KEY");
        }
        missing
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional variable; blank values count as unset.
fn get_optional_env<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Get a variable with a default value.
fn get_env_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    get_optional_env(lookup, key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_any_variables() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.base_url, "http://localhost:3000");
        assert!(!config.is_secure());
        assert_eq!(config.supabase.catalog_cache_ttl, Duration::from_secs(60));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_supabase_is_not_fatal() {
        let config = load(&[("SUPABASE_URL", "  ")]).unwrap();
        assert!(!config.supabase.is_configured());
        assert_eq!(
            config.supabase.missing_vars(),
            vec!["SUPABASE_URL", "SUPABASE_ANON_KEY"]
        );
    }

    #[test]
    fn test_supabase_configured() {
        let config = load(&[
            ("SUPABASE_URL", "https://demo.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon-key-value"),
            ("CATALOG_CACHE_TTL_SECS", "0"),
        ])
        .unwrap();
        assert!(config.supabase.is_configured());
        assert!(config.supabase.missing_vars().is_empty());
        assert_eq!(
            config.supabase.api_key.as_ref().unwrap().expose_secret(),
            "anon-key-value"
        );
        assert_eq!(config.supabase.catalog_cache_ttl, Duration::ZERO);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(load(&[("STOREFRONT_PORT", "http")]).is_err());
        assert!(load(&[("STOREFRONT_HOST", "localhost")]).is_err());
        assert!(load(&[("SUPABASE_URL", "not a url")]).is_err());
        assert!(load(&[("CATALOG_CACHE_TTL_SECS", "-5")]).is_err());
    }

    #[test]
    fn test_https_base_url_is_secure() {
        let config = load(&[("STOREFRONT_BASE_URL", "https://shop.example.com")]).unwrap();
        assert!(config.is_secure());
    }

    #[test]
    fn test_supabase_config_debug_redacts_key() {
        let config = load(&[
            ("SUPABASE_URL", "https://demo.supabase.co"),
            ("SUPABASE_ANON_KEY", "super_secret_anon_key"),
        ])
        .unwrap();

        let debug_output = format!("{:?}", config.supabase);
        assert!(debug_output.contains("demo.supabase.co"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_anon_key"));
    }
}
