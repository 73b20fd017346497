//! CLI command implementations.

pub mod catalog;
pub mod seed;

use secrecy::SecretString;
use stylefinder_storefront::config::SupabaseConfig;
use stylefinder_storefront::supabase::SupabaseClient;

/// Read the Supabase settings. The CLI never caches catalog reads.
fn load_config() -> Result<SupabaseConfig, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let mut config = SupabaseConfig::from_lookup(&|key: &str| std::env::var(key).ok())?;
    config.catalog_cache_ttl = std::time::Duration::ZERO;
    Ok(config)
}

fn client(config: &SupabaseConfig) -> Result<SupabaseClient, Box<dyn std::error::Error>> {
    let missing = config.missing_vars();
    if !missing.is_empty() {
        return Err(format!("{} not set", missing.join(", ")).into());
    }
    Ok(SupabaseClient::new(config))
}

/// Client authenticated with the anonymous key.
fn anon_client() -> Result<SupabaseClient, Box<dyn std::error::Error>> {
    client(&load_config()?)
}

/// Client authenticated with the service role key, for catalog writes.
fn service_client() -> Result<SupabaseClient, Box<dyn std::error::Error>> {
    let mut config = load_config()?;
    let service_key = std::env::var("SUPABASE_SERVICE_ROLE_KEY")
        .map(SecretString::from)
        .map_err(|_| "SUPABASE_SERVICE_ROLE_KEY not set")?;
    config.api_key = Some(service_key);
    client(&config)
}
