//! Configuration loading from environment.

use std::env;

use rate_providers::{ProviderSettings, ProvidersConfig};

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub redis_url: Option<String>,
    pub cache_ttl_secs: u64,
    pub rate_limit_per_minute: u32,
    pub providers: ProvidersConfig,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = parse_or(&get, "PORT", 3000)?;

        let database_url = get("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let defaults = ProvidersConfig::default();
        let providers = ProvidersConfig {
            exchangerates: provider(&get, "EXCHANGERATES", defaults.exchangerates)?,
            currencyapi: provider(&get, "CURRENCYAPI", defaults.currencyapi)?,
            fixer: provider(&get, "FIXER", defaults.fixer)?,
            static_table: provider(&get, "STATIC", defaults.static_table)?,
        };

        Ok(Self {
            port,
            database_url,
            redis_url: get("REDIS_URL"),
            cache_ttl_secs: parse_or(&get, "CACHE_TTL", 300)?,
            rate_limit_per_minute: parse_or(&get, "RATE_LIMIT_PER_MINUTE", 100)?,
            providers,
        })
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{key}: invalid value {raw:?}: {e}")),
        None => Ok(default),
    }
}

fn provider(
    get: &impl Fn(&str) -> Option<String>,
    prefix: &str,
    defaults: ProviderSettings,
) -> anyhow::Result<ProviderSettings> {
    let enabled = get(&format!("{prefix}_ENABLED"))
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(defaults.enabled);
    let priority = parse_or(get, &format!("{prefix}_PRIORITY"), defaults.priority)?;
    let base_url = get(&format!("{prefix}_BASE_URL")).unwrap_or(defaults.base_url);

    let mut settings = ProviderSettings::new(enabled, priority, base_url);
    settings.timeout = defaults.timeout;
    if let Some(key) = get(&format!("{prefix}_API_KEY")) {
        settings = settings.with_api_key(key);
    }
    Ok(settings)
}
