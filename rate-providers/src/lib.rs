//! Rate provider adapters.
//!
//! Every provider implements [`converter_types::RateProvider`] and only knows
//! how to talk to its own upstream: request shape, auth placement, response
//! normalisation and error payload translation.
//!
//! | provider | upstream | credential |
//! |---|---|---|
//! | `exchangerates` | `GET {base}/latest/{BASE}` | none |
//! | `currencyapi` | `GET {base}/latest?apikey&base_currency&currencies` | required |
//! | `fixer` | `GET {base}/latest?access_key&base&symbols` | required |
//! | `static` | in-process USD-relative table | none |

mod currencyapi;
mod exchangerates;
mod fixed;
mod fixer;
mod http;

use std::sync::Arc;
use std::time::Duration;

use converter_types::{ProviderDescriptor, ProviderError, RateProvider};

pub use currencyapi::CurrencyApiProvider;
pub use exchangerates::ExchangeRatesProvider;
pub use fixed::StaticRateProvider;
pub use fixer::FixerProvider;

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Per-provider configuration.
#[derive(Clone, PartialEq)]
pub struct ProviderSettings {
    pub enabled: bool,
    pub priority: i32,
    pub base_url: String,
    pub api_key: Option<String>,
    /// Per-request bound. `None` uses the provider's default.
    pub timeout: Option<Duration>,
}

impl ProviderSettings {
    pub fn new(enabled: bool, priority: i32, base_url: impl Into<String>) -> Self {
        Self {
            enabled,
            priority,
            base_url: base_url.into(),
            api_key: None,
            timeout: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn descriptor(&self, name: &str, requires_credential: bool) -> ProviderDescriptor {
        ProviderDescriptor::new(
            name,
            self.priority,
            self.enabled,
            self.base_url.trim_end_matches('/'),
            self.api_key.clone(),
            requires_credential,
        )
    }
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("enabled", &self.enabled)
            .field("priority", &self.priority)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Settings for every known provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvidersConfig {
    pub exchangerates: ProviderSettings,
    pub currencyapi: ProviderSettings,
    pub fixer: ProviderSettings,
    pub static_table: ProviderSettings,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            exchangerates: ProviderSettings::new(true, 1, exchangerates::DEFAULT_BASE_URL),
            currencyapi: ProviderSettings::new(true, 2, currencyapi::DEFAULT_BASE_URL),
            fixer: ProviderSettings::new(true, 3, fixer::DEFAULT_BASE_URL),
            static_table: ProviderSettings::new(false, 100, fixed::BASE_URL),
        }
    }
}

/// Builds every configured provider, active or not.
///
/// Inactive providers are still returned so their status can be registered;
/// the conversion service skips them.
pub fn build_providers(
    config: &ProvidersConfig,
) -> Result<Vec<Arc<dyn RateProvider>>, ProviderError> {
    let providers: Vec<Arc<dyn RateProvider>> = vec![
        Arc::new(ExchangeRatesProvider::new(&config.exchangerates)?),
        Arc::new(CurrencyApiProvider::new(&config.currencyapi)?),
        Arc::new(FixerProvider::new(&config.fixer)?),
        Arc::new(StaticRateProvider::new(&config.static_table)),
    ];

    for p in &providers {
        if p.is_active() {
            tracing::info!(provider = p.name(), priority = p.priority(), "Rate provider active");
        } else {
            tracing::warn!(provider = p.name(), "Rate provider disabled");
        }
    }

    Ok(providers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_priorities() {
        let config = ProvidersConfig::default();
        assert_eq!(config.exchangerates.priority, 1);
        assert_eq!(config.currencyapi.priority, 2);
        assert_eq!(config.fixer.priority, 3);
        assert!(!config.static_table.enabled);
    }

    #[test]
    fn test_keyless_defaults_activate_only_exchangerates() {
        let providers = build_providers(&ProvidersConfig::default()).unwrap();
        let active: Vec<_> = providers
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(active, vec!["exchangerates"]);
        assert_eq!(providers.len(), 4);
    }

    #[test]
    fn test_keys_activate_keyed_providers() {
        let mut config = ProvidersConfig::default();
        config.fixer = config.fixer.clone().with_api_key("f-key");
        config.currencyapi = config.currencyapi.clone().with_api_key("c-key");

        let providers = build_providers(&config).unwrap();
        assert!(providers.iter().all(|p| p.is_active() || p.name() == "static"));
    }

    #[test]
    fn test_settings_debug_hides_key() {
        let s = ProviderSettings::new(true, 1, "http://x").with_api_key("hunter2");
        assert!(!format!("{:?}", s).contains("hunter2"));
    }
}
