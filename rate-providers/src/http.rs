//! Shared HTTP plumbing for upstream rate APIs.

use std::collections::HashMap;
use std::time::Duration;

use converter_types::{CurrencyCode, ProviderError};
use serde::de::DeserializeOwned;

/// Translates an upstream error body into a message, if it recognises one.
pub(crate) type ErrorTranslator = fn(&str) -> Option<String>;

/// A reqwest client bound to one provider's timeout.
#[derive(Debug, Clone)]
pub(crate) struct HttpFetcher {
    client: reqwest::Client,
    provider: &'static str,
}

impl HttpFetcher {
    pub(crate) fn new(provider: &'static str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, provider })
    }

    /// GETs `url` and decodes the JSON body.
    ///
    /// Credentials belong in `query` so they never appear in logged URLs.
    /// Non-2xx bodies go through `translate`; unrecognised ones become
    /// [`ProviderError::Http`].
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        translate: ErrorTranslator,
    ) -> Result<T, ProviderError> {
        tracing::debug!(provider = self.provider, url, "Requesting rates");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(normalise)?;

        let status = response.status();
        let body = response.text().await.map_err(normalise)?;

        if !status.is_success() {
            tracing::warn!(
                provider = self.provider,
                status = status.as_u16(),
                "Upstream returned an error status"
            );
            return Err(match translate(&body) {
                Some(message) => ProviderError::Upstream(message),
                None => ProviderError::Http {
                    status: status.as_u16(),
                },
            });
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::MalformedResponse(e.to_string()))
    }
}

fn normalise(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        // Drop the URL: it may carry a credential in the query string.
        ProviderError::Request(err.without_url().to_string())
    }
}

/// Keeps only the requested targets from an upstream rate map.
pub(crate) fn select_targets(
    rates: HashMap<String, f64>,
    targets: &[CurrencyCode],
) -> HashMap<CurrencyCode, f64> {
    rates
        .into_iter()
        .filter_map(|(code, rate)| {
            let code = CurrencyCode::new(&code).ok()?;
            targets.contains(&code).then_some((code, rate))
        })
        .collect()
}

pub(crate) fn join_codes(codes: &[CurrencyCode]) -> String {
    codes
        .iter()
        .map(CurrencyCode::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(c: &str) -> CurrencyCode {
        CurrencyCode::new(c).unwrap()
    }

    #[test]
    fn test_select_targets_filters() {
        let raw = HashMap::from([
            ("EUR".to_string(), 0.85),
            ("GBP".to_string(), 0.73),
            ("JPY".to_string(), 149.2),
        ]);
        let picked = select_targets(raw, &[code("EUR"), code("JPY")]);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked.get(&code("EUR")), Some(&0.85));
        assert!(!picked.contains_key(&code("GBP")));
    }

    #[test]
    fn test_select_targets_skips_odd_keys() {
        let raw = HashMap::from([("BTC2".to_string(), 1.0), ("EUR".to_string(), 0.9)]);
        let picked = select_targets(raw, &[code("EUR")]);
        assert_eq!(picked.len(), 1);
    }

    #[test]
    fn test_join_codes() {
        assert_eq!(join_codes(&[code("EUR"), code("GBP")]), "EUR,GBP");
    }
}
