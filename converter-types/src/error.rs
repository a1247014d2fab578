//! Error types for the conversion service.

use crate::domain::CurrencyCode;

/// Domain-level errors (invalid input values).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrencyCode(String),

    #[error("Amount must be a positive number, got {0}")]
    InvalidAmount(String),
}

/// A single rate source failed. Recovered by trying the next provider.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("{0} API key is missing")]
    MissingCredential(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP {status}")]
    Http { status: u16 },

    /// Error payload reported by the upstream API itself.
    #[error("{0}")]
    Upstream(String),

    #[error("invalid response: {0}")]
    MalformedResponse(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("rate not available for {0}")]
    RateNotAvailable(CurrencyCode),

    #[error("invalid rate {rate} for {currency}")]
    InvalidRate { currency: CurrencyCode, rate: f64 },
}

/// Store-level errors (history and status persistence).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Fatal conversion failures: no rate could be produced by any means.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error(
        "All providers failed and no fallback available for {from}->{to}. Errors: {}{}",
        failures.join("; "),
        fallback_error.as_ref().map(|e| format!("; fallback lookup failed: {}", e)).unwrap_or_default()
    )]
    Exhausted {
        from: CurrencyCode,
        to: CurrencyCode,
        failures: Vec<String>,
        fallback_error: Option<String>,
    },

    #[error(
        "No active providers and no fallback available for {from}->{to}{}",
        fallback_error.as_ref().map(|e| format!("; fallback lookup failed: {}", e)).unwrap_or_default()
    )]
    NoActiveProviders {
        from: CurrencyCode,
        to: CurrencyCode,
        fallback_error: Option<String>,
    },
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::NotFound(what),
            StoreError::Database(e) | StoreError::Corrupt(e) => AppError::Internal(e),
        }
    }
}

impl From<ConversionError> for AppError {
    fn from(_: ConversionError) -> Self {
        // Provider diagnostics stay in the logs.
        AppError::Internal("Conversion failed".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (CurrencyCode, CurrencyCode) {
        (
            CurrencyCode::new("USD").unwrap(),
            CurrencyCode::new("EUR").unwrap(),
        )
    }

    #[test]
    fn test_exhausted_joins_every_failure() {
        let (from, to) = pair();
        let err = ConversionError::Exhausted {
            from,
            to,
            failures: vec![
                "provider a failed: HTTP 500".into(),
                "provider b failed: request timed out".into(),
            ],
            fallback_error: None,
        };
        let msg = err.to_string();
        assert!(msg.contains("provider a failed: HTTP 500; provider b failed: request timed out"));
        assert!(!msg.contains("fallback lookup failed"));
    }

    #[test]
    fn test_exhausted_includes_fallback_error() {
        let (from, to) = pair();
        let err = ConversionError::Exhausted {
            from,
            to,
            failures: vec!["provider a failed: HTTP 500".into()],
            fallback_error: Some("Database error: locked".into()),
        };
        assert!(err.to_string().ends_with("; fallback lookup failed: Database error: locked"));
    }

    #[test]
    fn test_no_active_providers_reports_fallback_error() {
        let (from, to) = pair();
        let err = ConversionError::NoActiveProviders {
            from,
            to,
            fallback_error: Some("Database error: locked".into()),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("No active providers"));
        assert!(!msg.contains("Errors:"));
        assert!(msg.ends_with("; fallback lookup failed: Database error: locked"));
    }

    #[test]
    fn test_conversion_error_is_generic_to_callers() {
        let (from, to) = pair();
        let app: AppError = ConversionError::NoActiveProviders {
            from,
            to,
            fallback_error: None,
        }
        .into();
        assert!(matches!(app, AppError::Internal(ref m) if m == "Conversion failed"));
    }

    #[test]
    fn test_provider_error_messages() {
        assert_eq!(ProviderError::Timeout.to_string(), "request timed out");
        assert_eq!(
            ProviderError::MissingCredential("Fixer".into()).to_string(),
            "Fixer API key is missing"
        );
        assert_eq!(ProviderError::Http { status: 503 }.to_string(), "HTTP 503");
    }
}
