//! HTTP providers against local stand-ins for the upstream APIs.

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    routing::get,
};
use converter_types::{CurrencyCode, ProviderError, RateProvider};
use rate_providers::{CurrencyApiProvider, ExchangeRatesProvider, FixerProvider, ProviderSettings};
use serde_json::{Value, json};

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn code(c: &str) -> CurrencyCode {
    CurrencyCode::new(c).unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// exchangerates
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_exchangerates_filters_to_targets() {
    let app = Router::new().route(
        "/latest/{base}",
        get(|Path(base): Path<String>| async move {
            Json(json!({
                "base": base,
                "date": "2024-01-01",
                "rates": { "EUR": 0.85, "GBP": 0.73, "JPY": 149.0 }
            }))
        }),
    );
    let url = spawn(app).await;
    let provider = ExchangeRatesProvider::new(&ProviderSettings::new(true, 1, url)).unwrap();

    let snapshot = provider
        .fetch_rates(code("USD"), &[code("EUR"), code("GBP")])
        .await
        .unwrap();

    assert_eq!(snapshot.source, "exchangerates");
    assert_eq!(snapshot.rates.len(), 2);
    assert_eq!(snapshot.get(code("EUR")), Some(0.85));

    let converted = provider
        .convert_currency(code("USD"), code("EUR"), 100.0)
        .await
        .unwrap();
    assert!((converted - 85.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_exchangerates_missing_rates_is_malformed() {
    let app = Router::new().route("/latest/{base}", get(|| async { Json(json!({ "base": "USD" })) }));
    let url = spawn(app).await;
    let provider = ExchangeRatesProvider::new(&ProviderSettings::new(true, 1, url)).unwrap();

    let err = provider.fetch_rates(code("USD"), &[code("EUR")]).await.unwrap_err();
    assert!(matches!(err, ProviderError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_exchangerates_error_status_translates_payload() {
    let app = Router::new().route(
        "/latest/{base}",
        get(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "result": "error", "error-type": "unsupported-code" })),
            )
        }),
    );
    let url = spawn(app).await;
    let provider = ExchangeRatesProvider::new(&ProviderSettings::new(true, 1, url)).unwrap();

    let err = provider.fetch_rates(code("XXX"), &[code("EUR")]).await.unwrap_err();
    assert_eq!(err, ProviderError::Upstream("unsupported-code".into()));
}

#[tokio::test]
async fn test_plain_error_status_reports_http_code() {
    let app = Router::new().route(
        "/latest/{base}",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
    );
    let url = spawn(app).await;
    let provider = ExchangeRatesProvider::new(&ProviderSettings::new(true, 1, url)).unwrap();

    let err = provider.fetch_rates(code("USD"), &[code("EUR")]).await.unwrap_err();
    assert_eq!(err, ProviderError::Http { status: 503 });
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let app = Router::new().route(
        "/latest/{base}",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({ "rates": { "EUR": 0.85 } }))
        }),
    );
    let url = spawn(app).await;
    let settings = ProviderSettings::new(true, 1, url).with_timeout(Duration::from_millis(100));
    let provider = ExchangeRatesProvider::new(&settings).unwrap();

    let err = provider.fetch_rates(code("USD"), &[code("EUR")]).await.unwrap_err();
    assert_eq!(err, ProviderError::Timeout);
    assert_eq!(err.to_string(), "request timed out");
}

#[tokio::test]
async fn test_unreachable_upstream_is_request_error() {
    // Nothing listens on the discard port.
    let provider =
        ExchangeRatesProvider::new(&ProviderSettings::new(true, 1, "http://127.0.0.1:9")).unwrap();
    let err = provider.fetch_rates(code("USD"), &[code("EUR")]).await.unwrap_err();
    assert!(matches!(err, ProviderError::Request(_) | ProviderError::Timeout));
}

// ─────────────────────────────────────────────────────────────────────────────
// fixer
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fixer_sends_key_and_symbols() {
    let app = Router::new().route(
        "/latest",
        get(|Query(q): Query<HashMap<String, String>>| async move {
            assert_eq!(q.get("access_key").map(String::as_str), Some("fx-key"));
            assert_eq!(q.get("base").map(String::as_str), Some("USD"));
            assert_eq!(q.get("symbols").map(String::as_str), Some("EUR,GBP"));
            Json(json!({ "success": true, "rates": { "EUR": 0.85, "GBP": 0.73 } }))
        }),
    );
    let url = spawn(app).await;
    let settings = ProviderSettings::new(true, 3, url).with_api_key("fx-key");
    let provider = FixerProvider::new(&settings).unwrap();
    assert!(provider.is_active());

    let snapshot = provider
        .fetch_rates(code("USD"), &[code("EUR"), code("GBP")])
        .await
        .unwrap();
    assert_eq!(snapshot.source, "fixer");
    assert_eq!(snapshot.get(code("GBP")), Some(0.73));
}

#[tokio::test]
async fn test_fixer_error_in_ok_body() {
    let app = Router::new().route(
        "/latest",
        get(|| async {
            Json(json!({
                "success": false,
                "error": { "type": "Invalid access_key", "info": "Invalid API key" }
            }))
        }),
    );
    let url = spawn(app).await;
    let provider = FixerProvider::new(&ProviderSettings::new(true, 3, url).with_api_key("bad")).unwrap();

    let err = provider.fetch_rates(code("USD"), &[code("EUR")]).await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid access_key: Invalid API key");
}

// ─────────────────────────────────────────────────────────────────────────────
// currencyapi
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_currencyapi_flattens_nested_values() {
    let app = Router::new().route(
        "/latest",
        get(|Query(q): Query<HashMap<String, String>>| async move {
            assert_eq!(q.get("apikey").map(String::as_str), Some("ca-key"));
            assert_eq!(q.get("base_currency").map(String::as_str), Some("USD"));
            Json(json!({
                "meta": { "last_updated_at": "2024-01-01T00:00:00Z" },
                "data": { "EUR": { "code": "EUR", "value": 0.91 } }
            }))
        }),
    );
    let url = spawn(app).await;
    let provider =
        CurrencyApiProvider::new(&ProviderSettings::new(true, 2, url).with_api_key("ca-key")).unwrap();

    let rate = provider.rate(code("USD"), code("EUR")).await.unwrap();
    assert_eq!(rate, 0.91);
}

#[tokio::test]
async fn test_currencyapi_error_message() {
    let app = Router::new().route(
        "/latest",
        get(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json::<Value>(json!({ "message": "Invalid authentication credentials" })),
            )
        }),
    );
    let url = spawn(app).await;
    let provider =
        CurrencyApiProvider::new(&ProviderSettings::new(true, 2, url).with_api_key("nope")).unwrap();

    let err = provider.fetch_rates(code("USD"), &[code("EUR")]).await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid authentication credentials");
}

#[tokio::test]
async fn test_currencyapi_missing_target() {
    let app = Router::new().route(
        "/latest",
        get(|| async { Json(json!({ "data": { "GBP": { "code": "GBP", "value": 0.7 } } })) }),
    );
    let url = spawn(app).await;
    let provider =
        CurrencyApiProvider::new(&ProviderSettings::new(true, 2, url).with_api_key("k")).unwrap();

    let err = provider.rate(code("USD"), code("EUR")).await.unwrap_err();
    assert_eq!(err, ProviderError::RateNotAvailable(code("EUR")));
}
