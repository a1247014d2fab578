//! Client example demonstrating conversions against a running server.
//!
//! Run with: cargo run -p converter-app --example client_example --no-default-features --features sqlite

use std::net::SocketAddr;
use std::sync::Arc;

use converter_client::ConverterClient;
use converter_hex::{ConversionService, inbound::HttpServer};
use converter_repo::{MemoryRateCache, build_repo};
use rate_providers::{ProviderSettings, ProvidersConfig, build_providers};
use tempfile::tempdir;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_env_filter("info").init();

    // Find an available port
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    let port = addr.port();
    drop(listener);

    // Use a temp file-backed SQLite DB
    let tmp = tempdir()?;
    let db_path = tmp.path().join("rates.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    println!("🚀 Starting server on port {port}...");
    println!("   Database: {db_url}");

    let repo = build_repo(&db_url).await?;

    // Offline: only the static table is active
    let mut providers = ProvidersConfig::default();
    providers.exchangerates.enabled = false;
    providers.static_table = ProviderSettings::new(true, 0, "static://table");
    let providers = build_providers(&providers)?;

    let service = ConversionService::new(repo, Arc::new(MemoryRateCache::new(300)), providers);
    service.register_providers().await?;

    let router = HttpServer::new(service).router();
    let server_addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&server_addr).await?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router.into_make_service()).await {
            eprintln!("server error: {e}");
        }
    });

    let client = ConverterClient::new(format!("http://127.0.0.1:{port}"));

    // ─────────────────────────────────────────────────────────────────────────
    // Demo: convert, hit the cache, inspect providers and history
    // ─────────────────────────────────────────────────────────────────────────

    let health = client.health().await?;
    println!("✅ Server health: {} (cache {})", health.status, health.cache);

    let usd = "USD".parse()?;
    let eur = "EUR".parse()?;

    let first = client.convert(usd, eur, Some(100.0)).await?;
    println!(
        "✅ 100 USD = {:.2} EUR (rate {:.5}, source {})",
        first.converted_amount, first.rate, first.source
    );

    let second = client.convert(usd, eur, Some(100.0)).await?;
    println!("✅ Repeat served from {} (cached={})", second.source, second.cached);

    let bad = client.convert(usd, "XYZ".parse()?, None).await;
    println!("✅ Unknown currency rejected: {}", bad.is_err());

    for p in client.providers().await? {
        println!(
            "   provider {:<13} priority={:<3} active={} failures={}",
            p.name, p.priority, p.is_active, p.failure_count
        );
    }

    let history = client.history(usd, eur, Some(5)).await?;
    println!("✅ {} history row(s) for USD->EUR", history.len());

    Ok(())
}
