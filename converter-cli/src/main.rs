//! Converter CLI
//!
//! Command-line interface for the Currency Converter API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use converter_client::ConverterClient;
use converter_types::CurrencyCode;

#[derive(Parser)]
#[command(name = "converter")]
#[command(author, version, about = "Currency converter API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Currency Converter API
    #[arg(
        long,
        env = "CONVERTER_API_URL",
        default_value = "http://localhost:3000"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an amount between two currencies
    Convert {
        /// Source currency (ISO 4217, e.g. USD)
        #[arg(value_parser = parse_currency)]
        from: CurrencyCode,
        /// Target currency (ISO 4217, e.g. EUR)
        #[arg(value_parser = parse_currency)]
        to: CurrencyCode,
        /// Amount to convert (server default: 1)
        #[arg(long)]
        amount: Option<f64>,
    },
    /// List rate providers and their health
    Providers,
    /// Show recent rates recorded for a pair
    History {
        #[arg(value_parser = parse_currency)]
        from: CurrencyCode,
        #[arg(value_parser = parse_currency)]
        to: CurrencyCode,
        /// Number of rows (1-100)
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Check API health
    Health,
}

fn parse_currency(s: &str) -> Result<CurrencyCode, String> {
    s.parse().map_err(|e| format!("{e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = ConverterClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let health = client.health().await?;
            println!("✓ {} is {} (cache {})", health.service, health.status, health.cache);
        }

        Commands::Convert { from, to, amount } => {
            let result = client.convert(from, to, amount).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Providers => {
            let providers = client.providers().await?;
            println!("{}", serde_json::to_string_pretty(&providers)?);
        }

        Commands::History { from, to, limit } => {
            let rows = client.history(from, to, limit).await?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    Ok(())
}
