//! Runs one expiration scan against PostgreSQL and prints the affected ids.

use anyhow::Context;
use b2b_quotes::application::services::{QuoteService, QuoteServiceConfig};
use b2b_quotes::config::AppConfig;
use b2b_quotes::domain::value_objects::Timestamp;
use b2b_quotes::infrastructure::persistence::PostgresQuoteRepository;
use b2b_quotes::infrastructure::platform::ShopifyAdminClient;
use b2b_quotes::telemetry;
use clap::Parser;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "expire_quotes", about = "Expire quotes past their expiration date")]
struct Args {
    /// Scan as of this RFC 3339 instant instead of now.
    #[arg(long)]
    as_of: Option<String>,

    /// Quotes expired per transaction. Defaults to `expiration.batch_size`.
    #[arg(long)]
    batch_size: Option<usize>,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = AppConfig::load().context("loading configuration")?;
    telemetry::init_tracing(&config.logging).context("installing tracing subscriber")?;

    let now = match args.as_of.as_deref() {
        Some(raw) => Timestamp::parse_rfc3339(raw)
            .with_context(|| format!("--as-of is not an RFC 3339 timestamp: {raw}"))?,
        None => Timestamp::now(),
    };
    let batch_size = args.batch_size.unwrap_or(config.expiration.batch_size);
    anyhow::ensure!(batch_size > 0, "--batch-size must be positive");

    let repository = PostgresQuoteRepository::connect(&config.database)
        .await
        .context("connecting to PostgreSQL")?;
    let service = QuoteService::with_config(
        Arc::new(repository),
        Arc::new(ShopifyAdminClient::from_config(&config.shopify)?),
        QuoteServiceConfig {
            expiration_batch_size: batch_size,
        },
    );

    let report = service.expire_quotes(now).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("expired {} quote(s) in {} batch(es)", report.count(), report.batches);
        for id in &report.expired_ids {
            println!("{id}");
        }
    }
    Ok(())
}
