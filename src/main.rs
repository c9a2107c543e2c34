//! B2B quote service: REST API plus the background expiration worker.

use anyhow::Context;
use b2b_quotes::api::rest::{AppState, create_router};
use b2b_quotes::application::services::{ExpirationWorker, QuoteService, QuoteServiceConfig};
use b2b_quotes::config::AppConfig;
use b2b_quotes::infrastructure::persistence::PostgresQuoteRepository;
use b2b_quotes::infrastructure::platform::ShopifyAdminClient;
use b2b_quotes::telemetry;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    telemetry::init_tracing(&config.logging).context("installing tracing subscriber")?;
    tracing::info!(?config, "starting b2b-quotes");

    let repository = PostgresQuoteRepository::connect(&config.database)
        .await
        .context("connecting to PostgreSQL")?;
    if config.database.run_migrations {
        repository.migrate().await.context("running migrations")?;
    }
    let platform = ShopifyAdminClient::from_config(&config.shopify)?;

    let service = Arc::new(QuoteService::with_config(
        Arc::new(repository),
        Arc::new(platform),
        QuoteServiceConfig {
            expiration_batch_size: config.expiration.batch_size,
        },
    ));

    let worker = config.expiration.enabled.then(|| {
        let worker = ExpirationWorker::new(Arc::clone(&service), config.expiration.scan_interval());
        let shutdown = worker.shutdown_handle();
        (worker.start(), shutdown)
    });

    let app = create_router(Arc::new(AppState::new(service)));
    let listener = tokio::net::TcpListener::bind(config.server.bind_addr())
        .await
        .with_context(|| format!("binding {}", config.server.bind_addr()))?;
    tracing::info!(addr = %config.server.bind_addr(), "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some((handle, shutdown)) = worker {
        shutdown.notify_one();
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "expiration worker did not stop cleanly");
        }
    }
    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
