//! # Expiration Worker
//!
//! Background task that runs [`QuoteService::expire_quotes`] on a fixed
//! interval until it is told to stop.

use crate::application::dto::ExpirationReport;
use crate::application::error::ApplicationResult;
use crate::application::services::QuoteService;
use crate::domain::value_objects::Timestamp;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default time between scans.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(3600);

/// Periodic expiration scan.
#[derive(Debug)]
pub struct ExpirationWorker {
    service: Arc<QuoteService>,
    interval: Duration,
    shutdown: Arc<Notify>,
}

impl ExpirationWorker {
    /// Creates a worker scanning every `interval`.
    #[must_use]
    pub fn new(service: Arc<QuoteService>, interval: Duration) -> Self {
        Self {
            service,
            interval,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Handle used to stop the worker. Call `notify_one` on it.
    #[must_use]
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    /// Runs one scan.
    ///
    /// # Errors
    ///
    /// Propagates the scan's repository error.
    pub async fn run_once(&self, now: Timestamp) -> ApplicationResult<ExpirationReport> {
        self.service.expire_quotes(now).await
    }

    /// Spawns the scan loop. The first scan runs immediately.
    ///
    /// A failed scan is logged and retried on the next tick.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tracing::info!(interval_secs = self.interval.as_secs(), "expiration worker started");

            loop {
                tokio::select! {
                    () = self.shutdown.notified() => {
                        tracing::info!("expiration worker received shutdown signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        match self.run_once(Timestamp::now()).await {
                            Ok(report) if report.count() > 0 => {
                                tracing::info!(expired = report.count(), "expired quotes");
                            }
                            Ok(_) => {}
                            Err(e) => {
                                tracing::error!(error = %e, "expiration scan failed");
                            }
                        }
                    }
                }
            }
        })
    }
}
