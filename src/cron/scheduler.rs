//! Cron scheduler for periodic background tasks.
//!
//! Runs jobs like:
//! - Ingesting market data from the provider

use std::time::Duration;

use anyhow::Result;
use log::{error, info};
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;

use crate::config::CronSettings;
use crate::services::IngestionService;

use super::jobs;

/// Cron scheduler that manages periodic background jobs.
pub struct CronScheduler {
    ingestion: IngestionService,
    settings: CronSettings,
}

impl CronScheduler {
    pub fn new(ingestion: IngestionService, settings: CronSettings) -> Self {
        Self {
            ingestion,
            settings,
        }
    }

    /// Starts the cron scheduler and runs until cancellation.
    pub async fn run(&self, cancellation_token: CancellationToken) -> Result<()> {
        let mut scheduler = JobScheduler::new().await?;

        let mut registered = 0;
        if self.settings.ingest_enabled() {
            self.register_ingest_market_data_job(&scheduler).await?;
            registered += 1;
        } else {
            info!("Scheduled ingestion disabled, waiting for external triggers");
        }

        // Start the scheduler
        scheduler.start().await?;
        info!("Cron scheduler started with {} jobs", registered);

        // Wait for cancellation
        cancellation_token.cancelled().await;
        info!("Cron scheduler shutting down...");

        scheduler.shutdown().await?;
        Ok(())
    }

    async fn register_ingest_market_data_job(&self, scheduler: &JobScheduler) -> Result<()> {
        let ingestion = self.ingestion.clone();
        let interval = self.settings.ingest_interval_secs;

        let job = Job::new_repeated_async(Duration::from_secs(interval), move |_uuid, _lock| {
            let ingestion = ingestion.clone();
            Box::pin(async move {
                if let Err(e) = jobs::ingest_market_data::run(&ingestion).await {
                    error!("Failed to ingest market data: {:#}", e);
                }
            })
        })?;

        scheduler.add(job).await?;
        info!("Registered ingest_market_data job (every {}s)", interval);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::provider::stub::StubProvider;

    fn scheduler(store: Arc<MemoryStore>, interval: u64) -> CronScheduler {
        let provider = StubProvider::repeating(json!([{ "id": "bitcoin", "market_cap": 1.0 }]));
        CronScheduler::new(
            IngestionService::new(provider, store),
            CronSettings {
                ingest_interval_secs: interval,
            },
        )
    }

    #[tokio::test]
    async fn test_disabled_scheduler_runs_nothing_and_stops_on_cancel() {
        let store = Arc::new(MemoryStore::new());
        let token = CancellationToken::new();
        token.cancel();

        scheduler(store.clone(), 0).run(token).await.unwrap();

        assert!(store.snapshots().is_empty());
    }

    #[tokio::test]
    async fn test_enabled_scheduler_ingests_periodically() {
        let store = Arc::new(MemoryStore::new());
        let token = CancellationToken::new();
        let cron = scheduler(store.clone(), 1);

        let handle = {
            let token = token.clone();
            tokio::spawn(async move { cron.run(token).await })
        };

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        token.cancel();
        handle.await.unwrap().unwrap();

        // One asset, one snapshot per tick.
        assert_eq!(store.assets().len(), 1);
        assert!(store.snapshots().len() >= 2);
    }
}
