//! Job to run a market data ingestion on a fixed interval.
//!
//! Same path as `POST /ingest/market`. A failed run is logged by the
//! scheduler and the next tick tries again from scratch.

use anyhow::Result;
use log::info;

use crate::services::IngestionService;

pub async fn run(ingestion: &IngestionService) -> Result<()> {
    let summary = ingestion.ingest_market_data().await?;

    info!(
        "Scheduled ingestion stored {}/{} records at {}",
        summary.snapshots_inserted,
        summary.coins_received,
        summary.ts.to_rfc3339()
    );
    Ok(())
}
