//! One ingestion run: fetch, normalize, persist.
//!
//! Every snapshot of a run shares a single timestamp, and the whole batch
//! is committed atomically by the store. Errors are not handled here; they
//! propagate to whoever triggered the run.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::db::models::MarketMetrics;
use crate::db::{AssetObservation, MarketStore};
use crate::error::{Error, Result};
use crate::provider::{normalize, MarketDataProvider, MarketRecord};

/// Outcome of an ingestion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestSummary {
    /// Records returned by the provider, including ones without an id.
    pub coins_received: usize,
    pub snapshots_inserted: usize,
    /// Run timestamp shared by every snapshot, serialized as RFC 3339.
    pub ts: DateTime<Utc>,
}

#[derive(Clone)]
pub struct IngestionService {
    provider: Arc<dyn MarketDataProvider>,
    store: Arc<dyn MarketStore>,
}

impl IngestionService {
    pub fn new(provider: Arc<dyn MarketDataProvider>, store: Arc<dyn MarketStore>) -> Self {
        Self { provider, store }
    }

    pub async fn ingest_market_data(&self) -> Result<IngestSummary> {
        info!("Starting market data ingestion...");
        let start = std::time::Instant::now();

        let payload = self.provider.fetch_markets().await?;
        let raw = payload.as_array().ok_or_else(|| {
            Error::UnexpectedPayload(format!(
                "expected a list of markets, got {}",
                json_kind(&payload)
            ))
        })?;

        let records = normalize(raw);
        let ts = Utc::now();

        let observations: Vec<AssetObservation> =
            records.into_iter().filter_map(into_observation).collect();

        let snapshots_inserted = self.store.record_batch(ts, &observations).await?;

        info!(
            "Ingested {} snapshots from {} provider records in {:?}",
            snapshots_inserted,
            raw.len(),
            start.elapsed()
        );

        Ok(IngestSummary {
            coins_received: raw.len(),
            snapshots_inserted,
            ts,
        })
    }
}

/// Records without an identifier cannot be tied to an asset and are skipped.
fn into_observation(record: MarketRecord) -> Option<AssetObservation> {
    let external_id = record.external_id.filter(|id| !id.is_empty())?;

    Some(AssetObservation {
        external_id,
        symbol: record.symbol,
        name: record.name,
        image: record.image,
        metrics: MarketMetrics {
            current_price: record.current_price,
            market_cap: record.market_cap,
            total_volume: record.total_volume,
            price_change_percentage_24h: record.price_change_percentage_24h,
        },
    })
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
