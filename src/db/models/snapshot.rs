use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MarketMetrics;

/// Point-in-time market observation (PostgreSQL `snapshots`).
///
/// Append-only. Every snapshot written by one ingestion run shares `ts`.
/// (asset_id, ts) is not unique; readers order by `ts DESC, id DESC`.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub id: i64,
    pub asset_id: i64,
    pub ts: DateTime<Utc>,
    pub metrics: MarketMetrics,
}

/// History entry as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPoint {
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub metrics: MarketMetrics,
}

impl From<&Snapshot> for SnapshotPoint {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            ts: snapshot.ts,
            metrics: snapshot.metrics,
        }
    }
}
