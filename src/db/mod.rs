use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

#[cfg(test)]
pub mod memory;
pub mod models;
pub mod postgres;

pub use models::{AssetHistory, AssetObservation, TopAsset};
pub use postgres::PostgresClient;

/// Persistent store for assets and their snapshots.
///
/// Implementations must make `record_batch` atomic: either every asset upsert
/// and snapshot insert of the run becomes durable, or none does.
#[async_trait]
pub trait MarketStore: Send + Sync {
    /// Upserts every observed asset by external id and appends one snapshot
    /// per observation stamped with `ts`. Returns the number of snapshots written.
    async fn record_batch(&self, ts: DateTime<Utc>, observations: &[AssetObservation])
        -> Result<usize>;

    /// Latest snapshot per asset, ranked by market cap (nulls last), top `limit`.
    async fn top_assets(&self, limit: i64) -> Result<Vec<TopAsset>>;

    /// Asset fields plus up to `limit` snapshots newest first, or `None` when
    /// the identifier is unknown.
    async fn asset_history(&self, external_id: &str, limit: i64) -> Result<Option<AssetHistory>>;

    async fn health_check(&self) -> Result<()>;
}
