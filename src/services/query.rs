use std::sync::Arc;

use log::debug;

use crate::db::{AssetHistory, MarketStore, TopAsset};
use crate::error::{Error, Result};

/// Row limit used when a caller does not ask for one.
pub const DEFAULT_LIMIT: i64 = 20;

/// Read-only queries over the snapshot table. Limits are passed through
/// as given; bounds are the transport layer's concern.
#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn MarketStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    /// Each asset's latest snapshot, ranked by market cap descending.
    pub async fn top_assets(&self, limit: i64) -> Result<Vec<TopAsset>> {
        self.store.top_assets(limit).await
    }

    /// Snapshot history for one asset, newest first.
    pub async fn asset_history(&self, external_id: &str, limit: i64) -> Result<AssetHistory> {
        match self.store.asset_history(external_id, limit).await? {
            Some(history) => Ok(history),
            None => {
                debug!("No asset tracked under {}", external_id);
                Err(Error::NotFound(external_id.to_string()))
            },
        }
    }

    pub async fn health_check(&self) -> Result<()> {
        self.store.health_check().await
    }
}
