use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Asset, SnapshotPoint};

/// Market metrics carried by a snapshot. Each is absent when the provider
/// omitted it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketMetrics {
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub total_volume: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
}

/// An asset joined with its latest snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopAsset {
    #[serde(rename = "coingecko_id")]
    pub external_id: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
    #[serde(flatten)]
    pub metrics: MarketMetrics,
    pub ts: DateTime<Utc>,
}

/// An asset's descriptive fields plus its snapshots, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetHistory {
    #[serde(rename = "coingecko_id")]
    pub external_id: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
    pub snapshots: Vec<SnapshotPoint>,
}

impl AssetHistory {
    pub fn new(asset: Asset, snapshots: Vec<SnapshotPoint>) -> Self {
        Self {
            external_id: asset.external_id,
            symbol: asset.symbol,
            name: asset.name,
            image: asset.image,
            snapshots,
        }
    }
}
