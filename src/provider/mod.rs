//! Upstream market-data access.
//!
//! - [`coingecko`] - HTTP client for the CoinGecko API
//! - [`normalizer`] - Maps loosely typed provider records to [`MarketRecord`]

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

mod coingecko;
mod normalizer;
#[cfg(test)]
pub mod stub;

pub use coingecko::CoinGeckoProvider;
pub use normalizer::{normalize, MarketRecord};

/// Source of raw market data.
///
/// One call per ingestion run, no retry. Any failure is fatal for the caller.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Raw "list markets" payload. Expected to be a JSON array of per-asset
    /// objects; callers validate the shape.
    async fn fetch_markets(&self) -> Result<Value>;

    /// Current price per identifier in `currency`. Identifiers the provider
    /// does not price are absent from the map.
    async fn fetch_prices(&self, ids: &[String], currency: &str) -> Result<HashMap<String, f64>>;
}
