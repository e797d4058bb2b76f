//! In-memory `MarketStore` used by unit tests.
//!
//! Mirrors the PostgreSQL ordering rules: latest snapshot is the max of
//! `(ts, id)`, ranking is market cap descending with nulls last and
//! `external_id` as the tie-break.

use std::cmp::Ordering;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::models::{
    Asset, AssetHistory, AssetObservation, MarketMetrics, Snapshot, SnapshotPoint, TopAsset,
};
use crate::db::MarketStore;
use crate::error::{Error, Result};

#[derive(Default)]
struct Tables {
    assets: Vec<Asset>,
    snapshots: Vec<Snapshot>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_writes: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `record_batch` fail before touching the tables.
    pub fn fail_writes(&self) {
        *self.fail_writes.lock().unwrap() = true;
    }

    pub fn assets(&self) -> Vec<Asset> {
        self.tables.lock().unwrap().assets.clone()
    }

    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.tables.lock().unwrap().snapshots.clone()
    }

    /// Inserts an asset with no snapshots.
    pub fn push_asset(&self, external_id: &str, symbol: &str, name: &str, ts: DateTime<Utc>) {
        let mut tables = self.tables.lock().unwrap();
        upsert_asset(
            &mut tables,
            ts,
            &AssetObservation {
                external_id: external_id.to_string(),
                symbol: Some(symbol.to_string()),
                name: Some(name.to_string()),
                image: None,
                metrics: MarketMetrics::default(),
            },
        );
    }

    /// Inserts a snapshot directly, bypassing ingestion. Creates the asset
    /// if needed and leaves existing descriptive fields untouched.
    pub fn push_snapshot(&self, external_id: &str, ts: DateTime<Utc>, metrics: MarketMetrics) {
        let mut tables = self.tables.lock().unwrap();
        let existing = tables
            .assets
            .iter()
            .find(|a| a.external_id == external_id)
            .map(|a| a.id);
        let asset_id = match existing {
            Some(id) => id,
            None => upsert_asset(
                &mut tables,
                ts,
                &AssetObservation {
                    external_id: external_id.to_string(),
                    symbol: None,
                    name: None,
                    image: None,
                    metrics,
                },
            ),
        };
        let id = tables.snapshots.len() as i64 + 1;
        tables.snapshots.push(Snapshot {
            id,
            asset_id,
            ts,
            metrics,
        });
    }
}

fn upsert_asset(tables: &mut Tables, ts: DateTime<Utc>, obs: &AssetObservation) -> i64 {
    if let Some(asset) = tables
        .assets
        .iter_mut()
        .find(|a| a.external_id == obs.external_id)
    {
        asset.symbol = obs.symbol.clone();
        asset.name = obs.name.clone();
        asset.image = obs.image.clone();
        asset.updated_at = ts;
        return asset.id;
    }

    let id = tables.assets.len() as i64 + 1;
    tables.assets.push(Asset {
        id,
        external_id: obs.external_id.clone(),
        symbol: obs.symbol.clone(),
        name: obs.name.clone(),
        image: obs.image.clone(),
        created_at: ts,
        updated_at: ts,
    });
    id
}

fn by_market_cap_desc_nulls_last(a: &TopAsset, b: &TopAsset) -> Ordering {
    match (a.metrics.market_cap, b.metrics.market_cap) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.external_id.cmp(&b.external_id))
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn record_batch(
        &self,
        ts: DateTime<Utc>,
        observations: &[AssetObservation],
    ) -> Result<usize> {
        if *self.fail_writes.lock().unwrap() {
            return Err(Error::Pool(deadpool_postgres::PoolError::Closed));
        }

        let mut tables = self.tables.lock().unwrap();
        for obs in observations {
            let asset_id = upsert_asset(&mut tables, ts, obs);
            let id = tables.snapshots.len() as i64 + 1;
            tables.snapshots.push(Snapshot {
                id,
                asset_id,
                ts,
                metrics: obs.metrics,
            });
        }
        Ok(observations.len())
    }

    async fn top_assets(&self, limit: i64) -> Result<Vec<TopAsset>> {
        let tables = self.tables.lock().unwrap();

        let mut rows: Vec<TopAsset> = tables
            .assets
            .iter()
            .filter_map(|asset| {
                let latest = tables
                    .snapshots
                    .iter()
                    .filter(|s| s.asset_id == asset.id)
                    .max_by(|a, b| a.ts.cmp(&b.ts).then(a.id.cmp(&b.id)))?;
                Some(TopAsset {
                    external_id: asset.external_id.clone(),
                    symbol: asset.symbol.clone(),
                    name: asset.name.clone(),
                    image: asset.image.clone(),
                    metrics: latest.metrics,
                    ts: latest.ts,
                })
            })
            .collect();

        rows.sort_by(by_market_cap_desc_nulls_last);
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn asset_history(&self, external_id: &str, limit: i64) -> Result<Option<AssetHistory>> {
        let tables = self.tables.lock().unwrap();

        let Some(asset) = tables.assets.iter().find(|a| a.external_id == external_id) else {
            return Ok(None);
        };

        let mut snapshots: Vec<&Snapshot> = tables
            .snapshots
            .iter()
            .filter(|s| s.asset_id == asset.id)
            .collect();
        snapshots.sort_by(|a, b| b.ts.cmp(&a.ts).then(b.id.cmp(&a.id)));
        snapshots.truncate(limit.max(0) as usize);

        Ok(Some(AssetHistory::new(
            asset.clone(),
            snapshots.into_iter().map(SnapshotPoint::from).collect(),
        )))
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
