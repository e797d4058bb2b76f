use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error};
use tokio_postgres::IsolationLevel;

use crate::db::models::{
    Asset, AssetHistory, AssetObservation, MarketMetrics, Snapshot, SnapshotPoint, TopAsset,
};
use crate::db::postgres::PostgresClient;
use crate::db::MarketStore;
use crate::error::Result;

/// Sanitize a string for PostgreSQL by removing null bytes (0x00)
/// which are invalid in UTF-8 text columns
fn sanitize_string(s: &str) -> String {
    s.replace('\0', "")
}

fn sanitize_opt(s: &Option<String>) -> Option<String> {
    s.as_deref().map(sanitize_string)
}

const UPSERT_ASSET: &str = r#"
    INSERT INTO assets (external_id, symbol, name, image, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $5)
    ON CONFLICT (external_id) DO UPDATE SET
        symbol = EXCLUDED.symbol,
        name = EXCLUDED.name,
        image = EXCLUDED.image,
        updated_at = EXCLUDED.updated_at
    RETURNING id
"#;

// Greatest-N-per-group: DISTINCT ON keeps the first row per asset, so the
// inner ORDER BY decides which snapshot is "latest" (id breaks equal ts).
const TOP_ASSETS: &str = r#"
    SELECT
        a.external_id, a.symbol, a.name, a.image,
        l.ts, l.current_price, l.market_cap, l.total_volume, l.price_change_percentage_24h
    FROM (
        SELECT DISTINCT ON (s.asset_id)
            s.asset_id, s.ts, s.current_price, s.market_cap,
            s.total_volume, s.price_change_percentage_24h
        FROM snapshots s
        ORDER BY s.asset_id, s.ts DESC, s.id DESC
    ) l
    JOIN assets a ON a.id = l.asset_id
    ORDER BY l.market_cap DESC NULLS LAST, a.external_id ASC
    LIMIT $1
"#;

const ASSET_BY_EXTERNAL_ID: &str = r#"
    SELECT id, external_id, symbol, name, image, created_at, updated_at
    FROM assets
    WHERE external_id = $1
"#;

const SNAPSHOTS_FOR_ASSET: &str = r#"
    SELECT
        id, asset_id, ts, current_price, market_cap,
        total_volume, price_change_percentage_24h
    FROM snapshots
    WHERE asset_id = $1
    ORDER BY ts DESC, id DESC
    LIMIT $2
"#;

#[async_trait]
impl MarketStore for PostgresClient {
    /// One transaction: an upsert per asset (returning its id), then
    /// multi-row snapshot inserts.
    async fn record_batch(
        &self,
        ts: DateTime<Utc>,
        observations: &[AssetObservation],
    ) -> Result<usize> {
        if observations.is_empty() {
            return Ok(0);
        }

        const COLS_PER_ROW: usize = 6;
        const BATCH_SIZE: usize = 1_000;

        let mut conn = self.pool.get().await?;
        let client: &mut tokio_postgres::Client = &mut conn;
        let tx = client.transaction().await?;

        let upsert = tx.prepare(UPSERT_ASSET).await?;
        let mut asset_ids: Vec<i64> = vec![0; observations.len()];

        // Row locks are taken in external_id order so that concurrent runs
        // listing the same assets in a different order cannot deadlock.
        let mut lock_order: Vec<usize> = (0..observations.len()).collect();
        lock_order.sort_by_key(|&i| observations[i].external_id.as_str());

        for index in lock_order {
            let obs = &observations[index];
            let row = tx
                .query_one(
                    &upsert,
                    &[
                        &sanitize_string(&obs.external_id),
                        &sanitize_opt(&obs.symbol),
                        &sanitize_opt(&obs.name),
                        &sanitize_opt(&obs.image),
                        &ts,
                    ],
                )
                .await
                .map_err(|e| {
                    error!("Failed to upsert asset {}: {:?}", obs.external_id, e);
                    e
                })?;
            asset_ids[index] = row.get("id");
        }

        for (chunk_index, chunk) in observations.chunks(BATCH_SIZE).enumerate() {
            let offset = chunk_index * BATCH_SIZE;

            // Build VALUES placeholders: ($1,...,$6), ($7,...,$12), ...
            let values_clauses: Vec<String> = chunk
                .iter()
                .enumerate()
                .map(|(i, _)| {
                    let start = i * COLS_PER_ROW + 1;
                    let placeholders: Vec<String> = (start..start + COLS_PER_ROW)
                        .map(|n| format!("${}", n))
                        .collect();
                    format!("({})", placeholders.join(", "))
                })
                .collect();

            let query = format!(
                r#"
                INSERT INTO snapshots (
                    asset_id, ts, current_price, market_cap,
                    total_volume, price_change_percentage_24h
                ) VALUES {}
                "#,
                values_clauses.join(", ")
            );

            let mut params: Vec<&(dyn tokio_postgres::types::ToSql + Sync)> =
                Vec::with_capacity(chunk.len() * COLS_PER_ROW);

            for (i, obs) in chunk.iter().enumerate() {
                params.push(&asset_ids[offset + i]);
                params.push(&ts);
                params.push(&obs.metrics.current_price);
                params.push(&obs.metrics.market_cap);
                params.push(&obs.metrics.total_volume);
                params.push(&obs.metrics.price_change_percentage_24h);
            }

            tx.execute(&query, &params).await.map_err(|e| {
                error!("Failed to batch insert {} snapshots: {:?}", chunk.len(), e);
                e
            })?;
        }

        tx.commit().await?;
        debug!(
            "Committed {} asset upserts and snapshots at {}",
            observations.len(),
            ts
        );

        Ok(observations.len())
    }

    async fn top_assets(&self, limit: i64) -> Result<Vec<TopAsset>> {
        let client = self.pool.get().await?;
        let rows = client.query(TOP_ASSETS, &[&limit]).await?;
        Ok(rows.iter().map(row_to_top_asset).collect())
    }

    async fn asset_history(&self, external_id: &str, limit: i64) -> Result<Option<AssetHistory>> {
        let mut conn = self.pool.get().await?;
        let client: &mut tokio_postgres::Client = &mut conn;

        // Asset and its snapshots come from the same read snapshot.
        let tx = client
            .build_transaction()
            .isolation_level(IsolationLevel::RepeatableRead)
            .read_only(true)
            .start()
            .await?;

        let Some(row) = tx.query_opt(ASSET_BY_EXTERNAL_ID, &[&external_id]).await? else {
            tx.commit().await?;
            return Ok(None);
        };
        let asset = row_to_asset(&row);

        let rows = tx.query(SNAPSHOTS_FOR_ASSET, &[&asset.id, &limit]).await?;
        tx.commit().await?;

        let snapshots = rows
            .iter()
            .map(row_to_snapshot)
            .map(|s| SnapshotPoint::from(&s))
            .collect();

        Ok(Some(AssetHistory::new(asset, snapshots)))
    }

    /// Health check - verify connection is still alive
    async fn health_check(&self) -> Result<()> {
        let client = self.pool.get().await?;
        client.query_one("SELECT 1", &[]).await?;
        Ok(())
    }
}

// ==================== HELPER FUNCTIONS ====================

fn row_to_metrics(row: &tokio_postgres::Row) -> MarketMetrics {
    MarketMetrics {
        current_price: row.get("current_price"),
        market_cap: row.get("market_cap"),
        total_volume: row.get("total_volume"),
        price_change_percentage_24h: row.get("price_change_percentage_24h"),
    }
}

fn row_to_asset(row: &tokio_postgres::Row) -> Asset {
    Asset {
        id: row.get("id"),
        external_id: row.get("external_id"),
        symbol: row.get("symbol"),
        name: row.get("name"),
        image: row.get("image"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_snapshot(row: &tokio_postgres::Row) -> Snapshot {
    Snapshot {
        id: row.get("id"),
        asset_id: row.get("asset_id"),
        ts: row.get("ts"),
        metrics: row_to_metrics(row),
    }
}

fn row_to_top_asset(row: &tokio_postgres::Row) -> TopAsset {
    TopAsset {
        external_id: row.get("external_id"),
        symbol: row.get("symbol"),
        name: row.get("name"),
        image: row.get("image"),
        metrics: row_to_metrics(row),
        ts: row.get("ts"),
    }
}
