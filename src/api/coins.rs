use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::{
    error::{ApiError, ApiResult},
    AppState,
};
use crate::db::{AssetHistory, TopAsset};
use crate::services::DEFAULT_LIMIT;

/// Upper bound on `limit` for every read endpoint.
const MAX_LIMIT: i64 = 200;

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<i64>,
}

impl LimitQuery {
    /// Unparseable query strings are reported in the same JSON shape as
    /// out-of-range values.
    fn resolve(query: Result<Query<Self>, QueryRejection>) -> ApiResult<i64> {
        let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(ApiError::BadRequest(format!(
                "limit must be between 1 and {}, got {}",
                MAX_LIMIT, limit
            )));
        }
        Ok(limit)
    }
}

async fn list_top_assets(
    State(state): State<Arc<AppState>>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<TopAsset>>> {
    let assets = state.queries.top_assets(LimitQuery::resolve(query)?).await?;
    Ok(Json(assets))
}

async fn asset_snapshots(
    Path(coingecko_id): Path<String>,
    State(state): State<Arc<AppState>>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> ApiResult<Json<AssetHistory>> {
    let limit = LimitQuery::resolve(query)?;
    let history = state
        .queries
        .asset_history(&coingecko_id, limit)
        .await?;
    Ok(Json(history))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/market/top", get(list_top_assets))
        .route("/coins", get(list_top_assets))
        .route("/coins/{coingecko_id}/snapshots", get(asset_snapshots))
}
