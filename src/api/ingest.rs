use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};

use crate::api::{error::ApiResult, AppState};
use crate::services::IngestSummary;

async fn ingest_market(State(state): State<Arc<AppState>>) -> ApiResult<Json<IngestSummary>> {
    let summary = state.ingestion.ingest_market_data().await?;
    Ok(Json(summary))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/ingest/market", post(ingest_market))
}
