use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::api::{error::ApiResult, AppState};

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Like `/health`, but also round-trips to the database.
async fn ready(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    state.queries.health_check().await?;
    Ok(Json(json!({ "status": "ok" })))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
}
