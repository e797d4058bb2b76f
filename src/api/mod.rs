//! HTTP transport over the ingestion and query services.

use std::sync::Arc;

use axum::{
    http::{HeaderValue, StatusCode},
    Router,
};
use log::warn;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};

use crate::config::ServerSettings;
use crate::services::{IngestionService, QueryService};

mod coins;
mod error;
mod health;
mod ingest;

pub struct AppState {
    pub ingestion: IngestionService,
    pub queries: QueryService,
}

fn cors_layer(settings: &ServerSettings) -> CorsLayer {
    let allowed = settings.cors_origins();
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let origins = allowed
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", o);
                None
            },
        })
        .collect::<Vec<_>>();
    cors.allow_origin(origins)
}

pub fn app_router(state: Arc<AppState>, settings: &ServerSettings) -> Router {
    Router::new()
        .merge(health::router())
        .merge(ingest::router())
        .merge(coins::router())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            settings.request_timeout(),
        ))
        .layer(cors_layer(settings))
        .with_state(state)
}
