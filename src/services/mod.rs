//! Ingestion and query paths over a [`MarketStore`](crate::db::MarketStore).

mod ingestion;
mod query;

pub use ingestion::{IngestSummary, IngestionService};
pub use query::{QueryService, DEFAULT_LIMIT};
