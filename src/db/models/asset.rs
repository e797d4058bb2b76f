use chrono::{DateTime, Utc};

use super::MarketMetrics;

/// Tracked instrument (PostgreSQL `assets`).
///
/// Primary Key: id
/// Natural Key: external_id (unique, immutable)
/// Query Pattern: "Resolve asset by provider id X"
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub id: i64,
    pub external_id: String,

    // Descriptive fields, replaced wholesale on every ingestion
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One asset as seen by an ingestion run: identity, descriptive fields and
/// the metrics that become its snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetObservation {
    pub external_id: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
    pub metrics: MarketMetrics,
}
