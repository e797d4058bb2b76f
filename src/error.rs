use thiserror::Error;

/// Errors produced by the ingestion and query paths.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport, HTTP status or decoding failure talking to the upstream provider.
    #[error("Provider error: {0}")]
    Provider(#[from] reqwest::Error),

    /// The upstream answered, but not with the shape the provider contract promises.
    #[error("Unexpected provider payload: {0}")]
    UnexpectedPayload(String),

    /// No asset is tracked under the requested external identifier.
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;
