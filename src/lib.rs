pub mod api;
pub mod config;
pub mod cron;
pub mod db;
pub mod error;
pub mod provider;
pub mod services;

pub use api::{app_router, AppState};
pub use config::Settings;
pub use cron::CronScheduler;
pub use db::{MarketStore, PostgresClient};
pub use error::{Error, Result};
pub use provider::{CoinGeckoProvider, MarketDataProvider};
pub use services::{IngestionService, QueryService};
