use std::{net::SocketAddr, time::Duration};

use config::{Config, ConfigError, Environment, File};
use log::LevelFilter;
use serde::Deserialize;

/// PostgreSQL pool configuration.
///
/// The connection string itself lives at the root (`DATABASE_URL`).
#[derive(Debug, Deserialize, Clone)]
pub struct PostgresSettings {
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

impl Default for PostgresSettings {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
        }
    }
}

fn default_pool_size() -> usize {
    16
}

/// Upstream market-data provider configuration.
///
/// `base_url` must end with a slash so that endpoint paths join under it.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderSettings {
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,
    /// Single unit of account for every price and metric.
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
    #[serde(default = "default_provider_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: default_provider_base_url(),
            vs_currency: default_vs_currency(),
            request_timeout_secs: default_provider_timeout(),
        }
    }
}

impl ProviderSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_provider_base_url() -> String {
    "https://api.coingecko.com/api/v3/".to_string()
}

fn default_vs_currency() -> String {
    "usd".to_string()
}

fn default_provider_timeout() -> u64 {
    30
}

/// HTTP server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    /// Comma-separated list of allowed origins, or `*`.
    #[serde(default = "default_cors_allow_origins")]
    pub cors_allow_origins: String,
    #[serde(default = "default_server_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            cors_allow_origins: default_cors_allow_origins(),
            request_timeout_secs: default_server_timeout(),
        }
    }
}

impl ServerSettings {
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allow_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

fn default_cors_allow_origins() -> String {
    "http://localhost:5173,http://localhost:3000".to_string()
}

fn default_server_timeout() -> u64 {
    60
}

/// Scheduled ingestion. An interval of 0 leaves ingestion to external triggers.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CronSettings {
    #[serde(default)]
    pub ingest_interval_secs: u64,
}

impl CronSettings {
    pub fn ingest_enabled(&self) -> bool {
        self.ingest_interval_secs > 0
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingSettings {
    /// Falls back to `Info` when the configured level is not recognised.
    pub fn level_filter(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::Info)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Root application configuration.
///
/// Loaded once at startup from an optional `config.*` file in the working
/// directory, overridden by process environment. `DATABASE_URL` and
/// `CG_API_KEY` are required; nested keys use a double underscore
/// (`SERVER__LISTEN_ADDR`, `CRON__INGEST_INTERVAL_SECS`).
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub database_url: String,
    pub cg_api_key: String,
    #[serde(default)]
    pub postgres: PostgresSettings,
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub cron: CronSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;

        Self::from_config(s)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        config.try_deserialize()
    }
}
