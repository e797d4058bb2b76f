mod config;

pub use config::{
    CronSettings, LoggingSettings, PostgresSettings, ProviderSettings, ServerSettings, Settings,
};
