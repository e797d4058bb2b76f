use std::str::FromStr;

use anyhow::Context;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use log::info;
use tokio_postgres::NoTls;

use crate::config::PostgresSettings;

const SCHEMA: &str = include_str!("../../../schema/postgres.sql");

/// PostgreSQL client with connection pooling.
///
/// Holds the `assets` and `snapshots` tables. Uses `deadpool-postgres`
/// for connection management.
#[derive(Clone)]
pub struct PostgresClient {
    pub pool: Pool,
}

impl PostgresClient {
    /// Connects using a `postgres://` connection string. The database may come
    /// up after the service, so the first checkout is attempted a few times.
    pub async fn new(database_url: &str, settings: &PostgresSettings) -> anyhow::Result<Self> {
        info!("Connecting to PostgreSQL");

        let pg_config = tokio_postgres::Config::from_str(database_url)
            .context("Invalid DATABASE_URL connection string")?;

        let mut retries = 0;
        let max_retries = 3;

        loop {
            let mgr_config = ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            };

            let mgr = Manager::from_config(pg_config.clone(), NoTls, mgr_config);
            let pool = Pool::builder(mgr)
                .max_size(settings.pool_size)
                .build()
                .context("Failed to create PostgreSQL connection pool")?;

            // Test the connection
            match pool.get().await {
                Ok(_conn) => {
                    info!("Successfully connected to PostgreSQL");
                    return Ok(Self { pool });
                },
                Err(e) => {
                    retries += 1;

                    if retries >= max_retries {
                        return Err(anyhow::anyhow!(
                            "Failed to connect to PostgreSQL after {} attempts: {}",
                            max_retries,
                            e
                        ));
                    }

                    let delay = std::time::Duration::from_millis(100 * 2_u64.pow(retries));
                    log::warn!(
                        "Failed to connect to PostgreSQL (attempt {}/{}), retrying in {:?}...",
                        retries,
                        max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                },
            }
        }
    }

    /// Applies `schema/postgres.sql`. Every statement is `IF NOT EXISTS`, so
    /// this is safe on every startup.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        info!("Running PostgreSQL migrations");
        let client = self.pool.get().await?;

        client
            .batch_execute(SCHEMA)
            .await
            .context("Failed to apply schema/postgres.sql")?;

        info!("PostgreSQL schema applied successfully");
        Ok(())
    }
}
