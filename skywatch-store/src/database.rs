use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;
use skywatch_core::RetryPolicy;
use crate::app_config::DatabaseConfig;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(config.connect_options())
            .await?;

        Ok(Self { pool })
    }

    /// Connects under `policy`; the last error is returned once attempts run out.
    pub async fn connect_with_retry(
        config: &DatabaseConfig,
        policy: &RetryPolicy,
    ) -> Result<Self, sqlx::Error> {
        let client = policy
            .run("Database connection", || Self::new(config))
            .await?;
        info!("Connected to {}:{}/{}", config.host, config.port, config.name);
        Ok(client)
    }

    /// Users and the request ledger.
    pub async fn migrate_identity(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running identity store migrations...");
        let mut migrator = sqlx::migrate!("./migrations/identity");
        migrator.set_ignore_missing(true);
        migrator.run(&self.pool).await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    /// Interests and flights.
    pub async fn migrate_collection(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running collection store migrations...");
        let mut migrator = sqlx::migrate!("./migrations/collection");
        migrator.set_ignore_missing(true);
        migrator.run(&self.pool).await?;
        info!("Migrations completed successfully.");
        Ok(())
    }
}
