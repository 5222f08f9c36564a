pub mod admin;
pub mod migrate;
pub mod serve;

use std::sync::Arc;

use anyhow::Context;

use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgStorage};

/// Connect, migrate and wrap the pool in the storage trait
pub(crate) async fn postgres_storage(config: &AppConfig) -> anyhow::Result<Arc<PgStorage>> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    DatabaseManager::migrate(&pool)
        .await
        .context("failed to apply migrations")?;
    Ok(Arc::new(PgStorage::new(pool)))
}
