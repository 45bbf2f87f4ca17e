pub mod migrate;
pub mod serve;

use std::time::Duration;

use anyhow::Context;

use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgTaskStore, TaskStore};

/// Shared startup: lazy pool, bounded wait for the store, schema bootstrap.
/// Any failure here is fatal for the process.
pub(crate) async fn prepare_store(config: &AppConfig) -> anyhow::Result<(DatabaseManager, PgTaskStore)> {
    let manager = DatabaseManager::connect_lazy(&config.database)
        .context("failed to configure database pool")?;

    let wait = Duration::from_secs(config.database.connect_wait_secs);
    tracing::info!("Waiting up to {:?} for the database", wait);
    manager
        .wait_until_ready(wait)
        .await
        .context("database not ready")?;

    let store = PgTaskStore::new(
        manager.pool().clone(),
        Duration::from_millis(config.database.statement_timeout_ms),
    );
    store.bootstrap().await.context("schema bootstrap failed")?;

    Ok((manager, store))
}
