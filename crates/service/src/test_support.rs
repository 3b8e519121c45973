#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};

// Shared databases are migrated once per test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Connection for repository tests.
///
/// Uses `TEST_DATABASE_URL` when set, otherwise a private in-memory SQLite
/// database that is migrated on every call.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let mut cfg = DatabaseConfig::from_env();
    match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => cfg.url = url,
        Err(_) => {
            cfg.url = "sqlite::memory:".to_string();
            // every sqlite memory connection is its own database
            cfg.max_connections = 1;
            cfg.min_connections = 1;
        }
    }
    cfg.acquire_timeout = std::time::Duration::from_secs(10);
    let db = connect_with_config(&cfg).await?;

    if cfg.url.starts_with("sqlite") {
        migration::Migrator::up(&db, None).await?;
    } else {
        MIGRATED
            .get_or_try_init(|| async { migration::Migrator::up(&db, None).await })
            .await?;
    }
    Ok(db)
}
