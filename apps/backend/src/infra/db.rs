use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::config::db::DbConfig;
use crate::error::AppError;
use crate::infra::{bounded, BACKEND_TIMEOUT};

/// Connect to the relational store. Does NOT run migrations.
pub async fn connect_db(config: &DbConfig) -> Result<DatabaseConnection, AppError> {
    let mut options = ConnectOptions::new(config.url());
    options
        .connect_timeout(BACKEND_TIMEOUT)
        .acquire_timeout(BACKEND_TIMEOUT)
        .sqlx_logging(false);

    let conn = bounded("database connect", async {
        Database::connect(options).await.map_err(AppError::from)
    })
    .await?;

    info!(host = %config.host, port = %config.port, db = %config.name, "database connected");
    Ok(conn)
}

/// Connect and bring the schema up to date.
pub async fn bootstrap_db(config: &DbConfig) -> Result<DatabaseConnection, AppError> {
    let conn = connect_db(config).await?;
    migration::migrate_up(&conn)
        .await
        .map_err(|e| AppError::db(format!("migration failed: {e}")))?;
    Ok(conn)
}
