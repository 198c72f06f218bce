use sea_orm::DatabaseConnection;

use crate::config::migrate_database;
use crate::errors::InternalError;

/// Apply pending migrations; every command needs the current schema
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), InternalError> {
    tracing::info!("Running database migrations...");
    migrate_database(db).await?;
    tracing::info!("All migrations completed successfully");
    Ok(())
}
