use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

use crate::errors::{InternalError, internal::DatabaseError};

/// Connect to the records database
///
/// Does NOT run migrations - call `migrate_database` separately.
pub async fn init_database(database_url: &str) -> Result<DatabaseConnection, InternalError> {
    let db = Database::connect(database_url).await.map_err(|source| {
        InternalError::Database(DatabaseError::Connection {
            url: database_url.to_string(),
            source,
        })
    })?;

    tracing::debug!("Connected to database: {}", database_url);

    Ok(db)
}

/// Apply every pending migration
pub async fn migrate_database(db: &DatabaseConnection) -> Result<(), InternalError> {
    Migrator::up(db, None)
        .await
        .map_err(|source| InternalError::Database(DatabaseError::Migration { source }))?;

    tracing::debug!("Database migrations completed");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, Statement};

    #[tokio::test]
    async fn test_migrations_create_tables_and_seed_permissions() {
        let db = init_database("sqlite::memory:").await.unwrap();
        migrate_database(&db).await.unwrap();

        let row = db
            .query_one(Statement::from_string(
                db.get_database_backend(),
                "SELECT COUNT(*) AS n FROM permissions WHERE role = 'Administrator'",
            ))
            .await
            .unwrap()
            .unwrap();
        let count: i64 = row.try_get("", "n").unwrap();
        assert_eq!(count, 13);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = init_database("sqlite::memory:").await.unwrap();
        migrate_database(&db).await.unwrap();
        migrate_database(&db).await.unwrap();
    }
}
