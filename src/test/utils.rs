// Test utilities shared by the unit tests
// Only compiled when running tests

use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

use crate::app_data::AppData;
use crate::config::AppSettings;
use crate::stores::{NewUserRecord, UserStore};
use crate::types::internal::{RequestContext, UserProfile};

/// Fresh in-memory database with every migration applied
///
/// `sqlite::memory:` gives each connection pool its own database, so tests
/// never see each other's rows.
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Insert an active account whose credential is stored as given
///
/// Pass a plaintext password to get a legacy account, or a PHC string to
/// get an already-hashed one. Returns the new user's id.
pub async fn insert_plain_user(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    role: &str,
) -> String {
    UserStore::new()
        .insert_user(
            db,
            NewUserRecord {
                username: username.to_string(),
                credential: password.to_string(),
                role: role.to_string(),
                created_by: None,
                profile: UserProfile::default(),
                password_changed_at: None,
                created_at: chrono::Utc::now().timestamp(),
            },
        )
        .await
        .expect("Failed to insert test user")
        .id
}

/// Default settings with an Argon2 work factor small enough for tests
pub fn test_settings() -> AppSettings {
    AppSettings {
        database_url: "sqlite::memory:".to_string(),
        argon2_memory_kib: 1024,
        argon2_iterations: 1,
        argon2_parallelism: 1,
        ..AppSettings::default()
    }
}

/// AppData over a fresh database with database-backed sessions
pub async fn setup_test_app_data() -> Arc<AppData> {
    let db = setup_test_db().await;
    Arc::new(
        AppData::init(db, test_settings())
            .await
            .expect("Failed to create AppData"),
    )
}

/// Anonymous API context from a fixed client
pub fn api_context() -> RequestContext {
    RequestContext::for_api(
        Some("192.168.1.20".parse().expect("valid test ip")),
        Some("records-desktop/2.4".to_string()),
    )
}
