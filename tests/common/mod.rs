// Common test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use lvd_records_backend::AppData;
use lvd_records_backend::config::{AppSettings, init_database, migrate_database};
use lvd_records_backend::coordinators::{AdminCoordinator, LoginCoordinator};
use lvd_records_backend::stores::SessionStore;
use lvd_records_backend::types::internal::{LoginInput, LoginResult, RequestContext};
use sea_orm::DatabaseConnection;

/// Fresh in-memory database with migrations applied
pub async fn setup_test_db() -> DatabaseConnection {
    let db = init_database("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    migrate_database(&db)
        .await
        .expect("Failed to run migrations");
    db
}

/// Defaults with a cheap Argon2 work factor
pub fn test_settings() -> AppSettings {
    AppSettings {
        database_url: "sqlite::memory:".to_string(),
        argon2_memory_kib: 1024,
        argon2_iterations: 1,
        argon2_parallelism: 1,
        ..AppSettings::default()
    }
}

/// Everything wired over a fresh database, default accounts seeded
pub struct TestApp {
    pub app_data: Arc<AppData>,
    pub login: LoginCoordinator,
    pub admin: AdminCoordinator,
}

impl TestApp {
    pub async fn new() -> Self {
        let app_data = AppData::init(setup_test_db().await, test_settings())
            .await
            .expect("Failed to create AppData");
        Self::seeded(Arc::new(app_data)).await
    }

    pub async fn with_session_store(store: Arc<dyn SessionStore>) -> Self {
        let app_data = AppData::init_with_session_store(setup_test_db().await, test_settings(), store)
            .await
            .expect("Failed to create AppData");
        Self::seeded(Arc::new(app_data)).await
    }

    async fn seeded(app_data: Arc<AppData>) -> Self {
        let admin = AdminCoordinator::new(Arc::clone(&app_data));
        admin
            .seed_default_users(&RequestContext::for_cli("seed"))
            .await
            .expect("Failed to seed default users");

        Self {
            login: LoginCoordinator::new(Arc::clone(&app_data)),
            admin,
            app_data,
        }
    }

    pub async fn attempt(&self, username: &str, password: &str) -> LoginResult {
        self.login
            .login(&client_context(), LoginInput::new(username, password))
            .await
            .expect("login should not fail on storage")
    }

    pub async fn user_id(&self, username: &str) -> String {
        self.admin
            .require_user_by_username(username)
            .await
            .expect("user should exist")
            .id
    }
}

/// API context from a fixed desktop client
pub fn client_context() -> RequestContext {
    RequestContext::for_api(
        Some("192.168.1.50".parse().expect("valid ip")),
        Some("records-desktop/2.4".to_string()),
    )
}

/// Helper to manage environment variables in tests
///
/// Cleans up specified environment variables on creation and drop,
/// ensuring test isolation when dealing with global environment state.
pub struct EnvGuard {
    vars: Vec<String>,
}

impl EnvGuard {
    pub fn new(vars: Vec<&str>) -> Self {
        for var in &vars {
            unsafe {
                std::env::remove_var(var);
            }
        }
        Self {
            vars: vars.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for var in &self.vars {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }
}

/// Global mutex for tests that modify environment variables
///
/// Environment variables are process-global, so tests that modify them
/// must run serially to avoid race conditions.
pub static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());
