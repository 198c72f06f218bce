use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::audit::ActivityLogger;
use crate::config::AppSettings;
use crate::errors::InternalError;
use crate::providers::{
    CredentialCodec, CryptoProvider, LoginGuardProvider, PasswordPolicyProvider,
    PermissionProvider, SessionProvider,
};
use crate::stores::{
    ActivityStore, DbSessionStore, LoginAttemptStore, PermissionStore, SessionStore, UserStore,
};

/// Everything the coordinators share, built once at startup
///
/// ```text
/// main.rs / cli
///   ↓
/// AppData::init(db, settings)
///   ├─ stores      (user, login attempts, permissions, activity, sessions)
///   ├─ providers   (crypto, credential codec, login guard, sessions, permissions, policy)
///   └─ activity_logger
///   ↓ wrapped in Arc<AppData>
///   ├─ LoginCoordinator::new(app_data)
///   └─ AdminCoordinator::new(app_data)
/// ```
pub struct AppData {
    pub db: DatabaseConnection,
    pub settings: AppSettings,

    pub user_store: Arc<UserStore>,
    pub login_attempt_store: Arc<LoginAttemptStore>,
    pub permission_store: Arc<PermissionStore>,
    pub activity_store: Arc<ActivityStore>,
    pub session_store: Arc<dyn SessionStore>,

    pub crypto: Arc<CryptoProvider>,
    pub credential_codec: Arc<CredentialCodec>,
    pub login_guard: Arc<LoginGuardProvider>,
    pub session_provider: Arc<SessionProvider>,
    pub permission_provider: Arc<PermissionProvider>,
    pub password_policy: Arc<PasswordPolicyProvider>,

    pub activity_logger: Arc<ActivityLogger>,
}

impl AppData {
    /// Production wiring: sessions live in the database
    ///
    /// # Errors
    ///
    /// Returns `InternalError::Crypto` when the Argon2 settings are unusable
    pub async fn init(db: DatabaseConnection, settings: AppSettings) -> Result<Self, InternalError> {
        let session_store: Arc<dyn SessionStore> = Arc::new(DbSessionStore::new(db.clone()));
        Self::init_with_session_store(db, settings, session_store).await
    }

    /// Wiring with a caller-supplied session store
    pub async fn init_with_session_store(
        db: DatabaseConnection,
        settings: AppSettings,
        session_store: Arc<dyn SessionStore>,
    ) -> Result<Self, InternalError> {
        tracing::info!("Initializing AppData...");

        let user_store = Arc::new(UserStore::new());
        let login_attempt_store = Arc::new(LoginAttemptStore::new());
        let permission_store = Arc::new(PermissionStore::new());
        let activity_store = Arc::new(ActivityStore::new(db.clone()));
        tracing::debug!("Stores created");

        let crypto = Arc::new(CryptoProvider::new());
        let params = CredentialCodec::params_from(
            settings.argon2_memory_kib,
            settings.argon2_iterations,
            settings.argon2_parallelism,
        )?;
        let credential_codec = Arc::new(CredentialCodec::new(
            settings.password_pepper.clone(),
            params,
            crypto.clone(),
        )?);
        let login_guard = Arc::new(LoginGuardProvider::new(
            db.clone(),
            login_attempt_store.clone(),
            settings.max_failed_login_attempts,
            settings.lockout_minutes,
        ));
        let session_provider = Arc::new(SessionProvider::new(
            db.clone(),
            session_store.clone(),
            user_store.clone(),
            crypto.clone(),
            settings.session_ttl_hours,
        ));
        let permission_provider = Arc::new(PermissionProvider::new(
            db.clone(),
            permission_store.clone(),
        ));
        let password_policy = Arc::new(PasswordPolicyProvider::new());
        tracing::debug!("Providers created");

        let activity_logger = Arc::new(ActivityLogger::new(activity_store.clone()));

        tracing::info!("AppData initialization complete");

        Ok(Self {
            db,
            settings,
            user_store,
            login_attempt_store,
            permission_store,
            activity_store,
            session_store,
            crypto,
            credential_codec,
            login_guard,
            session_provider,
            permission_provider,
            password_policy,
            activity_logger,
        })
    }
}
