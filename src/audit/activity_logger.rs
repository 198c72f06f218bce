use std::sync::Arc;

use crate::audit::ActivityBuilder;
use crate::errors::InternalError;
use crate::stores::ActivityStore;
use crate::types::internal::{ActivityLogRecord, ActivityType, RequestContext, RequestSource};

/// Writes and reads the activity log
///
/// Every `log_*` method swallows its own failure after reporting it through
/// `tracing`, so the operation being described is never blocked or rolled
/// back by a logging problem.
pub struct ActivityLogger {
    store: Arc<ActivityStore>,
}

impl ActivityLogger {
    pub fn new(store: Arc<ActivityStore>) -> Self {
        Self { store }
    }

    pub fn builder(&self, activity_type: ActivityType) -> ActivityBuilder {
        ActivityBuilder::new(self.store.clone(), activity_type)
    }

    /// Newest first, at most `limit` entries
    pub async fn query(
        &self,
        user_id: Option<&str>,
        limit: u64,
    ) -> Result<Vec<ActivityLogRecord>, InternalError> {
        self.store.query(user_id, limit).await
    }

    pub async fn log_login_success(&self, ctx: &RequestContext, user_id: &str, upgraded: bool) {
        let mut builder = self
            .builder(ActivityType::LoginSuccess)
            .with_context(ctx)
            .user_id(user_id)
            .describe("Login successful");
        if upgraded {
            builder = builder.detail("credential", "upgraded");
        }
        builder.record().await;
    }

    /// `user_id` is `None` when the username did not match any account
    pub async fn log_login_failed(
        &self,
        ctx: &RequestContext,
        user_id: Option<&str>,
        reason: &str,
    ) {
        let mut builder = self
            .builder(ActivityType::LoginFailed)
            .with_context(ctx)
            .describe(format!("Login failed: {}", reason));
        if let Some(user_id) = user_id {
            builder = builder.user_id(user_id);
        }
        builder.record().await;
    }

    /// Failed login for a username with no account
    ///
    /// The attempted name is stored only as a fingerprint, since users
    /// sometimes type their password into the username field.
    pub async fn log_unknown_user(&self, ctx: &RequestContext, attempted_username: &str) {
        self.builder(ActivityType::LoginFailed)
            .with_context(ctx)
            .describe("Login failed: unknown username")
            .sensitive("username", attempted_username)
            .record()
            .await;
    }

    pub async fn log_account_locked(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        minutes: i64,
        reason: &str,
    ) {
        self.builder(ActivityType::AccountLocked)
            .with_context(ctx)
            .user_id(user_id)
            .describe(format!("Account locked for {} minutes: {}", minutes, reason))
            .detail("by", &ctx.actor_id)
            .record()
            .await;
    }

    pub async fn log_account_unlocked(&self, ctx: &RequestContext, user_id: &str) {
        self.builder(ActivityType::AccountUnlocked)
            .with_context(ctx)
            .user_id(user_id)
            .describe("Account unlocked")
            .detail("by", &ctx.actor_id)
            .record()
            .await;
    }

    pub async fn log_status_change(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        is_active: bool,
        sessions_ended: u64,
    ) {
        let state = if is_active { "activated" } else { "deactivated" };
        self.builder(ActivityType::StatusChange)
            .with_context(ctx)
            .user_id(user_id)
            .describe(format!("Account {}", state))
            .detail("by", &ctx.actor_id)
            .detail("sessions_ended", sessions_ended)
            .record()
            .await;
    }

    /// Storage failure during `operation`; the error detail stays in tracing
    pub async fn log_system_error(
        &self,
        ctx: &RequestContext,
        user_id: Option<&str>,
        operation: &str,
        error: &InternalError,
    ) {
        tracing::error!("{} failed: {}", operation, error);
        let mut builder = self
            .builder(ActivityType::SystemError)
            .with_context(ctx)
            .describe(format!("{} failed", operation))
            .detail("request_id", &ctx.request_id);
        if let Some(user_id) = user_id {
            builder = builder.user_id(user_id);
        }
        builder.record().await;
    }

    pub async fn log_logout(&self, ctx: &RequestContext, user_id: &str) {
        self.builder(ActivityType::Logout)
            .with_context(ctx)
            .user_id(user_id)
            .describe("Logged out")
            .record()
            .await;
    }

    pub async fn log_password_changed(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        sessions_ended: u64,
    ) {
        self.builder(ActivityType::PasswordChanged)
            .with_context(ctx)
            .user_id(user_id)
            .describe("Password changed")
            .detail("other_sessions_ended", sessions_ended)
            .record()
            .await;
    }

    pub async fn log_user_created(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        username: &str,
        role: &str,
    ) {
        self.builder(ActivityType::UserCreated)
            .with_context(ctx)
            .user_id(user_id)
            .describe(format!("User {} created with role {}", username, role))
            .detail("by", &ctx.actor_id)
            .record()
            .await;
    }

    pub async fn log_profile_updated(&self, ctx: &RequestContext, user_id: &str) {
        self.builder(ActivityType::ProfileUpdated)
            .with_context(ctx)
            .user_id(user_id)
            .describe("Profile updated")
            .detail("by", &ctx.actor_id)
            .record()
            .await;
    }

    pub async fn log_sessions_cleaned(&self, ctx: &RequestContext, removed: u64) {
        self.builder(ActivityType::SessionsCleaned)
            .with_context(ctx)
            .describe(format!("Removed {} stale sessions", removed))
            .detail("by", &ctx.actor_id)
            .record()
            .await;
    }

    /// CLI invocation; ignored for contexts that did not come from the CLI
    pub async fn log_cli_command(&self, ctx: &RequestContext, outcome: &str) {
        if ctx.source != RequestSource::CLI {
            return;
        }
        self.builder(ActivityType::CliCommand)
            .describe(format!("{} {}", ctx.actor_id, outcome))
            .detail("request_id", &ctx.request_id)
            .record()
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{insert_plain_user, setup_test_db};
    use sea_orm::DbErr;

    async fn logger() -> (sea_orm::DatabaseConnection, ActivityLogger) {
        let db = setup_test_db().await;
        let logger = ActivityLogger::new(Arc::new(ActivityStore::new(db.clone())));
        (db, logger)
    }

    #[tokio::test]
    async fn test_failed_login_for_unknown_user_has_no_user() {
        let (_db, logger) = logger().await;
        let ctx = RequestContext::for_api(Some("10.0.0.9".parse().unwrap()), None);

        logger.log_login_failed(&ctx, None, "unknown username").await;

        let entries = logger.query(None, 10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].activity_type, "login_failed");
        assert_eq!(entries[0].user_id, None);
        assert_eq!(entries[0].ip_address.as_deref(), Some("10.0.0.9"));
    }

    #[tokio::test]
    async fn test_unknown_username_is_fingerprinted() {
        let (_db, logger) = logger().await;

        logger.log_unknown_user(&RequestContext::for_system("test"), "Hunter2-oops").await;

        let entries = logger.query(None, 10).await.unwrap();
        assert_eq!(entries[0].activity_type, "login_failed");
        assert!(entries[0].description.contains("username=sha256:"));
        assert!(!entries[0].description.contains("Hunter2-oops"));
    }

    #[tokio::test]
    async fn test_lock_entry_names_actor() {
        let (db, logger) = logger().await;
        let user_id = insert_plain_user(&db, "LVD-CLERK", "password", "User").await;
        let ctx = RequestContext::for_cli("user lock");

        logger.log_account_locked(&ctx, &user_id, 30, "administrative lock").await;

        let entries = logger.query(Some(&user_id), 10).await.unwrap();
        assert_eq!(
            entries[0].description,
            "Account locked for 30 minutes: administrative lock (by=cli:user lock)"
        );
        assert_eq!(entries[0].username.as_deref(), Some("LVD-CLERK"));
    }

    #[tokio::test]
    async fn test_system_error_does_not_leak_detail() {
        let (_db, logger) = logger().await;
        let ctx = RequestContext::for_system("test");
        let err = InternalError::database("insert_session", DbErr::Custom("secret path /var/db".into()));

        logger.log_system_error(&ctx, None, "Login", &err).await;

        let entries = logger.query(None, 1).await.unwrap();
        assert_eq!(entries[0].activity_type, "system_error");
        assert!(!entries[0].description.contains("/var/db"));
    }

    #[tokio::test]
    async fn test_cli_command_only_logged_for_cli() {
        let (_db, logger) = logger().await;

        logger.log_cli_command(&RequestContext::for_system("sweep"), "started").await;
        assert!(logger.query(None, 10).await.unwrap().is_empty());

        logger.log_cli_command(&RequestContext::for_cli("seed"), "completed").await;
        let entries = logger.query(None, 10).await.unwrap();
        assert_eq!(entries[0].activity_type, "cli_command");
        assert!(entries[0].description.starts_with("cli:seed completed"));
    }

    #[tokio::test]
    async fn test_write_failure_is_swallowed() {
        let (db, logger) = logger().await;
        db.close().await.unwrap();

        // Must return normally even though the database is gone
        logger.log_logout(&RequestContext::for_system("test"), "u-1").await;
    }
}
