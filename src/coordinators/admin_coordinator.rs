use std::sync::Arc;

use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::app_data::AppData;
use crate::audit::ActivityLogger;
use crate::errors::InternalError;
use crate::errors::internal::{AccountError, ValidationError};
use crate::providers::account_validator::{validate_email, validate_username};
use crate::providers::{
    CredentialCodec, CryptoProvider, LoginGuardProvider, PasswordPolicyProvider, SessionProvider,
};
use crate::stores::{NewUserRecord, UserStore, seed};
use crate::types::internal::{
    ActivityLogRecord, NewUser, RequestContext, Role, UserProfile, UserSummary,
};

pub const DEFAULT_ACTIVITY_LIMIT: u64 = 100;
pub const MAX_ACTIVITY_LIMIT: u64 = 1000;

/// Administrative account operations
///
/// Permission checks happen at the API boundary; everything here assumes
/// the caller is allowed. Storage failures are recorded as `system_error`
/// entries before being returned.
pub struct AdminCoordinator {
    db: DatabaseConnection,
    user_store: Arc<UserStore>,
    crypto: Arc<CryptoProvider>,
    credential_codec: Arc<CredentialCodec>,
    login_guard: Arc<LoginGuardProvider>,
    session_provider: Arc<SessionProvider>,
    password_policy: Arc<PasswordPolicyProvider>,
    activity_logger: Arc<ActivityLogger>,
}

impl AdminCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.db.clone(),
            user_store: app_data.user_store.clone(),
            crypto: app_data.crypto.clone(),
            credential_codec: app_data.credential_codec.clone(),
            login_guard: app_data.login_guard.clone(),
            session_provider: app_data.session_provider.clone(),
            password_policy: app_data.password_policy.clone(),
            activity_logger: app_data.activity_logger.clone(),
        }
    }

    /// Pass a result through, recording storage failures
    async fn reported<T>(
        &self,
        ctx: &RequestContext,
        user_id: Option<&str>,
        operation: &str,
        result: Result<T, InternalError>,
    ) -> Result<T, InternalError> {
        if let Err(e) = &result {
            if e.is_storage() {
                self.activity_logger
                    .log_system_error(ctx, user_id, operation, e)
                    .await;
            }
        }
        result
    }

    /// Lock an account for `minutes`, or the configured lockout when `None`
    ///
    /// Returns false when the user does not exist.
    pub async fn lock_account(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        minutes: Option<i64>,
    ) -> Result<bool, InternalError> {
        let minutes = minutes.unwrap_or_else(|| self.login_guard.lockout_minutes());
        let result = self.login_guard.lock(user_id, minutes).await;
        let locked = self.reported(ctx, Some(user_id), "Lock account", result).await?;

        if locked {
            self.activity_logger
                .log_account_locked(ctx, user_id, minutes, "administrative lock")
                .await;
        }
        Ok(locked)
    }

    /// Clear the lock and the failure counter
    pub async fn unlock_account(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<bool, InternalError> {
        let result = self.login_guard.reset(user_id).await;
        let unlocked = self.reported(ctx, Some(user_id), "Unlock account", result).await?;

        if unlocked {
            tracing::info!("User {} unlocked by {}", user_id, ctx.actor_id);
            self.activity_logger.log_account_unlocked(ctx, user_id).await;
        }
        Ok(unlocked)
    }

    /// Activate or deactivate an account
    ///
    /// Deactivation ends every session of the user.
    pub async fn set_active(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        is_active: bool,
    ) -> Result<bool, InternalError> {
        let result: Result<Option<u64>, InternalError> = async {
            let now = Utc::now().timestamp();
            if !self.user_store.set_active(&self.db, user_id, is_active, now).await? {
                return Ok(None);
            }
            let ended = if is_active {
                0
            } else {
                self.session_provider.invalidate_all_for_user(user_id, None).await?
            };
            Ok(Some(ended))
        }
        .await;

        let Some(ended) = self.reported(ctx, Some(user_id), "Set account status", result).await? else {
            return Ok(false);
        };

        tracing::info!(
            "User {} {} by {}",
            user_id,
            if is_active { "activated" } else { "deactivated" },
            ctx.actor_id
        );
        self.activity_logger
            .log_status_change(ctx, user_id, is_active, ended)
            .await;
        Ok(true)
    }

    /// Newest entries first, optionally for one user
    ///
    /// `limit` defaults to 100 and is clamped to 1..=1000.
    pub async fn get_activity_log(
        &self,
        user_id: Option<&str>,
        limit: Option<u64>,
    ) -> Result<Vec<ActivityLogRecord>, InternalError> {
        let limit = limit
            .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
            .clamp(1, MAX_ACTIVITY_LIMIT);
        self.activity_logger.query(user_id, limit).await
    }

    /// Create an account with a caller-chosen password
    pub async fn create_user(
        &self,
        ctx: &RequestContext,
        new_user: NewUser,
    ) -> Result<UserSummary, InternalError> {
        let username = new_user.username.trim().to_owned();
        validate_username(&username)?;
        if new_user.password.is_empty() {
            return Err(ValidationError::MissingField("password").into());
        }
        self.password_policy
            .validate(&new_user.password, Some(&username))
            .map_err(ValidationError::from)?;
        let profile = new_user.profile.normalized();
        if let Some(email) = &profile.email {
            validate_email(email)?;
        }

        let credential = self.credential_codec.hash(&new_user.password)?;
        let now = Utc::now().timestamp();
        let record = NewUserRecord {
            username,
            credential,
            role: new_user.role.as_str().to_owned(),
            created_by: ctx.session.as_ref().map(|s| s.user_id.clone()),
            profile,
            password_changed_at: Some(now),
            created_at: now,
        };

        let result = self.user_store.insert_user(&self.db, record).await;
        let model = self.reported(ctx, None, "Create user", result).await?;

        tracing::info!("User {} created by {}", model.username, ctx.actor_id);
        self.activity_logger
            .log_user_created(ctx, &model.id, &model.username, &model.role)
            .await;

        Ok(UserSummary::from(model))
    }

    /// Create an account with a generated password, returned once
    pub async fn create_user_with_generated_password(
        &self,
        ctx: &RequestContext,
        username: &str,
        role: Role,
        profile: UserProfile,
    ) -> Result<(UserSummary, String), InternalError> {
        validate_username(username.trim())?;

        let mut password = self.crypto.generate_secure_password();
        // A generated password may by chance contain a short username
        while password.to_lowercase().contains(&username.to_lowercase()) {
            password = self.crypto.generate_secure_password();
        }

        let summary = self
            .create_user(
                ctx,
                NewUser {
                    username: username.to_owned(),
                    password: password.clone(),
                    role,
                    profile,
                },
            )
            .await?;

        Ok((summary, password))
    }

    /// Patch the profile fields; omitted fields are kept, blank ones cleared
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        profile: UserProfile,
    ) -> Result<bool, InternalError> {
        let profile = profile.trimmed();
        if let Some(email) = profile.email.as_deref().filter(|e| !e.is_empty()) {
            validate_email(email)?;
        }

        let now = Utc::now().timestamp();
        let result = self.user_store.update_profile(&self.db, user_id, &profile, now).await;
        let updated = self.reported(ctx, Some(user_id), "Update profile", result).await?;

        if updated {
            self.activity_logger.log_profile_updated(ctx, user_id).await;
        }
        Ok(updated)
    }

    pub async fn list_users(&self) -> Result<Vec<UserSummary>, InternalError> {
        let users = self.user_store.list_users(&self.db).await?;
        Ok(users.into_iter().map(UserSummary::from).collect())
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<UserSummary>, InternalError> {
        Ok(self
            .user_store
            .find_by_id(&self.db, user_id)
            .await?
            .map(UserSummary::from))
    }

    /// Resolve a username to its account; `UserNotFound` when absent
    pub async fn require_user_by_username(&self, username: &str) -> Result<UserSummary, InternalError> {
        self.user_store
            .find_by_username(&self.db, username)
            .await?
            .map(UserSummary::from)
            .ok_or_else(|| AccountError::UserNotFound(username.to_owned()).into())
    }

    /// Delete logged-out and expired sessions
    pub async fn cleanup_expired_sessions(&self, ctx: &RequestContext) -> Result<u64, InternalError> {
        let result = self.session_provider.cleanup_expired().await;
        let removed = self.reported(ctx, None, "Session cleanup", result).await?;

        if removed > 0 {
            tracing::info!("Removed {} stale sessions", removed);
            self.activity_logger.log_sessions_cleaned(ctx, removed).await;
        } else {
            tracing::debug!("No stale sessions to remove");
        }
        Ok(removed)
    }

    /// Insert the development accounts that are missing
    pub async fn seed_default_users(&self, ctx: &RequestContext) -> Result<Vec<String>, InternalError> {
        let now = Utc::now().timestamp();
        let result = seed::seed_default_users(&self.db, &self.user_store, now).await;
        let created = self.reported(ctx, None, "Seed default users", result).await?;

        for username in &created {
            if let Some(user) = self.user_store.find_by_username(&self.db, username).await? {
                self.activity_logger
                    .log_user_created(ctx, &user.id, &user.username, &user.role)
                    .await;
            }
        }
        Ok(created)
    }
}
