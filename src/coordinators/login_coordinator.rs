use std::sync::Arc;

use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::app_data::AppData;
use crate::audit::ActivityLogger;
use crate::errors::InternalError;
use crate::errors::internal::{AccountError, PasswordPolicyError, ValidationError};
use crate::providers::{
    CredentialCodec, LoginGuardProvider, PasswordPolicyProvider, PermissionMap,
    PermissionProvider, SessionProvider,
};
use crate::stores::{UserForAuth, UserStore};
use crate::types::internal::{LoginInput, LoginResult, RequestContext, Role, SessionInfo};

/// Login sequence and the operations of an authenticated session
///
/// The login steps always run in the same order:
/// lookup, lock check, active check, verify, then either the failure path
/// (count, maybe lock) or the success path (upgrade legacy credential,
/// reset counter, stamp last login, issue session). Each finished attempt
/// writes exactly one activity entry.
pub struct LoginCoordinator {
    db: DatabaseConnection,
    user_store: Arc<UserStore>,
    credential_codec: Arc<CredentialCodec>,
    login_guard: Arc<LoginGuardProvider>,
    session_provider: Arc<SessionProvider>,
    permission_provider: Arc<PermissionProvider>,
    password_policy: Arc<PasswordPolicyProvider>,
    activity_logger: Arc<ActivityLogger>,
}

impl LoginCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.db.clone(),
            user_store: app_data.user_store.clone(),
            credential_codec: app_data.credential_codec.clone(),
            login_guard: app_data.login_guard.clone(),
            session_provider: app_data.session_provider.clone(),
            permission_provider: app_data.permission_provider.clone(),
            password_policy: app_data.password_policy.clone(),
            activity_logger: app_data.activity_logger.clone(),
        }
    }

    /// Run one login attempt
    ///
    /// Rejections are `Ok` results. `Err` means storage or hashing failed;
    /// a `system_error` entry is attempted before the error is returned.
    pub async fn login(
        &self,
        ctx: &RequestContext,
        input: LoginInput,
    ) -> Result<LoginResult, InternalError> {
        let username = input.username.trim();
        if username.is_empty() || input.password.is_empty() {
            tracing::debug!("Login rejected: missing fields");
            return Ok(LoginResult::RejectedMissingFields);
        }

        let result = match self.user_store.get_user_for_auth(&self.db, username).await {
            Ok(Some(user)) => self.authenticate(ctx, &user, &input.password).await,
            Ok(None) => {
                self.credential_codec.burn_verification(&input.password);
                self.activity_logger.log_unknown_user(ctx, username).await;
                Ok(LoginResult::RejectedInvalidCredentials)
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(result) => {
                tracing::info!(
                    "Login for '{}' from {}: {}",
                    username,
                    ctx.ip_string().unwrap_or_else(|| "unknown".to_string()),
                    result.label()
                );
                Ok(result)
            }
            Err(e) => {
                self.activity_logger
                    .log_system_error(ctx, None, "Login", &e)
                    .await;
                Err(e)
            }
        }
    }

    async fn authenticate(
        &self,
        ctx: &RequestContext,
        user: &UserForAuth,
        password: &str,
    ) -> Result<LoginResult, InternalError> {
        if let Some(lock_until) = self.login_guard.lock_until(&user.id).await? {
            self.activity_logger
                .log_login_failed(ctx, Some(&user.id), "account locked")
                .await;
            return Ok(LoginResult::RejectedLocked {
                lock_until: Some(lock_until),
            });
        }

        if !user.is_active {
            self.activity_logger
                .log_login_failed(ctx, Some(&user.id), "account inactive")
                .await;
            return Ok(LoginResult::RejectedInactive);
        }

        if !self.credential_codec.verify(password, &user.password) {
            return self.handle_failure(ctx, user).await;
        }

        self.handle_success(ctx, user, password).await
    }

    async fn handle_failure(
        &self,
        ctx: &RequestContext,
        user: &UserForAuth,
    ) -> Result<LoginResult, InternalError> {
        let attempts = self.login_guard.record_failure(&user.id).await?;

        if self.login_guard.threshold_reached(attempts) {
            self.login_guard.lock_default(&user.id).await?;
            tracing::warn!(
                "User {} locked after {} failed login attempts",
                user.username,
                attempts
            );
            self.activity_logger
                .log_account_locked(
                    ctx,
                    &user.id,
                    self.login_guard.lockout_minutes(),
                    &format!("{} failed login attempts", attempts),
                )
                .await;
        } else {
            self.activity_logger
                .log_login_failed(ctx, Some(&user.id), "invalid password")
                .await;
        }

        Ok(LoginResult::RejectedInvalidCredentials)
    }

    async fn handle_success(
        &self,
        ctx: &RequestContext,
        user: &UserForAuth,
        password: &str,
    ) -> Result<LoginResult, InternalError> {
        let role: Role = user
            .role
            .parse()
            .map_err(|_| InternalError::parse("role", format!("unknown role '{}'", user.role)))?;
        let now = Utc::now().timestamp();

        let upgraded = CredentialCodec::is_legacy_plaintext(&user.password);
        if upgraded {
            let credential = self.credential_codec.hash(password)?;
            self.user_store
                .update_credential(&self.db, &user.id, &credential, None, now)
                .await?;
            tracing::info!("Legacy credential upgraded for user {}", user.username);
        }

        self.login_guard.reset(&user.id).await?;
        self.user_store.update_last_login(&self.db, &user.id, now).await?;

        let session = self
            .session_provider
            .create(&user.id, ctx.ip_string(), ctx.user_agent.clone())
            .await?;

        self.activity_logger
            .log_login_success(ctx, &user.id, upgraded)
            .await;

        Ok(LoginResult::Accepted {
            session,
            user_id: user.id.clone(),
            username: user.username.clone(),
            role,
        })
    }

    /// The session behind a bearer token, if it is still valid
    pub async fn validate_session(&self, token: &str) -> Result<Option<SessionInfo>, InternalError> {
        self.session_provider.validate(token).await
    }

    /// End the session holding `token`
    ///
    /// Returns false when nothing was active, so a repeated logout is harmless.
    pub async fn logout(&self, ctx: &RequestContext, token: &str) -> Result<bool, InternalError> {
        let session = self.session_provider.validate(token).await?;
        let ended = self.session_provider.invalidate(token).await?;

        if let (true, Some(session)) = (ended, session) {
            self.activity_logger.log_logout(ctx, &session.user_id).await;
        }

        Ok(ended)
    }

    /// Replace the session owner's password
    ///
    /// Every other session of the user is ended; the calling session stays.
    /// Returns how many sessions were ended.
    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        session: &SessionInfo,
        current_password: &str,
        new_password: &str,
    ) -> Result<u64, InternalError> {
        if current_password.is_empty() {
            return Err(ValidationError::MissingField("current_password").into());
        }
        if new_password.is_empty() {
            return Err(ValidationError::MissingField("new_password").into());
        }

        let user = self
            .user_store
            .find_by_id(&self.db, &session.user_id)
            .await?
            .ok_or_else(|| AccountError::UserNotFound(session.user_id.clone()))?;

        if !self.credential_codec.verify(current_password, &user.password) {
            tracing::warn!("Password change for {} rejected: wrong current password", user.username);
            return Err(AccountError::IncorrectPassword.into());
        }
        if current_password == new_password {
            return Err(ValidationError::from(PasswordPolicyError::SameAsCurrent).into());
        }
        self.password_policy
            .validate(new_password, Some(&user.username))
            .map_err(ValidationError::from)?;

        let credential = self.credential_codec.hash(new_password)?;
        let now = Utc::now().timestamp();

        let result: Result<u64, InternalError> = async {
            self.user_store
                .update_credential(&self.db, &user.id, &credential, Some(now), now)
                .await?;
            self.session_provider
                .invalidate_all_for_user(&user.id, Some(&session.session_id))
                .await
        }
        .await;

        match result {
            Ok(ended) => {
                tracing::info!("Password changed for {}; {} other sessions ended", user.username, ended);
                self.activity_logger
                    .log_password_changed(ctx, &user.id, ended)
                    .await;
                Ok(ended)
            }
            Err(e) => {
                self.activity_logger
                    .log_system_error(ctx, Some(&user.id), "Password change", &e)
                    .await;
                Err(e)
            }
        }
    }

    /// Authoritative allow-list lookup
    pub async fn check_permission(
        &self,
        role: &str,
        resource: &str,
        action: &str,
    ) -> Result<bool, InternalError> {
        self.permission_provider.is_allowed(role, resource, action).await
    }

    /// Resource to action map for a role, for client-side gating
    pub async fn permissions_for(&self, role: &str) -> Result<PermissionMap, InternalError> {
        self.permission_provider.permissions_for(role).await
    }
}
