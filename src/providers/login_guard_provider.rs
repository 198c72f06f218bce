use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::errors::InternalError;
use crate::errors::internal::{AccountError, ValidationError};
use crate::stores::LoginAttemptStore;

/// Longest lock an administrator may apply (one year)
pub const MAX_LOCK_MINUTES: i64 = 60 * 24 * 365;

/// Per-account failed-login counter and timed lock
///
/// The only component that writes `failed_login_attempts` and `lock_until`.
/// There is no per-IP or global throttle; an attacker rotating usernames is
/// only slowed by Argon2 itself.
pub struct LoginGuardProvider {
    db: DatabaseConnection,
    store: Arc<LoginAttemptStore>,
    max_failed_attempts: u32,
    lockout_minutes: i64,
}

impl LoginGuardProvider {
    pub fn new(
        db: DatabaseConnection,
        store: Arc<LoginAttemptStore>,
        max_failed_attempts: u32,
        lockout_minutes: i64,
    ) -> Self {
        Self {
            db,
            store,
            max_failed_attempts,
            lockout_minutes,
        }
    }

    pub fn max_failed_attempts(&self) -> u32 {
        self.max_failed_attempts
    }

    pub fn lockout_minutes(&self) -> i64 {
        self.lockout_minutes
    }

    /// Whether `attempts` failures should lock the account
    pub fn threshold_reached(&self, attempts: u32) -> bool {
        attempts >= self.max_failed_attempts
    }

    /// Count one more failure and return the new total
    ///
    /// A lock that has already lapsed is cleared first, so its old count does
    /// not carry over.
    pub async fn record_failure(&self, user_id: &str) -> Result<u32, InternalError> {
        let now = Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(InternalError::transaction_begin)?;

        self.store.clear_expired_lock(&txn, user_id, now).await?;
        if !self.store.increment_failed_attempts(&txn, user_id).await? {
            return Err(AccountError::UserNotFound(user_id.to_owned()).into());
        }
        let state = self
            .store
            .get_lock_state(&txn, user_id)
            .await?
            .ok_or_else(|| AccountError::UserNotFound(user_id.to_owned()))?;

        txn.commit().await.map_err(InternalError::transaction_commit)?;

        let attempts = u32::try_from(state.failed_login_attempts).unwrap_or(0);
        tracing::debug!("Failed login {} recorded for user {}", attempts, user_id);
        Ok(attempts)
    }

    /// Lock until now + `minutes`; false when the user does not exist
    pub async fn lock(&self, user_id: &str, minutes: i64) -> Result<bool, InternalError> {
        if !(1..=MAX_LOCK_MINUTES).contains(&minutes) {
            return Err(ValidationError::InvalidLockDuration {
                got: minutes,
                max: MAX_LOCK_MINUTES,
            }
            .into());
        }

        let lock_until = Utc::now().timestamp() + minutes * 60;
        let locked = self.store.set_lock_until(&self.db, user_id, lock_until).await?;
        if locked {
            tracing::info!("User {} locked for {} minutes", user_id, minutes);
        }
        Ok(locked)
    }

    /// Lock with the configured lockout duration
    pub async fn lock_default(&self, user_id: &str) -> Result<bool, InternalError> {
        self.lock(user_id, self.lockout_minutes).await
    }

    /// True while a lock-until timestamp is in the future; never writes
    pub async fn is_locked(&self, user_id: &str) -> Result<bool, InternalError> {
        Ok(self.lock_until(user_id).await?.is_some())
    }

    /// The lock expiry if a lock is currently in force
    pub async fn lock_until(&self, user_id: &str) -> Result<Option<i64>, InternalError> {
        let now = Utc::now().timestamp();
        let state = self.store.get_lock_state(&self.db, user_id).await?;
        Ok(state
            .and_then(|s| s.lock_until)
            .filter(|until| now < *until))
    }

    /// Zero the counter and clear any lock
    pub async fn reset(&self, user_id: &str) -> Result<bool, InternalError> {
        self.store.clear(&self.db, user_id).await
    }
}
