use std::sync::Arc;

use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::errors::InternalError;
use crate::providers::CryptoProvider;
use crate::stores::{SessionRecord, SessionStore, UserStore};
use crate::types::internal::{IssuedSession, Role, SessionInfo};

/// Issues, validates and ends sessions
///
/// Each session has a random id (lookup key) and a separate random bearer
/// token (the credential). Only the token's SHA-256 is stored. Expiry is
/// absolute from creation; validation never extends it.
pub struct SessionProvider {
    db: DatabaseConnection,
    store: Arc<dyn SessionStore>,
    user_store: Arc<UserStore>,
    crypto: Arc<CryptoProvider>,
    ttl_seconds: i64,
}

impl SessionProvider {
    pub fn new(
        db: DatabaseConnection,
        store: Arc<dyn SessionStore>,
        user_store: Arc<UserStore>,
        crypto: Arc<CryptoProvider>,
        ttl_hours: i64,
    ) -> Self {
        Self {
            db,
            store,
            user_store,
            crypto,
            ttl_seconds: ttl_hours * 3600,
        }
    }

    /// Start a session for `user_id`
    pub async fn create(
        &self,
        user_id: &str,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Result<IssuedSession, InternalError> {
        let now = Utc::now().timestamp();
        let token = self.crypto.generate_session_token();

        let record = SessionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_owned(),
            token_hash: self.crypto.hash_token(token.expose()),
            created_at: now,
            expires_at: now + self.ttl_seconds,
            last_seen_at: now,
            is_active: true,
            ip_address,
            user_agent,
        };

        let issued = IssuedSession {
            session_id: record.id.clone(),
            token,
            created_at: record.created_at,
            expires_at: record.expires_at,
        };

        self.store.insert(record).await?;
        tracing::debug!("Session {} created for user {}", issued.session_id, user_id);

        Ok(issued)
    }

    /// Resolve a token to its session and user
    ///
    /// `None` for unknown, logged-out or expired tokens, and for sessions
    /// whose user is gone or deactivated.
    pub async fn validate(&self, token: &str) -> Result<Option<SessionInfo>, InternalError> {
        if token.is_empty() {
            return Ok(None);
        }

        let now = Utc::now().timestamp();
        let token_hash = self.crypto.hash_token(token);

        let Some(record) = self.store.find_by_token_hash(&token_hash).await? else {
            tracing::debug!("Session token not recognised");
            return Ok(None);
        };
        if !record.is_valid_at(now) {
            tracing::debug!("Session {} is inactive or expired", record.id);
            return Ok(None);
        }

        let Some(user) = self.user_store.get_user_for_session(&self.db, &record.user_id).await? else {
            tracing::warn!("Session {} belongs to missing user {}", record.id, record.user_id);
            return Ok(None);
        };
        if !user.is_active {
            tracing::debug!("Session {} belongs to inactive user {}", record.id, user.id);
            return Ok(None);
        }

        let role: Role = user
            .role
            .parse()
            .map_err(|_| InternalError::parse("role", format!("unknown role '{}'", user.role)))?;

        self.store.touch(&record.id, now).await?;

        Ok(Some(SessionInfo {
            session_id: record.id,
            user_id: user.id,
            username: user.username,
            role,
            created_at: record.created_at,
            expires_at: record.expires_at,
        }))
    }

    /// End the session holding `token`; false when none was active
    pub async fn invalidate(&self, token: &str) -> Result<bool, InternalError> {
        if token.is_empty() {
            return Ok(false);
        }
        let token_hash = self.crypto.hash_token(token);
        self.store.deactivate_by_token_hash(&token_hash).await
    }

    /// End every session of a user, optionally keeping one
    pub async fn invalidate_all_for_user(
        &self,
        user_id: &str,
        except_session_id: Option<&str>,
    ) -> Result<u64, InternalError> {
        self.store.deactivate_for_user(user_id, except_session_id).await
    }

    /// Delete sessions that are logged out or past expiry
    pub async fn cleanup_expired(&self) -> Result<u64, InternalError> {
        self.store.delete_stale(Utc::now().timestamp()).await
    }
}
