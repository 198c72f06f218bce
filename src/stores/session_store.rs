use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
    sea_query::Expr,
};
use tokio::sync::RwLock;

use crate::errors::InternalError;
use crate::types::db::session;

/// One stored session, keyed by id and looked up by token digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: String,
    pub user_id: String,
    pub token_hash: String,
    pub created_at: i64,
    pub expires_at: i64,
    pub last_seen_at: i64,
    pub is_active: bool,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl SessionRecord {
    /// Active and not yet at its expiry
    pub fn is_valid_at(&self, now: i64) -> bool {
        self.is_active && now < self.expires_at
    }
}

impl From<session::Model> for SessionRecord {
    fn from(model: session::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            token_hash: model.token_hash,
            created_at: model.created_at,
            expires_at: model.expires_at,
            last_seen_at: model.last_seen_at,
            is_active: model.is_active,
            ip_address: model.ip_address,
            user_agent: model.user_agent,
        }
    }
}

/// Storage for sessions
///
/// Production uses `DbSessionStore`; `InMemorySessionStore` backs tests that
/// do not need a database. Exactly one of them is wired into `AppData`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, record: SessionRecord) -> Result<(), InternalError>;

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<SessionRecord>, InternalError>;

    /// Record activity; never moves `expires_at`
    async fn touch(&self, session_id: &str, seen_at: i64) -> Result<(), InternalError>;

    /// Mark the session inactive; false when nothing active matched
    async fn deactivate_by_token_hash(&self, token_hash: &str) -> Result<bool, InternalError>;

    /// Deactivate every active session of a user, optionally sparing one
    async fn deactivate_for_user(
        &self,
        user_id: &str,
        except_session_id: Option<&str>,
    ) -> Result<u64, InternalError>;

    /// Remove rows that are inactive or expired at `now`
    async fn delete_stale(&self, now: i64) -> Result<u64, InternalError>;
}

/// `sessions` table
pub struct DbSessionStore {
    db: DatabaseConnection,
}

impl DbSessionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for DbSessionStore {
    async fn insert(&self, record: SessionRecord) -> Result<(), InternalError> {
        let model = session::ActiveModel {
            id: Set(record.id),
            user_id: Set(record.user_id),
            token_hash: Set(record.token_hash),
            created_at: Set(record.created_at),
            expires_at: Set(record.expires_at),
            last_seen_at: Set(record.last_seen_at),
            is_active: Set(record.is_active),
            ip_address: Set(record.ip_address),
            user_agent: Set(record.user_agent),
        };

        model
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("insert_session", e))?;

        Ok(())
    }

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<SessionRecord>, InternalError> {
        let model = session::Entity::find()
            .filter(session::Column::TokenHash.eq(token_hash))
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_session_by_token_hash", e))?;

        Ok(model.map(SessionRecord::from))
    }

    async fn touch(&self, session_id: &str, seen_at: i64) -> Result<(), InternalError> {
        session::Entity::update_many()
            .col_expr(session::Column::LastSeenAt, Expr::value(seen_at))
            .filter(session::Column::Id.eq(session_id))
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("touch_session", e))?;

        Ok(())
    }

    async fn deactivate_by_token_hash(&self, token_hash: &str) -> Result<bool, InternalError> {
        let result = session::Entity::update_many()
            .col_expr(session::Column::IsActive, Expr::value(false))
            .filter(session::Column::TokenHash.eq(token_hash))
            .filter(session::Column::IsActive.eq(true))
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("deactivate_session", e))?;

        Ok(result.rows_affected > 0)
    }

    async fn deactivate_for_user(
        &self,
        user_id: &str,
        except_session_id: Option<&str>,
    ) -> Result<u64, InternalError> {
        let mut query = session::Entity::update_many()
            .col_expr(session::Column::IsActive, Expr::value(false))
            .filter(session::Column::UserId.eq(user_id))
            .filter(session::Column::IsActive.eq(true));
        if let Some(keep) = except_session_id {
            query = query.filter(session::Column::Id.ne(keep));
        }

        let result = query
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("deactivate_user_sessions", e))?;

        Ok(result.rows_affected)
    }

    async fn delete_stale(&self, now: i64) -> Result<u64, InternalError> {
        let result = session::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(session::Column::IsActive.eq(false))
                    .add(session::Column::ExpiresAt.lte(now)),
            )
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("delete_stale_sessions", e))?;

        Ok(result.rows_affected)
    }
}

/// Process-local session map
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, record: SessionRecord) -> Result<(), InternalError> {
        let mut sessions = self.sessions.write().await;
        if sessions.values().any(|s| s.token_hash == record.token_hash) {
            return Err(InternalError::database(
                "insert_session",
                sea_orm::DbErr::Custom("duplicate token hash".to_string()),
            ));
        }
        sessions.insert(record.id.clone(), record);
        Ok(())
    }

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<SessionRecord>, InternalError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .find(|s| s.token_hash == token_hash)
            .cloned())
    }

    async fn touch(&self, session_id: &str, seen_at: i64) -> Result<(), InternalError> {
        if let Some(session) = self.sessions.write().await.get_mut(session_id) {
            session.last_seen_at = seen_at;
        }
        Ok(())
    }

    async fn deactivate_by_token_hash(&self, token_hash: &str) -> Result<bool, InternalError> {
        let mut sessions = self.sessions.write().await;
        match sessions
            .values_mut()
            .find(|s| s.token_hash == token_hash && s.is_active)
        {
            Some(session) => {
                session.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn deactivate_for_user(
        &self,
        user_id: &str,
        except_session_id: Option<&str>,
    ) -> Result<u64, InternalError> {
        let mut sessions = self.sessions.write().await;
        let mut count = 0;
        for session in sessions.values_mut() {
            if session.user_id == user_id
                && session.is_active
                && Some(session.id.as_str()) != except_session_id
            {
                session.is_active = false;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn delete_stale(&self, now: i64) -> Result<u64, InternalError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.is_valid_at(now));
        Ok((before - sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{insert_plain_user, setup_test_db};

    fn record(id: &str, user_id: &str, token_hash: &str, expires_at: i64) -> SessionRecord {
        SessionRecord {
            id: id.to_owned(),
            user_id: user_id.to_owned(),
            token_hash: token_hash.to_owned(),
            created_at: 100,
            expires_at,
            last_seen_at: 100,
            is_active: true,
            ip_address: Some("127.0.0.1".to_owned()),
            user_agent: None,
        }
    }

    /// Same scenario against either implementation
    async fn exercise_store(store: &dyn SessionStore, user_id: &str) {
        store.insert(record("s1", user_id, "hash-1", 1_000)).await.unwrap();
        store.insert(record("s2", user_id, "hash-2", 1_000)).await.unwrap();
        store.insert(record("s3", user_id, "hash-3", 150)).await.unwrap();

        let found = store.find_by_token_hash("hash-1").await.unwrap().unwrap();
        assert_eq!(found.id, "s1");
        assert!(store.find_by_token_hash("nope").await.unwrap().is_none());

        store.touch("s1", 200).await.unwrap();
        let touched = store.find_by_token_hash("hash-1").await.unwrap().unwrap();
        assert_eq!(touched.last_seen_at, 200);
        assert_eq!(touched.expires_at, 1_000);

        assert!(store.deactivate_by_token_hash("hash-1").await.unwrap());
        assert!(!store.deactivate_by_token_hash("hash-1").await.unwrap());
        assert!(!store.deactivate_by_token_hash("unknown").await.unwrap());

        // s1 inactive, s3 expired at 500, s2 survives
        assert_eq!(store.delete_stale(500).await.unwrap(), 2);
        assert!(store.find_by_token_hash("hash-2").await.unwrap().is_some());

        assert_eq!(store.deactivate_for_user(user_id, Some("s2")).await.unwrap(), 0);
        assert_eq!(store.deactivate_for_user(user_id, None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_in_memory_store_contract() {
        let store = InMemorySessionStore::new();
        exercise_store(&store, "user-1").await;
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_db_store_contract() {
        let db = setup_test_db().await;
        let user_id = insert_plain_user(&db, "LVD-CLERK", "password", "User").await;
        let store = DbSessionStore::new(db);
        exercise_store(&store, &user_id).await;
    }

    #[tokio::test]
    async fn test_sessions_removed_with_user() {
        let db = setup_test_db().await;
        let user_id = insert_plain_user(&db, "LVD-CLERK", "password", "User").await;
        let store = DbSessionStore::new(db.clone());
        store.insert(record("s1", &user_id, "hash-1", 1_000)).await.unwrap();

        crate::types::db::user::Entity::delete_by_id(user_id.clone())
            .exec(&db)
            .await
            .unwrap();

        assert!(store.find_by_token_hash("hash-1").await.unwrap().is_none());
    }
}
