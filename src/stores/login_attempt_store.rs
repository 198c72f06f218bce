use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter, QuerySelect,
    sea_query::Expr,
};

use crate::errors::InternalError;
use crate::types::db::user;

/// Failed-attempt counter and lock columns of `users`
///
/// Every statement here is a single UPDATE so concurrent logins against the
/// same account never lose an increment.
pub struct LoginAttemptStore;

#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct LockState {
    pub failed_login_attempts: i32,
    pub lock_until: Option<i64>,
}

impl LoginAttemptStore {
    pub fn new() -> Self {
        Self
    }

    /// `failed_login_attempts = failed_login_attempts + 1`; false if no such user
    pub async fn increment_failed_attempts(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<bool, InternalError> {
        let result = user::Entity::update_many()
            .col_expr(
                user::Column::FailedLoginAttempts,
                Expr::col(user::Column::FailedLoginAttempts).add(1),
            )
            .filter(user::Column::Id.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("increment_failed_attempts", e))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn get_lock_state(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Option<LockState>, InternalError> {
        user::Entity::find_by_id(user_id.to_owned())
            .select_only()
            .column(user::Column::FailedLoginAttempts)
            .column(user::Column::LockUntil)
            .into_model::<LockState>()
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_lock_state", e))
    }

    pub async fn set_lock_until(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        lock_until: i64,
    ) -> Result<bool, InternalError> {
        let result = user::Entity::update_many()
            .col_expr(user::Column::LockUntil, Expr::value(lock_until))
            .filter(user::Column::Id.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("set_lock_until", e))?;

        Ok(result.rows_affected > 0)
    }

    /// Clear a lock whose time has passed, together with its counter
    ///
    /// A lock still in force, or no lock at all, is left untouched.
    pub async fn clear_expired_lock(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        now: i64,
    ) -> Result<bool, InternalError> {
        let result = user::Entity::update_many()
            .col_expr(user::Column::FailedLoginAttempts, Expr::value(0))
            .col_expr(user::Column::LockUntil, Expr::value(Option::<i64>::None))
            .filter(user::Column::Id.eq(user_id))
            .filter(user::Column::LockUntil.is_not_null())
            .filter(user::Column::LockUntil.lte(now))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("clear_expired_lock", e))?;

        Ok(result.rows_affected > 0)
    }

    /// Zero the counter and clear the lock in one statement
    pub async fn clear(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<bool, InternalError> {
        let result = user::Entity::update_many()
            .col_expr(user::Column::FailedLoginAttempts, Expr::value(0))
            .col_expr(user::Column::LockUntil, Expr::value(Option::<i64>::None))
            .filter(user::Column::Id.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("clear_login_attempts", e))?;

        Ok(result.rows_affected > 0)
    }
}

impl Default for LoginAttemptStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{insert_plain_user, setup_test_db};

    #[tokio::test]
    async fn test_increment_is_cumulative() {
        let db = setup_test_db().await;
        let user_id = insert_plain_user(&db, "LVD-CLERK", "password", "User").await;
        let store = LoginAttemptStore::new();

        for _ in 0..3 {
            assert!(store.increment_failed_attempts(&db, &user_id).await.unwrap());
        }

        let state = store.get_lock_state(&db, &user_id).await.unwrap().unwrap();
        assert_eq!(state.failed_login_attempts, 3);
        assert_eq!(state.lock_until, None);
    }

    #[tokio::test]
    async fn test_clear_resets_counter_and_lock() {
        let db = setup_test_db().await;
        let user_id = insert_plain_user(&db, "LVD-CLERK", "password", "User").await;
        let store = LoginAttemptStore::new();

        store.increment_failed_attempts(&db, &user_id).await.unwrap();
        store.set_lock_until(&db, &user_id, 4_000_000_000).await.unwrap();
        assert!(store.clear(&db, &user_id).await.unwrap());

        let state = store.get_lock_state(&db, &user_id).await.unwrap().unwrap();
        assert_eq!(
            state,
            LockState {
                failed_login_attempts: 0,
                lock_until: None
            }
        );
    }

    #[tokio::test]
    async fn test_clear_expired_lock_only_touches_elapsed_locks() {
        let db = setup_test_db().await;
        let user_id = insert_plain_user(&db, "LVD-CLERK", "password", "User").await;
        let store = LoginAttemptStore::new();

        store.increment_failed_attempts(&db, &user_id).await.unwrap();
        store.set_lock_until(&db, &user_id, 1_000).await.unwrap();

        assert!(!store.clear_expired_lock(&db, &user_id, 999).await.unwrap());
        assert!(store.clear_expired_lock(&db, &user_id, 1_000).await.unwrap());

        let state = store.get_lock_state(&db, &user_id).await.unwrap().unwrap();
        assert_eq!(state.failed_login_attempts, 0);
        assert_eq!(state.lock_until, None);
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_updated() {
        let db = setup_test_db().await;
        let store = LoginAttemptStore::new();

        assert!(!store.increment_failed_attempts(&db, "ghost").await.unwrap());
        assert!(store.get_lock_state(&db, "ghost").await.unwrap().is_none());
    }
}
