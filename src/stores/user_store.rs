use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, sea_query::Expr,
};

use crate::errors::InternalError;
use crate::errors::internal::AccountError;
use crate::types::db::user;
use crate::types::internal::UserProfile;

/// Account rows, minus the lockout columns (see `LoginAttemptStore`)
pub struct UserStore;

impl UserStore {
    pub fn new() -> Self {
        Self
    }

    /// Columns the login flow needs, looked up by username
    pub async fn get_user_for_auth(
        &self,
        conn: &impl ConnectionTrait,
        username: &str,
    ) -> Result<Option<UserForAuth>, InternalError> {
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .select_only()
            .column(user::Column::Id)
            .column(user::Column::Username)
            .column(user::Column::Password)
            .column(user::Column::Role)
            .column(user::Column::IsActive)
            .into_model::<UserForAuth>()
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_user_for_auth", e))
    }

    /// Identity columns attached to a validated session
    pub async fn get_user_for_session(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Option<UserForSession>, InternalError> {
        user::Entity::find_by_id(user_id.to_owned())
            .select_only()
            .column(user::Column::Id)
            .column(user::Column::Username)
            .column(user::Column::Role)
            .column(user::Column::IsActive)
            .into_model::<UserForSession>()
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_user_for_session", e))
    }

    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        user::Entity::find_by_id(user_id.to_owned())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_id", e))
    }

    pub async fn find_by_username(
        &self,
        conn: &impl ConnectionTrait,
        username: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_username", e))
    }

    /// All accounts ordered by username
    pub async fn list_users(
        &self,
        conn: &impl ConnectionTrait,
    ) -> Result<Vec<user::Model>, InternalError> {
        user::Entity::find()
            .order_by_asc(user::Column::Username)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_users", e))
    }

    /// Insert a new account
    ///
    /// `credential` is stored as given; callers hash it first unless they
    /// are deliberately seeding a legacy plaintext value.
    pub async fn insert_user(
        &self,
        conn: &impl ConnectionTrait,
        new_user: NewUserRecord,
    ) -> Result<user::Model, InternalError> {
        let taken = user::Entity::find()
            .filter(user::Column::Username.eq(new_user.username.as_str()))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("check_username_taken", e))?;
        if taken > 0 {
            return Err(AccountError::DuplicateUsername(new_user.username).into());
        }

        let model = user::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            username: Set(new_user.username),
            password: Set(new_user.credential),
            role: Set(new_user.role),
            is_active: Set(true),
            failed_login_attempts: Set(0),
            lock_until: Set(None),
            last_login_at: Set(None),
            password_changed_at: Set(new_user.password_changed_at),
            created_by: Set(new_user.created_by),
            full_name: Set(new_user.profile.full_name),
            email: Set(new_user.profile.email),
            department: Set(new_user.profile.department),
            phone: Set(new_user.profile.phone),
            created_at: Set(new_user.created_at),
            updated_at: Set(new_user.created_at),
        };

        model
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("insert_user", e))
    }

    /// Replace the stored credential
    ///
    /// `changed_at` is `None` for a lazy legacy upgrade, which is not a
    /// user-initiated change.
    pub async fn update_credential(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        credential: &str,
        changed_at: Option<i64>,
        now: i64,
    ) -> Result<bool, InternalError> {
        let mut update = user::Entity::update_many()
            .col_expr(user::Column::Password, Expr::value(credential))
            .col_expr(user::Column::UpdatedAt, Expr::value(now));
        if let Some(changed_at) = changed_at {
            update = update.col_expr(user::Column::PasswordChangedAt, Expr::value(changed_at));
        }

        let result = update
            .filter(user::Column::Id.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("update_credential", e))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn update_last_login(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        now: i64,
    ) -> Result<(), InternalError> {
        user::Entity::update_many()
            .col_expr(user::Column::LastLoginAt, Expr::value(now))
            .filter(user::Column::Id.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("update_last_login", e))?;

        Ok(())
    }

    pub async fn set_active(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        is_active: bool,
        now: i64,
    ) -> Result<bool, InternalError> {
        let result = user::Entity::update_many()
            .col_expr(user::Column::IsActive, Expr::value(is_active))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("set_user_active", e))?;

        Ok(result.rows_affected > 0)
    }

    /// Apply a profile patch
    ///
    /// `None` leaves the column untouched; an empty string clears it to NULL.
    pub async fn update_profile(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        profile: &UserProfile,
        now: i64,
    ) -> Result<bool, InternalError> {
        let mut query = user::Entity::update_many();
        for (column, value) in [
            (user::Column::FullName, &profile.full_name),
            (user::Column::Email, &profile.email),
            (user::Column::Department, &profile.department),
            (user::Column::Phone, &profile.phone),
        ] {
            if let Some(value) = value {
                let stored = Some(value.clone()).filter(|v| !v.is_empty());
                query = query.col_expr(column, Expr::value(stored));
            }
        }

        let result = query
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("update_profile", e))?;

        Ok(result.rows_affected > 0)
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Values for a new `users` row
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub username: String,
    pub credential: String,
    pub role: String,
    pub created_by: Option<String>,
    pub profile: UserProfile,
    pub password_changed_at: Option<i64>,
    pub created_at: i64,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct UserForAuth {
    pub id: String,
    pub username: String,
    pub password: String,
    pub role: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct UserForSession {
    pub id: String,
    pub username: String,
    pub role: String,
    pub is_active: bool,
}
