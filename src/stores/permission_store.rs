use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};

use crate::errors::InternalError;
use crate::types::db::permission;

/// Read-only access to the role/resource/action allow-list
pub struct PermissionStore;

impl PermissionStore {
    pub fn new() -> Self {
        Self
    }

    /// True only when an allowing row exists for the triple
    pub async fn is_allowed(
        &self,
        conn: &impl ConnectionTrait,
        role: &str,
        resource: &str,
        action: &str,
    ) -> Result<bool, InternalError> {
        let count = permission::Entity::find()
            .filter(permission::Column::Role.eq(role))
            .filter(permission::Column::Resource.eq(resource))
            .filter(permission::Column::Action.eq(action))
            .filter(permission::Column::Allowed.eq(true))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("check_permission", e))?;

        Ok(count > 0)
    }

    /// Allowing rows for a role
    pub async fn list_for_role(
        &self,
        conn: &impl ConnectionTrait,
        role: &str,
    ) -> Result<Vec<permission::Model>, InternalError> {
        permission::Entity::find()
            .filter(permission::Column::Role.eq(role))
            .filter(permission::Column::Allowed.eq(true))
            .order_by_asc(permission::Column::Resource)
            .order_by_asc(permission::Column::Action)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_permissions_for_role", e))
    }
}

impl Default for PermissionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::setup_test_db;

    #[tokio::test]
    async fn test_seeded_rows_are_default_deny() {
        let db = setup_test_db().await;
        let store = PermissionStore::new();

        assert!(store.is_allowed(&db, "Administrator", "entries", "delete").await.unwrap());
        assert!(store.is_allowed(&db, "User", "entries", "update").await.unwrap());
        assert!(!store.is_allowed(&db, "User", "entries", "delete").await.unwrap());
        assert!(!store.is_allowed(&db, "User", "users", "read").await.unwrap());
        assert!(!store.is_allowed(&db, "Auditor", "entries", "read").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_for_role() {
        let db = setup_test_db().await;
        let store = PermissionStore::new();

        let rows = store.list_for_role(&db, "User").await.unwrap();
        let pairs: Vec<(String, String)> =
            rows.into_iter().map(|r| (r.resource, r.action)).collect();

        assert_eq!(
            pairs,
            vec![
                ("entries".to_owned(), "create".to_owned()),
                ("entries".to_owned(), "read".to_owned()),
                ("entries".to_owned(), "update".to_owned()),
                ("reports".to_owned(), "export".to_owned()),
                ("reports".to_owned(), "read".to_owned()),
            ]
        );
    }
}
