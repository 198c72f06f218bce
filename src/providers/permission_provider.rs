use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::errors::InternalError;
use crate::stores::PermissionStore;

/// Resource name to the actions allowed on it
pub type PermissionMap = BTreeMap<String, BTreeSet<String>>;

/// Default-deny role/resource/action checks
pub struct PermissionProvider {
    db: DatabaseConnection,
    store: Arc<PermissionStore>,
}

impl PermissionProvider {
    pub fn new(db: DatabaseConnection, store: Arc<PermissionStore>) -> Self {
        Self { db, store }
    }

    /// Authoritative check; absence of a row means denied
    pub async fn is_allowed(
        &self,
        role: &str,
        resource: &str,
        action: &str,
    ) -> Result<bool, InternalError> {
        let allowed = self.store.is_allowed(&self.db, role, resource, action).await?;
        if !allowed {
            tracing::debug!("Permission denied: {} may not {} {}", role, action, resource);
        }
        Ok(allowed)
    }

    /// Capability view for a role, for client-side gating only
    pub async fn permissions_for(&self, role: &str) -> Result<PermissionMap, InternalError> {
        let rows = self.store.list_for_role(&self.db, role).await?;

        let mut map = PermissionMap::new();
        for row in rows {
            map.entry(row.resource).or_default().insert(row.action);
        }
        Ok(map)
    }
}
