use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};

use crate::errors::InternalError;
use crate::errors::internal::AuditError;
use crate::types::db::{activity_log, user};
use crate::types::internal::{ActivityEvent, ActivityLogRecord};

/// Append-only access to `activity_log`
///
/// No update or delete is exposed.
pub struct ActivityStore {
    db: DatabaseConnection,
}

impl ActivityStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert one entry, returning its id
    pub async fn write_entry(&self, event: ActivityEvent, created_at: i64) -> Result<i64, InternalError> {
        if event.description.trim().is_empty() {
            return Err(AuditError::MissingDescription.into());
        }

        let entry = activity_log::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            user_id: Set(event.user_id),
            activity_type: Set(event.activity_type.as_str().to_owned()),
            description: Set(event.description),
            ip_address: Set(event.ip_address),
            user_agent: Set(event.user_agent),
            created_at: Set(created_at),
        };

        let inserted = entry
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("write_activity_entry", e))?;

        Ok(inserted.id)
    }

    /// Newest first, bounded by `limit`, joined with username and role
    pub async fn query(
        &self,
        user_id: Option<&str>,
        limit: u64,
    ) -> Result<Vec<ActivityLogRecord>, InternalError> {
        let mut select = activity_log::Entity::find()
            .select_only()
            .column(activity_log::Column::Id)
            .column(activity_log::Column::UserId)
            .column_as(user::Column::Username, "username")
            .column_as(user::Column::Role, "role")
            .column(activity_log::Column::ActivityType)
            .column(activity_log::Column::Description)
            .column(activity_log::Column::IpAddress)
            .column(activity_log::Column::UserAgent)
            .column(activity_log::Column::CreatedAt)
            .join(JoinType::LeftJoin, activity_log::Relation::User.def());

        if let Some(user_id) = user_id {
            select = select.filter(activity_log::Column::UserId.eq(user_id));
        }

        select
            .order_by_desc(activity_log::Column::CreatedAt)
            .order_by_desc(activity_log::Column::Id)
            .limit(limit)
            .into_model::<ActivityLogRecord>()
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("query_activity_log", e))
    }
}
