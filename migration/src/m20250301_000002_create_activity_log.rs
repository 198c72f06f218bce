use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_account_tables::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Append-only; user_id survives user deletion as NULL
        manager
            .create_table(
                Table::create()
                    .table(ActivityLog::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ActivityLog::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(ActivityLog::UserId).string().null())
                    .col(ColumnDef::new(ActivityLog::ActivityType).string().not_null())
                    .col(ColumnDef::new(ActivityLog::Description).string().not_null())
                    .col(ColumnDef::new(ActivityLog::IpAddress).string().null())
                    .col(ColumnDef::new(ActivityLog::UserAgent).string().null())
                    .col(ColumnDef::new(ActivityLog::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_log_user_id")
                            .from(ActivityLog::Table, ActivityLog::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activity_log_user_id")
                    .table(ActivityLog::Table)
                    .col(ActivityLog::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activity_log_activity_type")
                    .table(ActivityLog::Table)
                    .col(ActivityLog::ActivityType)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activity_log_created_at")
                    .table(ActivityLog::Table)
                    .col(ActivityLog::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActivityLog::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum ActivityLog {
    Table,
    Id,
    UserId,
    ActivityType,
    Description,
    IpAddress,
    UserAgent,
    CreatedAt,
}
