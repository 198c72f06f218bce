use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Default allow-list. Anything not listed here is denied.
const DEFAULT_PERMISSIONS: &[(&str, &str, &[&str])] = &[
    ("Administrator", "entries", &["create", "read", "update", "delete"]),
    ("Administrator", "reports", &["read", "export"]),
    ("Administrator", "users", &["create", "read", "update", "delete"]),
    ("Administrator", "activity_log", &["read"]),
    ("Administrator", "settings", &["read", "update"]),
    ("User", "entries", &["create", "read", "update"]),
    ("User", "reports", &["read", "export"]),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Permissions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Permissions::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Permissions::Role).string().not_null())
                    .col(ColumnDef::new(Permissions::Resource).string().not_null())
                    .col(ColumnDef::new(Permissions::Action).string().not_null())
                    .col(ColumnDef::new(Permissions::Allowed).boolean().not_null().default(true))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_permissions_role_resource_action")
                    .table(Permissions::Table)
                    .col(Permissions::Role)
                    .col(Permissions::Resource)
                    .col(Permissions::Action)
                    .unique()
                    .to_owned(),
            )
            .await?;

        for (role, resource, actions) in DEFAULT_PERMISSIONS {
            for action in *actions {
                manager
                    .exec_stmt(
                        Query::insert()
                            .into_table(Permissions::Table)
                            .columns([
                                Permissions::Role,
                                Permissions::Resource,
                                Permissions::Action,
                                Permissions::Allowed,
                            ])
                            .values_panic([
                                (*role).into(),
                                (*resource).into(),
                                (*action).into(),
                                true.into(),
                            ])
                            .to_owned(),
                    )
                    .await?;
            }
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Permissions::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Permissions {
    Table,
    Id,
    Role,
    Resource,
    Action,
    Allowed,
}
