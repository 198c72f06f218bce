use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub username: String,

    /// Argon2 PHC string, or a legacy plaintext value awaiting upgrade
    pub password: String,

    /// `Administrator` or `User`
    pub role: String,
    pub is_active: bool,

    // Lockout bookkeeping, only written through the login guard
    pub failed_login_attempts: i32,
    pub lock_until: Option<i64>,

    pub last_login_at: Option<i64>,
    pub password_changed_at: Option<i64>,
    pub created_by: Option<String>,

    // Free-form profile
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,

    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::session::Entity")]
    Session,
    #[sea_orm(has_many = "super::activity_log::Entity")]
    ActivityLog,
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::activity_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ActivityLog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
