use std::fmt;

use sea_orm::FromQueryResult;

use super::context::RequestContext;

/// Kinds of entries written to the activity log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityType {
    LoginSuccess,
    LoginFailed,
    AccountLocked,
    AccountUnlocked,
    StatusChange,
    SystemError,
    Logout,
    PasswordChanged,
    UserCreated,
    ProfileUpdated,
    SessionsCleaned,
    CliCommand,
    Custom(String),
}

impl ActivityType {
    /// Stored representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::LoginSuccess => "login_success",
            Self::LoginFailed => "login_failed",
            Self::AccountLocked => "account_locked",
            Self::AccountUnlocked => "account_unlocked",
            Self::StatusChange => "status_change",
            Self::SystemError => "system_error",
            Self::Logout => "logout",
            Self::PasswordChanged => "password_changed",
            Self::UserCreated => "user_created",
            Self::ProfileUpdated => "profile_updated",
            Self::SessionsCleaned => "sessions_cleaned",
            Self::CliCommand => "cli_command",
            Self::Custom(s) => s.as_str(),
        }
    }

    /// Parse a stored value; anything unrecognised becomes `Custom`
    pub fn from_stored(value: &str) -> Self {
        match value {
            "login_success" => Self::LoginSuccess,
            "login_failed" => Self::LoginFailed,
            "account_locked" => Self::AccountLocked,
            "account_unlocked" => Self::AccountUnlocked,
            "status_change" => Self::StatusChange,
            "system_error" => Self::SystemError,
            "logout" => Self::Logout,
            "password_changed" => Self::PasswordChanged,
            "user_created" => Self::UserCreated,
            "profile_updated" => Self::ProfileUpdated,
            "sessions_cleaned" => Self::SessionsCleaned,
            "cli_command" => Self::CliCommand,
            other => Self::Custom(other.to_owned()),
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One activity log entry waiting to be written
#[derive(Debug, Clone)]
pub struct ActivityEvent {
    pub activity_type: ActivityType,
    pub user_id: Option<String>,
    pub description: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ActivityEvent {
    pub fn new(activity_type: ActivityType, description: impl Into<String>) -> Self {
        Self {
            activity_type,
            user_id: None,
            description: description.into(),
            ip_address: None,
            user_agent: None,
        }
    }

    /// Copy client address and agent from the request
    pub fn with_context(mut self, ctx: &RequestContext) -> Self {
        self.ip_address = ctx.ip_string();
        self.user_agent = ctx.user_agent.clone();
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Activity log row joined with the acting user's name and role
///
/// `username` and `role` are `None` when the entry has no user or the user
/// has since been removed.
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct ActivityLogRecord {
    pub id: i64,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
    pub activity_type: String,
    pub description: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: i64,
}
