use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::types::internal::{ActivityLogRecord, UserProfile, UserSummary};

/// Account as shown to administrators
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub role: String,
    pub is_active: bool,
    pub failed_login_attempts: i32,
    /// Lock expiry (Unix timestamp), if a lock was ever applied
    pub lock_until: Option<i64>,
    /// True when the lock is still in force
    pub locked: bool,
    pub last_login_at: Option<i64>,
    pub password_changed_at: Option<i64>,
    pub created_by: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl UserResponse {
    pub fn from_summary(summary: UserSummary, now: i64) -> Self {
        let locked = summary.is_locked_at(now);
        Self {
            id: summary.id,
            username: summary.username,
            role: summary.role,
            is_active: summary.is_active,
            failed_login_attempts: summary.failed_login_attempts,
            lock_until: summary.lock_until,
            locked,
            last_login_at: summary.last_login_at,
            password_changed_at: summary.password_changed_at,
            created_by: summary.created_by,
            full_name: summary.profile.full_name,
            email: summary.profile.email,
            department: summary.profile.department,
            phone: summary.profile.phone,
            created_at: summary.created_at,
            updated_at: summary.updated_at,
        }
    }
}

#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
}

/// Request to create an account
///
/// When `password` is omitted a random one is generated and returned once.
#[derive(Object, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: Option<String>,
    /// Defaults to `User`
    pub role: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
}

#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub user: UserResponse,
    /// Present only when the server generated the password
    pub generated_password: Option<String>,
}

/// Profile patch; omitted fields are kept, empty strings clear the field
#[derive(Object, Debug, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
}

impl From<UpdateProfileRequest> for UserProfile {
    fn from(req: UpdateProfileRequest) -> Self {
        UserProfile {
            full_name: req.full_name,
            email: req.email,
            department: req.department,
            phone: req.phone,
        }
    }
}

#[derive(Object, Debug, Default, Serialize, Deserialize)]
pub struct LockAccountRequest {
    /// Lock duration in minutes; server default when omitted
    pub minutes: Option<i64>,
}

#[derive(Object, Debug, Serialize, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// Outcome of an account state change
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct AccountActionResponse {
    pub user_id: String,
    /// False when the account does not exist
    pub changed: bool,
    pub message: String,
}

#[derive(Object, Debug, Serialize, Deserialize)]
pub struct ActivityEntryResponse {
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

impl From<ActivityLogRecord> for ActivityEntryResponse {
    fn from(record: ActivityLogRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            username: record.username,
            role: record.role,
            activity_type: record.activity_type,
            description: record.description,
            ip_address: record.ip_address,
            user_agent: record.user_agent,
            created_at: record.created_at,
        }
    }
}

#[derive(Object, Debug, Serialize, Deserialize)]
pub struct ActivityLogResponse {
    pub entries: Vec<ActivityEntryResponse>,
}
