use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::types::internal::SessionInfo;

/// Request model for user login
///
/// Both fields default to empty so a missing field reaches the login flow
/// and is rejected there with a 400.
#[derive(Object, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username for authentication
    #[oai(default)]
    #[serde(default)]
    pub username: String,

    /// Password for authentication
    #[oai(default)]
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Identity of the logged-in user
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    /// `Administrator` or `User`
    pub role: String,
}

/// Response model for a successful login
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Session identifier (not a credential)
    pub session_id: String,

    /// Bearer token for the Authorization header; shown only once
    pub token: String,

    /// Token type (always "Bearer")
    pub token_type: String,

    /// Session expiry (Unix timestamp)
    pub expires_at: i64,

    pub user: SessionUser,
}

/// Response model describing the caller's session
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub user_id: String,
    pub username: String,
    pub role: String,
    pub created_at: i64,
    pub expires_at: i64,
}

impl From<SessionInfo> for SessionResponse {
    fn from(session: SessionInfo) -> Self {
        Self {
            session_id: session.session_id,
            user_id: session.user_id,
            username: session.username,
            role: session.role.to_string(),
            created_at: session.created_at,
            expires_at: session.expires_at,
        }
    }
}

/// Response model for logout
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    /// False when the session had already ended
    pub logged_out: bool,
}

/// Request model for password change
#[derive(Object, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    /// Current password for verification
    pub current_password: String,

    /// New password to set
    pub new_password: String,
}

/// Response model for password change
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct ChangePasswordResponse {
    pub message: String,

    /// Other sessions of this user that were ended
    pub sessions_invalidated: u64,
}

/// Actions a role may perform on one resource
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct ResourcePermissions {
    pub resource: String,
    pub actions: Vec<String>,
}

/// Response model listing the caller's permissions
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct PermissionsResponse {
    pub role: String,
    pub permissions: Vec<ResourcePermissions>,
}

/// Request model for a single permission check
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct PermissionCheckRequest {
    pub resource: String,
    pub action: String,
}

/// Response model for a single permission check
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct PermissionCheckResponse {
    pub resource: String,
    pub action: String,
    pub allowed: bool,
}
