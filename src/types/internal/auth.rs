use std::fmt;

use super::account::Role;

/// Opaque bearer token handed to a client exactly once at login
///
/// Display and Debug never reveal the value; call `expose` when it has to
/// leave the process.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[session_token]")
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken([REDACTED])")
    }
}

/// Freshly minted session returned from a successful login
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub session_id: String,
    pub token: SessionToken,
    pub created_at: i64,
    pub expires_at: i64,
}

/// Identity resolved from a valid session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub session_id: String,
    pub user_id: String,
    pub username: String,
    pub role: Role,
    pub created_at: i64,
    pub expires_at: i64,
}

/// Raw login attempt as received from a client
#[derive(Clone, Default)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

impl LoginInput {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginInput")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Terminal state of one login attempt
///
/// Every variant except `Accepted` is an expected rejection rather than a
/// failure; storage problems surface as `Err(InternalError)` instead.
#[derive(Debug, Clone)]
pub enum LoginResult {
    Accepted {
        session: IssuedSession,
        user_id: String,
        username: String,
        role: Role,
    },
    RejectedMissingFields,
    RejectedInvalidCredentials,
    RejectedLocked {
        /// Unix timestamp the lock lapses at
        lock_until: Option<i64>,
    },
    RejectedInactive,
}

impl LoginResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, LoginResult::Accepted { .. })
    }

    /// Short label used in logs
    pub fn label(&self) -> &'static str {
        match self {
            LoginResult::Accepted { .. } => "accepted",
            LoginResult::RejectedMissingFields => "missing_fields",
            LoginResult::RejectedInvalidCredentials => "invalid_credentials",
            LoginResult::RejectedLocked { .. } => "locked",
            LoginResult::RejectedInactive => "inactive",
        }
    }
}
