use std::{fmt, str::FromStr};

use crate::{errors::internal::ValidationError, types::db::user};

/// Account role; permissions are granted per role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Administrator,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "Administrator",
            Role::User => "User",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Administrator" => Ok(Role::Administrator),
            "User" => Ok(Role::User),
            other => Err(ValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// Optional profile fields kept alongside an account
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
}

impl UserProfile {
    /// Trim every field and drop the ones left empty
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        }

        Self {
            full_name: clean(self.full_name),
            email: clean(self.email),
            department: clean(self.department),
            phone: clean(self.phone),
        }
    }

    /// Trim every field but keep empty strings, which mark a field to clear
    pub fn trimmed(self) -> Self {
        fn trim(value: Option<String>) -> Option<String> {
            value.map(|v| v.trim().to_owned())
        }

        Self {
            full_name: trim(self.full_name),
            email: trim(self.email),
            department: trim(self.department),
            phone: trim(self.phone),
        }
    }
}

/// Input for account creation
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub profile: UserProfile,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .field("profile", &self.profile)
            .finish()
    }
}

/// Account view without the stored credential
#[derive(Debug, Clone, PartialEq)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub role: String,
    pub is_active: bool,
    pub failed_login_attempts: i32,
    pub lock_until: Option<i64>,
    pub last_login_at: Option<i64>,
    pub password_changed_at: Option<i64>,
    pub created_by: Option<String>,
    pub profile: UserProfile,
    pub created_at: i64,
    pub updated_at: i64,
}

impl UserSummary {
    pub fn is_locked_at(&self, now: i64) -> bool {
        self.lock_until.is_some_and(|until| now < until)
    }
}

impl From<user::Model> for UserSummary {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            role: model.role,
            is_active: model.is_active,
            failed_login_attempts: model.failed_login_attempts,
            lock_until: model.lock_until,
            last_login_at: model.last_login_at,
            password_changed_at: model.password_changed_at,
            created_by: model.created_by,
            profile: UserProfile {
                full_name: model.full_name,
                email: model.email,
                department: model.department,
                phone: model.phone,
            },
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_text() {
        assert_eq!("Administrator".parse::<Role>().unwrap(), Role::Administrator);
        assert_eq!("User".parse::<Role>().unwrap(), Role::User);
        assert_eq!(Role::Administrator.to_string(), "Administrator");
    }

    #[test]
    fn test_unknown_role_rejected() {
        let err = "superuser".parse::<Role>().unwrap_err();
        assert!(matches!(err, ValidationError::UnknownRole(role) if role == "superuser"));
    }

    #[test]
    fn test_profile_normalized_drops_blank_fields() {
        let profile = UserProfile {
            full_name: Some("  Dana Reyes ".to_owned()),
            email: Some("   ".to_owned()),
            department: None,
            phone: Some("555-0100".to_owned()),
        }
        .normalized();

        assert_eq!(profile.full_name.as_deref(), Some("Dana Reyes"));
        assert_eq!(profile.email, None);
        assert_eq!(profile.phone.as_deref(), Some("555-0100"));
    }
}
