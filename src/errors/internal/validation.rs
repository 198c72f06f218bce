use thiserror::Error;

/// Malformed or missing input, rejected before storage is touched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid username '{username}': {reason}")]
    InvalidUsername { username: String, reason: String },

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Lock duration must be between 1 and {max} minutes, got {got}")]
    InvalidLockDuration { got: i64, max: i64 },

    #[error(transparent)]
    WeakPassword(#[from] PasswordPolicyError),
}

/// Password policy violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters")]
    TooShort { min: usize },

    #[error("Password must not exceed {max} characters")]
    TooLong { max: usize },

    #[error("Password must contain at least one letter")]
    MissingLetter,

    #[error("Password must contain at least one digit")]
    MissingDigit,

    #[error("Password must not contain the username")]
    ContainsUsername,

    #[error("New password must differ from the current password")]
    SameAsCurrent,
}
