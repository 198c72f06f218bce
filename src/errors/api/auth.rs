use std::fmt;

use poem_openapi::{ApiResponse, payload::Json};

use super::error_body;
use crate::errors::internal::{AccountError, InternalError, ValidationError};
use crate::types::dto::common::ErrorResponse;

/// Authentication error types
#[derive(ApiResponse, Debug)]
pub enum AuthError {
    /// Username or password missing from the request
    #[oai(status = 400)]
    MissingFields(Json<ErrorResponse>),

    /// Invalid username or password
    #[oai(status = 401)]
    InvalidCredentials(Json<ErrorResponse>),

    /// Account has been deactivated
    #[oai(status = 401)]
    AccountInactive(Json<ErrorResponse>),

    /// Account is temporarily locked after repeated failures
    #[oai(status = 423)]
    AccountLocked(Json<ErrorResponse>),

    /// Session token missing, unknown, expired or logged out
    #[oai(status = 401)]
    InvalidSession(Json<ErrorResponse>),

    /// Current password is incorrect (for password change)
    #[oai(status = 401)]
    IncorrectPassword(Json<ErrorResponse>),

    /// Input rejected by validation (password policy and the like)
    #[oai(status = 400)]
    ValidationFailed(Json<ErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

impl AuthError {
    pub fn missing_fields() -> Self {
        AuthError::MissingFields(error_body(
            "missing_fields",
            "Username and password are required",
            400,
        ))
    }

    pub fn invalid_credentials() -> Self {
        AuthError::InvalidCredentials(error_body(
            "invalid_credentials",
            "Invalid username or password",
            401,
        ))
    }

    pub fn account_inactive() -> Self {
        AuthError::AccountInactive(error_body(
            "account_inactive",
            "Account is inactive. Contact an administrator",
            401,
        ))
    }

    /// Locked accounts are told to retry later; remaining attempts are never disclosed
    pub fn account_locked() -> Self {
        AuthError::AccountLocked(error_body(
            "account_locked",
            "Account is temporarily locked. Try again later",
            423,
        ))
    }

    pub fn invalid_session() -> Self {
        AuthError::InvalidSession(error_body(
            "invalid_session",
            "Session is invalid or has expired",
            401,
        ))
    }

    pub fn incorrect_password() -> Self {
        AuthError::IncorrectPassword(error_body(
            "incorrect_password",
            "Current password is incorrect",
            401,
        ))
    }

    pub fn validation_failed(message: impl Into<String>) -> Self {
        AuthError::ValidationFailed(error_body("validation_failed", message, 400))
    }

    /// Convert InternalError to AuthError
    ///
    /// Internal error details are logged but not exposed to clients.
    pub fn from_internal_error(err: InternalError) -> Self {
        match &err {
            InternalError::Database(db_err) => {
                tracing::error!("Database error in auth operation: {}", db_err);
                Self::internal_server_error()
            }
            InternalError::Parse { value_type, .. } => {
                tracing::error!("Parse error for {}: {}", value_type, err);
                Self::internal_server_error()
            }
            InternalError::Crypto { operation, .. } => {
                tracing::error!("Crypto error in {}: {}", operation, err);
                Self::internal_server_error()
            }
            InternalError::Validation(ValidationError::MissingField(field)) => {
                tracing::debug!("Missing field: {}", field);
                Self::missing_fields()
            }
            InternalError::Validation(validation) => {
                tracing::debug!("Validation failed: {}", validation);
                Self::validation_failed(validation.to_string())
            }
            InternalError::Account(AccountError::IncorrectPassword) => {
                tracing::debug!("Incorrect current password for password change");
                Self::incorrect_password()
            }
            InternalError::Account(AccountError::UserNotFound(user_id)) => {
                // Session refers to a user that no longer exists
                tracing::warn!("Session user {} not found", user_id);
                Self::invalid_session()
            }
            _ => {
                tracing::error!("Unexpected error in auth operation: {}", err);
                Self::internal_server_error()
            }
        }
    }

    fn internal_server_error() -> Self {
        AuthError::InternalError(error_body(
            "internal_error",
            "An internal error occurred",
            500,
        ))
    }

    fn body(&self) -> &ErrorResponse {
        match self {
            AuthError::MissingFields(json)
            | AuthError::InvalidCredentials(json)
            | AuthError::AccountInactive(json)
            | AuthError::AccountLocked(json)
            | AuthError::InvalidSession(json)
            | AuthError::IncorrectPassword(json)
            | AuthError::ValidationFailed(json)
            | AuthError::InternalError(json) => &json.0,
        }
    }

    pub fn message(&self) -> String {
        self.body().message.clone()
    }

    pub fn status_code(&self) -> u16 {
        self.body().status_code
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl From<InternalError> for AuthError {
    fn from(err: InternalError) -> Self {
        AuthError::from_internal_error(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::internal::PasswordPolicyError;
    use sea_orm::DbErr;

    #[test]
    fn test_database_error_hides_detail() {
        let err = AuthError::from_internal_error(InternalError::database(
            "insert_session",
            DbErr::Custom("UNIQUE constraint failed: sessions.token_hash".into()),
        ));

        assert_eq!(err.status_code(), 500);
        assert_eq!(err.message(), "An internal error occurred");
    }

    #[test]
    fn test_crypto_error_is_internal() {
        let err = AuthError::from_internal_error(InternalError::crypto("hash_password", "bad params"));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_missing_field_maps_to_400() {
        let err = AuthError::from_internal_error(ValidationError::MissingField("username").into());
        assert!(matches!(err, AuthError::MissingFields(_)));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_weak_password_message_reaches_client() {
        let err = AuthError::from_internal_error(
            ValidationError::from(PasswordPolicyError::MissingDigit).into(),
        );
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Password must contain at least one digit");
    }

    #[test]
    fn test_locked_is_distinct_from_invalid_credentials() {
        assert_eq!(AuthError::account_locked().status_code(), 423);
        assert_eq!(AuthError::invalid_credentials().status_code(), 401);
        assert!(!AuthError::account_locked().message().contains("attempt"));
    }
}
