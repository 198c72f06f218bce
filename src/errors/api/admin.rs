use std::fmt;

use poem_openapi::{ApiResponse, payload::Json};

use super::error_body;
use crate::errors::internal::{AccountError, InternalError};
use crate::types::dto::common::ErrorResponse;

/// Admin operation error types
#[derive(ApiResponse, Debug)]
pub enum AdminError {
    /// Request body or parameters rejected
    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),

    /// No valid session presented
    #[oai(status = 401)]
    Unauthorized(Json<ErrorResponse>),

    /// Session role lacks the required permission
    #[oai(status = 403)]
    Forbidden(Json<ErrorResponse>),

    /// User not found
    #[oai(status = 404)]
    UserNotFound(Json<ErrorResponse>),

    /// Username already taken
    #[oai(status = 409)]
    DuplicateUsername(Json<ErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

impl AdminError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AdminError::BadRequest(error_body("bad_request", message, 400))
    }

    pub fn unauthorized() -> Self {
        AdminError::Unauthorized(error_body(
            "invalid_session",
            "Session is invalid or has expired",
            401,
        ))
    }

    pub fn forbidden(resource: &str, action: &str) -> Self {
        AdminError::Forbidden(error_body(
            "forbidden",
            format!("Not permitted to {} {}", action, resource),
            403,
        ))
    }

    pub fn user_not_found(user_id: &str) -> Self {
        AdminError::UserNotFound(error_body(
            "user_not_found",
            format!("User not found: {}", user_id),
            404,
        ))
    }

    pub fn duplicate_username(username: &str) -> Self {
        AdminError::DuplicateUsername(error_body(
            "duplicate_username",
            format!("Username already exists: {}", username),
            409,
        ))
    }

    fn internal_server_error() -> Self {
        AdminError::InternalError(error_body(
            "internal_error",
            "An internal error occurred",
            500,
        ))
    }

    /// Convert InternalError to AdminError, logging anything not shown to clients
    pub fn from_internal_error(err: InternalError) -> Self {
        match &err {
            InternalError::Validation(validation) => {
                tracing::debug!("Admin request rejected: {}", validation);
                Self::bad_request(validation.to_string())
            }
            InternalError::Account(AccountError::UserNotFound(user_id)) => {
                tracing::debug!("Admin operation on unknown user {}", user_id);
                Self::user_not_found(user_id)
            }
            InternalError::Account(AccountError::DuplicateUsername(username)) => {
                tracing::warn!("Duplicate username attempt: {}", username);
                Self::duplicate_username(username)
            }
            InternalError::Database(db_err) => {
                tracing::error!("Database error in admin operation: {}", db_err);
                Self::internal_server_error()
            }
            _ => {
                tracing::error!("Unexpected error in admin operation: {}", err);
                Self::internal_server_error()
            }
        }
    }

    fn body(&self) -> &ErrorResponse {
        match self {
            AdminError::BadRequest(json)
            | AdminError::Unauthorized(json)
            | AdminError::Forbidden(json)
            | AdminError::UserNotFound(json)
            | AdminError::DuplicateUsername(json)
            | AdminError::InternalError(json) => &json.0,
        }
    }

    pub fn message(&self) -> String {
        self.body().message.clone()
    }

    pub fn status_code(&self) -> u16 {
        self.body().status_code
    }
}

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl From<InternalError> for AdminError {
    fn from(err: InternalError) -> Self {
        AdminError::from_internal_error(err)
    }
}
