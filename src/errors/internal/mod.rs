use thiserror::Error;

pub mod account;
pub mod audit;
pub mod database;
pub mod validation;

pub use account::AccountError;
pub use audit::AuditError;
pub use database::DatabaseError;
pub use validation::{PasswordPolicyError, ValidationError};

/// Internal error type for store, provider and coordinator operations
///
/// Infrastructure errors (database, crypto, parse) are shared; domain errors
/// are grouped per concern. Not exposed via API - endpoints must convert to
/// AuthError or AdminError.
#[derive(Error, Debug)]
pub enum InternalError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Parse error: failed to parse {value_type}: {message}")]
    Parse { value_type: String, message: String },

    #[error("Crypto error: {operation} failed: {message}")]
    Crypto { operation: String, message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Audit(#[from] AuditError),
}

impl InternalError {
    pub fn database(operation: &str, source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::Operation {
            operation: operation.to_string(),
            source,
        })
    }

    pub fn transaction_begin(source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::TransactionBegin { source })
    }

    pub fn transaction_commit(source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::TransactionCommit { source })
    }

    pub fn parse(value_type: &str, message: impl Into<String>) -> InternalError {
        InternalError::Parse {
            value_type: value_type.to_string(),
            message: message.into(),
        }
    }

    pub fn crypto(operation: &str, message: impl Into<String>) -> InternalError {
        InternalError::Crypto {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    /// Storage faults are the ones worth a `system_error` activity entry
    pub fn is_storage(&self) -> bool {
        matches!(self, InternalError::Database(_))
    }
}
