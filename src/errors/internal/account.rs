use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("User already exists: {0}")]
    DuplicateUsername(String),

    #[error("Current password is incorrect")]
    IncorrectPassword,
}
