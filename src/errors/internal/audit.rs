use thiserror::Error;

/// Activity log failures; reported to operational logs, never to clients
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Failed to write activity log: {0}")]
    LogWriteFailed(String),

    #[error("Activity entry is missing a description")]
    MissingDescription,
}
