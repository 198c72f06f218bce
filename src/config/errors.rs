use thiserror::Error;

/// Configuration problems found at startup
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Setting '{key}' has invalid value '{value}', expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },

    #[error("Setting '{key}' must be between {min} and {max}, got {value}")]
    OutOfRange {
        key: String,
        value: i64,
        min: i64,
        max: i64,
    },
}
