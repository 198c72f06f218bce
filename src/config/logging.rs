use std::path::{Path, PathBuf};

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use super::env_provider::EnvironmentProvider;

/// Configuration for application logging
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub log_level: String,
    /// Daily-rotated log file; console only when unset
    pub app_log_file: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn from_env_provider(env: &dyn EnvironmentProvider) -> Self {
        Self {
            log_level: env.get_or("LOG_LEVEL", "INFO"),
            app_log_file: env
                .get_var("APP_LOG_FILE")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize logging: {0}")]
    InitializationError(String),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("File system error: {0}")]
    FileSystemError(#[from] std::io::Error),
}

/// Install the global tracing subscriber: console always, file when configured
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| LoggingError::InvalidLogLevel(format!("{}: {}", config.log_level, e)))?;

    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter.clone());

    let subscriber = tracing_subscriber::registry().with(console_layer);

    let Some(log_file_path) = &config.app_log_file else {
        return subscriber
            .try_init()
            .map_err(|e| LoggingError::InitializationError(e.to_string()));
    };

    let directory = log_file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(directory)?;

    let file_name = log_file_path
        .file_name()
        .ok_or_else(|| LoggingError::InitializationError("Invalid log file path".to_string()))?;
    let file_appender = tracing_appender::rolling::daily(directory, file_name);

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter);

    subscriber
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::InitializationError(e.to_string()))
}
