use std::fmt;

use super::env_provider::{EnvironmentProvider, SystemEnvironment, get_parsed};
use super::errors::ConfigError;

/// Runtime settings, read once at startup
#[derive(Clone)]
pub struct AppSettings {
    pub database_url: String,
    pub host: String,
    pub port: u16,

    /// Optional Argon2 secret mixed into every hash
    pub password_pepper: String,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,

    pub session_ttl_hours: i64,
    pub max_failed_login_attempts: u32,
    pub lockout_minutes: i64,
    /// 0 disables the background sweep
    pub session_cleanup_interval_minutes: u64,

    pub seed_default_users: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://records.db?mode=rwc".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            password_pepper: String::new(),
            argon2_memory_kib: argon2::Params::DEFAULT_M_COST,
            argon2_iterations: argon2::Params::DEFAULT_T_COST,
            argon2_parallelism: argon2::Params::DEFAULT_P_COST,
            session_ttl_hours: 24,
            max_failed_login_attempts: 5,
            lockout_minutes: 30,
            session_cleanup_interval_minutes: 60,
            seed_default_users: false,
        }
    }
}

impl AppSettings {
    pub fn from_env_provider(env: &dyn EnvironmentProvider) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port: u16 = get_parsed(env, "PORT", defaults.port, "a port number")?;
        if port == 0 {
            return Err(ConfigError::OutOfRange {
                key: "PORT".to_string(),
                value: 0,
                min: 1,
                max: 65535,
            });
        }

        let settings = Self {
            database_url: env.get_or("DATABASE_URL", &defaults.database_url),
            host: env.get_or("HOST", &defaults.host),
            port,
            password_pepper: env.get_var("PASSWORD_PEPPER").unwrap_or_default(),
            argon2_memory_kib: get_parsed(
                env,
                "ARGON2_MEMORY_KIB",
                defaults.argon2_memory_kib,
                "a size in KiB",
            )?,
            argon2_iterations: get_parsed(
                env,
                "ARGON2_ITERATIONS",
                defaults.argon2_iterations,
                "an iteration count",
            )?,
            argon2_parallelism: get_parsed(
                env,
                "ARGON2_PARALLELISM",
                defaults.argon2_parallelism,
                "a lane count",
            )?,
            session_ttl_hours: positive(
                "SESSION_TTL_HOURS",
                get_parsed(env, "SESSION_TTL_HOURS", defaults.session_ttl_hours, "hours")?,
                24 * 365,
            )?,
            max_failed_login_attempts: get_parsed(
                env,
                "MAX_FAILED_LOGIN_ATTEMPTS",
                defaults.max_failed_login_attempts,
                "a whole number",
            )?,
            lockout_minutes: positive(
                "LOCKOUT_MINUTES",
                get_parsed(env, "LOCKOUT_MINUTES", defaults.lockout_minutes, "minutes")?,
                60 * 24 * 30,
            )?,
            session_cleanup_interval_minutes: get_parsed(
                env,
                "SESSION_CLEANUP_INTERVAL_MINUTES",
                defaults.session_cleanup_interval_minutes,
                "minutes",
            )?,
            seed_default_users: get_parsed(
                env,
                "SEED_DEFAULT_USERS",
                defaults.seed_default_users,
                "true or false",
            )?,
        };

        if settings.max_failed_login_attempts == 0 {
            return Err(ConfigError::OutOfRange {
                key: "MAX_FAILED_LOGIN_ATTEMPTS".to_string(),
                value: 0,
                min: 1,
                max: i64::from(u32::MAX),
            });
        }

        Ok(settings)
    }

    /// Settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_provider(&SystemEnvironment)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn positive(key: &str, value: i64, max: i64) -> Result<i64, ConfigError> {
    if (1..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange {
            key: key.to_string(),
            value,
            min: 1,
            max,
        })
    }
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pepper = if self.password_pepper.is_empty() {
            "[unset]"
        } else {
            "[REDACTED]"
        };

        f.debug_struct("AppSettings")
            .field("database_url", &self.database_url)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password_pepper", &pepper)
            .field("argon2_memory_kib", &self.argon2_memory_kib)
            .field("argon2_iterations", &self.argon2_iterations)
            .field("argon2_parallelism", &self.argon2_parallelism)
            .field("session_ttl_hours", &self.session_ttl_hours)
            .field("max_failed_login_attempts", &self.max_failed_login_attempts)
            .field("lockout_minutes", &self.lockout_minutes)
            .field(
                "session_cleanup_interval_minutes",
                &self.session_cleanup_interval_minutes,
            )
            .field("seed_default_users", &self.seed_default_users)
            .finish()
    }
}
