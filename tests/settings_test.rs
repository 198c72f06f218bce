mod common;

use common::{ENV_TEST_MUTEX, EnvGuard};
use lvd_records_backend::config::{AppSettings, ConfigError};

const VARS: &[&str] = &[
    "PORT",
    "SESSION_TTL_HOURS",
    "MAX_FAILED_LOGIN_ATTEMPTS",
    "LOCKOUT_MINUTES",
    "PASSWORD_PEPPER",
    "SEED_DEFAULT_USERS",
];

#[test]
fn test_settings_from_process_environment() {
    let _lock = ENV_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = EnvGuard::new(VARS.to_vec());

    unsafe {
        std::env::set_var("PORT", "8088");
        std::env::set_var("LOCKOUT_MINUTES", "45");
        std::env::set_var("PASSWORD_PEPPER", "pepper-from-env");
    }

    let settings = AppSettings::from_env().unwrap();
    assert_eq!(settings.port, 8088);
    assert_eq!(settings.lockout_minutes, 45);
    assert_eq!(settings.max_failed_login_attempts, 5);
    assert_eq!(settings.session_ttl_hours, 24);
    assert!(!format!("{:?}", settings).contains("pepper-from-env"));
}

#[test]
fn test_invalid_number_is_reported() {
    let _lock = ENV_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = EnvGuard::new(VARS.to_vec());

    unsafe {
        std::env::set_var("SESSION_TTL_HOURS", "a day");
    }

    let err = AppSettings::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "SESSION_TTL_HOURS"));
}
