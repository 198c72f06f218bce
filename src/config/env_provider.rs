#[cfg(test)]
use std::collections::HashMap;
use std::str::FromStr;

use super::errors::ConfigError;

/// Source of configuration values
///
/// Injected so tests can supply values without touching the process
/// environment, which parallel tests would otherwise race on.
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;

    /// Value for `key`, or `default` when unset or blank
    fn get_or(&self, key: &str, default: &str) -> String {
        self.get_var(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string())
    }
}

/// Parse `key` into `T`; unset or blank falls back to `default`
pub fn get_parsed<T>(
    env: &dyn EnvironmentProvider,
    key: &str,
    default: T,
    expected: &str,
) -> Result<T, ConfigError>
where
    T: FromStr,
{
    match env.get_var(key).map(|v| v.trim().to_string()) {
        None => Ok(default),
        Some(v) if v.is_empty() => Ok(default),
        Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: v,
            expected: expected.to_string(),
        }),
    }
}

/// Production environment provider that reads from system environment
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Test environment provider with configurable variables
#[cfg(test)]
#[derive(Default)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

#[cfg(test)]
impl MockEnvironment {
    pub fn new(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_vars(mut self, vars: &[(&str, &str)]) -> Self {
        for (key, value) in vars {
            self.vars.insert(key.to_string(), value.to_string());
        }
        self
    }
}

#[cfg(test)]
impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_falls_back_on_blank() {
        let env = MockEnvironment::empty()
            .with_var("HOST", "   ")
            .with_var("LOG_LEVEL", "debug");

        assert_eq!(env.get_or("HOST", "127.0.0.1"), "127.0.0.1");
        assert_eq!(env.get_or("LOG_LEVEL", "INFO"), "debug");
        assert_eq!(env.get_or("MISSING", "x"), "x");
    }

    #[test]
    fn test_get_parsed_reports_bad_value() {
        let env = MockEnvironment::empty().with_var("LOCKOUT_MINUTES", "thirty");

        let err = get_parsed::<i64>(&env, "LOCKOUT_MINUTES", 30, "a whole number of minutes")
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, ref value, .. } if key == "LOCKOUT_MINUTES" && value == "thirty"
        ));
    }

    #[test]
    fn test_get_parsed_uses_default_when_unset() {
        let env = MockEnvironment::empty();
        assert_eq!(get_parsed::<u16>(&env, "PORT", 3000, "a port").unwrap(), 3000);
    }
}
