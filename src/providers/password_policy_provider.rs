use crate::errors::internal::PasswordPolicyError;

/// The one password policy, applied when creating an account and when
/// changing a password
///
/// Legacy and seeded credentials never pass through here; they are only
/// upgraded.
pub struct PasswordPolicyProvider {
    min_length: usize,
    max_length: usize,
}

impl PasswordPolicyProvider {
    pub fn new() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
        }
    }

    /// Validate in order (fail fast): length, letter, digit, username
    pub fn validate(&self, password: &str, username: Option<&str>) -> Result<(), PasswordPolicyError> {
        let length = password.chars().count();
        if length < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min: self.min_length,
            });
        }
        if length > self.max_length {
            return Err(PasswordPolicyError::TooLong {
                max: self.max_length,
            });
        }

        if !password.chars().any(char::is_alphabetic) {
            return Err(PasswordPolicyError::MissingLetter);
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(PasswordPolicyError::MissingDigit);
        }

        if let Some(username) = username.filter(|u| !u.is_empty()) {
            if password.to_lowercase().contains(&username.to_lowercase()) {
                return Err(PasswordPolicyError::ContainsUsername);
            }
        }

        Ok(())
    }
}

impl Default for PasswordPolicyProvider {
    fn default() -> Self {
        Self::new()
    }
}
