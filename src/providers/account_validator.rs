use crate::errors::internal::ValidationError;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 50;

/// Username shape for new accounts: 3 to 50 characters drawn from ASCII
/// letters, digits, `-`, `_` and `.`
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidUsername {
        username: username.to_owned(),
        reason: reason.to_owned(),
    };

    if username.is_empty() {
        return Err(ValidationError::MissingField("username"));
    }

    let length = username.chars().count();
    if length < USERNAME_MIN {
        return Err(invalid("must be at least 3 characters"));
    }
    if length > USERNAME_MAX {
        return Err(invalid("must not exceed 50 characters"));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(invalid("may only contain letters, digits, '-', '_' and '.'"));
    }

    Ok(())
}

/// Basic `local@domain.tld` shape check; deliverability is not our concern
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidEmail(email.to_owned());

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }

    Ok(())
}
