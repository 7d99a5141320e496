use crate::error::AuthError;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_USERNAME_LEN: usize = 32;

/// Trim a username and check it is non-empty and not too long.
pub fn normalize_username(username: &str) -> Result<String, AuthError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AuthError::MissingUsername);
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AuthError::UsernameTooLong {
            max: MAX_USERNAME_LEN,
        });
    }
    Ok(username.to_string())
}

pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Checks run before an account is created.
///
/// The browser passes the confirmation field; the server has none and passes `None`.
/// Returns the normalized username.
pub fn validate_registration(
    username: &str,
    password: &str,
    confirm: Option<&str>,
) -> Result<String, AuthError> {
    let username = normalize_username(username)?;
    if let Some(confirm) = confirm {
        if confirm != password {
            return Err(AuthError::PasswordMismatch);
        }
    }
    validate_password(password)?;
    Ok(username)
}
