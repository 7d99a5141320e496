//! Argon2id password hashes, stored as PHC strings in `users.password_hash`.
//!
//! Hashing refuses anything [`validate_password`] rejects, so a short password can
//! never reach the table even if a caller skips registration checks.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

use super::validate::validate_password;
use crate::error::AuthError;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error(transparent)]
    Rejected(#[from] AuthError),

    #[error("Failed to hash password: {0}")]
    Hash(String),

    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),
}

pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    validate_password(password)?;
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// `Ok(false)` on a wrong password; `Err` only for a hash that does not parse.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MIN_PASSWORD_LEN;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter22", &hash).unwrap());
        assert!(!verify_password("hunter23", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let a = hash_password("parking").unwrap();
        let b = hash_password("parking").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_short_password_is_never_hashed() {
        let err = hash_password("abcd").unwrap_err();
        assert!(matches!(
            err,
            PasswordError::Rejected(AuthError::PasswordTooShort { min: MIN_PASSWORD_LEN })
        ));
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(PasswordError::MalformedHash(_))
        ));
    }
}
