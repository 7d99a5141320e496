//! Local username/password authentication.
//!
//! Input validation is shared with the browser so the register form can reject a
//! short password before any request is made. Hashing and the session key are
//! server only.

mod validate;

#[cfg(feature = "server")]
mod password;
#[cfg(feature = "server")]
mod session;

pub use validate::{
    normalize_username, validate_password, validate_registration, MAX_USERNAME_LEN,
    MIN_PASSWORD_LEN,
};

#[cfg(feature = "server")]
pub use password::{hash_password, verify_password, PasswordError};
#[cfg(feature = "server")]
pub use session::{session_user_id, SESSION_USER_ID_KEY};
