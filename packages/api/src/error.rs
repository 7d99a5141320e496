//! Error types shared by the browser client and the server.
//!
//! [`AuthError`] and [`PersistenceError`] are what the ui crate shows to the user.
//! [`AppError`] exists only on the server and renders itself as an HTTP status plus
//! the `{success: false, ...}` JSON body.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("Username is required")]
    MissingUsername,

    #[error("Username must be at most {max} characters")]
    UsernameTooLong { max: usize },

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Username is already taken")]
    DuplicateUsername,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("{0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PersistenceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server responded {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for PersistenceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            PersistenceError::Decode(e.to_string())
        } else {
            PersistenceError::Network(e.to_string())
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::Network(e.to_string())
    }
}

#[cfg(feature = "server")]
pub use server::AppError;

#[cfg(feature = "server")]
mod server {
    use axum::{
        http::StatusCode,
        response::{IntoResponse, Response},
        Json,
    };
    use thiserror::Error;

    use super::AuthError;
    use crate::auth::PasswordError;
    use crate::models::StatusResponse;
    use crate::store::StoreError;

    #[derive(Debug, Error)]
    pub enum AppError {
        #[error("{0}")]
        BadRequest(String),

        #[error("{0}")]
        Unauthorized(String),

        #[error("{0}")]
        Forbidden(String),

        #[error("{0}")]
        NotFound(String),

        #[error("Store error: {0}")]
        Store(#[from] StoreError),

        #[error("Session error: {0}")]
        Session(#[from] tower_sessions::session::Error),

        #[error("Internal error: {0}")]
        Internal(String),
    }

    impl From<AuthError> for AppError {
        fn from(e: AuthError) -> Self {
            match e {
                AuthError::InvalidCredentials => AppError::Unauthorized(e.to_string()),
                AuthError::NotAuthenticated => AppError::Unauthorized(e.to_string()),
                AuthError::Network(msg) => AppError::Internal(msg),
                other => AppError::BadRequest(other.to_string()),
            }
        }
    }

    impl From<PasswordError> for AppError {
        fn from(e: PasswordError) -> Self {
            match e {
                PasswordError::Rejected(auth) => auth.into(),
                other => AppError::Internal(other.to_string()),
            }
        }
    }

    impl AppError {
        pub fn status(&self) -> StatusCode {
            match self {
                AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
                AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                AppError::Forbidden(_) => StatusCode::FORBIDDEN,
                AppError::NotFound(_) => StatusCode::NOT_FOUND,
                AppError::Store(StoreError::Duplicate) => StatusCode::BAD_REQUEST,
                AppError::Store(_) | AppError::Session(_) | AppError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        }
    }

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = self.status();
            let body = match &self {
                AppError::NotFound(msg) => StatusResponse::not_found(msg),
                AppError::Store(StoreError::Duplicate) => {
                    StatusResponse::error(&AuthError::DuplicateUsername.to_string())
                }
                _ if status.is_server_error() => {
                    tracing::error!("request failed: {}", self);
                    StatusResponse::error("Internal server error")
                }
                _ => StatusResponse::error(&self.to_string()),
            };

            (status, Json(body)).into_response()
        }
    }
}

#[cfg(all(test, feature = "server"))]
mod tests {
    use super::*;
    use axum::{http::StatusCode, response::IntoResponse};

    #[test]
    fn test_auth_errors_map_to_statuses() {
        assert_eq!(
            AppError::from(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(AuthError::PasswordTooShort { min: 6 }).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_password_errors_map_to_statuses() {
        use crate::auth::PasswordError;
        let short = PasswordError::Rejected(AuthError::PasswordTooShort { min: 6 });
        assert_eq!(AppError::from(short).status(), StatusCode::BAD_REQUEST);
        let broken = PasswordError::MalformedHash("bad".into());
        assert_eq!(
            AppError::from(broken).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let response = AppError::Internal("pool exhausted".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
