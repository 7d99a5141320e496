//! Account and parking-spot operations behind the REST routes.
//!
//! Every function takes the id of the session user (if any) explicitly, so the
//! ownership rules can be tested without HTTP:
//!
//! - no session user: [`AppError::Unauthorized`]
//! - a `userId` that is not the session user: [`AppError::Forbidden`]

use chrono::Utc;
use map::{LatLng, ParkedLocation};
use uuid::Uuid;

use crate::auth::{hash_password, normalize_username, validate_registration, verify_password};
use crate::error::{AppError, AuthError};
use crate::models::User;
use crate::store::{StoreError, UserStore};

pub async fn register<S: UserStore>(
    store: &S,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    let username = validate_registration(username, password, None)?;

    if store.find_by_username(&username).await?.is_some() {
        return Err(AuthError::DuplicateUsername.into());
    }

    let password_hash = hash_password(password)?;
    let user = store
        .insert(&username, &password_hash)
        .await
        .map_err(|e| match e {
            StoreError::Duplicate => AppError::from(AuthError::DuplicateUsername),
            other => other.into(),
        })?;

    tracing::info!("Registered user {}", user.username);
    Ok(user)
}

pub async fn login<S: UserStore>(
    store: &S,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    let username = normalize_username(username).map_err(|_| AuthError::InvalidCredentials)?;

    let Some(user) = store.find_by_username(&username).await? else {
        return Err(AuthError::InvalidCredentials.into());
    };

    let valid = verify_password(password, &user.password_hash)?;
    if !valid {
        tracing::warn!("Failed login for {}", username);
        return Err(AuthError::InvalidCredentials.into());
    }

    Ok(user)
}

/// The user behind the session. A session whose user no longer exists counts as
/// signed out.
pub async fn current_user<S: UserStore>(
    store: &S,
    session_user: Option<Uuid>,
) -> Result<User, AppError> {
    let id = session_user.ok_or(AuthError::NotAuthenticated)?;
    store
        .find_by_id(id)
        .await?
        .ok_or_else(|| AuthError::NotAuthenticated.into())
}

fn authorize(session_user: Option<Uuid>, user_id: &str) -> Result<Uuid, AppError> {
    let me = session_user.ok_or(AuthError::NotAuthenticated)?;
    match Uuid::parse_str(user_id.trim()) {
        Ok(requested) if requested == me => Ok(me),
        _ => Err(AppError::Forbidden(
            "Cannot access another user's parking location".into(),
        )),
    }
}

/// Persist `at` as the user's single parking spot, stamped now.
pub async fn update_location<S: UserStore>(
    store: &S,
    session_user: Option<Uuid>,
    user_id: &str,
    at: LatLng,
) -> Result<ParkedLocation, AppError> {
    let id = authorize(session_user, user_id)?;

    if !at.is_valid() {
        return Err(AppError::BadRequest("Invalid coordinates".into()));
    }

    let user = store
        .set_location(id, at, Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    tracing::info!("Saved parking spot for {} at {}, {}", user.username, at.lat, at.lng);
    user.last_location()
        .ok_or_else(|| AppError::Internal("location was not stored".into()))
}

pub async fn last_location<S: UserStore>(
    store: &S,
    session_user: Option<Uuid>,
    user_id: &str,
) -> Result<ParkedLocation, AppError> {
    let id = authorize(session_user, user_id)?;

    let user = store
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    user.last_location()
        .ok_or_else(|| AppError::NotFound("No parking location saved".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryUserStore;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_register_short_password_creates_nobody() {
        let store = MemoryUserStore::new();
        let err = register(&store, "driver", "abcd").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_register_duplicate_is_bad_request() {
        let store = MemoryUserStore::new();
        register(&store, "driver", "secret1").await.unwrap();
        let err = register(&store, " driver ", "secret2").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Username is already taken");
    }

    #[tokio::test]
    async fn test_login_checks_password() {
        let store = MemoryUserStore::new();
        register(&store, "driver", "secret1").await.unwrap();

        assert!(login(&store, "driver", "secret1").await.is_ok());
        let err = login(&store, "driver", "wrong!!").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        let err = login(&store, "nobody", "secret1").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_new_user_has_no_last_location() {
        let store = MemoryUserStore::new();
        let user = register(&store, "driver", "secret1").await.unwrap();
        let err = last_location(&store, Some(user.id), &user.id.to_string())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_save_then_fetch_round_trip() {
        let store = MemoryUserStore::new();
        let user = register(&store, "driver", "secret1").await.unwrap();
        let id = user.id.to_string();
        let before = Utc::now();

        update_location(&store, Some(user.id), &id, LatLng::new(37.5665, 126.978))
            .await
            .unwrap();
        let spot = last_location(&store, Some(user.id), &id).await.unwrap();

        assert_eq!((spot.lat, spot.lng), (37.5665, 126.978));
        assert!(spot.timestamp >= before);
    }

    #[tokio::test]
    async fn test_ownership_rules() {
        let store = MemoryUserStore::new();
        let alice = register(&store, "alice", "secret1").await.unwrap();
        let bob = register(&store, "bob", "secret1").await.unwrap();
        let at = LatLng::new(1.0, 1.0);

        let err = update_location(&store, None, &alice.id.to_string(), at)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let err = update_location(&store, Some(bob.id), &alice.id.to_string(), at)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let err = last_location(&store, Some(bob.id), "not-a-uuid")
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_invalid_coordinates_rejected() {
        let store = MemoryUserStore::new();
        let user = register(&store, "driver", "secret1").await.unwrap();
        let err = update_location(
            &store,
            Some(user.id),
            &user.id.to_string(),
            LatLng::new(91.0, 0.0),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stale_session_user_is_not_authenticated() {
        let store = MemoryUserStore::new();
        let err = current_user(&store, Some(Uuid::new_v4())).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
