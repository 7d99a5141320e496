//! # User storage backends
//!
//! [`UserStore`] is the seam between the account service and the database. Two
//! implementations:
//!
//! - [`PgUserStore`]: the `users` table through the shared SQLx pool.
//! - [`MemoryUserStore`]: a `HashMap` behind a mutex, used by the route tests and
//!   handy for running the server without PostgreSQL.
//!
//! A user row carries at most one parking spot. [`UserStore::set_location`]
//! overwrites it in a single statement, so concurrent saves for the same user resolve
//! last-write-wins.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use map::LatLng;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::User;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already exists")]
    Duplicate,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub trait UserStore: Clone + Send + Sync + 'static {
    fn find_by_id(&self, id: Uuid) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    /// Create a user. Fails with [`StoreError::Duplicate`] when the name is taken.
    fn insert(
        &self,
        username: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<User, StoreError>> + Send;

    /// Overwrite the user's parking spot. `Ok(None)` when no such user exists.
    fn set_location(
        &self,
        id: Uuid,
        at: LatLng,
        parked_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        sqlx::query_as(
            "INSERT INTO users (id, username, password_hash) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::Duplicate,
            other => StoreError::Database(other),
        })
    }

    async fn set_location(
        &self,
        id: Uuid,
        at: LatLng,
        parked_at: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as(
            "UPDATE users SET last_lat = $2, last_lng = $3, last_parked_at = $4, updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(at.lat)
        .bind(at.lng)
        .bind(parked_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<Mutex<HashMap<Uuid, User>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.lock().map(|u| u.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_users<T>(
        &self,
        f: impl FnOnce(&mut HashMap<Uuid, User>) -> T,
    ) -> Result<T, StoreError> {
        let mut users = self
            .users
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(f(&mut users))
    }
}

impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.with_users(|users| users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.with_users(|users| users.values().find(|u| u.username == username).cloned())
    }

    async fn insert(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        self.with_users(|users| {
            if users.values().any(|u| u.username == username) {
                return Err(StoreError::Duplicate);
            }
            let now = Utc::now();
            let user = User {
                id: Uuid::new_v4(),
                username: username.to_string(),
                password_hash: password_hash.to_string(),
                last_lat: None,
                last_lng: None,
                last_parked_at: None,
                created_at: now,
                updated_at: now,
            };
            users.insert(user.id, user.clone());
            Ok(user)
        })?
    }

    async fn set_location(
        &self,
        id: Uuid,
        at: LatLng,
        parked_at: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        self.with_users(|users| {
            users.get_mut(&id).map(|user| {
                user.last_lat = Some(at.lat);
                user.last_lng = Some(at.lng);
                user.last_parked_at = Some(parked_at);
                user.updated_at = Utc::now();
                user.clone()
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_insert_rejects_duplicate_username() {
        let store = MemoryUserStore::new();
        store.insert("driver", "hash").await.unwrap();
        let err = store.insert("driver", "hash").await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_set_location_overwrites() {
        let store = MemoryUserStore::new();
        let user = store.insert("driver", "hash").await.unwrap();
        assert!(user.last_location().is_none());

        let first = Utc::now();
        store
            .set_location(user.id, LatLng::new(1.0, 2.0), first)
            .await
            .unwrap();
        let updated = store
            .set_location(user.id, LatLng::new(37.5665, 126.978), first)
            .await
            .unwrap()
            .unwrap();

        let spot = updated.last_location().unwrap();
        assert_eq!((spot.lat, spot.lng), (37.5665, 126.978));
        assert_eq!(spot.timestamp, first);
    }

    #[tokio::test]
    async fn test_memory_set_location_unknown_user() {
        let store = MemoryUserStore::new();
        let result = store
            .set_location(Uuid::new_v4(), LatLng::new(0.0, 0.0), Utc::now())
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
