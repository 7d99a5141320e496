//! # User model for authenticated users
//!
//! Defines the two representations of a Parkspot user:
//!
//! ## [`User`] (server only)
//!
//! The complete row from the `users` table, loadable with [`sqlx::FromRow`]:
//!
//! - `id`: primary key (`UUID v4`).
//! - `username`: unique login name.
//! - `password_hash`: Argon2id PHC string.
//! - `last_lat` / `last_lng` / `last_parked_at`: the single saved parking spot.
//!   All three are set together by a location save and are `NULL` for a user who
//!   has never saved one.
//! - `created_at` / `updated_at`: audit timestamps.
//!
//! [`User::to_info`] projects the row into a [`UserInfo`], and
//! [`User::last_location`] into a [`ParkedLocation`] when one exists.
//!
//! ## [`UserInfo`]
//!
//! The client-safe subset (`id` and `username`) that crosses the HTTP boundary. The
//! `Uuid` becomes a `String` so the type works unchanged in WASM.

use serde::{Deserialize, Serialize};

#[cfg(feature = "server")]
use chrono::{DateTime, Utc};
#[cfg(feature = "server")]
use map::ParkedLocation;
#[cfg(feature = "server")]
use sqlx::FromRow;
#[cfg(feature = "server")]
use uuid::Uuid;

/// Full user record from the database.
#[cfg(feature = "server")]
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub last_lat: Option<f64>,
    pub last_lng: Option<f64>,
    pub last_parked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(feature = "server")]
impl User {
    /// Convert to UserInfo for client consumption.
    pub fn to_info(&self) -> UserInfo {
        UserInfo {
            id: self.id.to_string(),
            username: self.username.clone(),
        }
    }

    /// The saved parking spot, if the user has one.
    pub fn last_location(&self) -> Option<ParkedLocation> {
        match (self.last_lat, self.last_lng, self.last_parked_at) {
            (Some(lat), Some(lng), Some(timestamp)) => Some(ParkedLocation { lat, lng, timestamp }),
            _ => None,
        }
    }
}

/// User information safe to send to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
}
