//! # API crate: accounts and parking-spot persistence for Parkspot
//!
//! Shared by the browser and the server. The wire models, validation rules and the
//! HTTP client compile everywhere (including WASM); everything that touches the
//! database, password hashes or sessions sits behind the `server` feature.
//!
//! ## Modules
//!
//! | Module | Feature gate | Purpose |
//! |--------|-------------|---------|
//! | [`auth`] | (partly `server`) | Username/password rules, Argon2id hashing, session key |
//! | [`client`] | none | [`ApiClient`]: auth session and location calls over HTTP |
//! | [`error`] | (partly `server`) | `AuthError`, `PersistenceError`, server `AppError` |
//! | [`models`] | (partly `server`) | `User` row, `UserInfo`, JSON request/response bodies |
//! | [`config`] | `server` | `ServerConfig` from environment variables |
//! | [`db`] | `server` | PostgreSQL pool (lazy `OnceCell` singleton) and migrations |
//! | [`geocode`] | `server` | Nominatim reverse lookups |
//! | [`store`] | `server` | `UserStore` trait with PostgreSQL and in-memory backends |
//! | [`service`] | `server` | Register, login and location rules over a `UserStore` |
//! | [`routes`] | `server` | The axum router for `/api/*` |

pub mod auth;
pub mod client;
pub mod error;
pub mod models;

#[cfg(feature = "server")]
pub mod config;
pub mod db;
#[cfg(feature = "server")]
pub mod geocode;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod service;
#[cfg(feature = "server")]
pub mod store;

pub use client::ApiClient;
pub use error::{AuthError, PersistenceError};
pub use map::{LatLng, ParkedLocation};
pub use models::UserInfo;
