//! # Database module: PostgreSQL connection pool and migrations
//!
//! Entirely gated behind `#[cfg(feature = "server")]` so client (WASM) builds never
//! pull in SQLx or Tokio networking code.
//!
//! The pool is a **lazy, process-wide singleton** backed by a
//! [`tokio::sync::OnceCell`]. The first call to [`get_pool`] reads `DATABASE_URL`
//! (via `dotenvy`), opens a pool of up to 5 connections and caches it for every
//! later caller. [`run_migrations`] applies the SQL files under `migrations/`.

#[cfg(feature = "server")]
mod pool;

#[cfg(feature = "server")]
pub use pool::{get_pool, run_migrations};
