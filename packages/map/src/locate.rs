//! # Geolocation lookups
//!
//! Platform-independent half of the geolocation watcher:
//!
//! - [`LocateOptions`]: what to ask the device for (accuracy, timeout, cache age).
//! - [`LocationError`]: why a lookup failed, with a message fit for an alert box.
//!   [`LocationError::from_code`] maps the W3C `GeolocationPositionError.code` values.
//! - [`LocateState`] + [`reduce`]: the lookup lifecycle as one tagged union. The map
//!   view feeds every request and every settled result through [`reduce`]; whichever
//!   result arrives last determines the state, even if several requests overlap.
//!
//! The browser binding lives in `crate::geolocation` (web feature, `wasm32` only).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::Position;

/// Options passed to the device for each lookup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocateOptions {
    #[serde(default = "default_high_accuracy")]
    pub high_accuracy: bool,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u32,
    /// Maximum age of a cached fix the device may return. 0 forces a fresh fix.
    #[serde(default)]
    pub maximum_age_ms: u32,
}

fn default_high_accuracy() -> bool {
    true
}

fn default_timeout_ms() -> u32 {
    10_000
}

impl Default for LocateOptions {
    fn default() -> Self {
        Self {
            high_accuracy: default_high_accuracy(),
            timeout_ms: default_timeout_ms(),
            maximum_age_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("Location permission was denied")]
    PermissionDenied,

    #[error("Your position is currently unavailable")]
    PositionUnavailable,

    #[error("Timed out while looking up your position")]
    Timeout,

    #[error("This device does not support geolocation")]
    Unsupported,

    #[error("Location lookup failed: {0}")]
    Other(String),
}

impl LocationError {
    /// Map a W3C `GeolocationPositionError.code`.
    pub fn from_code(code: u16, message: &str) -> Self {
        match code {
            1 => LocationError::PermissionDenied,
            2 => LocationError::PositionUnavailable,
            3 => LocationError::Timeout,
            _ => LocationError::Other(message.to_string()),
        }
    }
}

/// Lifecycle of the device position as seen by the map view.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum LocateState {
    #[default]
    Idle,
    Locating,
    Located(Position),
    Failed(LocationError),
}

impl LocateState {
    pub fn position(&self) -> Option<&Position> {
        match self {
            LocateState::Located(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_locating(&self) -> bool {
        matches!(self, LocateState::Locating)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LocateEvent {
    Requested,
    Found(Position),
    Failed(LocationError),
}

/// Fold one event into the state.
///
/// A new request keeps a known position visible (it only moves `Idle`/`Failed` to
/// `Locating`); settled results always replace the state.
pub fn reduce(state: &LocateState, event: LocateEvent) -> LocateState {
    match event {
        LocateEvent::Requested => match state {
            LocateState::Located(p) => LocateState::Located(p.clone()),
            _ => LocateState::Locating,
        },
        LocateEvent::Found(position) => LocateState::Located(position),
        LocateEvent::Failed(error) => LocateState::Failed(error),
    }
}
