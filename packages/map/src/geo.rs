//! # Geographic primitives
//!
//! | Type | Represents |
//! |------|-----------|
//! | [`LatLng`] | A WGS84 coordinate pair. Serialises as `{"lat": .., "lng": ..}`, the shape the REST API and the browser both use. |
//! | [`ParkedLocation`] | The single "last parking spot" a user has persisted on the server, with the time it was saved. |
//! | [`Position`] | A device fix reported by the geolocation watcher: coordinates plus accuracy and the time of the fix. |
//!
//! Coordinates are only checked at the edges that need it (the reconciler before it
//! asks a surface for an overlay, the server before it writes a row) via
//! [`LatLng::is_valid`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both components are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Google Maps link that drops a pin on this point.
    pub fn google_maps_url(&self) -> String {
        format!("https://www.google.com/maps?q={},{}", self.lat, self.lng)
    }
}

/// The persisted "last parking location" of a user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParkedLocation {
    pub lat: f64,
    pub lng: f64,
    pub timestamp: DateTime<Utc>,
}

impl ParkedLocation {
    pub fn coords(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// A position fix from the device.
#[derive(Clone, Debug, PartialEq)]
pub struct Position {
    pub coords: LatLng,
    /// Accuracy radius in meters, as reported by the device.
    pub accuracy: f64,
    pub timestamp: DateTime<Utc>,
}

impl Position {
    pub fn new(coords: LatLng, accuracy: f64) -> Self {
        Self {
            coords,
            accuracy,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ranges() {
        assert!(LatLng::new(37.5665, 126.9780).is_valid());
        assert!(LatLng::new(-90.0, 180.0).is_valid());
        assert!(!LatLng::new(90.5, 0.0).is_valid());
        assert!(!LatLng::new(0.0, -180.1).is_valid());
        assert!(!LatLng::new(f64::NAN, 0.0).is_valid());
        assert!(!LatLng::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_google_maps_url() {
        let url = LatLng::new(37.5665, 126.978).google_maps_url();
        assert_eq!(url, "https://www.google.com/maps?q=37.5665,126.978");
    }

    #[test]
    fn test_parked_location_wire_shape() {
        let json = r#"{"lat":37.5665,"lng":126.978,"timestamp":"2025-01-02T03:04:05Z"}"#;
        let parked: ParkedLocation = serde_json::from_str(json).unwrap();
        assert_eq!(parked.coords(), LatLng::new(37.5665, 126.978));
        assert_eq!(parked.timestamp.to_rfc3339(), "2025-01-02T03:04:05+00:00");
    }
}
