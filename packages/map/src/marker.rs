//! Session-local parking markers.
//!
//! A [`Marker`] is created every time the user saves a spot during the session.
//! Markers live only in client memory; the most recent one is also persisted on the
//! server as the user's last parking location.

use chrono::{DateTime, Utc};

use crate::geo::LatLng;

/// A spot saved during this session.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub id: u64,
    pub at: LatLng,
    /// Photo of the spot as a `data:image/...;base64,...` URL.
    pub image_data: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Hands out marker ids that are unique and strictly increasing for the session.
///
/// Ids are seeded from the wall clock in milliseconds so they stay readable in logs,
/// but two saves within the same millisecond still get distinct ids.
#[derive(Clone, Debug, Default)]
pub struct MarkerIds {
    last: u64,
}

impl MarkerIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> u64 {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        self.last = now.max(self.last + 1);
        self.last
    }

    /// Build a marker at `at` stamped with the current time.
    pub fn create(&mut self, at: LatLng, image_data: Option<String>) -> Marker {
        Marker {
            id: self.next_id(),
            at,
            image_data,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_strictly_increase() {
        let mut ids = MarkerIds::new();
        let mut prev = ids.next_id();
        for _ in 0..1000 {
            let next = ids.next_id();
            assert!(next > prev);
            prev = next;
        }
    }

    #[test]
    fn test_create_marker() {
        let mut ids = MarkerIds::new();
        let a = ids.create(LatLng::new(1.0, 2.0), None);
        let b = ids.create(LatLng::new(1.0, 2.0), Some("data:image/png;base64,AAAA".into()));
        assert_ne!(a.id, b.id);
        assert_eq!(b.image_data.as_deref(), Some("data:image/png;base64,AAAA"));
    }
}
