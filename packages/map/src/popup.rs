//! Typed popup content attached to an overlay.
//!
//! Surfaces render a [`Popup`] however they like (Leaflet builds DOM nodes from it);
//! nothing here produces markup strings.

use chrono::{DateTime, Local, Utc};

use crate::geo::LatLng;

pub const CURRENT_TITLE: &str = "Current location";
pub const LAST_TITLE: &str = "Last parking spot";
pub const SAVED_TITLE: &str = "Parking spot";

#[derive(Clone, Debug, PartialEq)]
pub struct Popup {
    pub title: String,
    pub at: LatLng,
    pub timestamp: DateTime<Utc>,
    /// Photo as a data URL; clicking it opens the image viewer.
    pub image: Option<String>,
}

impl Popup {
    pub fn new(title: &str, at: LatLng, timestamp: DateTime<Utc>) -> Self {
        Self {
            title: title.to_string(),
            at,
            timestamp,
            image: None,
        }
    }

    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    /// Timestamp in the viewer's local time, `YYYY-MM-DD HH:MM`.
    pub fn timestamp_label(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }

    pub fn maps_link(&self) -> String {
        self.at.google_maps_url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_popup_fields() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();
        let popup = Popup::new(SAVED_TITLE, LatLng::new(37.5, 127.0), ts)
            .with_image(Some("data:image/jpeg;base64,/9j/".into()));

        assert_eq!(popup.title, "Parking spot");
        assert_eq!(popup.maps_link(), "https://www.google.com/maps?q=37.5,127");
        assert_eq!(popup.timestamp_label().len(), "2025-03-01 12:30".len());
        assert!(popup.image.is_some());
    }
}
