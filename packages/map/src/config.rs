//! # Map configuration: `parkspot.toml`
//!
//! Settings for the browser map. Every field has a default, so an empty or missing
//! file is equivalent to [`MapConfig::default`].
//!
//! ```toml
//! [view]
//! center_lat = 37.5665      # where the map opens before the first fix
//! center_lng = 126.978
//! initial_zoom = 13
//! focus_zoom = 16           # zoom used when recentering on a pin
//!
//! [tiles]
//! url = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png"
//! attribution = "&copy; OpenStreetMap contributors"
//! max_zoom = 19
//!
//! [locate]
//! high_accuracy = true
//! timeout_ms = 10000
//! maximum_age_ms = 0
//! ```

use serde::{Deserialize, Serialize};

use crate::geo::LatLng;
use crate::locate::LocateOptions;
use crate::reconciler::DEFAULT_FOCUS_ZOOM;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub tiles: TileConfig,
    #[serde(default)]
    pub locate: LocateOptions,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default = "default_center_lat")]
    pub center_lat: f64,
    #[serde(default = "default_center_lng")]
    pub center_lng: f64,
    #[serde(default = "default_initial_zoom")]
    pub initial_zoom: u8,
    #[serde(default = "default_focus_zoom")]
    pub focus_zoom: u8,
}

// Seoul City Hall.
fn default_center_lat() -> f64 {
    37.5665
}

fn default_center_lng() -> f64 {
    126.9780
}

fn default_initial_zoom() -> u8 {
    13
}

fn default_focus_zoom() -> u8 {
    DEFAULT_FOCUS_ZOOM
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            center_lat: default_center_lat(),
            center_lng: default_center_lng(),
            initial_zoom: default_initial_zoom(),
            focus_zoom: default_focus_zoom(),
        }
    }
}

impl ViewConfig {
    pub fn center(&self) -> LatLng {
        LatLng::new(self.center_lat, self.center_lng)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileConfig {
    #[serde(default = "default_tile_url")]
    pub url: String,
    #[serde(default = "default_attribution")]
    pub attribution: String,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,
}

fn default_tile_url() -> String {
    "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()
}

fn default_attribution() -> String {
    "&copy; OpenStreetMap contributors".to_string()
}

fn default_max_zoom() -> u8 {
    19
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            url: default_tile_url(),
            attribution: default_attribution(),
            max_zoom: default_max_zoom(),
        }
    }
}

impl MapConfig {
    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "parkspot.toml"
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config = MapConfig::from_toml("").unwrap();
        assert_eq!(config, MapConfig::default());
        assert_eq!(config.view.center(), LatLng::new(37.5665, 126.978));
        assert_eq!(config.view.focus_zoom, 16);
        assert!(config.locate.high_accuracy);
    }

    #[test]
    fn test_partial_override() {
        let config = MapConfig::from_toml(
            r#"
            [view]
            initial_zoom = 11

            [locate]
            timeout_ms = 3000
            "#,
        )
        .unwrap();

        assert_eq!(config.view.initial_zoom, 11);
        assert_eq!(config.view.focus_zoom, 16);
        assert_eq!(config.locate.timeout_ms, 3000);
        assert_eq!(config.tiles.max_zoom, 19);
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = MapConfig::default();
        config.tiles.url = "https://tiles.example/{z}/{x}/{y}.png".into();
        let text = config.to_toml().unwrap();
        assert_eq!(MapConfig::from_toml(&text).unwrap(), config);
    }
}
