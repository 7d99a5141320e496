//! Reverse geocoding through Nominatim.
//!
//! The browser cannot set the `User-Agent` Nominatim's usage policy asks for, so the
//! lookup runs on the server and the client reaches it through
//! `GET /api/geocode/reverse`.

use map::LatLng;
use serde_json::Value;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

const USER_AGENT: &str = concat!("parkspot/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct Geocoder {
    client: reqwest::Client,
    base_url: String,
}

impl Geocoder {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn reverse_url(&self, at: LatLng) -> String {
        format!(
            "{}/reverse?format=jsonv2&lat={}&lon={}",
            self.base_url, at.lat, at.lng
        )
    }

    /// Street address for `at`, or `None` when Nominatim has nothing there.
    pub async fn reverse(&self, at: LatLng) -> Result<Option<String>, reqwest::Error> {
        let body: Value = self
            .client
            .get(self.reverse_url(at))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(parse_reverse(&body))
    }
}

/// Pull `display_name` out of a `format=jsonv2` reverse response.
pub fn parse_reverse(body: &Value) -> Option<String> {
    body.get("display_name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_display_name() {
        let body = json!({
            "place_id": 1,
            "display_name": "Sejong-daero, Jung-gu, Seoul, South Korea",
            "address": {"city": "Seoul"}
        });
        assert_eq!(
            parse_reverse(&body).as_deref(),
            Some("Sejong-daero, Jung-gu, Seoul, South Korea")
        );
    }

    #[test]
    fn test_parse_unable_to_geocode() {
        assert_eq!(parse_reverse(&json!({"error": "Unable to geocode"})), None);
        assert_eq!(parse_reverse(&json!({"display_name": "  "})), None);
    }

    #[test]
    fn test_reverse_url() {
        let geocoder = Geocoder::new("http://localhost:8088/").unwrap();
        assert_eq!(
            geocoder.reverse_url(LatLng::new(37.5665, 126.978)),
            "http://localhost:8088/reverse?format=jsonv2&lat=37.5665&lon=126.978"
        );
    }
}
