//! JSON bodies of the `/api/auth/*` endpoints.
//!
//! Field names follow the REST contract (`userId`, `success`, `data`), so these types
//! are shared verbatim by the axum handlers and the browser client.

use map::{LatLng, ParkedLocation};
use serde::{Deserialize, Serialize};

use super::UserInfo;

/// `POST /api/auth/register` and `POST /api/auth/login` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Successful auth response: `{success: true, user: {id, username}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: UserInfo,
}

impl AuthResponse {
    pub fn new(user: UserInfo) -> Self {
        Self {
            success: true,
            user,
        }
    }
}

/// `POST /api/auth/update-location` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdate {
    pub user_id: String,
    pub location: LatLng,
}

/// `GET /api/auth/last-parking-location/:userId` success body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastLocationResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<ParkedLocation>,
}

/// `GET /api/geocode/reverse?lat=..&lng=..` success body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressResponse {
    pub success: bool,
    #[serde(default)]
    pub address: Option<String>,
}

/// Generic `{success, message?, error?}` body used for acknowledgements and errors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusResponse {
    pub fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            error: None,
        }
    }

    pub fn error(error: &str) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.to_string()),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self {
            success: false,
            message: Some(message.to_string()),
            error: None,
        }
    }

    /// Whichever of `error` or `message` the server filled in.
    pub fn reason(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_update_uses_camel_case() {
        let body = LocationUpdate {
            user_id: "u1".into(),
            location: LatLng::new(37.5665, 126.978),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"userId": "u1", "location": {"lat": 37.5665, "lng": 126.978}})
        );
    }

    #[test]
    fn test_status_response_omits_empty_fields() {
        let json = serde_json::to_string(&StatusResponse::error("nope")).unwrap();
        assert_eq!(json, r#"{"success":false,"error":"nope"}"#);
        assert_eq!(StatusResponse::not_found("none").reason(), Some("none"));
    }
}
