//! # HTTP client for the `/api` routes
//!
//! [`ApiClient`] is what the ui crate talks to. It covers both halves of the
//! browser's remote state:
//!
//! - **auth session**: [`ApiClient::me`], [`ApiClient::login`],
//!   [`ApiClient::register`], [`ApiClient::logout`]
//! - **parking persistence**: [`ApiClient::save_location`],
//!   [`ApiClient::fetch_last_location`], plus [`ApiClient::reverse_geocode`]
//!
//! There is no retry, no queue and no cache; each call is one request. Response
//! handling lives in the `interpret_*` functions so it can be tested without a
//! server.
//!
//! The session cookie is handled by the browser on `wasm32`, and by reqwest's cookie
//! jar elsewhere.

use map::{LatLng, ParkedLocation};
use serde::de::DeserializeOwned;

use crate::error::{AuthError, PersistenceError};
use crate::models::{
    AddressResponse, AuthResponse, Credentials, LastLocationResponse, LocationUpdate,
    StatusResponse, UserInfo,
};

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn reason(body: &str) -> Option<String> {
    serde_json::from_str::<StatusResponse>(body)
        .ok()
        .and_then(|s| s.reason().map(str::to_string))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, PersistenceError> {
    serde_json::from_str(body).map_err(|e| PersistenceError::Decode(e.to_string()))
}

fn server_error(status: u16, body: &str) -> PersistenceError {
    PersistenceError::Server {
        status,
        message: reason(body).unwrap_or_else(|| "request failed".to_string()),
    }
}

/// Response of login or register.
pub fn interpret_auth(status: u16, body: &str) -> Result<UserInfo, AuthError> {
    match status {
        s if is_success(s) => serde_json::from_str::<AuthResponse>(body)
            .map(|r| r.user)
            .map_err(|e| AuthError::Rejected(e.to_string())),
        401 => Err(AuthError::InvalidCredentials),
        _ => Err(AuthError::Rejected(
            reason(body).unwrap_or_else(|| format!("Request failed ({status})")),
        )),
    }
}

/// Response of `GET /api/auth/me`. 401 means signed out.
pub fn interpret_me(status: u16, body: &str) -> Result<Option<UserInfo>, AuthError> {
    match status {
        401 => Ok(None),
        _ => interpret_auth(status, body).map(Some),
    }
}

pub fn interpret_save(status: u16, body: &str) -> Result<(), PersistenceError> {
    if !is_success(status) {
        return Err(server_error(status, body));
    }
    let response: StatusResponse = decode(body)?;
    if response.success {
        Ok(())
    } else {
        Err(server_error(status, body))
    }
}

/// Response of `GET /api/auth/last-parking-location/{userId}`.
///
/// A 404 or an empty body means "nothing saved yet", not an error.
pub fn interpret_last(status: u16, body: &str) -> Result<Option<ParkedLocation>, PersistenceError> {
    if status == 404 || (is_success(status) && body.trim().is_empty()) {
        return Ok(None);
    }
    if !is_success(status) {
        return Err(server_error(status, body));
    }
    let response: LastLocationResponse = decode(body)?;
    Ok(response.data)
}

pub fn interpret_address(status: u16, body: &str) -> Result<Option<String>, PersistenceError> {
    if !is_success(status) {
        return Err(server_error(status, body));
    }
    let response: AddressResponse = decode(body)?;
    Ok(response.address)
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .unwrap_or_default();
        #[cfg(target_arch = "wasm32")]
        let http = reqwest::Client::new();

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read(response: reqwest::Response) -> Result<(u16, String), reqwest::Error> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }

    pub async fn me(&self) -> Result<Option<UserInfo>, AuthError> {
        let response = self.http.get(self.url("/api/auth/me")).send().await?;
        let (status, body) = Self::read(response).await?;
        interpret_me(status, &body)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<UserInfo, AuthError> {
        self.credentials("/api/auth/login", username, password).await
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<UserInfo, AuthError> {
        self.credentials("/api/auth/register", username, password).await
    }

    async fn credentials(
        &self,
        path: &str,
        username: &str,
        password: &str,
    ) -> Result<UserInfo, AuthError> {
        let body = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self.http.post(self.url(path)).json(&body).send().await?;
        let (status, body) = Self::read(response).await?;
        interpret_auth(status, &body)
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        let response = self.http.post(self.url("/api/auth/logout")).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(AuthError::Rejected(format!("Logout failed ({status})")))
        }
    }

    /// Persist `at` as the user's last parking location.
    pub async fn save_location(&self, user_id: &str, at: LatLng) -> Result<(), PersistenceError> {
        let body = LocationUpdate {
            user_id: user_id.to_string(),
            location: at,
        };
        let response = self
            .http
            .post(self.url("/api/auth/update-location"))
            .json(&body)
            .send()
            .await?;
        let (status, body) = Self::read(response).await?;
        interpret_save(status, &body)
    }

    pub async fn fetch_last_location(
        &self,
        user_id: &str,
    ) -> Result<Option<ParkedLocation>, PersistenceError> {
        let response = self
            .http
            .get(self.url(&format!("/api/auth/last-parking-location/{user_id}")))
            .send()
            .await?;
        let (status, body) = Self::read(response).await?;
        interpret_last(status, &body)
    }

    pub async fn reverse_geocode(&self, at: LatLng) -> Result<Option<String>, PersistenceError> {
        let response = self
            .http
            .get(self.url("/api/geocode/reverse"))
            .query(&[("lat", at.lat), ("lng", at.lng)])
            .send()
            .await?;
        let (status, body) = Self::read(response).await?;
        interpret_address(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_location_absent_on_404() {
        let body = r#"{"success":false,"message":"No parking location saved"}"#;
        assert_eq!(interpret_last(404, body), Ok(None));
    }

    #[test]
    fn test_last_location_absent_on_empty_body() {
        assert_eq!(interpret_last(200, ""), Ok(None));
        assert_eq!(interpret_last(200, r#"{"success":true,"data":null}"#), Ok(None));
    }

    #[test]
    fn test_last_location_present() {
        let body = r#"{"success":true,"data":{"lat":37.5665,"lng":126.978,"timestamp":"2026-10-17T09:30:00Z"}}"#;
        let spot = interpret_last(200, body).unwrap().unwrap();
        assert_eq!((spot.lat, spot.lng), (37.5665, 126.978));
    }

    #[test]
    fn test_last_location_server_error_surfaces() {
        let body = r#"{"success":false,"error":"Internal server error"}"#;
        assert_eq!(
            interpret_last(500, body),
            Err(PersistenceError::Server {
                status: 500,
                message: "Internal server error".into()
            })
        );
    }

    #[test]
    fn test_save_failure_carries_reason() {
        let body = r#"{"success":false,"error":"Cannot access another user's parking location"}"#;
        let err = interpret_save(403, body).unwrap_err();
        assert!(err.to_string().contains("another user's"));
        assert_eq!(interpret_save(200, r#"{"success":true,"message":"ok"}"#), Ok(()));
    }

    #[test]
    fn test_me_401_is_signed_out() {
        assert_eq!(interpret_me(401, r#"{"success":false,"error":"Not authenticated"}"#), Ok(None));
        let body = r#"{"success":true,"user":{"id":"u1","username":"driver"}}"#;
        assert_eq!(
            interpret_me(200, body).unwrap().map(|u| u.username),
            Some("driver".to_string())
        );
    }

    #[test]
    fn test_auth_errors() {
        assert_eq!(interpret_auth(401, "{}"), Err(AuthError::InvalidCredentials));
        assert_eq!(
            interpret_auth(400, r#"{"success":false,"error":"Username is already taken"}"#),
            Err(AuthError::Rejected("Username is already taken".into()))
        );
    }

    #[test]
    fn test_url_joins_base() {
        let client = ApiClient::new("http://localhost:8080/");
        assert_eq!(client.url("/api/auth/me"), "http://localhost:8080/api/auth/me");
    }
}
