//! Server settings read from the environment.

use std::env;

use crate::geocode::DEFAULT_NOMINATIM_URL;

const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    /// Mark the session cookie `Secure` (HTTPS only).
    pub session_secure: bool,
    /// Inactivity expiry of a session.
    pub session_ttl_hours: i64,
    pub nominatim_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}

impl ServerConfig {
    /// Load `.env` (when present) and read the settings.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let session_secure = match lookup("SESSION_SECURE").as_deref() {
            None => false,
            Some("1") | Some("true") | Some("TRUE") | Some("yes") => true,
            Some("0") | Some("false") | Some("FALSE") | Some("no") => false,
            Some(other) => {
                tracing::warn!("Ignoring SESSION_SECURE={}, expected true or false", other);
                false
            }
        };

        let session_ttl_hours = match lookup("SESSION_TTL_HOURS") {
            None => DEFAULT_SESSION_TTL_HOURS,
            Some(raw) => match raw.parse::<i64>() {
                Ok(hours) if hours > 0 => hours,
                _ => {
                    tracing::warn!(
                        "Invalid SESSION_TTL_HOURS={}, using {}",
                        raw,
                        DEFAULT_SESSION_TTL_HOURS
                    );
                    DEFAULT_SESSION_TTL_HOURS
                }
            },
        };

        let nominatim_url =
            lookup("NOMINATIM_URL").unwrap_or_else(|| DEFAULT_NOMINATIM_URL.to_string());

        tracing::info!(
            "Config: session_secure={}, session_ttl_hours={}, nominatim={}",
            session_secure,
            session_ttl_hours,
            nominatim_url
        );

        Ok(Self {
            database_url,
            session_secure,
            session_ttl_hours,
            nominatim_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")])).unwrap();
        assert!(!config.session_secure);
        assert_eq!(config.session_ttl_hours, 24);
        assert_eq!(config.nominatim_url, DEFAULT_NOMINATIM_URL);
    }

    #[test]
    fn test_database_url_required() {
        assert!(matches!(
            ServerConfig::from_lookup(lookup(&[])),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("SESSION_SECURE", "true"),
            ("SESSION_TTL_HOURS", "-3"),
        ]))
        .unwrap();
        assert!(config.session_secure);
        assert_eq!(config.session_ttl_hours, 24);
    }
}
