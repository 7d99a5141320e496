//! Session keys and helpers.

use tower_sessions::Session;
use uuid::Uuid;

/// Key for storing user ID in session.
pub const SESSION_USER_ID_KEY: &str = "user_id";

/// The id of the signed-in user, or `None` for an anonymous session.
///
/// A value that no longer parses as a UUID is treated as anonymous.
pub async fn session_user_id(session: &Session) -> Result<Option<Uuid>, tower_sessions::session::Error> {
    let raw: Option<String> = session.get(SESSION_USER_ID_KEY).await?;
    Ok(raw.and_then(|id| Uuid::parse_str(&id).ok()))
}
