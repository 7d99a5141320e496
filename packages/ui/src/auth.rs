//! Authentication context and hooks for the UI.
//!
//! [`AuthProvider`] checks `/api/auth/me` once on mount and exposes the result as a
//! `Signal<SessionState>`. Login, register and logout go through the same
//! [`ApiClient`], shared via context with [`use_api`].

use api::{ApiClient, UserInfo};
use dioxus::prelude::*;

/// Who is using the app right now.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// The identity check has not answered yet.
    #[default]
    Loading,
    Anonymous,
    Authenticated(UserInfo),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Result of the identity check on load.
    Checked(Option<UserInfo>),
    /// The identity check itself failed (server unreachable).
    CheckFailed,
    SignedIn(UserInfo),
    SignedOut,
}

impl SessionState {
    pub fn user(&self) -> Option<&UserInfo> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user().map(|u| u.id.as_str())
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }

    pub fn apply(&self, event: SessionEvent) -> SessionState {
        match event {
            SessionEvent::Checked(Some(user)) | SessionEvent::SignedIn(user) => {
                SessionState::Authenticated(user)
            }
            SessionEvent::Checked(None) | SessionEvent::SignedOut => SessionState::Anonymous,
            SessionEvent::CheckFailed => match self {
                SessionState::Loading => SessionState::Anonymous,
                other => other.clone(),
            },
        }
    }
}

/// Base URL of the API: the page's own origin in the browser.
pub fn api_base_url() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .unwrap_or_default()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::env::var("PARKSPOT_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
    }
}

/// Get the current session. Updates when the user logs in or out.
pub fn use_auth() -> Signal<SessionState> {
    use_context::<Signal<SessionState>>()
}

pub fn use_api() -> ApiClient {
    use_context::<ApiClient>()
}

/// Apply a session event to the shared signal.
pub fn dispatch_session(session: &mut Signal<SessionState>, event: SessionEvent) {
    let next = session.peek().apply(event);
    session.set(next);
}

/// Provider component that manages the session and the API client.
#[component]
pub fn AuthProvider(children: Element) -> Element {
    let client = use_context_provider(|| ApiClient::new(&api_base_url()));
    let mut session = use_signal(|| SessionState::Loading);
    use_context_provider(|| session);

    let _ = use_resource(move || {
        let client = client.clone();
        async move {
            match client.me().await {
                Ok(user) => dispatch_session(&mut session, SessionEvent::Checked(user)),
                Err(e) => {
                    tracing::warn!("Identity check failed: {}", e);
                    dispatch_session(&mut session, SessionEvent::CheckFailed);
                }
            }
        }
    });

    rsx! {
        {children}
    }
}

/// Button to log out the current user.
#[component]
pub fn LogoutButton(
    #[props(default = "Logout".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let mut session = use_auth();
    let client = use_api();

    let onclick = move |_| {
        let client = client.clone();
        async move {
            match client.logout().await {
                Ok(()) => dispatch_session(&mut session, SessionEvent::SignedOut),
                Err(e) => {
                    tracing::error!("Logout failed: {}", e);
                    crate::browser::alert(&e.to_string());
                }
            }
        }
    };

    rsx! {
        button {
            class: "{class}",
            onclick: onclick,
            "{label}"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> UserInfo {
        UserInfo {
            id: format!("id-{name}"),
            username: name.to_string(),
        }
    }

    #[test]
    fn test_loading_resolves_from_identity_check() {
        let state = SessionState::Loading;
        assert_eq!(
            state.apply(SessionEvent::Checked(Some(user("a")))),
            SessionState::Authenticated(user("a"))
        );
        assert_eq!(state.apply(SessionEvent::Checked(None)), SessionState::Anonymous);
        assert_eq!(state.apply(SessionEvent::CheckFailed), SessionState::Anonymous);
    }

    #[test]
    fn test_login_then_logout() {
        let state = SessionState::Anonymous.apply(SessionEvent::SignedIn(user("a")));
        assert_eq!(state.user_id(), Some("id-a"));
        assert_eq!(state.apply(SessionEvent::SignedOut), SessionState::Anonymous);
    }

    #[test]
    fn test_failed_recheck_keeps_user() {
        let state = SessionState::Authenticated(user("a"));
        assert_eq!(state.apply(SessionEvent::CheckFailed), state);
    }
}
