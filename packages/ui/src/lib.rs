//! This crate contains all shared UI for the workspace.

use dioxus::prelude::*;

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

pub mod views;

pub const PARKSPOT_CSS: Asset = asset!("/assets/parkspot.css");

mod auth;
pub use auth::{
    api_base_url, dispatch_session, use_api, use_auth, AuthProvider, LogoutButton,
    SessionEvent, SessionState,
};

pub mod auth_modal;
pub use auth_modal::{use_auth_modal, AuthModal, AuthModalSignal, AuthModalView};

pub mod browser;

mod header;
pub use header::Header;

mod map_view;
pub use map_view::{locate_status, save_message, MapView};

mod save_button;
pub use save_button::SaveButton;

mod theme;
pub use theme::{
    apply_theme, load_theme_from_storage, Theme, ThemeProvider, ThemeSignal, ThemeToggle,
    THEME_STORAGE_KEY,
};
