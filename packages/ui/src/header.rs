use dioxus::prelude::*;

use crate::auth::{use_auth, LogoutButton, SessionState};
use crate::auth_modal::{dispatch, use_auth_modal, ModalAction};
use crate::icons::FaSquareParking;
use crate::theme::ThemeToggle;
use crate::Icon;

/// Top bar: app name, theme toggle and the account area.
#[component]
pub fn Header() -> Element {
    let session = use_auth();
    let mut modal = use_auth_modal();

    rsx! {
        header {
            class: "app-header",
            div {
                class: "app-header__brand",
                Icon { icon: FaSquareParking, width: 22, height: 22 }
                span { "Parkspot" }
            }
            div {
                class: "app-header__actions",
                ThemeToggle {}
                match session() {
                    SessionState::Loading => rsx! {
                        span { class: "app-header__muted", "Loading..." }
                    },
                    SessionState::Authenticated(user) => rsx! {
                        span { class: "app-header__welcome", "Welcome, {user.username}" }
                        LogoutButton { class: "header-btn" }
                    },
                    SessionState::Anonymous => rsx! {
                        button {
                            class: "header-btn",
                            onclick: move |_| dispatch(&mut modal, ModalAction::OpenLogin),
                            "Log in"
                        }
                        button {
                            class: "header-btn header-btn--outline",
                            onclick: move |_| dispatch(&mut modal, ModalAction::OpenRegister),
                            "Sign up"
                        }
                    },
                }
            }
        }
    }
}
