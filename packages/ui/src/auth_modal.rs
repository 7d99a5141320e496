//! # Login / register modal
//!
//! The whole modal is one value, [`AuthModal`], changed only through [`reduce`]. The
//! component renders whatever the current value says: nothing when `Closed`, the
//! login form or the register form otherwise. Switching between the two keeps the
//! typed username and drops the passwords.
//!
//! Register runs the client-side checks from [`api::auth::validate_registration`]
//! (matching confirmation, minimum length) before anything is sent.

use api::auth::validate_registration;
use dioxus::prelude::*;

use crate::auth::{dispatch_session, use_api, use_auth, SessionEvent};
use crate::views::ModalOverlay;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuthForm {
    pub username: String,
    pub password: String,
    pub confirm: String,
    pub error: Option<String>,
    pub submitting: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthModal {
    #[default]
    Closed,
    Login(AuthForm),
    Register(AuthForm),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    Password,
    Confirm,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModalAction {
    OpenLogin,
    OpenRegister,
    SwitchToLogin,
    SwitchToRegister,
    Edit(Field, String),
    Submitting,
    Failed(String),
    Close,
    Escape,
}

impl AuthModal {
    pub fn form(&self) -> Option<&AuthForm> {
        match self {
            AuthModal::Closed => None,
            AuthModal::Login(form) | AuthModal::Register(form) => Some(form),
        }
    }

    fn form_mut(&mut self) -> Option<&mut AuthForm> {
        match self {
            AuthModal::Closed => None,
            AuthModal::Login(form) | AuthModal::Register(form) => Some(form),
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, AuthModal::Closed)
    }
}

/// Keep the username, drop everything else.
fn carry_over(form: Option<&AuthForm>) -> AuthForm {
    AuthForm {
        username: form.map(|f| f.username.clone()).unwrap_or_default(),
        ..AuthForm::default()
    }
}

pub fn reduce(state: &AuthModal, action: ModalAction) -> AuthModal {
    match action {
        ModalAction::OpenLogin => AuthModal::Login(AuthForm::default()),
        ModalAction::OpenRegister => AuthModal::Register(AuthForm::default()),
        ModalAction::SwitchToLogin if state.is_open() => AuthModal::Login(carry_over(state.form())),
        ModalAction::SwitchToRegister if state.is_open() => {
            AuthModal::Register(carry_over(state.form()))
        }
        ModalAction::SwitchToLogin | ModalAction::SwitchToRegister => state.clone(),
        ModalAction::Close | ModalAction::Escape => AuthModal::Closed,
        ModalAction::Edit(field, value) => {
            let mut next = state.clone();
            if let Some(form) = next.form_mut() {
                match field {
                    Field::Username => form.username = value,
                    Field::Password => form.password = value,
                    Field::Confirm => form.confirm = value,
                }
                form.error = None;
            }
            next
        }
        ModalAction::Submitting => {
            let mut next = state.clone();
            if let Some(form) = next.form_mut() {
                form.submitting = true;
                form.error = None;
            }
            next
        }
        ModalAction::Failed(message) => {
            let mut next = state.clone();
            if let Some(form) = next.form_mut() {
                form.submitting = false;
                form.error = Some(message);
            }
            next
        }
    }
}

pub type AuthModalSignal = Signal<AuthModal>;

pub fn use_auth_modal() -> AuthModalSignal {
    use_context::<AuthModalSignal>()
}

pub fn dispatch(modal: &mut AuthModalSignal, action: ModalAction) {
    let next = reduce(&modal.peek(), action);
    modal.set(next);
}

/// Renders the modal described by the shared [`AuthModalSignal`].
#[component]
pub fn AuthModalView() -> Element {
    let mut modal = use_auth_modal();
    let mut session = use_auth();
    let client = use_api();

    let state = modal();
    let (is_register, form) = match &state {
        AuthModal::Closed => return rsx! {},
        AuthModal::Login(form) => (false, form.clone()),
        AuthModal::Register(form) => (true, form.clone()),
    };

    let onsubmit = move |evt: FormEvent| {
        evt.prevent_default();
        let client = client.clone();
        let Some(form) = modal.peek().form().cloned() else {
            return;
        };
        if form.submitting {
            return;
        }
        spawn(async move {
            if is_register {
                if let Err(e) =
                    validate_registration(&form.username, &form.password, Some(&form.confirm))
                {
                    dispatch(&mut modal, ModalAction::Failed(e.to_string()));
                    return;
                }
            }

            dispatch(&mut modal, ModalAction::Submitting);
            let result = if is_register {
                client.register(&form.username, &form.password).await
            } else {
                client.login(&form.username, &form.password).await
            };

            match result {
                Ok(user) => {
                    tracing::info!("Signed in as {}", user.username);
                    dispatch_session(&mut session, SessionEvent::SignedIn(user));
                    dispatch(&mut modal, ModalAction::Close);
                }
                Err(e) => dispatch(&mut modal, ModalAction::Failed(e.to_string())),
            }
        });
    };

    let title = if is_register { "Create account" } else { "Log in" };
    let submit_label = match (is_register, form.submitting) {
        (_, true) => "Please wait...",
        (true, false) => "Sign up",
        (false, false) => "Log in",
    };

    rsx! {
        ModalOverlay {
            on_close: move |_| dispatch(&mut modal, ModalAction::Close),
            on_escape: move |_| dispatch(&mut modal, ModalAction::Escape),
            div {
                class: "auth-modal",
                div {
                    class: "auth-modal__header",
                    h3 { "{title}" }
                    button {
                        class: "close-btn",
                        r#type: "button",
                        onclick: move |_| dispatch(&mut modal, ModalAction::Close),
                        "×"
                    }
                }

                form {
                    class: "auth-form",
                    onsubmit: onsubmit,

                    label { r#for: "auth-username", "Username" }
                    input {
                        id: "auth-username",
                        r#type: "text",
                        autocomplete: "username",
                        autofocus: true,
                        required: true,
                        value: "{form.username}",
                        oninput: move |evt: FormEvent| {
                            dispatch(&mut modal, ModalAction::Edit(Field::Username, evt.value()))
                        },
                    }

                    label { r#for: "auth-password", "Password" }
                    input {
                        id: "auth-password",
                        r#type: "password",
                        autocomplete: if is_register { "new-password" } else { "current-password" },
                        required: true,
                        value: "{form.password}",
                        oninput: move |evt: FormEvent| {
                            dispatch(&mut modal, ModalAction::Edit(Field::Password, evt.value()))
                        },
                    }

                    if is_register {
                        label { r#for: "auth-confirm", "Confirm password" }
                        input {
                            id: "auth-confirm",
                            r#type: "password",
                            autocomplete: "new-password",
                            required: true,
                            value: "{form.confirm}",
                            oninput: move |evt: FormEvent| {
                                dispatch(&mut modal, ModalAction::Edit(Field::Confirm, evt.value()))
                            },
                        }
                    }

                    if let Some(err) = &form.error {
                        p { class: "error-message", "{err}" }
                    }

                    button {
                        class: "submit-btn",
                        r#type: "submit",
                        disabled: form.submitting,
                        "{submit_label}"
                    }
                }

                div {
                    class: "auth-modal__footer",
                    if is_register {
                        span { "Already have an account?" }
                        button {
                            class: "link-btn",
                            r#type: "button",
                            onclick: move |_| dispatch(&mut modal, ModalAction::SwitchToLogin),
                            "Log in"
                        }
                    } else {
                        span { "New here?" }
                        button {
                            class: "link-btn",
                            r#type: "button",
                            onclick: move |_| dispatch(&mut modal, ModalAction::SwitchToRegister),
                            "Create an account"
                        }
                    }
                }
            }
        }
    }
}
