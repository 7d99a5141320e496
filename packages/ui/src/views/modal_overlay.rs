use dioxus::prelude::*;

/// A full-screen overlay that centers its children in a modal card.
/// Clicking outside the card triggers `on_close`; pressing Escape triggers
/// `on_escape`, or `on_close` when none is given.
#[component]
pub fn ModalOverlay(
    on_close: EventHandler<()>,
    on_escape: Option<EventHandler<()>>,
    #[props(default = "modal-card".to_string())] class: String,
    children: Element,
) -> Element {
    rsx! {
        div {
            class: "modal-overlay",
            tabindex: "-1",
            onmounted: move |evt: MountedEvent| async move {
                let _ = evt.set_focus(true).await;
            },
            onclick: move |_| on_close.call(()),
            onkeydown: move |evt: KeyboardEvent| {
                if evt.key() == Key::Escape {
                    match on_escape {
                        Some(handler) => handler.call(()),
                        None => on_close.call(()),
                    }
                }
            },
            div {
                class: "{class}",
                onclick: move |evt: Event<MouseData>| evt.stop_propagation(),
                {children}
            }
        }
    }
}
