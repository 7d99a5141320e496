use dioxus::prelude::*;

use super::ModalOverlay;

/// Full-size view of a parking photo.
#[component]
pub fn ImageModal(src: String, on_close: EventHandler<()>) -> Element {
    rsx! {
        ModalOverlay {
            on_close: on_close,
            class: "modal-card image-modal",
            button {
                class: "close-btn image-modal__close",
                onclick: move |_| on_close.call(()),
                "×"
            }
            img {
                class: "image-modal__photo",
                src: "{src}",
                alt: "Parking spot photo",
            }
        }
    }
}
