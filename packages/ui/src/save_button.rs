use dioxus::prelude::*;

use crate::browser::{clear_file_input, read_selected_file};

const PHOTO_INPUT_ID: &str = "parking-photo";

/// "Save parking spot" plus an optional photo picker.
///
/// The photo is read only when the button is pressed; `on_save` receives it as a
/// data URL, or `None` when no photo was picked. It returns whether the save went
/// ahead; a refused save keeps the picked photo for the next attempt.
#[component]
pub fn SaveButton(on_save: Callback<Option<String>, bool>) -> Element {
    let mut reading = use_signal(|| false);

    let onclick = move |_| async move {
        reading.set(true);
        let photo = read_selected_file(PHOTO_INPUT_ID).await;
        reading.set(false);
        if on_save.call(photo) {
            clear_file_input(PHOTO_INPUT_ID);
        }
    };

    rsx! {
        div {
            class: "save-controls",
            button {
                class: "control-btn control-btn--primary",
                disabled: reading(),
                onclick: onclick,
                "Save parking spot"
            }
            label {
                class: "photo-picker",
                r#for: PHOTO_INPUT_ID,
                "Attach a photo (optional)"
            }
            input {
                id: PHOTO_INPUT_ID,
                r#type: "file",
                accept: "image/*",
                "capture": "environment",
            }
        }
    }
}
