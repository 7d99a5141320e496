//! Thin wrappers over browser APIs the views need.
//!
//! Outside the browser (server-side rendering, native tests) each function degrades
//! to a log line or a `None`.

/// Blocking `window.alert`.
pub fn alert(message: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }
    tracing::info!("alert: {}", message);
}

/// Copy text to the clipboard. Returns whether the browser accepted it.
pub async fn copy_to_clipboard(text: &str) -> bool {
    #[cfg(target_arch = "wasm32")]
    {
        use js_sys::{Function, Promise, Reflect};
        use wasm_bindgen::JsCast;

        let Some(window) = web_sys::window() else {
            return false;
        };
        let Ok(clipboard) = Reflect::get(&window.navigator(), &"clipboard".into()) else {
            return false;
        };
        if clipboard.is_undefined() {
            return false;
        }
        let Ok(write_text) = Reflect::get(&clipboard, &"writeText".into()) else {
            return false;
        };
        let Ok(write_text) = write_text.dyn_into::<Function>() else {
            return false;
        };
        match write_text.call1(&clipboard, &text.into()) {
            Ok(promise) => wasm_bindgen_futures::JsFuture::from(Promise::from(promise))
                .await
                .is_ok(),
            Err(_) => false,
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        tracing::debug!("clipboard unavailable, dropping {}", text);
        false
    }
}

/// Read the first file picked in `<input type="file" id={input_id}>` as a data URL.
pub async fn read_selected_file(input_id: &str) -> Option<String> {
    #[cfg(target_arch = "wasm32")]
    {
        use js_sys::Promise;
        use wasm_bindgen::JsCast;

        let document = web_sys::window()?.document()?;
        let input: web_sys::HtmlInputElement =
            document.get_element_by_id(input_id)?.dyn_into().ok()?;
        let file = input.files()?.get(0)?;

        let reader = web_sys::FileReader::new().ok()?;
        let loaded = Promise::new(&mut |resolve, reject| {
            reader.set_onload(Some(&resolve));
            reader.set_onerror(Some(&reject));
        });
        reader.read_as_data_url(&file).ok()?;

        let result = wasm_bindgen_futures::JsFuture::from(loaded).await;
        reader.set_onload(None);
        reader.set_onerror(None);
        result.ok()?;
        reader.result().ok()?.as_string()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = input_id;
        None
    }
}

/// Reset a file input so the same photo can be picked again.
pub fn clear_file_input(input_id: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;

        if let Some(input) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(input_id))
            .and_then(|e| e.dyn_into::<web_sys::HtmlInputElement>().ok())
        {
            input.set_value("");
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    let _ = input_id;
}

/// Wait roughly `ms` milliseconds.
pub async fn sleep_ms(ms: u64) {
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::sleep(std::time::Duration::from_millis(ms)).await;
    #[cfg(not(target_arch = "wasm32"))]
    let _ = ms;
}
