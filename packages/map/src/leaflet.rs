//! # Leaflet map surface: browser rendering
//!
//! [`LeafletSurface`] is the [`MapSurface`] used on the **web platform**. It drives a
//! Leaflet map (the global `L` object, loaded from a `<script>` tag by the ui crate)
//! through hand-written `wasm-bindgen` bindings.
//!
//! ## Popups
//!
//! Popup bodies are built as DOM nodes from the typed [`Popup`]. When a popup carries
//! a photo, the `on_image_click` callback handed to [`LeafletSurface::mount`] is
//! attached to the `<img>` directly; the listener is detached again when the overlay
//! is removed. No global `window` functions, no inline `onclick` attributes.
//!
//! ## Lifetime
//!
//! The ui crate calls [`MapSurface::invalidate_size`] on window resizes. Dropping the surface calls `map.remove()`, which tears down every layer and
//! Leaflet's own DOM listeners on the container.

use std::rc::Rc;

use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::config::MapConfig;
use crate::geo::LatLng;
use crate::overlay::{MapSurface, Overlay, PinStyle, SurfaceError};
use crate::popup::Popup;

#[wasm_bindgen]
extern "C" {
    type LeafletMap;

    #[wasm_bindgen(catch, js_namespace = L, js_name = map)]
    fn leaflet_map(element: &web_sys::HtmlElement) -> Result<LeafletMap, JsValue>;

    #[wasm_bindgen(method, js_name = setView)]
    fn set_view(this: &LeafletMap, center: &JsValue, zoom: u8) -> LeafletMap;

    #[wasm_bindgen(method, js_name = removeLayer)]
    fn remove_layer(this: &LeafletMap, layer: &Layer) -> LeafletMap;

    #[wasm_bindgen(method, js_name = invalidateSize)]
    fn invalidate_size(this: &LeafletMap) -> LeafletMap;

    #[wasm_bindgen(method, js_name = remove)]
    fn destroy(this: &LeafletMap) -> LeafletMap;

    type Layer;

    #[wasm_bindgen(catch, js_namespace = L, js_name = marker)]
    fn leaflet_marker(at: &JsValue, options: &JsValue) -> Result<Layer, JsValue>;

    #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
    fn leaflet_tile_layer(url: &str, options: &JsValue) -> Layer;

    #[wasm_bindgen(js_namespace = L, js_name = icon)]
    fn leaflet_icon(options: &JsValue) -> JsValue;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &Layer, map: &LeafletMap) -> Layer;

    #[wasm_bindgen(method, js_name = bindPopup)]
    fn bind_popup(this: &Layer, content: &web_sys::HtmlElement, options: &JsValue) -> Layer;

    #[wasm_bindgen(method, js_name = openPopup)]
    fn open_popup(this: &Layer) -> Layer;
}

const PARKING_PIN_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 36" width="32" height="48"><path fill="#DC143C" stroke="#8B0000" stroke-width="1.5" d="M12 0C7.03 0 3 4.03 3 9c0 6.75 9 18 9 18s9-11.25 9-18c0-4.97-4.03-9-9-9z"/><text x="12" y="14" text-anchor="middle" font-size="12" font-weight="bold" fill="white">P</text></svg>"##;

/// Callback invoked with the photo's data URL when a popup photo is clicked.
pub type ImageClick = Rc<dyn Fn(String)>;

/// A live Leaflet marker plus the photo listener attached to its popup.
pub struct LeafletOverlay {
    layer: Layer,
    photo_listener: Option<(web_sys::Element, Closure<dyn FnMut()>)>,
}

pub struct LeafletSurface {
    map: LeafletMap,
    document: web_sys::Document,
    on_image_click: Option<ImageClick>,
}

fn js_object(entries: &[(&str, JsValue)]) -> JsValue {
    let obj = Object::new();
    for (key, value) in entries {
        let _ = Reflect::set(&obj, &(*key).into(), value);
    }
    obj.into()
}

fn js_latlng(at: LatLng) -> JsValue {
    Array::of2(&at.lat.into(), &at.lng.into()).into()
}

fn js_pair(a: i32, b: i32) -> JsValue {
    Array::of2(&a.into(), &b.into()).into()
}

fn describe(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| {
            Reflect::get(err, &"message".into())
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| "unknown error".to_string())
}

impl LeafletSurface {
    /// Create a Leaflet map inside the element with id `container_id`.
    ///
    /// Returns [`SurfaceError::NotReady`] while the Leaflet script or the container
    /// is not in the page yet; callers retry on the next tick.
    pub fn mount(
        container_id: &str,
        config: &MapConfig,
        on_image_click: Option<ImageClick>,
    ) -> Result<Self, SurfaceError> {
        let window = web_sys::window().ok_or(SurfaceError::NotReady)?;
        let document = window.document().ok_or(SurfaceError::NotReady)?;

        if !Reflect::has(&window, &"L".into()).unwrap_or(false) {
            return Err(SurfaceError::NotReady);
        }

        let container: web_sys::HtmlElement = document
            .get_element_by_id(container_id)
            .ok_or(SurfaceError::NotReady)?
            .dyn_into()
            .map_err(|_| SurfaceError::Rejected(format!("#{container_id} is not an HTML element")))?;

        let map = leaflet_map(&container).map_err(|e| SurfaceError::Rejected(describe(&e)))?;
        map.set_view(&js_latlng(config.view.center()), config.view.initial_zoom);

        let tile_options = js_object(&[
            ("attribution", config.tiles.attribution.as_str().into()),
            ("maxZoom", config.tiles.max_zoom.into()),
        ]);
        leaflet_tile_layer(&config.tiles.url, &tile_options).add_to(&map);

        Ok(Self {
            map,
            document,
            on_image_click,
        })
    }

    fn parking_icon() -> JsValue {
        let url = format!(
            "data:image/svg+xml;charset=utf-8,{}",
            String::from(js_sys::encode_uri_component(PARKING_PIN_SVG))
        );
        leaflet_icon(&js_object(&[
            ("iconUrl", url.into()),
            ("iconSize", js_pair(32, 48)),
            ("iconAnchor", js_pair(16, 48)),
            ("popupAnchor", js_pair(0, -48)),
        ]))
    }

    fn popup_element(
        &self,
        popup: &Popup,
    ) -> Result<(web_sys::HtmlElement, Option<(web_sys::Element, Closure<dyn FnMut()>)>), JsValue> {
        let doc = &self.document;
        let root: web_sys::HtmlElement = doc.create_element("div")?.dyn_into()?;
        root.set_class_name("parking-popup");

        let title = doc.create_element("b")?;
        title.set_text_content(Some(&popup.title));
        root.append_child(&title)?;

        let mut listener = None;
        if let Some(src) = &popup.image {
            let img = doc.create_element("img")?;
            img.set_attribute("src", src)?;
            img.set_attribute("alt", "Parking spot photo")?;
            img.set_class_name("parking-popup__photo");
            if let Some(callback) = &self.on_image_click {
                let callback = callback.clone();
                let src = src.clone();
                let closure = Closure::<dyn FnMut()>::new(move || callback(src.clone()));
                img.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
                listener = Some((img.clone(), closure));
            }
            root.append_child(&img)?;
        }

        let time = doc.create_element("small")?;
        time.set_class_name("parking-popup__time");
        time.set_text_content(Some(&popup.timestamp_label()));
        root.append_child(&time)?;

        let link = doc.create_element("a")?;
        link.set_class_name("parking-popup__link");
        link.set_attribute("href", &popup.maps_link())?;
        link.set_attribute("target", "_blank")?;
        link.set_attribute("rel", "noopener noreferrer")?;
        link.set_text_content(Some("Open in Google Maps →"));
        root.append_child(&link)?;

        Ok((root, listener))
    }
}

impl MapSurface for LeafletSurface {
    type Handle = LeafletOverlay;

    fn add_overlay(&mut self, overlay: &Overlay) -> Result<LeafletOverlay, SurfaceError> {
        let options = match overlay.style {
            PinStyle::Default => js_object(&[]),
            PinStyle::Parking => js_object(&[("icon", Self::parking_icon())]),
        };

        let layer = leaflet_marker(&js_latlng(overlay.at), &options)
            .map_err(|e| SurfaceError::Rejected(describe(&e)))?;
        let (content, photo_listener) = self
            .popup_element(&overlay.popup)
            .map_err(|e| SurfaceError::Rejected(describe(&e)))?;

        layer.add_to(&self.map);
        layer.bind_popup(
            &content,
            &js_object(&[("maxWidth", 250.into()), ("className", "custom-popup".into())]),
        );
        if overlay.open_popup {
            layer.open_popup();
        }

        Ok(LeafletOverlay {
            layer,
            photo_listener,
        })
    }

    fn remove_overlay(&mut self, handle: LeafletOverlay) {
        self.map.remove_layer(&handle.layer);
        if let Some((img, closure)) = handle.photo_listener {
            let _ = img.remove_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        }
    }

    fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.map.set_view(&js_latlng(center), zoom);
    }

    fn invalidate_size(&mut self) {
        self.map.invalidate_size();
    }
}

impl Drop for LeafletSurface {
    fn drop(&mut self) {
        self.map.destroy();
    }
}
