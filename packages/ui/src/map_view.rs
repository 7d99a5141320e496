//! # Map view
//!
//! Puts the pieces together on one screen:
//!
//! - a [`MarkerReconciler`] over the page's map surface (Leaflet in the browser, an
//!   in-memory surface everywhere else), created once the Leaflet script and the
//!   container are both in the page;
//! - the device position, folded through [`map::locate::reduce`];
//! - the signed-in user's last parking spot, fetched from the API;
//! - the spots saved during this session, each rendered as a `Saved(id)` pin.
//!
//! Whenever the session changes the reconciler is rebound to the new user, which
//! wipes every pin, and the map is rebuilt from scratch. The refresh button does the
//! same rebuild for the current user. A window `resize` listener keeps Leaflet's
//! idea of the container size current while the view is mounted.

use std::cell::RefCell;
use std::rc::Rc;

use api::ApiClient;
use dioxus::prelude::*;
use map::locate::{reduce, LocateEvent};
use map::{
    LatLng, LocateOptions, LocateState, LocationError, MapConfig, MapSurface, Marker,
    MarkerIds, MarkerReconciler, ParkedLocation, Position, SurfaceError,
};

use crate::auth::{use_api, use_auth};
use crate::auth_modal::{dispatch, use_auth_modal, ModalAction};
use crate::browser::{alert, copy_to_clipboard, sleep_ms};
use crate::save_button::SaveButton;
use crate::views::ImageModal;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
type Surface = map::LeafletSurface;
#[cfg(not(all(target_arch = "wasm32", feature = "web")))]
type Surface = map::MemorySurface;

type SharedReconciler = Rc<RefCell<Option<MarkerReconciler<Surface>>>>;
type PhotoClick = Rc<dyn Fn(String)>;

const MAP_CONTAINER_ID: &str = "parking-map";
const MOUNT_ATTEMPTS: u32 = 50;
const MOUNT_RETRY_MS: u64 = 100;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

#[cfg(all(target_arch = "wasm32", feature = "web"))]
fn mount_surface(config: &MapConfig, on_photo: PhotoClick) -> Result<Surface, SurfaceError> {
    map::LeafletSurface::mount(MAP_CONTAINER_ID, config, Some(on_photo))
}

#[cfg(not(all(target_arch = "wasm32", feature = "web")))]
fn mount_surface(_config: &MapConfig, _on_photo: PhotoClick) -> Result<Surface, SurfaceError> {
    Ok(map::MemorySurface::new())
}

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod resize {
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    use super::{fit_to_container, SharedReconciler};

    /// A `resize` listener on `window`, detached on drop.
    pub struct ResizeListener(Closure<dyn FnMut()>);

    impl ResizeListener {
        pub fn attach(reconciler: SharedReconciler) -> Option<Self> {
            let window = web_sys::window()?;
            let closure = Closure::<dyn FnMut()>::new(move || {
                fit_to_container(&reconciler);
            });
            window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())
                .ok()?;
            Some(Self(closure))
        }
    }

    impl Drop for ResizeListener {
        fn drop(&mut self) {
            if let Some(window) = web_sys::window() {
                let _ = window
                    .remove_event_listener_with_callback("resize", self.0.as_ref().unchecked_ref());
            }
        }
    }
}

#[cfg(not(all(target_arch = "wasm32", feature = "web")))]
mod resize {
    use super::SharedReconciler;

    #[allow(dead_code)]
    pub struct ResizeListener;

    impl ResizeListener {
        pub fn attach(_reconciler: SharedReconciler) -> Option<Self> {
            None
        }
    }
}

use resize::ResizeListener;

/// Tell the mounted map its container may have changed size.
#[cfg_attr(not(all(target_arch = "wasm32", feature = "web")), allow(dead_code))]
fn fit_to_container(shared: &SharedReconciler) -> bool {
    let Ok(mut guard) = shared.try_borrow_mut() else {
        return false;
    };
    match guard.as_mut() {
        Some(reconciler) => {
            reconciler.surface_mut().invalidate_size();
            true
        }
        None => false,
    }
}

/// Wipe the map, then redraw the spots saved this session.
fn rebuild<S: MapSurface>(
    reconciler: &mut MarkerReconciler<S>,
    saved: &[Marker],
) -> Result<usize, SurfaceError> {
    reconciler.clear_all();
    reconciler.sync_saved(saved)
}

/// Bind the map to `user_id`. A different user starts with no saved spots.
fn rebind<S: MapSurface>(
    reconciler: &mut MarkerReconciler<S>,
    saved: &mut Vec<Marker>,
    user_id: Option<&str>,
) -> bool {
    let changed = reconciler.bind_user(user_id);
    if changed {
        saved.clear();
    }
    changed
}

/// Draw a fetched last spot for `user_id`.
///
/// Returns `Ok(false)` when the map was rebound to someone else while the fetch
/// was in flight; nothing is drawn then.
fn apply_last<S: MapSurface>(
    reconciler: &mut MarkerReconciler<S>,
    user_id: &str,
    spot: &ParkedLocation,
) -> Result<bool, SurfaceError> {
    if reconciler.user() != Some(user_id) {
        return Ok(false);
    }
    reconciler.load_last(Some(spot))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SaveBlocked {
    SignedOut,
    NoPosition,
}

/// Who is saving and where, or why a save cannot happen yet.
fn save_target(
    user_id: Option<String>,
    locate: &LocateState,
) -> Result<(String, LatLng), SaveBlocked> {
    let user_id = user_id.ok_or(SaveBlocked::SignedOut)?;
    let at = locate.position().ok_or(SaveBlocked::NoPosition)?.coords;
    Ok((user_id, at))
}

async fn locate_device(options: &LocateOptions) -> Result<Position, LocationError> {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        map::geolocation::locate(options).await
    }
    #[cfg(not(all(target_arch = "wasm32", feature = "web")))]
    {
        let _ = options;
        Err(LocationError::Unsupported)
    }
}

/// Text shown after a spot was saved.
pub fn save_message(address: Option<&str>, link: &str, copied: bool) -> String {
    let mut message = String::from("Parking spot saved.");
    if let Some(address) = address {
        message.push_str(&format!("\n\nAddress: {address}"));
    }
    if copied {
        message.push_str(&format!("\n\nGoogle Maps link copied to clipboard:\n{link}"));
    } else {
        message.push_str(&format!("\n\nGoogle Maps link:\n{link}"));
    }
    message
}

pub fn locate_status(state: &LocateState) -> String {
    match state {
        LocateState::Idle => "Location not requested yet".to_string(),
        LocateState::Locating => "Finding your location...".to_string(),
        LocateState::Located(p) => format!("Accurate to about {:.0} m", p.accuracy),
        LocateState::Failed(e) => e.to_string(),
    }
}

/// Handles shared by the map's async tasks.
#[derive(Clone)]
struct MapCtx {
    reconciler: SharedReconciler,
    client: ApiClient,
    options: LocateOptions,
    locate_state: Signal<LocateState>,
    saved: Signal<Vec<Marker>>,
    ids: Signal<MarkerIds>,
    pins: Signal<usize>,
}

impl MapCtx {
    /// Run `f` against the reconciler, if the map is mounted.
    fn with<R>(&self, f: impl FnOnce(&mut MarkerReconciler<Surface>) -> R) -> Option<R> {
        let mut guard = self.reconciler.borrow_mut();
        let reconciler = guard.as_mut()?;
        let result = f(reconciler);
        let mut pins = self.pins;
        pins.set(reconciler.len());
        Some(result)
    }

    fn set_locate(&self, event: LocateEvent) {
        let mut state = self.locate_state;
        let next = reduce(&state.peek(), event);
        state.set(next);
    }

    /// Switch to `user_id`. A different user starts with no saved spots.
    fn bind(&self, user_id: Option<&str>) {
        let mut list = self.saved.peek().clone();
        if self.with(|r| rebind(r, &mut list, user_id)) == Some(true) {
            tracing::info!("Map bound to {:?}", user_id);
            let mut saved = self.saved;
            saved.set(list);
        }
    }

    /// Rebuild every pin: saved spots, then the device position and last spot.
    fn refresh(&self, user_id: Option<String>) {
        let saved = self.saved.peek().clone();
        if let Some(Err(e)) = self.with(|r| rebuild(r, &saved)) {
            tracing::warn!("Some saved spots could not be drawn: {}", e);
        }

        self.locate();
        if let Some(user_id) = user_id {
            self.load_last(user_id);
        }
    }

    fn locate(&self) {
        let ctx = self.clone();
        self.set_locate(LocateEvent::Requested);
        spawn(async move {
            match locate_device(&ctx.options).await {
                Ok(position) => {
                    if let Some(Err(e)) = ctx.with(|r| r.upsert_current(&position)) {
                        tracing::warn!("Could not draw current position: {}", e);
                    }
                    ctx.set_locate(LocateEvent::Found(position));
                }
                Err(e) => {
                    tracing::warn!("Geolocation failed: {}", e);
                    ctx.set_locate(LocateEvent::Failed(e.clone()));
                    alert(&format!("Could not get your location: {e}"));
                }
            }
        });
    }

    fn load_last(&self, user_id: String) {
        let ctx = self.clone();
        spawn(async move {
            match ctx.client.fetch_last_location(&user_id).await {
                Ok(Some(spot)) => match ctx.with(|r| apply_last(r, &user_id, &spot)) {
                    Some(Ok(false)) => {
                        tracing::debug!("Dropped last spot of {}: map was rebound", user_id)
                    }
                    Some(Err(e)) => tracing::warn!("Could not draw last parking spot: {}", e),
                    _ => {}
                },
                Ok(None) => tracing::debug!("No parking spot saved yet"),
                Err(e) => {
                    tracing::error!("Failed to fetch last parking spot: {}", e);
                    alert(&format!("Could not load your last parking spot: {e}"));
                }
            }
        });
    }

    fn save(&self, user_id: String, at: LatLng, image: Option<String>) {
        let mut ids = self.ids;
        let marker = ids.write().create(at, image);
        {
            let mut saved = self.saved;
            saved.write().push(marker.clone());
        }
        if let Some(Err(e)) = self.with(|r| r.add_saved(&marker)) {
            tracing::warn!("Could not draw saved spot {}: {}", marker.id, e);
        }

        let client = self.client.clone();
        spawn(async move {
            if let Err(e) = client.save_location(&user_id, at).await {
                tracing::error!("Failed to save parking spot: {}", e);
                alert(&format!("Could not save your parking spot: {e}"));
                return;
            }

            let link = at.google_maps_url();
            let copied = copy_to_clipboard(&link).await;
            let address = match client.reverse_geocode(at).await {
                Ok(address) => address,
                Err(e) => {
                    tracing::warn!("Reverse geocoding failed: {}", e);
                    None
                }
            };
            alert(&save_message(address.as_deref(), &link, copied));
        });
    }
}

#[component]
pub fn MapView() -> Element {
    let session = use_auth();
    let mut modal = use_auth_modal();
    let config = try_use_context::<MapConfig>().unwrap_or_default();

    let mut ready = use_signal(|| false);
    let mut viewing = use_signal(|| Option::<String>::None);
    let locate_state = use_signal(LocateState::default);
    let pins = use_signal(|| 0usize);

    let ctx = MapCtx {
        reconciler: use_hook(|| Rc::new(RefCell::new(None))),
        client: use_api(),
        options: config.locate.clone(),
        locate_state,
        saved: use_signal(Vec::new),
        ids: use_signal(MarkerIds::new),
        pins,
    };

    let resize: Rc<RefCell<Option<ResizeListener>>> = use_hook(|| Rc::new(RefCell::new(None)));
    let resize_slot = resize.clone();
    use_drop(move || {
        resize_slot.borrow_mut().take();
    });

    // Mount the map once Leaflet and the container exist.
    let mount_ctx = ctx.clone();
    use_effect(move || {
        let ctx = mount_ctx.clone();
        let resize = resize.clone();
        let config = config.clone();
        spawn(async move {
            let on_photo: PhotoClick = Rc::new(move |src| {
                let mut viewing = viewing;
                viewing.set(Some(src));
            });
            for _ in 0..MOUNT_ATTEMPTS {
                match mount_surface(&config, on_photo.clone()) {
                    Ok(surface) => {
                        let reconciler =
                            MarkerReconciler::new(surface).with_focus_zoom(config.view.focus_zoom);
                        *ctx.reconciler.borrow_mut() = Some(reconciler);
                        *resize.borrow_mut() = ResizeListener::attach(ctx.reconciler.clone());
                        ready.set(true);
                        return;
                    }
                    Err(SurfaceError::NotReady) => sleep_ms(MOUNT_RETRY_MS).await,
                    Err(e) => {
                        tracing::error!("Map failed to load: {}", e);
                        alert(&format!("The map failed to load: {e}"));
                        return;
                    }
                }
            }
            tracing::error!("Map never became ready");
        });
    });

    // Rebind and rebuild whenever the map comes up or the session changes.
    let session_ctx = ctx.clone();
    use_effect(move || {
        let state = session();
        if !ready() || state.is_loading() {
            return;
        }
        let user_id = state.user_id().map(str::to_string);
        session_ctx.bind(user_id.as_deref());
        session_ctx.refresh(user_id);
    });

    let refresh_ctx = ctx.clone();
    let on_refresh = move |_| {
        let user_id = session.peek().user_id().map(str::to_string);
        refresh_ctx.refresh(user_id);
    };

    let save_ctx = ctx.clone();
    let on_save = move |image: Option<String>| -> bool {
        let user_id = session.peek().user_id().map(str::to_string);
        let target = save_target(user_id, &save_ctx.locate_state.peek());
        match target {
            Ok((user_id, at)) => {
                save_ctx.save(user_id, at, image);
                true
            }
            Err(SaveBlocked::SignedOut) => {
                alert("Log in to save your parking spot.");
                dispatch(&mut modal, ModalAction::OpenLogin);
                false
            }
            Err(SaveBlocked::NoPosition) => {
                alert("Your current location is not known yet. Try refreshing.");
                false
            }
        }
    };

    let status = locate_status(&locate_state());
    let busy = locate_state().is_locating();
    let pin_count = pins();

    rsx! {
        document::Link { rel: "stylesheet", href: LEAFLET_CSS }
        document::Script { src: LEAFLET_JS }

        div {
            class: "map-shell",
            div { id: MAP_CONTAINER_ID, class: "map-container" }

            div {
                class: "map-controls",
                button {
                    class: "control-btn",
                    disabled: busy,
                    onclick: on_refresh,
                    "Refresh location"
                }
                SaveButton { on_save: on_save }
                p { class: "map-status", "{status}" }
                p { class: "map-status", "{pin_count} pins on the map" }
            }

            if !ready() {
                div { class: "map-loading", "Loading map..." }
            }
        }

        if let Some(src) = viewing() {
            ImageModal {
                src: src,
                on_close: move |_| viewing.set(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use map::{Identity, MemorySurface, SurfaceOp};

    fn reconciler() -> MarkerReconciler<MemorySurface> {
        MarkerReconciler::new(MemorySurface::new())
    }

    fn saved_spots() -> Vec<Marker> {
        let mut ids = MarkerIds::new();
        vec![
            ids.create(LatLng::new(37.5665, 126.9780), None),
            ids.create(LatLng::new(37.5700, 126.9820), None),
        ]
    }

    fn spot() -> ParkedLocation {
        ParkedLocation {
            lat: 37.5665,
            lng: 126.9780,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_rebuild_replaces_everything_with_saved_spots() {
        let mut rec = reconciler();
        rec.upsert_current(&Position::new(LatLng::new(37.0, 127.0), 5.0))
            .unwrap();
        rec.load_last(Some(&spot())).unwrap();
        let saved = saved_spots();

        assert_eq!(rebuild(&mut rec, &saved).unwrap(), 2);
        assert_eq!(
            rec.identities(),
            vec![Identity::Saved(saved[0].id), Identity::Saved(saved[1].id)]
        );
        assert_eq!(rec.surface().live_count(), 2);
    }

    #[test]
    fn test_rebind_same_user_keeps_saved_spots() {
        let mut rec = reconciler();
        let mut saved = saved_spots();
        assert!(rebind(&mut rec, &mut saved, Some("a")));
        assert!(saved.is_empty());

        saved = saved_spots();
        rebuild(&mut rec, &saved).unwrap();
        assert!(!rebind(&mut rec, &mut saved, Some("a")));
        assert_eq!(saved.len(), 2);
        assert_eq!(rec.len(), 2);
    }

    #[test]
    fn test_rebind_other_user_drops_saved_spots() {
        let mut rec = reconciler();
        let mut saved = saved_spots();
        rebind(&mut rec, &mut saved, Some("a"));
        saved = saved_spots();
        rebuild(&mut rec, &saved).unwrap();

        assert!(rebind(&mut rec, &mut saved, None));
        assert!(saved.is_empty());
        assert!(rec.is_empty());
    }

    #[test]
    fn test_last_spot_for_previous_user_is_dropped() {
        let mut rec = reconciler();
        let mut saved = Vec::new();
        rebind(&mut rec, &mut saved, Some("a"));
        // The fetch for "a" lands after the map moved on to "b".
        rebind(&mut rec, &mut saved, Some("b"));

        assert!(!apply_last(&mut rec, "a", &spot()).unwrap());
        assert!(!rec.contains(Identity::Last));
        assert_eq!(rec.surface().live_count(), 0);

        assert!(apply_last(&mut rec, "b", &spot()).unwrap());
        assert!(rec.contains(Identity::Last));
    }

    #[test]
    fn test_save_needs_user_and_position() {
        let located = LocateState::Located(Position::new(LatLng::new(37.5665, 126.978), 8.0));
        assert_eq!(save_target(None, &located), Err(SaveBlocked::SignedOut));
        assert_eq!(
            save_target(Some("a".into()), &LocateState::Locating),
            Err(SaveBlocked::NoPosition)
        );
        assert_eq!(
            save_target(Some("a".into()), &located),
            Ok(("a".to_string(), LatLng::new(37.5665, 126.978)))
        );
    }

    #[test]
    fn test_fit_to_container_reaches_mounted_surface() {
        let shared: SharedReconciler = Rc::new(RefCell::new(None));
        assert!(!fit_to_container(&shared));

        *shared.borrow_mut() = Some(reconciler());
        assert!(fit_to_container(&shared));
        let guard = shared.borrow();
        let ops = guard.as_ref().unwrap().surface().ops();
        assert_eq!(ops.last(), Some(&SurfaceOp::Resized));
    }

    #[test]
    fn test_save_message_with_address() {
        let message = save_message(
            Some("Sejong-daero, Seoul"),
            "https://www.google.com/maps?q=37.5665,126.978",
            true,
        );
        assert!(message.contains("Address: Sejong-daero, Seoul"));
        assert!(message.contains("copied to clipboard"));
    }

    #[test]
    fn test_save_message_without_clipboard() {
        let message = save_message(None, "https://www.google.com/maps?q=1,2", false);
        assert!(!message.contains("Address"));
        assert!(message.ends_with("https://www.google.com/maps?q=1,2"));
    }

    #[test]
    fn test_locate_status() {
        assert_eq!(locate_status(&LocateState::Locating), "Finding your location...");
        let located = LocateState::Located(Position::new(LatLng::new(1.0, 2.0), 12.4));
        assert_eq!(locate_status(&located), "Accurate to about 12 m");
        assert_eq!(
            locate_status(&LocateState::Failed(LocationError::Unsupported)),
            LocationError::Unsupported.to_string()
        );
    }
}
