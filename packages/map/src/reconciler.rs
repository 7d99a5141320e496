//! # Marker reconciler: one overlay per identity
//!
//! [`MarkerReconciler`] is the only owner of the overlays on a [`MapSurface`]. It
//! keeps a map from [`Identity`] to the surface handle currently rendering it and
//! folds three independent inputs into that map:
//!
//! | Input | Operation | Identity |
//! |-------|-----------|----------|
//! | Geolocation fix | [`upsert_current`](MarkerReconciler::upsert_current) | `Current` |
//! | Server's last parking spot (async) | [`load_last`](MarkerReconciler::load_last) | `Last` |
//! | Spots saved this session | [`add_saved`](MarkerReconciler::add_saved) / [`sync_saved`](MarkerReconciler::sync_saved) | `Saved(id)` |
//!
//! ## Rules
//!
//! - Replacing an identity always removes the old overlay before the new one is
//!   added, never the other way round.
//! - If the surface fails to create an overlay, the identity is left absent. The
//!   mapping never points at a half-built overlay.
//! - Inputs are applied in arrival order. A stale geolocation fix that lands after a
//!   newer one simply becomes the current position (last write wins).
//! - [`bind_user`](MarkerReconciler::bind_user) clears everything when the signed-in
//!   identity changes, so one user's spots never linger on another user's map.

use std::collections::HashMap;

use tracing::debug;

use crate::geo::{LatLng, ParkedLocation, Position};
use crate::marker::Marker;
use crate::overlay::{Identity, MapSurface, Overlay, PinStyle, SurfaceError};
use crate::popup::{Popup, CURRENT_TITLE, LAST_TITLE, SAVED_TITLE};

/// Zoom level used when the map recenters on a newly placed pin.
pub const DEFAULT_FOCUS_ZOOM: u8 = 16;

struct Binding<H> {
    handle: H,
    at: LatLng,
}

/// Keeps a [`MapSurface`] in sync with the current, last and saved positions.
pub struct MarkerReconciler<S: MapSurface> {
    surface: S,
    overlays: HashMap<Identity, Binding<S::Handle>>,
    user: Option<String>,
    focus_zoom: u8,
}

impl<S: MapSurface> MarkerReconciler<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            overlays: HashMap::new(),
            user: None,
            focus_zoom: DEFAULT_FOCUS_ZOOM,
        }
    }

    pub fn with_focus_zoom(mut self, zoom: u8) -> Self {
        self.focus_zoom = zoom;
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Direct access for calls that don't touch overlays (resizing, panning).
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Replace the `Current` overlay with one at `position` and recenter on it.
    pub fn upsert_current(&mut self, position: &Position) -> Result<(), SurfaceError> {
        let overlay = Overlay {
            identity: Identity::Current,
            at: position.coords,
            style: PinStyle::Default,
            popup: Popup::new(CURRENT_TITLE, position.coords, position.timestamp),
            open_popup: true,
        };
        self.replace(overlay)?;
        self.surface.set_view(position.coords, self.focus_zoom);
        Ok(())
    }

    /// Replace the `Last` overlay with the persisted spot.
    ///
    /// `None` means the user has never saved a spot: nothing is cleared and nothing
    /// is added. Returns whether an overlay was placed.
    pub fn load_last(&mut self, record: Option<&ParkedLocation>) -> Result<bool, SurfaceError> {
        let Some(record) = record else {
            return Ok(false);
        };

        let at = record.coords();
        let overlay = Overlay {
            identity: Identity::Last,
            at,
            style: PinStyle::Default,
            popup: Popup::new(LAST_TITLE, at, record.timestamp),
            open_popup: true,
        };
        self.replace(overlay)?;
        self.surface.set_view(at, self.focus_zoom);
        Ok(true)
    }

    /// Add an overlay for a saved marker unless one already exists for its id.
    ///
    /// Returns `true` when a new overlay was created.
    pub fn add_saved(&mut self, marker: &Marker) -> Result<bool, SurfaceError> {
        let identity = Identity::Saved(marker.id);
        if self.overlays.contains_key(&identity) {
            return Ok(false);
        }

        let overlay = Overlay {
            identity,
            at: marker.at,
            style: PinStyle::Parking,
            popup: Popup::new(SAVED_TITLE, marker.at, marker.created_at)
                .with_image(marker.image_data.clone()),
            open_popup: false,
        };
        self.insert(overlay)?;
        Ok(true)
    }

    /// [`add_saved`](Self::add_saved) for every marker, in order.
    ///
    /// A failing marker does not stop the rest; the first error is returned after
    /// all markers have been tried. On success returns how many overlays were added.
    pub fn sync_saved(&mut self, markers: &[Marker]) -> Result<usize, SurfaceError> {
        let mut added = 0;
        let mut first_error = None;
        for marker in markers {
            match self.add_saved(marker) {
                Ok(true) => added += 1,
                Ok(false) => {}
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(added),
        }
    }

    /// Remove the overlay for `identity`. Returns whether one existed.
    pub fn remove(&mut self, identity: Identity) -> bool {
        match self.overlays.remove(&identity) {
            Some(binding) => {
                debug!(%identity, "removing overlay");
                self.surface.remove_overlay(binding.handle);
                true
            }
            None => false,
        }
    }

    /// Remove every tracked overlay.
    pub fn clear_all(&mut self) {
        debug!(count = self.overlays.len(), "clearing all overlays");
        for (_, binding) in self.overlays.drain() {
            self.surface.remove_overlay(binding.handle);
        }
    }

    /// Record the signed-in user. Clears every overlay when the user changes
    /// (including sign-in and sign-out). Returns whether a clear happened.
    pub fn bind_user(&mut self, user_id: Option<&str>) -> bool {
        if self.user.as_deref() == user_id {
            return false;
        }
        self.user = user_id.map(str::to_string);
        self.clear_all();
        true
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    pub fn contains(&self, identity: Identity) -> bool {
        self.overlays.contains_key(&identity)
    }

    /// Tracked identities, sorted.
    pub fn identities(&self) -> Vec<Identity> {
        let mut ids: Vec<Identity> = self.overlays.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn position_of(&self, identity: Identity) -> Option<LatLng> {
        self.overlays.get(&identity).map(|b| b.at)
    }

    /// Remove-then-add for `overlay.identity`.
    fn replace(&mut self, overlay: Overlay) -> Result<(), SurfaceError> {
        self.remove(overlay.identity);
        self.insert(overlay)
    }

    fn insert(&mut self, overlay: Overlay) -> Result<(), SurfaceError> {
        if !overlay.at.is_valid() {
            return Err(SurfaceError::InvalidCoordinates {
                lat: overlay.at.lat,
                lng: overlay.at.lng,
            });
        }

        let handle = self.surface.add_overlay(&overlay)?;
        debug!(identity = %overlay.identity, lat = overlay.at.lat, lng = overlay.at.lng, "added overlay");
        self.overlays.insert(
            overlay.identity,
            Binding {
                handle,
                at: overlay.at,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::MarkerIds;
    use crate::memory::{MemorySurface, SurfaceOp};
    use chrono::Utc;

    fn seoul() -> LatLng {
        LatLng::new(37.5665, 126.9780)
    }

    fn fix(lat: f64, lng: f64) -> Position {
        Position::new(LatLng::new(lat, lng), 12.0)
    }

    fn saved(id: u64, lat: f64, lng: f64) -> Marker {
        Marker {
            id,
            at: LatLng::new(lat, lng),
            image_data: None,
            created_at: Utc::now(),
        }
    }

    fn parked(lat: f64, lng: f64) -> ParkedLocation {
        ParkedLocation {
            lat,
            lng,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_upsert_current_keeps_single_overlay_at_last_fix() {
        let mut rec = MarkerReconciler::new(MemorySurface::new());

        rec.upsert_current(&fix(10.0, 10.0)).unwrap();
        rec.upsert_current(&fix(20.0, 20.0)).unwrap();
        rec.upsert_current(&fix(37.5665, 126.9780)).unwrap();

        let live = rec.surface().live_for(Identity::Current);
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].at, seoul());
        assert_eq!(rec.position_of(Identity::Current), Some(seoul()));
        assert_eq!(rec.surface().live_count(), 1);
    }

    #[test]
    fn test_upsert_current_recenters_map() {
        let mut rec = MarkerReconciler::new(MemorySurface::new()).with_focus_zoom(15);
        rec.upsert_current(&fix(37.5665, 126.9780)).unwrap();
        assert_eq!(rec.surface().last_view(), Some((seoul(), 15)));
    }

    #[test]
    fn test_replacement_removes_before_adding() {
        let mut rec = MarkerReconciler::new(MemorySurface::new());
        rec.upsert_current(&fix(1.0, 1.0)).unwrap();
        rec.upsert_current(&fix(2.0, 2.0)).unwrap();

        let overlay_ops: Vec<&SurfaceOp> = rec
            .surface()
            .ops()
            .iter()
            .filter(|op| !matches!(op, SurfaceOp::View { .. }))
            .collect();
        assert_eq!(
            overlay_ops,
            vec![
                &SurfaceOp::Added { handle: 1, identity: Identity::Current },
                &SurfaceOp::Removed { handle: 1 },
                &SurfaceOp::Added { handle: 2, identity: Identity::Current },
            ]
        );
    }

    #[test]
    fn test_add_saved_is_idempotent() {
        let mut rec = MarkerReconciler::new(MemorySurface::new());
        let marker = saved(7, 37.0, 127.0);

        assert!(rec.add_saved(&marker).unwrap());
        assert!(!rec.add_saved(&marker).unwrap());

        assert_eq!(rec.surface().live_for(Identity::Saved(7)).len(), 1);
        assert_eq!(rec.len(), 1);
    }

    #[test]
    fn test_saved_markers_are_independent() {
        let mut rec = MarkerReconciler::new(MemorySurface::new());
        rec.add_saved(&saved(1, 37.0, 127.0)).unwrap();
        rec.add_saved(&saved(2, 37.1, 127.1)).unwrap();
        assert_eq!(rec.identities(), vec![Identity::Saved(1), Identity::Saved(2)]);

        assert!(rec.remove(Identity::Saved(1)));
        assert!(!rec.contains(Identity::Saved(1)));
        assert!(rec.contains(Identity::Saved(2)));
        assert_eq!(rec.surface().live_count(), 1);

        assert!(rec.remove(Identity::Saved(2)));
        assert!(!rec.remove(Identity::Saved(2)));
        assert!(rec.is_empty());
        assert_eq!(rec.surface().live_count(), 0);
    }

    #[test]
    fn test_saved_marker_carries_photo_and_parking_pin() {
        let mut rec = MarkerReconciler::new(MemorySurface::new());
        let mut marker = MarkerIds::new().create(seoul(), Some("data:image/png;base64,AA".into()));
        marker.id = 3;
        rec.add_saved(&marker).unwrap();

        let live = rec.surface().live_for(Identity::Saved(3));
        assert_eq!(live[0].style, PinStyle::Parking);
        assert_eq!(live[0].popup.image.as_deref(), Some("data:image/png;base64,AA"));
        assert!(!live[0].open_popup);
    }

    #[test]
    fn test_sync_saved_reprocessing_adds_nothing() {
        let mut rec = MarkerReconciler::new(MemorySurface::new());
        let markers = vec![saved(1, 1.0, 1.0), saved(2, 2.0, 2.0)];

        assert_eq!(rec.sync_saved(&markers).unwrap(), 2);
        assert_eq!(rec.sync_saved(&markers).unwrap(), 0);
        assert_eq!(rec.surface().live_count(), 2);
    }

    #[test]
    fn test_sync_saved_continues_past_bad_marker() {
        let mut rec = MarkerReconciler::new(MemorySurface::new());
        let markers = vec![saved(1, 95.0, 1.0), saved(2, 2.0, 2.0)];

        let err = rec.sync_saved(&markers).unwrap_err();
        assert!(matches!(err, SurfaceError::InvalidCoordinates { .. }));
        assert!(!rec.contains(Identity::Saved(1)));
        assert!(rec.contains(Identity::Saved(2)));
    }

    #[test]
    fn test_load_last_none_is_noop() {
        let mut rec = MarkerReconciler::new(MemorySurface::new());
        assert!(!rec.load_last(None).unwrap());
        assert!(rec.is_empty());
        assert!(rec.surface().ops().is_empty());
    }

    #[test]
    fn test_load_last_then_none_keeps_existing() {
        let mut rec = MarkerReconciler::new(MemorySurface::new());
        assert!(rec.load_last(Some(&parked(37.5665, 126.9780))).unwrap());
        assert!(!rec.load_last(None).unwrap());

        assert!(rec.contains(Identity::Last));
        assert_eq!(rec.surface().live_for(Identity::Last).len(), 1);
    }

    #[test]
    fn test_load_last_replaces_previous() {
        let mut rec = MarkerReconciler::new(MemorySurface::new());
        rec.load_last(Some(&parked(1.0, 1.0))).unwrap();
        rec.load_last(Some(&parked(2.0, 2.0))).unwrap();

        let live = rec.surface().live_for(Identity::Last);
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].at, LatLng::new(2.0, 2.0));
    }

    #[test]
    fn test_clear_all_removes_everything() {
        let mut rec = MarkerReconciler::new(MemorySurface::new());
        rec.upsert_current(&fix(1.0, 1.0)).unwrap();
        rec.load_last(Some(&parked(2.0, 2.0))).unwrap();
        rec.add_saved(&saved(9, 3.0, 3.0)).unwrap();
        assert_eq!(rec.len(), 3);

        rec.clear_all();

        assert!(rec.is_empty());
        assert!(rec.identities().is_empty());
        assert_eq!(rec.position_of(Identity::Current), None);
        assert_eq!(rec.surface().live_count(), 0);
    }

    #[test]
    fn test_invalid_coordinates_leave_identity_absent() {
        let mut rec = MarkerReconciler::new(MemorySurface::new());
        rec.upsert_current(&fix(1.0, 1.0)).unwrap();

        let err = rec.upsert_current(&fix(f64::NAN, 1.0)).unwrap_err();

        assert!(matches!(err, SurfaceError::InvalidCoordinates { .. }));
        assert!(!rec.contains(Identity::Current));
        assert_eq!(rec.surface().live_count(), 0);
    }

    #[test]
    fn test_surface_rejection_leaves_identity_absent() {
        let mut rec = MarkerReconciler::new(MemorySurface::new());
        rec.surface_mut().reject_next("tile engine gone");

        let err = rec.add_saved(&saved(4, 1.0, 1.0)).unwrap_err();

        assert_eq!(err, SurfaceError::Rejected("tile engine gone".into()));
        assert!(!rec.contains(Identity::Saved(4)));

        // A retry after the failure goes through.
        assert!(rec.add_saved(&saved(4, 1.0, 1.0)).unwrap());
    }

    #[test]
    fn test_bind_user_clears_on_identity_change() {
        let mut rec = MarkerReconciler::new(MemorySurface::new());
        assert!(rec.bind_user(Some("alice")));
        rec.load_last(Some(&parked(1.0, 1.0))).unwrap();
        rec.add_saved(&saved(1, 1.0, 1.0)).unwrap();

        assert!(!rec.bind_user(Some("alice")));
        assert_eq!(rec.len(), 2);

        assert!(rec.bind_user(Some("bob")));
        assert!(rec.is_empty());
        assert_eq!(rec.user(), Some("bob"));

        rec.upsert_current(&fix(1.0, 1.0)).unwrap();
        assert!(rec.bind_user(None));
        assert!(rec.is_empty());
    }

    #[test]
    fn test_seoul_scenario_current_then_last() {
        let mut rec = MarkerReconciler::new(MemorySurface::new());
        rec.upsert_current(&fix(37.5665, 126.9780)).unwrap();
        assert_eq!(rec.identities(), vec![Identity::Current]);

        // The saved spot comes back from the server as the last location.
        rec.load_last(Some(&parked(37.5665, 126.9780))).unwrap();
        assert_eq!(rec.identities(), vec![Identity::Current, Identity::Last]);
        assert_eq!(rec.position_of(Identity::Last), Some(seoul()));
    }
}
