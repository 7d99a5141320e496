//! # Overlays and the map surface seam
//!
//! An overlay is one rendered pin bound to one point. The reconciler decides *which*
//! overlays should exist; a [`MapSurface`] knows *how* to draw and remove them.
//! Implementations live in sibling modules ([`crate::memory`] for tests and
//! non-browser targets, `crate::leaflet` in the browser).

use std::fmt;

use thiserror::Error;

use crate::geo::LatLng;
use crate::popup::Popup;

/// Logical key of an overlay. At most one live overlay exists per identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Identity {
    /// The device's current position.
    Current,
    /// The last parking spot persisted on the server.
    Last,
    /// A spot saved during this session, keyed by marker id.
    Saved(u64),
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Current => write!(f, "current"),
            Identity::Last => write!(f, "last"),
            Identity::Saved(id) => write!(f, "saved:{id}"),
        }
    }
}

/// Pin artwork.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinStyle {
    /// The map engine's stock blue pin.
    Default,
    /// Red pin with a white "P".
    Parking,
}

/// Everything a surface needs to render one overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    pub identity: Identity,
    pub at: LatLng,
    pub style: PinStyle,
    pub popup: Popup,
    /// Open the popup as soon as the overlay is added.
    pub open_popup: bool,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    #[error("invalid coordinates ({lat}, {lng})")]
    InvalidCoordinates { lat: f64, lng: f64 },

    #[error("map is not ready")]
    NotReady,

    #[error("map engine rejected the overlay: {0}")]
    Rejected(String),
}

/// A mutable map that overlays can be added to and removed from.
///
/// Handles are opaque to callers. Dropping a handle without passing it to
/// [`remove_overlay`](MapSurface::remove_overlay) leaves the overlay on the map, so
/// the reconciler is the only code that should hold them.
pub trait MapSurface {
    type Handle;

    fn add_overlay(&mut self, overlay: &Overlay) -> Result<Self::Handle, SurfaceError>;

    fn remove_overlay(&mut self, handle: Self::Handle);

    /// Recenter the map on `center` at `zoom`.
    fn set_view(&mut self, center: LatLng, zoom: u8);

    /// Re-measure the map after its container changed size.
    fn invalidate_size(&mut self) {}
}
