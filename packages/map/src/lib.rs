pub mod config;
pub mod geo;
pub mod locate;
pub mod marker;
pub mod overlay;
pub mod popup;
pub mod reconciler;

mod memory;
pub use memory::{MemorySurface, SurfaceOp};

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub mod geolocation;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod leaflet;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use leaflet::{ImageClick, LeafletOverlay, LeafletSurface};

pub use config::MapConfig;
pub use geo::{LatLng, ParkedLocation, Position};
pub use locate::{LocateOptions, LocateState, LocationError};
pub use marker::{Marker, MarkerIds};
pub use overlay::{Identity, MapSurface, Overlay, PinStyle, SurfaceError};
pub use reconciler::MarkerReconciler;
