use std::collections::BTreeMap;

use crate::geo::LatLng;
use crate::overlay::{Identity, MapSurface, Overlay, SurfaceError};

/// One call recorded by [`MemorySurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceOp {
    Added { handle: u64, identity: Identity },
    Removed { handle: u64 },
    View { center: LatLng, zoom: u8 },
    Resized,
}

/// In-memory MapSurface for testing and for targets without a browser map.
#[derive(Debug, Default)]
pub struct MemorySurface {
    next_handle: u64,
    live: BTreeMap<u64, Overlay>,
    ops: Vec<SurfaceOp>,
    reject_next: Option<String>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `add_overlay` call fail with [`SurfaceError::Rejected`].
    pub fn reject_next(&mut self, reason: &str) {
        self.reject_next = Some(reason.to_string());
    }

    /// Overlays currently on the map, in creation order.
    pub fn live(&self) -> Vec<&Overlay> {
        self.live.values().collect()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn live_for(&self, identity: Identity) -> Vec<&Overlay> {
        self.live
            .values()
            .filter(|o| o.identity == identity)
            .collect()
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn last_view(&self) -> Option<(LatLng, u8)> {
        self.ops.iter().rev().find_map(|op| match op {
            SurfaceOp::View { center, zoom } => Some((*center, *zoom)),
            _ => None,
        })
    }
}

impl MapSurface for MemorySurface {
    type Handle = u64;

    fn add_overlay(&mut self, overlay: &Overlay) -> Result<u64, SurfaceError> {
        if let Some(reason) = self.reject_next.take() {
            return Err(SurfaceError::Rejected(reason));
        }
        if !overlay.at.is_valid() {
            return Err(SurfaceError::InvalidCoordinates {
                lat: overlay.at.lat,
                lng: overlay.at.lng,
            });
        }

        self.next_handle += 1;
        let handle = self.next_handle;
        self.live.insert(handle, overlay.clone());
        self.ops.push(SurfaceOp::Added {
            handle,
            identity: overlay.identity,
        });
        Ok(handle)
    }

    fn remove_overlay(&mut self, handle: u64) {
        self.live.remove(&handle);
        self.ops.push(SurfaceOp::Removed { handle });
    }

    fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.ops.push(SurfaceOp::View { center, zoom });
    }

    fn invalidate_size(&mut self) {
        self.ops.push(SurfaceOp::Resized);
    }
}
