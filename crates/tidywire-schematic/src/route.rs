//! Contract between the sheet model and the external wire router.
//!
//! The beautifier never computes segment paths itself: after every
//! geometric edit it hands the affected wires back to a [`Router`] and
//! stores whatever segments come back.

use crate::wire::{Orientation, PortRef};
use crate::{Sheet, WireId};

/// A freshly computed path for one wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub initial_orientation: Orientation,
    pub segments: Vec<f64>,
}

/// External routing service.
pub trait Router {
    /// Compute a path from `source` (an output port) to `target` (an input
    /// port) given the current symbol geometry on `sheet`.
    fn route(&self, sheet: &Sheet, source: &PortRef, target: &PortRef) -> Route;

    /// Space out parallel overlapping runs among `wires`. Returns adjusted
    /// routes for the wires that changed; untouched wires are omitted.
    fn separate(&self, sheet: &Sheet, wires: &[WireId]) -> Vec<(WireId, Route)>;
}
