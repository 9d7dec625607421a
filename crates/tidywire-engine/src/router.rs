//! Reference Manhattan router and the routing-adapter call-throughs.
//!
//! The beautifier treats routing as an external service; this module holds
//! the thin adapter functions that push updated symbol geometry back
//! through a [`Router`], plus [`ManhattanRouter`], the simplest
//! contract-honoring implementation: a dog-leg whose middle segment is the
//! perpendicular offset between the two ports. Collinear ports therefore
//! coalesce to a single visible vector.

use log::debug;
use tidywire_schematic::route::{Route, Router};
use tidywire_schematic::symbol::Edge;
use tidywire_schematic::wire::{Orientation, PortRef};
use tidywire_schematic::{Sheet, SymbolId, WireId};

/// Spacing inserted between parallel wire runs sharing a track.
pub const SEPARATION: f64 = 6.0;

/// Dog-leg router: leaves the source port along its edge normal and crosses
/// to the target in three segments `[half, cross, half]`.
#[derive(Debug, Clone)]
pub struct ManhattanRouter {
    pub separation: f64,
}

impl Default for ManhattanRouter {
    fn default() -> Self {
        Self {
            separation: SEPARATION,
        }
    }
}

impl Router for ManhattanRouter {
    fn route(&self, sheet: &Sheet, source: &PortRef, target: &PortRef) -> Route {
        let (Some(from), Some(to)) = (sheet.port_position(source), sheet.port_position(target))
        else {
            // Dangling endpoint; give back a degenerate stub.
            return Route {
                initial_orientation: Orientation::Horizontal,
                segments: vec![0.0],
            };
        };
        let edge = sheet.port(source).map(|p| p.edge).unwrap_or(Edge::Right);

        let delta = to - from;
        match edge {
            Edge::Left | Edge::Right => Route {
                initial_orientation: Orientation::Horizontal,
                segments: vec![delta.x / 2.0, delta.y, delta.x / 2.0],
            },
            Edge::Top | Edge::Bottom => Route {
                initial_orientation: Orientation::Vertical,
                segments: vec![delta.y / 2.0, delta.x, delta.y / 2.0],
            },
        }
    }

    /// Spread the middle runs of 3-segment wires that share a track,
    /// shifting each later wire's corner split by a multiple of the
    /// separation. Endpoints are preserved (the two half segments absorb
    /// the shift).
    fn separate(&self, sheet: &Sheet, wires: &[WireId]) -> Vec<(WireId, Route)> {
        let mut tracks: Vec<(Orientation, i64, Vec<WireId>)> = Vec::new();
        for &id in wires {
            let Some(wire) = sheet.wire(id) else { continue };
            if wire.segments.len() != 3 {
                continue;
            }
            let Some(start) = sheet.port_position(&wire.source) else {
                continue;
            };
            let along = match wire.initial_orientation {
                Orientation::Horizontal => start.x,
                Orientation::Vertical => start.y,
            };
            // Track position of the middle (perpendicular) run.
            let key = ((along + wire.segments[0]) * 10.0).round() as i64;
            match tracks
                .iter_mut()
                .find(|(o, k, _)| *o == wire.initial_orientation && *k == key)
            {
                Some((_, _, ids)) => ids.push(id),
                None => tracks.push((wire.initial_orientation, key, vec![id])),
            }
        }

        let mut adjusted = Vec::new();
        for (orientation, _, ids) in tracks {
            for (rank, id) in ids.iter().enumerate().skip(1) {
                let Some(wire) = sheet.wire(*id) else { continue };
                let shift = rank as f64 * self.separation;
                let segments = vec![
                    wire.segments[0] + shift,
                    wire.segments[1],
                    wire.segments[2] - shift,
                ];
                adjusted.push((
                    *id,
                    Route {
                        initial_orientation: orientation,
                        segments,
                    },
                ));
            }
        }
        adjusted
    }
}

// --- Adapter call-throughs -------------------------------------------------

/// Regenerate the path of a single wire from the current symbol geometry.
pub fn reroute_wire(mut sheet: Sheet, router: &dyn Router, id: WireId) -> Sheet {
    let Some(wire) = sheet.wire(id) else {
        return sheet;
    };
    let (source, target) = (wire.source, wire.target);
    let route = router.route(&sheet, &source, &target);
    sheet.set_route(id, route);
    sheet
}

/// Regenerate every wire touching one of the moved symbols.
pub fn reroute_all(mut sheet: Sheet, router: &dyn Router, moved: &[SymbolId]) -> Sheet {
    let ids: Vec<WireId> = sheet
        .wires()
        .filter(|w| moved.contains(&w.source.symbol) || moved.contains(&w.target.symbol))
        .map(|w| w.id)
        .collect();
    debug!("rerouting {} wire(s) after {} move(s)", ids.len(), moved.len());
    for id in ids {
        sheet = reroute_wire(sheet, router, id);
    }
    sheet
}

/// Apply the router's separation adjustments to the given wires.
pub fn separate_wires(mut sheet: Sheet, router: &dyn Router, wires: &[WireId]) -> Sheet {
    for (id, route) in router.separate(&sheet, wires) {
        sheet.set_route(id, route);
    }
    sheet
}
