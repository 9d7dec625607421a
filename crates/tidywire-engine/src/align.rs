//! The three-phase beautification pass.
//!
//! Each phase proposes symbol transforms that straighten wires, commits
//! them under a shared overlap-and-bounds policy, and then pushes the
//! affected wires back through the router. Rollback is value replacement:
//! the pre-move symbol is cloned up front and restored wholesale when a
//! candidate would collide or leave the sheet.

use std::cmp::Ordering;

use itertools::Itertools;
use log::{debug, warn};
use tidywire_schematic::geometry::{Point, EPSILON};
use tidywire_schematic::route::Router;
use tidywire_schematic::symbol::{Edge, PortDirection, Symbol};
use tidywire_schematic::wire::PortRef;
use tidywire_schematic::{Sheet, SymbolId, WireId};

use crate::router::{reroute_all, reroute_wire, separate_wires};

/// Run all three phases in order: single-port alignment, paired-symbol
/// pitch scaling, multi-port fan-in alignment.
pub fn beautify(sheet: Sheet, router: &dyn Router) -> Sheet {
    let sheet = align_single_port(sheet, router);
    let sheet = align_port_pitch(sheet, router);
    align_multi_port(sheet, router)
}

/// Phase 1: symbols with exactly one port (stubs, single-pin elements).
///
/// For each such symbol, pick the attached 3-visible-segment wire with the
/// smallest middle offset and translate the symbol by that offset so the
/// wire becomes a single run. When the local and far port sit on equal
/// edges the symbol is first turned 180 degrees so the ports face each
/// other.
pub fn align_single_port(mut sheet: Sheet, router: &dyn Router) -> Sheet {
    let candidates: Vec<SymbolId> = sheet
        .symbols()
        .filter(|s| s.port_count() == 1)
        .map(|s| s.id)
        .collect();

    let mut moved = Vec::new();
    for id in candidates {
        let attached: Vec<(WireId, Vec<Point>)> = sheet
            .wires_touching(id)
            .iter()
            .map(|w| (w.id, w.visible_segments()))
            .collect();
        if attached.is_empty() {
            continue;
        }
        if attached.iter().any(|(_, vs)| vs.len() == 1) {
            // Something attached is already straight; leave well alone.
            continue;
        }

        // First minimal Manhattan middle among 3-visible-segment wires.
        let mut best: Option<(WireId, Point)> = None;
        for (wire_id, vs) in &attached {
            if vs.len() != 3 {
                continue;
            }
            let middle = vs[1];
            if best
                .as_ref()
                .map_or(true, |(_, b)| middle.manhattan_len() < b.manhattan_len())
            {
                best = Some((*wire_id, middle));
            }
        }
        let Some((wire_id, middle)) = best else {
            continue;
        };

        let Some(wire) = sheet.wire(wire_id) else {
            continue;
        };
        let (local, far) = if wire.source.symbol == id {
            (wire.source, wire.target)
        } else {
            (wire.target, wire.source)
        };
        let (Some(local_edge), Some(far_edge)) = (
            sheet.port(&local).map(|p| p.edge),
            sheet.port(&far).map(|p| p.edge),
        ) else {
            continue;
        };
        let Some(snapshot) = sheet.symbol(id).cloned() else {
            continue;
        };

        // Equal edges cannot face each other; turn the stub around.
        if local_edge == far_edge {
            if let Some(symbol) = sheet.symbol_mut(id) {
                symbol.rotate90();
                symbol.rotate90();
            }
        }

        let edge_now = sheet.port(&local).map(|p| p.edge).unwrap_or(local_edge);
        let offset = signed_offset(middle, edge_now);
        sheet.translate_symbol(id, offset);
        if commit_move(&mut sheet, id, snapshot) {
            moved.push(id);
        }
    }

    let sheet = reroute_all(sheet, router, &moved);
    let all = sheet.wire_ids();
    separate_wires(sheet, router, &all)
}

/// Phase 2: for every ordered symbol pair joined by more than one wire,
/// scale the target symbol vertically so its input pitch matches the
/// source's output pitch, letting the parallel bus wires run straight
/// instead of fanning out.
pub fn align_port_pitch(mut sheet: Sheet, router: &dyn Router) -> Sheet {
    let mut pairs: Vec<((SymbolId, SymbolId), Vec<WireId>)> = Vec::new();
    for wire in sheet.wires() {
        if wire.source.symbol == wire.target.symbol {
            continue;
        }
        let key = (wire.source.symbol, wire.target.symbol);
        match pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, ids)) => ids.push(wire.id),
            None => pairs.push((key, vec![wire.id])),
        }
    }

    for ((source, target), wires) in pairs {
        if wires.len() < 2 {
            continue;
        }
        let out_pitch = sheet
            .symbol(source)
            .and_then(|s| s.port_pitch(PortDirection::Output));
        let in_pitch = sheet
            .symbol(target)
            .and_then(|s| s.port_pitch(PortDirection::Input));
        let ratio = match (out_pitch, in_pitch) {
            (Some(out), Some(inp)) if inp > EPSILON => out / inp,
            _ => {
                warn!(
                    "pitch unavailable for pair ({source:?}, {target:?}); keeping scale at 1.0"
                );
                1.0
            }
        };

        let Some(snapshot) = sheet.symbol(target).cloned() else {
            continue;
        };
        if let Some(symbol) = sheet.symbol_mut(target) {
            symbol.v_scale *= ratio;
        }
        if commit_move(&mut sheet, target, snapshot) {
            for id in &wires {
                sheet = reroute_wire(sheet, router, *id);
            }
        }
    }
    sheet
}

/// Phase 3: symbols with more than one input and exactly one output,
/// rightmost first. The symbol's output-wire offset is applied to the
/// symbol *and* its whole upstream fan-in, so the output straightens
/// without disturbing the relative geometry of the inputs.
pub fn align_multi_port(mut sheet: Sheet, router: &dyn Router) -> Sheet {
    let ordered: Vec<SymbolId> = sheet
        .symbols()
        .filter(|s| s.inputs.len() > 1 && s.outputs.len() == 1)
        .sorted_by(|a, b| {
            b.position
                .x
                .partial_cmp(&a.position.x)
                .unwrap_or(Ordering::Equal)
        })
        .map(|s| s.id)
        .collect();

    let mut moved = Vec::new();
    for id in ordered {
        let out_ref = PortRef {
            symbol: id,
            direction: PortDirection::Output,
            index: 0,
        };
        let Some(first_out) = sheet
            .wires_at_port(&out_ref)
            .into_iter()
            .find(|w| w.source == out_ref)
        else {
            continue;
        };
        let vs = first_out.visible_segments();
        if vs.len() != 3 {
            continue;
        }
        let middle = vs[1];
        let edge = sheet.port(&out_ref).map(|p| p.edge).unwrap_or(Edge::Right);
        let offset = signed_offset(middle, edge);

        // The symbol plus every symbol feeding one of its inputs.
        let mut batch = vec![id];
        let input_count = sheet.symbol(id).map(|s| s.inputs.len()).unwrap_or(0);
        for index in 0..input_count {
            let in_ref = PortRef {
                symbol: id,
                direction: PortDirection::Input,
                index,
            };
            for wire in sheet.wires_at_port(&in_ref) {
                if wire.target == in_ref && !batch.contains(&wire.source.symbol) {
                    batch.push(wire.source.symbol);
                }
            }
        }

        // Per-symbol commit: one rolled-back member does not block the rest.
        for symbol_id in batch {
            let Some(snapshot) = sheet.symbol(symbol_id).cloned() else {
                continue;
            };
            sheet.translate_symbol(symbol_id, offset);
            if commit_move(&mut sheet, symbol_id, snapshot) {
                moved.push(symbol_id);
            }
        }
    }

    let sheet = reroute_all(sheet, router, &moved);
    let all = sheet.wire_ids();
    separate_wires(sheet, router, &all)
}

/// Middle-offset sign correction: a Left-edge port faces the far symbol
/// across negative x, so the raw offset would push the symbol away from
/// the target instead of toward it.
fn signed_offset(middle: Point, edge: Edge) -> Point {
    if edge == Edge::Left {
        -middle
    } else {
        middle
    }
}

/// Shared commit policy: refresh the box index and keep the candidate only
/// if the transformed symbol neither intersects another symbol nor leaves
/// the sheet. Otherwise restore the snapshot.
fn commit_move(sheet: &mut Sheet, id: SymbolId, snapshot: Symbol) -> bool {
    sheet.recompute_bounding_boxes();
    if sheet.overlaps_any(id) || !sheet.in_bounds(id) {
        debug!("rolling back transform of '{}'", snapshot.label);
        sheet.replace_symbol(snapshot);
        sheet.recompute_bounding_boxes();
        false
    } else {
        true
    }
}
