//! Sample circuit library and invariant assertions for property runs.
//!
//! Builders construct schematics through the fallible placement chain and
//! route them with the reference Manhattan router. Generator constructors
//! wrap them into `Gen<Sheet>` values with per-index seeded randomness so
//! every failing sample replays from its index.

use tidywire_engine::ManhattanRouter;
use tidywire_schematic::geometry::Point;
use tidywire_schematic::symbol::ComponentKind;
use tidywire_schematic::wire::Orientation;
use tidywire_schematic::{Sheet, SheetError};

use crate::gen::{self, Gen};

/// Unwrap a builder chain inside sample generation. A construction error
/// panics with the placement error's message; the runner's exception
/// isolation turns that into an `Exception` outcome for the one sample.
pub fn built(sheet: Result<Sheet, SheetError>) -> Sheet {
    match sheet {
        Ok(sheet) => sheet,
        Err(e) => panic!("circuit construction failed: {e}"),
    }
}

// --- Circuit builders ------------------------------------------------------

/// One input stub wired into the first input of an AND gate.
pub fn stub_to_gate(stub: Point, gate: Point) -> Result<Sheet, SheetError> {
    let router = ManhattanRouter::default();
    Sheet::new()
        .place_symbol("IN1", ComponentKind::Input, stub)?
        .place_symbol("G1", ComponentKind::And, gate)?
        .place_wire(&router, ("IN1", 0), ("G1", 0))
}

/// Two custom blocks joined by a 2-wire bus with mismatched port pitch:
/// the paired-alignment phase's target shape.
pub fn two_gate_bus(src: Point, dst: Point) -> Result<Sheet, SheetError> {
    let router = ManhattanRouter::default();
    let source = ComponentKind::Custom {
        name: "BUSSRC".into(),
        inputs: 0,
        outputs: 2,
        width: 60.0,
        height: 90.0,
    };
    let sink = ComponentKind::Custom {
        name: "BUSDST".into(),
        inputs: 2,
        outputs: 0,
        width: 60.0,
        height: 60.0,
    };
    Sheet::new()
        .place_symbol("SRC", source, src)?
        .place_symbol("DST", sink, dst)?
        .place_wire(&router, ("SRC", 0), ("DST", 0))?
        .place_wire(&router, ("SRC", 1), ("DST", 1))
}

/// A gate fed by two stubs and driving an output stub: the multi-port
/// alignment phase's target shape.
pub fn fan_in_gate(
    gate: Point,
    in_a: Point,
    in_b: Point,
    out: Point,
) -> Result<Sheet, SheetError> {
    let router = ManhattanRouter::default();
    Sheet::new()
        .place_symbol("G1", ComponentKind::And, gate)?
        .place_symbol("IN1", ComponentKind::Input, in_a)?
        .place_symbol("IN2", ComponentKind::Input, in_b)?
        .place_symbol("OUT1", ComponentKind::Output, out)?
        .place_wire(&router, ("IN1", 0), ("G1", 0))?
        .place_wire(&router, ("IN2", 0), ("G1", 1))?
        .place_wire(&router, ("G1", 0), ("OUT1", 0))
}

// --- Sample generators -----------------------------------------------------

/// Random stub-and-gate layouts. The stub and gate draw from disjoint
/// x-bands, so initial placements never overlap and always sit in bounds.
pub fn stub_circuit_samples(count: usize, seed: u64) -> Gen<Sheet> {
    Gen::new(count, move |index| {
        let mut rng = gen::sample_rng(seed, index);
        let stub = Point::new(
            rng.u64(0..=20) as f64 * 10.0,
            rng.u64(0..=88) as f64 * 10.0,
        );
        let gate = Point::new(
            300.0 + rng.u64(0..=60) as f64 * 10.0,
            rng.u64(0..=84) as f64 * 10.0,
        );
        built(stub_to_gate(stub, gate))
    })
}

/// Random fan-in layouts across four disjoint x-bands.
pub fn fan_in_samples(count: usize, seed: u64) -> Gen<Sheet> {
    Gen::new(count, move |index| {
        let mut rng = gen::sample_rng(seed, index);
        let in_a = Point::new(50.0, 100.0 + rng.u64(0..=30) as f64 * 10.0);
        let in_b = Point::new(50.0, 500.0 + rng.u64(0..=30) as f64 * 10.0);
        let gate = Point::new(
            400.0 + rng.u64(0..=10) as f64 * 10.0,
            300.0 + rng.u64(0..=20) as f64 * 10.0,
        );
        let out = Point::new(
            700.0 + rng.u64(0..=20) as f64 * 10.0,
            200.0 + rng.u64(0..=40) as f64 * 10.0,
        );
        built(fan_in_gate(gate, in_a, in_b, out))
    })
}

/// Random raw segment-length lists (including zeros) paired with an
/// initial orientation, for exercising the visible-segment analyzer.
pub fn segment_list_samples(count: usize, seed: u64) -> Gen<(Orientation, Vec<f64>)> {
    Gen::new(count, move |index| {
        let mut rng = gen::sample_rng(seed, index);
        let orientation = if rng.bool() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };
        let len = rng.usize(1..=9);
        let segments = (0..len)
            .map(|_| (rng.i64(-5..=5) * 10) as f64)
            .collect();
        (orientation, segments)
    })
}

// --- Invariant assertions --------------------------------------------------

/// No two symbol bounding boxes may intersect.
pub fn assert_no_symbol_overlap(sheet: &Sheet) -> Option<String> {
    let ids = sheet.symbol_ids();
    for (i, &a) in ids.iter().enumerate() {
        for &b in &ids[i + 1..] {
            let (Some(box_a), Some(box_b)) = (sheet.bounding_box(a), sheet.bounding_box(b))
            else {
                continue;
            };
            if box_a.overlaps(box_b) {
                return Some(format!("symbols {a:?} and {b:?} overlap"));
            }
        }
    }
    None
}

/// Every symbol box must lie within the sheet coordinate range.
pub fn assert_in_bounds(sheet: &Sheet) -> Option<String> {
    for id in sheet.symbol_ids() {
        if !sheet.in_bounds(id) {
            let label = sheet
                .symbol(id)
                .map(|s| s.label.clone())
                .unwrap_or_default();
            return Some(format!("symbol '{label}' leaves the sheet bounds"));
        }
    }
    None
}

/// After a blocked transform, the named symbol must be restored bit-for-bit:
/// position, rotation, flip, and both scale factors.
pub fn assert_rollback_identical(before: &Sheet, after: &Sheet, label: &str) -> Option<String> {
    match (before.symbol_by_label(label), after.symbol_by_label(label)) {
        (Some(b), Some(a)) if a == b => None,
        (Some(_), Some(_)) => Some(format!("symbol '{label}' was not restored bit-for-bit")),
        _ => Some(format!("symbol '{label}' missing from a sheet")),
    }
}

/// No wire's visible polyline may pass strictly through a symbol it is not
/// attached to. Checks every bend vertex and segment midpoint.
pub fn assert_no_wire_through_symbol(sheet: &Sheet) -> Option<String> {
    for wire in sheet.wires() {
        let Some(polyline) = sheet.wire_polyline(wire.id) else {
            continue;
        };
        let mut probes: Vec<Point> = polyline[1..polyline.len() - 1].to_vec();
        for pair in polyline.windows(2) {
            probes.push(Point::new(
                (pair[0].x + pair[1].x) / 2.0,
                (pair[0].y + pair[1].y) / 2.0,
            ));
        }
        for symbol in sheet.symbols() {
            if symbol.id == wire.source.symbol || symbol.id == wire.target.symbol {
                continue;
            }
            let b = symbol.bounding_box();
            if let Some(hit) = probes.iter().find(|p| b.contains_point(**p)) {
                return Some(format!(
                    "wire {:?} crosses symbol '{}' near ({:.1}, {:.1})",
                    wire.id, symbol.label, hit.x, hit.y
                ));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_produce_clean_layouts() {
        let sheet = built(stub_to_gate(
            Point::new(100.0, 100.0),
            Point::new(300.0, 60.0),
        ));
        assert!(assert_no_symbol_overlap(&sheet).is_none());
        assert!(assert_in_bounds(&sheet).is_none());

        let sheet = built(two_gate_bus(
            Point::new(100.0, 100.0),
            Point::new(400.0, 100.0),
        ));
        assert_eq!(sheet.wires().count(), 2);

        let sheet = built(fan_in_gate(
            Point::new(600.0, 300.0),
            Point::new(100.0, 280.0),
            Point::new(100.0, 340.0),
            Point::new(800.0, 250.0),
        ));
        assert_eq!(sheet.wires().count(), 3);
    }

    #[test]
    fn overlap_assertion_reports_colliding_symbols() {
        let sheet = built(
            Sheet::new()
                .place_symbol("A", ComponentKind::And, Point::new(100.0, 100.0))
                .and_then(|s| s.place_symbol("B", ComponentKind::And, Point::new(130.0, 120.0))),
        );
        let reason = assert_no_symbol_overlap(&sheet);
        assert!(reason.is_some());
        assert!(reason.unwrap().contains("overlap"));
    }

    #[test]
    fn clearance_assertion_flags_a_crossed_symbol() {
        // Straight wire from the stub at y=110 passes through BLK's box.
        let sheet = built(
            stub_to_gate(Point::new(100.0, 100.0), Point::new(500.0, 90.0)).and_then(|s| {
                s.place_symbol("BLK", ComponentKind::And, Point::new(300.0, 80.0))
            }),
        );
        assert!(assert_no_wire_through_symbol(&sheet).is_some());
    }

    #[test]
    fn sample_generators_replay_deterministically() {
        let a = stub_circuit_samples(10, 5);
        let b = stub_circuit_samples(10, 5);
        for i in 0..10 {
            assert_eq!(a.value(i), b.value(i));
        }
    }
}
