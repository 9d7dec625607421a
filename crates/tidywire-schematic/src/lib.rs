//! Schematic sheet model for the tidywire layout beautifier.
//!
//! The central structure is [`Sheet`], the aggregate root owning two maps:
//!
//! * `symbols` – placed components keyed by a stable [`SymbolId`];
//! * `wires` – routed connections keyed by [`WireId`].
//!
//! plus a derived `bounding_boxes` index kept consistent through an explicit
//! [`Sheet::recompute_bounding_boxes`] after any geometric edit. Everything
//! is serialisable with `serde` so a failing test sample can be dumped as
//! JSON and inspected.
//!
//! Construction goes through the fallible builder-style operations
//! (`place_symbol`, `place_wire`, ...), each consuming the sheet and
//! returning the updated value, so a circuit-building chain short-circuits
//! with `?` on the first [`SheetError`].

pub mod geometry;
pub mod route;
pub mod symbol;
pub mod wire;

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Point};
use crate::route::Router;
use crate::symbol::{ComponentKind, Flip, Port, PortDirection, Rotation, Symbol};
use crate::wire::{PortRef, Wire};

/// Default maximum X/Y coordinate of the sheet.
pub const SHEET_MAX_COORD: f64 = 1000.0;

/// Stable symbol identifier, allocated from a per-sheet counter so that
/// map iteration (and therefore beautifier output) is deterministic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SymbolId(pub u32);

/// Stable wire identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct WireId(pub u32);

/// Recoverable placement and lookup errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SheetError {
    #[error("a symbol labelled '{0}' already exists on the sheet")]
    DuplicateLabel(String),

    #[error("no symbol labelled '{0}' on the sheet")]
    NotFound(String),

    #[error("symbol '{label}' has no {direction:?} port {index}")]
    UnknownPort {
        label: String,
        direction: PortDirection,
        index: usize,
    },

    #[error("a wire already connects '{from}' to '{to}'")]
    DuplicateWire { from: String, to: String },

    #[error("symbol '{0}' bounding box leaves the sheet coordinate range")]
    OutOfBounds(String),

    #[error("custom component source name '{0}' conflicts with an existing symbol")]
    CustomNameConflict(String),
}

/// The full schematic under layout: symbols, wires, and the derived
/// bounding-box index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    max_coord: f64,
    symbols: BTreeMap<SymbolId, Symbol>,
    wires: BTreeMap<WireId, Wire>,
    bounding_boxes: BTreeMap<SymbolId, BoundingBox>,
    /// Canonical-uppercase label to id; the only label-keyed lookup left,
    /// serving the builder-facing API.
    labels: BTreeMap<String, SymbolId>,
    next_symbol: u32,
    next_wire: u32,
}

impl Default for Sheet {
    fn default() -> Self {
        Self::with_bounds(SHEET_MAX_COORD)
    }
}

impl Sheet {
    /// Empty sheet with the default coordinate range.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty sheet allowing coordinates in `[0, max_coord]` on both axes.
    pub fn with_bounds(max_coord: f64) -> Self {
        Self {
            max_coord,
            symbols: BTreeMap::new(),
            wires: BTreeMap::new(),
            bounding_boxes: BTreeMap::new(),
            labels: BTreeMap::new(),
            next_symbol: 0,
            next_wire: 0,
        }
    }

    pub fn max_coord(&self) -> f64 {
        self.max_coord
    }

    // --- Placement builder -------------------------------------------------

    /// Place a new symbol. Fails on a (case-insensitive) duplicate label, a
    /// custom component whose source name collides with an existing symbol,
    /// or a bounding box outside the sheet range. The label is canonicalized
    /// to uppercase before storage.
    pub fn place_symbol(
        mut self,
        label: &str,
        kind: ComponentKind,
        position: Point,
    ) -> Result<Self, SheetError> {
        let canonical = label.to_uppercase();
        if self.labels.contains_key(&canonical) {
            return Err(SheetError::DuplicateLabel(canonical));
        }
        if let ComponentKind::Custom { name, .. } = &kind {
            let source = name.to_uppercase();
            if source != canonical && self.labels.contains_key(&source) {
                return Err(SheetError::CustomNameConflict(source));
            }
        }

        let id = SymbolId(self.next_symbol);
        let symbol = Symbol::new(id, canonical.clone(), kind, position);
        if !self.box_in_bounds(&symbol.bounding_box()) {
            return Err(SheetError::OutOfBounds(canonical));
        }

        debug!("placed '{}' at ({}, {})", canonical, position.x, position.y);
        self.next_symbol += 1;
        self.labels.insert(canonical, id);
        self.symbols.insert(id, symbol);
        self.recompute_bounding_boxes();
        Ok(self)
    }

    /// Connect an output port to an input port, both addressed by
    /// (label, port index). On success the router supplies the initial path.
    pub fn place_wire(
        mut self,
        router: &dyn Router,
        source: (&str, usize),
        target: (&str, usize),
    ) -> Result<Self, SheetError> {
        let source = self.resolve_port(source.0, PortDirection::Output, source.1)?;
        let target = self.resolve_port(target.0, PortDirection::Input, target.1)?;

        if self
            .wires
            .values()
            .any(|w| w.source == source && w.target == target)
        {
            return Err(SheetError::DuplicateWire {
                from: self.symbols[&source.symbol].label.clone(),
                to: self.symbols[&target.symbol].label.clone(),
            });
        }

        let route = router.route(&self, &source, &target);
        let id = WireId(self.next_wire);
        debug!("routed wire {id:?} with {} segment(s)", route.segments.len());
        self.next_wire += 1;
        self.wires.insert(
            id,
            Wire {
                id,
                source,
                target,
                initial_orientation: route.initial_orientation,
                segments: route.segments,
            },
        );
        Ok(self)
    }

    /// Rotate the named symbol clockwise by the given amount. A label that
    /// does not resolve is an explicit error, not a silent no-op.
    pub fn rotate_symbol(mut self, label: &str, rotation: Rotation) -> Result<Self, SheetError> {
        let id = self.require_label(label)?;
        if let Some(symbol) = self.symbols.get_mut(&id) {
            for _ in 0..rotation.quarter_turns() {
                symbol.rotate90();
            }
        }
        self.recompute_bounding_boxes();
        Ok(self)
    }

    /// Mirror the named symbol.
    pub fn flip_symbol(mut self, label: &str, flip: Flip) -> Result<Self, SheetError> {
        let id = self.require_label(label)?;
        if let Some(symbol) = self.symbols.get_mut(&id) {
            symbol.apply_flip(flip);
        }
        self.recompute_bounding_boxes();
        Ok(self)
    }

    /// Set independent scale factors on the named symbol and refresh the
    /// bounding-box index. Does not reroute wires.
    pub fn scale_symbol(
        mut self,
        label: &str,
        v_scale: Option<f64>,
        h_scale: Option<f64>,
    ) -> Result<Self, SheetError> {
        let id = self.require_label(label)?;
        if let Some(symbol) = self.symbols.get_mut(&id) {
            if let Some(v) = v_scale {
                symbol.v_scale = v;
            }
            if let Some(h) = h_scale {
                symbol.h_scale = h;
            }
        }
        self.recompute_bounding_boxes();
        Ok(self)
    }

    /// Rebuild the id to bounding-box index from current symbol geometry.
    pub fn recompute_bounding_boxes(&mut self) {
        self.bounding_boxes = self
            .symbols
            .iter()
            .map(|(id, s)| (*id, s.bounding_box()))
            .collect();
    }

    // --- Read accessors ----------------------------------------------------

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(&id)
    }

    /// Case-insensitive label lookup.
    pub fn symbol_by_label(&self, label: &str) -> Option<&Symbol> {
        let id = self.labels.get(&label.to_uppercase())?;
        self.symbols.get(id)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn symbol_ids(&self) -> Vec<SymbolId> {
        self.symbols.keys().copied().collect()
    }

    pub fn wire(&self, id: WireId) -> Option<&Wire> {
        self.wires.get(&id)
    }

    pub fn wires(&self) -> impl Iterator<Item = &Wire> {
        self.wires.values()
    }

    pub fn wire_ids(&self) -> Vec<WireId> {
        self.wires.keys().copied().collect()
    }

    /// All wires with `port` at either end.
    pub fn wires_at_port(&self, port: &PortRef) -> Vec<&Wire> {
        self.wires
            .values()
            .filter(|w| w.source == *port || w.target == *port)
            .collect()
    }

    /// All wires with either end on `symbol`.
    pub fn wires_touching(&self, symbol: SymbolId) -> Vec<&Wire> {
        self.wires
            .values()
            .filter(|w| w.source.symbol == symbol || w.target.symbol == symbol)
            .collect()
    }

    pub fn bounding_box(&self, id: SymbolId) -> Option<&BoundingBox> {
        self.bounding_boxes.get(&id)
    }

    /// Pairwise scan of the bounding-box index: does `id` intersect any
    /// other symbol? O(n) per query, O(n^2) over a phase; schematics are a
    /// few dozen symbols.
    pub fn overlaps_any(&self, id: SymbolId) -> bool {
        let Some(own) = self.bounding_boxes.get(&id) else {
            return false;
        };
        self.bounding_boxes
            .iter()
            .any(|(other, b)| *other != id && own.overlaps(b))
    }

    /// Whether the symbol's current box lies within `[0, max_coord]^2`.
    pub fn in_bounds(&self, id: SymbolId) -> bool {
        match self.bounding_boxes.get(&id) {
            Some(b) => self.box_in_bounds(b),
            None => false,
        }
    }

    pub fn port(&self, r: &PortRef) -> Option<&Port> {
        self.symbols.get(&r.symbol)?.port(r.direction, r.index)
    }

    /// Absolute sheet position of a port.
    pub fn port_position(&self, r: &PortRef) -> Option<Point> {
        self.symbols
            .get(&r.symbol)?
            .port_position(r.direction, r.index)
    }

    /// Vertices of the wire's visible polyline, from the source port
    /// through each visible segment vector.
    pub fn wire_polyline(&self, id: WireId) -> Option<Vec<Point>> {
        let wire = self.wires.get(&id)?;
        let start = self.port_position(&wire.source)?;
        let mut points = vec![start];
        let mut at = start;
        for v in wire.visible_segments() {
            at = at + v;
            points.push(at);
        }
        Some(points)
    }

    /// Serialize the whole sheet to pretty JSON for inspection dumps.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    // --- Engine-facing mutation --------------------------------------------

    /// Mutable access to a symbol. Callers must follow any geometric edit
    /// with [`Sheet::recompute_bounding_boxes`].
    pub fn symbol_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(&id)
    }

    /// Shift a symbol's reference point by `delta` without refreshing the
    /// box index; the committing caller recomputes.
    pub fn translate_symbol(&mut self, id: SymbolId, delta: Point) {
        if let Some(symbol) = self.symbols.get_mut(&id) {
            symbol.position = symbol.position + delta;
        }
    }

    /// Replace a symbol value wholesale (rollback is "put the old value
    /// back").
    pub fn replace_symbol(&mut self, symbol: Symbol) {
        self.symbols.insert(symbol.id, symbol);
    }

    /// Store a router-provided path on an existing wire.
    pub fn set_route(&mut self, id: WireId, route: crate::route::Route) {
        if let Some(wire) = self.wires.get_mut(&id) {
            wire.initial_orientation = route.initial_orientation;
            wire.segments = route.segments;
        }
    }

    // --- Internals ---------------------------------------------------------

    fn box_in_bounds(&self, b: &BoundingBox) -> bool {
        b.min_x() >= 0.0
            && b.min_y() >= 0.0
            && b.max_x() <= self.max_coord
            && b.max_y() <= self.max_coord
    }

    fn require_label(&self, label: &str) -> Result<SymbolId, SheetError> {
        self.labels
            .get(&label.to_uppercase())
            .copied()
            .ok_or_else(|| SheetError::NotFound(label.to_uppercase()))
    }

    fn resolve_port(
        &self,
        label: &str,
        direction: PortDirection,
        index: usize,
    ) -> Result<PortRef, SheetError> {
        let id = self.require_label(label)?;
        let symbol = &self.symbols[&id];
        if symbol.port(direction, index).is_none() {
            return Err(SheetError::UnknownPort {
                label: symbol.label.clone(),
                direction,
                index,
            });
        }
        Ok(PortRef {
            symbol: id,
            direction,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{Route, Router};
    use crate::wire::Orientation;

    /// Test double: always returns a fixed dog-leg so model tests don't
    /// depend on the engine crate's reference router.
    struct FixedRouter;

    impl Router for FixedRouter {
        fn route(&self, _sheet: &Sheet, _source: &PortRef, _target: &PortRef) -> Route {
            Route {
                initial_orientation: Orientation::Horizontal,
                segments: vec![10.0, 10.0, 10.0],
            }
        }

        fn separate(&self, _sheet: &Sheet, _wires: &[WireId]) -> Vec<(WireId, Route)> {
            Vec::new()
        }
    }

    fn mid() -> Point {
        Point::new(500.0, 500.0)
    }

    #[test]
    fn duplicate_label_is_case_insensitive() {
        let sheet = Sheet::new()
            .place_symbol("G1", ComponentKind::And, mid())
            .unwrap();
        let err = sheet
            .place_symbol("g1", ComponentKind::Or, Point::new(100.0, 100.0))
            .unwrap_err();
        assert_eq!(err, SheetError::DuplicateLabel("G1".into()));
    }

    #[test]
    fn labels_are_canonicalized_uppercase() {
        let sheet = Sheet::new()
            .place_symbol("mux_a", ComponentKind::Mux2, mid())
            .unwrap();
        let s = sheet.symbol_by_label("MuX_A").unwrap();
        assert_eq!(s.label, "MUX_A");
    }

    #[test]
    fn placement_outside_bounds_fails() {
        let err = Sheet::new()
            .place_symbol("G1", ComponentKind::And, Point::new(980.0, 100.0))
            .unwrap_err();
        assert_eq!(err, SheetError::OutOfBounds("G1".into()));

        let err = Sheet::new()
            .place_symbol("G2", ComponentKind::And, Point::new(-1.0, 100.0))
            .unwrap_err();
        assert_eq!(err, SheetError::OutOfBounds("G2".into()));
    }

    #[test]
    fn custom_source_name_conflict() {
        let custom = ComponentKind::Custom {
            name: "ALU".into(),
            inputs: 2,
            outputs: 1,
            width: 80.0,
            height: 60.0,
        };
        let sheet = Sheet::new()
            .place_symbol("ALU", ComponentKind::And, mid())
            .unwrap();
        let err = sheet
            .place_symbol("U1", custom, Point::new(100.0, 100.0))
            .unwrap_err();
        assert_eq!(err, SheetError::CustomNameConflict("ALU".into()));
    }

    #[test]
    fn wire_endpoints_resolve_and_deduplicate() {
        let sheet = Sheet::new()
            .place_symbol("IN1", ComponentKind::Input, Point::new(100.0, 100.0))
            .unwrap()
            .place_symbol("G1", ComponentKind::And, mid())
            .unwrap()
            .place_wire(&FixedRouter, ("in1", 0), ("g1", 0))
            .unwrap();
        assert_eq!(sheet.wires().count(), 1);

        // Same ordered pair again.
        let err = sheet
            .clone()
            .place_wire(&FixedRouter, ("IN1", 0), ("G1", 0))
            .unwrap_err();
        assert_eq!(
            err,
            SheetError::DuplicateWire {
                from: "IN1".into(),
                to: "G1".into()
            }
        );
        assert_eq!(err.to_string(), "a wire already connects 'IN1' to 'G1'");

        // A different input port on the same symbol is a different pair.
        let sheet = sheet.place_wire(&FixedRouter, ("IN1", 0), ("G1", 1)).unwrap();
        assert_eq!(sheet.wires().count(), 2);
    }

    #[test]
    fn wire_to_missing_port_fails() {
        let sheet = Sheet::new()
            .place_symbol("IN1", ComponentKind::Input, Point::new(100.0, 100.0))
            .unwrap()
            .place_symbol("G1", ComponentKind::And, mid())
            .unwrap();
        let err = sheet
            .clone()
            .place_wire(&FixedRouter, ("IN1", 0), ("G1", 5))
            .unwrap_err();
        assert_eq!(
            err,
            SheetError::UnknownPort {
                label: "G1".into(),
                direction: PortDirection::Input,
                index: 5
            }
        );

        let err = sheet
            .place_wire(&FixedRouter, ("NOPE", 0), ("G1", 0))
            .unwrap_err();
        assert_eq!(err, SheetError::NotFound("NOPE".into()));
    }

    #[test]
    fn rotate_missing_symbol_is_an_error() {
        let err = Sheet::new()
            .rotate_symbol("ghost", Rotation::R90)
            .unwrap_err();
        assert_eq!(err, SheetError::NotFound("GHOST".into()));
    }

    #[test]
    fn rotate_and_flip_update_geometry() {
        let sheet = Sheet::new()
            .place_symbol("M1", ComponentKind::Mux2, mid())
            .unwrap()
            .rotate_symbol("m1", Rotation::R90)
            .unwrap();
        let s = sheet.symbol_by_label("M1").unwrap();
        assert_eq!(s.rotation, Rotation::R90);
        // Mux2 is 50x80; after a quarter turn the indexed box is 80x50.
        let b = sheet.bounding_box(s.id).unwrap();
        assert_eq!(b.size.width, 80.0);
        assert_eq!(b.size.height, 50.0);

        let sheet = sheet.flip_symbol("M1", Flip::Vertical).unwrap();
        assert_eq!(sheet.symbol_by_label("M1").unwrap().flip, Flip::Vertical);
    }

    #[test]
    fn scale_refreshes_box_index() {
        let sheet = Sheet::new()
            .place_symbol("G1", ComponentKind::And, mid())
            .unwrap()
            .scale_symbol("G1", Some(2.0), None)
            .unwrap();
        let s = sheet.symbol_by_label("G1").unwrap();
        let b = sheet.bounding_box(s.id).unwrap();
        assert_eq!(b.size.height, 120.0);
        assert_eq!(b.size.width, 60.0);
    }

    #[test]
    fn overlap_scan_ignores_self() {
        let sheet = Sheet::new()
            .place_symbol("A", ComponentKind::And, Point::new(100.0, 100.0))
            .unwrap()
            .place_symbol("B", ComponentKind::And, Point::new(300.0, 100.0))
            .unwrap();
        let a = sheet.symbol_by_label("A").unwrap().id;
        assert!(!sheet.overlaps_any(a));

        let mut sheet = sheet;
        sheet.translate_symbol(a, Point::new(170.0, 0.0));
        sheet.recompute_bounding_boxes();
        assert!(sheet.overlaps_any(a));
    }

    #[test]
    fn json_dump_roundtrips() {
        let sheet = Sheet::new()
            .place_symbol("IN1", ComponentKind::Input, Point::new(100.0, 100.0))
            .unwrap()
            .place_wire_fixture();
        let json = sheet.to_json().unwrap();
        let parsed: Sheet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sheet);
    }

    impl Sheet {
        /// Adds one gate and one wire; keeps the JSON test readable.
        fn place_wire_fixture(self) -> Sheet {
            self.place_symbol("G1", ComponentKind::And, Point::new(500.0, 500.0))
                .unwrap()
                .place_wire(&FixedRouter, ("IN1", 0), ("G1", 0))
                .unwrap()
        }
    }
}
