//! Routed wires and the visible-segment analyzer.
//!
//! A wire stores its routed path as scalar segment lengths whose axis
//! alternates by index parity starting from the wire's initial orientation.
//! The *visible* geometry is derived on demand: zero-length interior
//! segments are joints, and coalescing them yields the externally
//! observable bend structure. One visible vector means the wire is
//! straight; exactly three means the middle vector is the offset that
//! would straighten it.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::symbol::PortDirection;
use crate::{SymbolId, WireId};

/// Axis of a wire segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn perpendicular(self) -> Orientation {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

/// Typed reference to one port of one symbol, resolved at wire creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRef {
    pub symbol: SymbolId,
    pub direction: PortDirection,
    pub index: usize,
}

/// A routed connection from one output port to one input port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wire {
    pub id: WireId,
    /// Driving end; always an output port.
    pub source: PortRef,
    /// Consuming end; always an input port.
    pub target: PortRef,
    pub initial_orientation: Orientation,
    /// Scalar lengths; sign encodes direction along each segment's axis.
    pub segments: Vec<f64>,
}

impl Wire {
    /// Axis of the raw segment at `index`: even indices take the initial
    /// orientation, odd indices the perpendicular one.
    pub fn segment_orientation(&self, index: usize) -> Orientation {
        if index % 2 == 0 {
            self.initial_orientation
        } else {
            self.initial_orientation.perpendicular()
        }
    }

    fn segment_vector(&self, index: usize) -> Point {
        let len = self.segments[index];
        match self.segment_orientation(index) {
            Orientation::Horizontal => Point::new(len, 0.0),
            Orientation::Vertical => Point::new(0.0, len),
        }
    }

    /// The post-coalescing segment vectors from source to target.
    ///
    /// A wire with n raw segments yields between 1 and n visible vectors;
    /// re-running coalescing on the result is a no-op.
    pub fn visible_segments(&self) -> Vec<Point> {
        let vectors = (0..self.segments.len())
            .map(|i| self.segment_vector(i))
            .collect();
        coalesce(vectors)
    }

    /// Exactly one visible vector: a single-segment run.
    pub fn is_straight(&self) -> bool {
        self.visible_segments().len() == 1
    }

    /// End-to-end displacement of the routed path.
    pub fn span(&self) -> Point {
        self.visible_segments()
            .into_iter()
            .fold(Point::ZERO, |acc, v| acc + v)
    }
}

/// Merge zero-length interior vectors until none remain.
///
/// The neighbors of an interior vector share an axis (parity flips twice),
/// so summing them preserves the path. End vectors are never removed.
pub fn coalesce(mut vectors: Vec<Point>) -> Vec<Point> {
    loop {
        let n = vectors.len();
        let Some(i) = (1..n.saturating_sub(1)).find(|&i| vectors[i].close_to(Point::ZERO)) else {
            return vectors;
        };
        let merged = vectors[i - 1] + vectors[i + 1];
        vectors.splice(i - 1..=i + 1, [merged]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(initial: Orientation, segments: Vec<f64>) -> Wire {
        Wire {
            id: WireId(1),
            source: PortRef {
                symbol: SymbolId(1),
                direction: PortDirection::Output,
                index: 0,
            },
            target: PortRef {
                symbol: SymbolId(2),
                direction: PortDirection::Input,
                index: 0,
            },
            initial_orientation: initial,
            segments,
        }
    }

    #[test]
    fn parity_assigns_axes() {
        let w = wire(Orientation::Horizontal, vec![10.0, 20.0, 30.0]);
        assert_eq!(
            w.visible_segments(),
            vec![
                Point::new(10.0, 0.0),
                Point::new(0.0, 20.0),
                Point::new(30.0, 0.0)
            ]
        );

        let w = wire(Orientation::Vertical, vec![10.0, 20.0]);
        assert_eq!(
            w.visible_segments(),
            vec![Point::new(0.0, 10.0), Point::new(20.0, 0.0)]
        );
    }

    #[test]
    fn interior_zeros_cascade_to_one_vector() {
        // Same-axis runs separated by zero joints collapse to one straight
        // horizontal vector of the summed length.
        let w = wire(Orientation::Horizontal, vec![10.0, 0.0, 20.0, 0.0, 50.0]);
        assert_eq!(w.visible_segments(), vec![Point::new(80.0, 0.0)]);
        assert!(w.is_straight());
    }

    #[test]
    fn end_zeros_survive() {
        let w = wire(Orientation::Horizontal, vec![0.0, 50.0, 30.0, 0.0]);
        let vs = w.visible_segments();
        assert_eq!(vs.len(), 4);
        assert_eq!(vs[0], Point::ZERO);
        assert_eq!(vs[3], Point::ZERO);
    }

    #[test]
    fn coalescing_is_idempotent() {
        let w = wire(
            Orientation::Vertical,
            vec![5.0, 0.0, 0.0, -10.0, 0.0, 25.0, 3.0],
        );
        let once = w.visible_segments();
        assert_eq!(coalesce(once.clone()), once);
    }

    #[test]
    fn visible_count_bounds() {
        for segments in [
            vec![40.0],
            vec![40.0, 0.0, 10.0],
            vec![0.0, 0.0, 0.0],
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
        ] {
            let n = segments.len();
            let w = wire(Orientation::Horizontal, segments);
            let count = w.visible_segments().len();
            assert!((1..=n).contains(&count), "count {count} out of [1, {n}]");
        }
    }

    #[test]
    fn three_visible_exposes_middle_offset() {
        let w = wire(Orientation::Horizontal, vec![70.0, -40.0, 70.0]);
        let vs = w.visible_segments();
        assert_eq!(vs.len(), 3);
        assert_eq!(vs[1], Point::new(0.0, -40.0));
        assert_eq!(w.span(), Point::new(140.0, -40.0));
    }
}
