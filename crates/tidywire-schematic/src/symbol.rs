//! Placed circuit components: kinds, ports, orientation state.

use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Point, Size};
use crate::SymbolId;

/// The component family a symbol renders as. Each kind fixes the port
/// complement and the unscaled outline size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Input stub: a single output pin feeding the circuit.
    Input,
    /// Output stub: a single input pin terminating the circuit.
    Output,
    Not,
    And,
    Or,
    Xor,
    /// 2-way multiplexer: two data inputs plus a select.
    Mux2,
    /// 2-way demultiplexer: data plus select in, two outputs.
    Demux2,
    /// D flip-flop: D and clock in, Q out.
    DFlipFlop,
    /// User-defined block with an arbitrary port complement.
    Custom {
        name: String,
        inputs: usize,
        outputs: usize,
        width: f64,
        height: f64,
    },
}

impl ComponentKind {
    pub fn input_count(&self) -> usize {
        match self {
            ComponentKind::Input => 0,
            ComponentKind::Output => 1,
            ComponentKind::Not => 1,
            ComponentKind::And | ComponentKind::Or | ComponentKind::Xor => 2,
            ComponentKind::Mux2 => 3,
            ComponentKind::Demux2 => 2,
            ComponentKind::DFlipFlop => 2,
            ComponentKind::Custom { inputs, .. } => *inputs,
        }
    }

    pub fn output_count(&self) -> usize {
        match self {
            ComponentKind::Input => 1,
            ComponentKind::Output => 0,
            ComponentKind::Demux2 => 2,
            ComponentKind::Custom { outputs, .. } => *outputs,
            _ => 1,
        }
    }

    /// Outline size before scaling and rotation.
    pub fn base_size(&self) -> Size {
        match self {
            ComponentKind::Input | ComponentKind::Output => Size::new(30.0, 20.0),
            ComponentKind::Not => Size::new(45.0, 45.0),
            ComponentKind::And | ComponentKind::Or | ComponentKind::Xor => Size::new(60.0, 60.0),
            ComponentKind::Mux2 | ComponentKind::Demux2 => Size::new(50.0, 80.0),
            ComponentKind::DFlipFlop => Size::new(60.0, 60.0),
            ComponentKind::Custom { width, height, .. } => Size::new(*width, *height),
        }
    }
}

/// Whether a port consumes or drives a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PortDirection {
    Input,
    Output,
}

/// The symbol edge a port is rendered on. Assigned by the symbol's layout
/// and remapped by rotation and flipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    /// Edge mapping for a clockwise quarter turn.
    pub fn rotate90(self) -> Edge {
        match self {
            Edge::Left => Edge::Top,
            Edge::Top => Edge::Right,
            Edge::Right => Edge::Bottom,
            Edge::Bottom => Edge::Left,
        }
    }

    pub fn mirror_horizontal(self) -> Edge {
        match self {
            Edge::Left => Edge::Right,
            Edge::Right => Edge::Left,
            other => other,
        }
    }

    pub fn mirror_vertical(self) -> Edge {
        match self {
            Edge::Top => Edge::Bottom,
            Edge::Bottom => Edge::Top,
            other => other,
        }
    }
}

/// Quarter-turn rotation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    fn next(self) -> Rotation {
        match self {
            Rotation::R0 => Rotation::R90,
            Rotation::R90 => Rotation::R180,
            Rotation::R180 => Rotation::R270,
            Rotation::R270 => Rotation::R0,
        }
    }

    /// Number of quarter turns this rotation represents.
    pub fn quarter_turns(self) -> usize {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }
}

/// Mirror state of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flip {
    None,
    Horizontal,
    Vertical,
}

/// A connection point on a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub direction: PortDirection,
    /// Position within the symbol's input or output list.
    pub index: usize,
    pub edge: Edge,
}

/// A placed circuit component.
///
/// `position` is the top-left reference point; the bounding box extends by
/// the scaled (and rotation-swapped) outline diagonal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub id: SymbolId,
    /// Canonical (uppercase) display label, unique per sheet.
    pub label: String,
    pub kind: ComponentKind,
    pub position: Point,
    pub rotation: Rotation,
    pub flip: Flip,
    pub h_scale: f64,
    pub v_scale: f64,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
}

impl Symbol {
    /// Create a symbol at `position` with the default port layout:
    /// inputs on the left edge, outputs on the right.
    pub fn new(id: SymbolId, label: String, kind: ComponentKind, position: Point) -> Self {
        let inputs = (0..kind.input_count())
            .map(|index| Port {
                direction: PortDirection::Input,
                index,
                edge: Edge::Left,
            })
            .collect();
        let outputs = (0..kind.output_count())
            .map(|index| Port {
                direction: PortDirection::Output,
                index,
                edge: Edge::Right,
            })
            .collect();

        Self {
            id,
            label,
            kind,
            position,
            rotation: Rotation::R0,
            flip: Flip::None,
            h_scale: 1.0,
            v_scale: 1.0,
            inputs,
            outputs,
        }
    }

    pub fn port_count(&self) -> usize {
        self.inputs.len() + self.outputs.len()
    }

    pub fn port(&self, direction: PortDirection, index: usize) -> Option<&Port> {
        match direction {
            PortDirection::Input => self.inputs.get(index),
            PortDirection::Output => self.outputs.get(index),
        }
    }

    /// Derived bounding box: position plus the scaled diagonal, with width
    /// and height swapped for quarter-turn rotations.
    pub fn bounding_box(&self) -> BoundingBox {
        let base = self.kind.base_size();
        let scaled = Size::new(base.width * self.h_scale, base.height * self.v_scale);
        let size = match self.rotation {
            Rotation::R90 | Rotation::R270 => Size::new(scaled.height, scaled.width),
            _ => scaled,
        };
        BoundingBox::from_position_and_size(self.position, size)
    }

    /// Rotate the symbol clockwise by a quarter turn, remapping every port
    /// edge. A 180-degree turn is two calls.
    pub fn rotate90(&mut self) {
        self.rotation = self.rotation.next();
        for port in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
            port.edge = port.edge.rotate90();
        }
    }

    /// Apply a mirror flip. Flipping along the same axis twice cancels; the
    /// stored state records the most recent uncancelled axis.
    pub fn apply_flip(&mut self, flip: Flip) {
        match flip {
            Flip::None => return,
            Flip::Horizontal => {
                for port in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
                    port.edge = port.edge.mirror_horizontal();
                }
            }
            Flip::Vertical => {
                for port in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
                    port.edge = port.edge.mirror_vertical();
                }
            }
        }
        self.flip = if self.flip == flip { Flip::None } else { flip };
    }

    /// Absolute position of a port: ports of one direction sharing an edge
    /// are spaced evenly at fractions (rank+1)/(count+1) along it.
    pub fn port_position(&self, direction: PortDirection, index: usize) -> Option<Point> {
        let port = *self.port(direction, index)?;
        let peers: Vec<&Port> = self
            .ports(direction)
            .iter()
            .filter(|p| p.edge == port.edge)
            .collect();
        let rank = peers.iter().position(|p| p.index == index)?;
        let frac = (rank + 1) as f64 / (peers.len() + 1) as f64;

        let b = self.bounding_box();
        Some(match port.edge {
            Edge::Left => Point::new(b.min_x(), b.min_y() + frac * b.size.height),
            Edge::Right => Point::new(b.max_x(), b.min_y() + frac * b.size.height),
            Edge::Top => Point::new(b.min_x() + frac * b.size.width, b.min_y()),
            Edge::Bottom => Point::new(b.min_x() + frac * b.size.width, b.max_y()),
        })
    }

    /// Distance between the first two ports of `direction`, or `None` when
    /// the symbol has fewer than two. This is the bus pitch used by the
    /// paired-symbol alignment phase.
    pub fn port_pitch(&self, direction: PortDirection) -> Option<f64> {
        let a = self.port_position(direction, 0)?;
        let b = self.port_position(direction, 1)?;
        Some(a.euclidean_distance(b))
    }

    fn ports(&self, direction: PortDirection) -> &[Port] {
        match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        }
    }
}
