//! # tidywire-engine
//!
//! The beautification engine for tidywire schematics: a deterministic,
//! single-threaded geometry transformer that adjusts symbol position,
//! rotation, flip, and scale so the maximum number of wires become
//! single-segment runs, while no two symbols overlap and every symbol
//! stays inside the sheet.
//!
//! Routing stays an external concern behind the
//! [`tidywire_schematic::route::Router`] trait; [`router::ManhattanRouter`]
//! is the bundled reference implementation used by the test harness.

pub mod align;
pub mod router;

pub use align::{align_multi_port, align_port_pitch, align_single_port, beautify};
pub use router::{reroute_all, reroute_wire, separate_wires, ManhattanRouter};
