//! Watertight Graph -- room-node arena and grid graph builder.
//!
//! Level layouts are described as *room nodes*: cells on a 3D integer grid,
//! each with six faces that are either open or blocked (ceiling, floor, door,
//! wall) and up to six links to neighboring nodes. Designers author these as
//! a loose tree of links from a root, so links are often one-sided or missing
//! between cells that are in fact adjacent.
//!
//! This crate stores such layouts in a [`NodeGraph`](graph::NodeGraph) arena
//! and turns them into a consistent grid graph with
//! [`build`](builder::build): every node gets an integer position relative to
//! the root, and every pair of adjacent placed nodes ends up linked both
//! ways. Watertightness checking on top of the built graph lives in the
//! `watertight-check` crate.
//!
//! # Quick Start
//!
//! ```
//! use watertight_graph::prelude::*;
//!
//! let mut graph = NodeGraph::new();
//! let hall = graph.add_node(Node::enclosed("hall").with_open(Direction::North));
//! let den = graph.add_node(Node::enclosed("den").with_open(Direction::South));
//! graph.link(hall, Direction::North, den).unwrap();
//!
//! let report = build(&mut graph, hall).unwrap();
//! assert!(report.is_clean());
//! assert_eq!(report.position_of(den), Some(GridPos::new(0, 0, 1)));
//! assert_eq!(graph.neighbor(den, Direction::South), Some(hall));
//! ```

#![deny(unsafe_code)]

pub mod builder;
pub mod graph;
pub mod grid;
pub mod layout;
pub mod node;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by graph construction and layout loading.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The id does not name a node in this graph.
    #[error("node {node} does not exist in the graph")]
    UnknownNode { node: node::NodeId },

    /// A blocker was placed on a face of the wrong orientation.
    #[error("{blocker:?} cannot block a {direction} face")]
    BlockerOrientation {
        blocker: node::Blocker,
        direction: grid::Direction,
    },

    /// Two nodes in a layout document share a label.
    #[error("duplicate node label '{label}' in layout")]
    DuplicateLabel { label: String },

    /// A layout document refers to a label that no node carries.
    #[error("unknown node label '{label}' referenced by '{referenced_by}'")]
    UnknownLabel {
        label: String,
        referenced_by: String,
    },

    /// A layout document is not valid JSON or does not match the schema.
    #[error("failed to parse layout: {details}")]
    LayoutParse { details: String },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::builder::{
        build, collect_positions, BuildReport, DanglingLink, DisplacedLink, OverlapError,
    };
    pub use crate::graph::NodeGraph;
    pub use crate::grid::{Direction, GridPos};
    pub use crate::layout::{LayoutSnapshot, NodeSnapshot};
    pub use crate::node::{default_blocker, Blocker, Face, Node, NodeId};
    pub use crate::GraphError;
}

// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------
