//! Watertight Check -- decides whether a room-node layout leaks.
//!
//! This crate builds on [`watertight_graph`] to answer one question about a
//! level layout: can anything get from inside the structure out into the
//! void through open faces? A check pass builds the grid graph from a root
//! node, runs the memoized [`SafetyEngine`](safety::SafetyEngine) over it,
//! and returns a [`WatertightReport`](report::WatertightReport). Problems met
//! on the way (overlapping nodes, dangling links, a missing root) are sent to
//! a caller-supplied [`DiagnosticSink`](diagnostics::DiagnosticSink) and
//! never abort the pass.
//!
//! # Quick Start
//!
//! ```
//! use watertight_check::prelude::*;
//!
//! let mut graph = NodeGraph::new();
//! let hall = graph.add_node(Node::enclosed("hall").with_open(Direction::North));
//! let den = graph.add_node(Node::enclosed("den").with_open(Direction::South));
//! graph.link(hall, Direction::North, den).unwrap();
//!
//! let mut log = DiagnosticLog::new();
//! let report = run_check(&mut graph, hall, &CheckConfig::default(), &mut log);
//! assert!(report.watertight);
//! assert_eq!(report.is_node_safe(den), Some(true));
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod diagnostics;
pub mod pass;
pub mod report;
pub mod safety;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the graph crate for convenience.
pub use watertight_graph;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use watertight_graph::prelude::*;

    pub use crate::config::{CheckConfig, MemoPolicy};
    pub use crate::diagnostics::{
        Diagnostic, DiagnosticLog, DiagnosticSink, FnSink, NullSink, Severity,
    };
    pub use crate::pass::{run_check, WatertightChecker};
    pub use crate::report::{LeakCause, NodeVerdict, UnsafeFace, WatertightReport};
    pub use crate::safety::{FaceOutcome, NodeSafety, NodeStatus, SafetyEngine, SafetyOutcome};
}
