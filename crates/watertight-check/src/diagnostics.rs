//! Diagnostics emitted during a check pass.
//!
//! A check never fails outright. Anything worth telling the caller about
//! (overlapping nodes, dangling or displaced links, a missing root, the
//! verdict of each frontier evaluation) is delivered as a [`Diagnostic`] to a caller-supplied
//! [`DiagnosticSink`]. The crate ships a few sinks:
//!
//! - [`DiagnosticLog`]: collects everything in memory, with query helpers.
//! - [`FnSink`]: forwards to a closure.
//! - `std::sync::mpsc::Sender<Diagnostic>`: forwards to a channel.
//!
//! # Example
//!
//! ```
//! use watertight_check::diagnostics::{Diagnostic, DiagnosticLog, DiagnosticSink, Severity};
//! use watertight_graph::node::NodeId;
//!
//! let mut log = DiagnosticLog::new();
//! log.report(Diagnostic::MissingRoot { root: NodeId(3) });
//!
//! assert_eq!(log.len(), 1);
//! assert_eq!(log.count_at_least(Severity::Warning), 1);
//! ```

use std::sync::mpsc::Sender;

use serde::{Deserialize, Serialize};
use watertight_graph::builder::{DanglingLink, DisplacedLink, OverlapError};
use watertight_graph::node::NodeId;

// ---------------------------------------------------------------------------
// Diagnostic
// ---------------------------------------------------------------------------

/// How much attention a diagnostic deserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A single event reported by a check pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// Two nodes resolved to the same grid cell. The later one was left
    /// unplaced on that path.
    OverlappingNodes(OverlapError),
    /// A link names a node that is not in the graph. Treated as absent.
    DanglingLink(DanglingLink),
    /// A link names a node that was placed in a different cell than the one
    /// the link implies.
    DisplacedLink(DisplacedLink),
    /// The root id is not in the graph; nothing was evaluated.
    MissingRoot { root: NodeId },
    /// A node taken off the frontier was evaluated. `safe` is the verdict at
    /// that point of the pass.
    FrontierEvaluated { node: NodeId, safe: bool },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::OverlappingNodes(_) => Severity::Error,
            Diagnostic::DanglingLink(_)
            | Diagnostic::DisplacedLink(_)
            | Diagnostic::MissingRoot { .. } => Severity::Warning,
            Diagnostic::FrontierEvaluated { .. } => Severity::Info,
        }
    }
}

// ---------------------------------------------------------------------------
// DiagnosticSink
// ---------------------------------------------------------------------------

/// Receiver for diagnostics produced by a check pass.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}

/// Forwards diagnostics over a channel. A disconnected receiver is ignored.
impl DiagnosticSink for Sender<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        if self.send(diagnostic).is_err() {
            tracing::trace!("diagnostic receiver dropped");
        }
    }
}

/// Adapts a closure into a [`DiagnosticSink`].
pub struct FnSink<F>(pub F);

impl<F: FnMut(Diagnostic)> DiagnosticSink for FnSink<F> {
    fn report(&mut self, diagnostic: Diagnostic) {
        (self.0)(diagnostic);
    }
}

/// A sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}

// ---------------------------------------------------------------------------
// DiagnosticLog
// ---------------------------------------------------------------------------

/// Collects diagnostics in arrival order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticLog {
    entries: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All diagnostics in arrival order.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Every overlap reported so far.
    pub fn overlaps(&self) -> impl Iterator<Item = &OverlapError> {
        self.entries.iter().filter_map(|d| match d {
            Diagnostic::OverlappingNodes(overlap) => Some(overlap),
            _ => None,
        })
    }

    /// Number of diagnostics with severity `min` or above.
    pub fn count_at_least(&self, min: Severity) -> usize {
        self.entries.iter().filter(|d| d.severity() >= min).count()
    }

    /// Consume the log, returning the entries.
    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl DiagnosticSink for DiagnosticLog {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
