//! The full build + check pass.
//!
//! [`run_check`] ties the pieces together:
//!
//! 1. Build the grid graph from the root (normalizing links unless the config
//!    says otherwise) and forward overlaps, dangling and displaced links to
//!    the sink.
//! 2. Drain the safety frontier from the root, reporting each frontier step.
//! 3. Under [`MemoPolicy::Strict`], settle verdicts to a fixed point.
//! 4. Assemble the [`WatertightReport`].
//!
//! Nothing here fails: a missing root produces a
//! [`Diagnostic::MissingRoot`] and a non-watertight report.

use watertight_graph::builder::{build, collect_positions};
use watertight_graph::graph::NodeGraph;
use watertight_graph::layout::LayoutSnapshot;
use watertight_graph::node::NodeId;
use watertight_graph::GraphError;

use crate::config::{CheckConfig, MemoPolicy};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::report::WatertightReport;
use crate::safety::SafetyEngine;

/// Run one build + check pass over `graph` from `root`.
pub fn run_check<S: DiagnosticSink + ?Sized>(
    graph: &mut NodeGraph,
    root: NodeId,
    config: &CheckConfig,
    sink: &mut S,
) -> WatertightReport {
    let built = if config.normalize_links {
        build(graph, root)
    } else {
        collect_positions(graph, root)
    };
    let build_report = match built {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!(root = %root, error = %e, "check requested for a missing root");
            sink.report(Diagnostic::MissingRoot { root });
            return WatertightReport::missing_root(root, config.memo_policy);
        }
    };

    for overlap in &build_report.overlaps {
        sink.report(Diagnostic::OverlappingNodes(overlap.clone()));
    }
    for dangling in &build_report.dangling {
        sink.report(Diagnostic::DanglingLink(dangling.clone()));
    }
    for displaced in &build_report.displaced {
        sink.report(Diagnostic::DisplacedLink(displaced.clone()));
    }

    let graph: &NodeGraph = graph;
    let mut engine = SafetyEngine::new(graph);
    engine.run(root, |node, safe| {
        sink.report(Diagnostic::FrontierEvaluated { node, safe });
    });
    let mut outcome = engine.into_outcome();

    if config.memo_policy == MemoPolicy::Strict {
        outcome.settle_strict();
    }

    let report = WatertightReport::assemble(graph, build_report, &outcome, config.memo_policy);
    tracing::debug!(
        root = %root,
        watertight = report.watertight,
        evaluated = report.evaluated(),
        unsafe_faces = report.unsafe_faces.len(),
        overlaps = report.overlaps.len(),
        "watertight check finished"
    );
    report
}

// ---------------------------------------------------------------------------
// WatertightChecker
// ---------------------------------------------------------------------------

/// Runs check passes with a fixed configuration.
///
/// # Example
///
/// ```
/// use watertight_check::prelude::*;
///
/// let mut graph = NodeGraph::new();
/// let room = graph.add_node(Node::enclosed("room"));
///
/// let checker = WatertightChecker::default();
/// let report = checker.check(&mut graph, room, &mut NullSink);
/// assert!(report.watertight);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WatertightChecker {
    config: CheckConfig,
}

impl WatertightChecker {
    pub fn new(config: CheckConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Run a pass over an in-memory graph. Links may be rewritten in place.
    pub fn check<S: DiagnosticSink + ?Sized>(
        &self,
        graph: &mut NodeGraph,
        root: NodeId,
        sink: &mut S,
    ) -> WatertightReport {
        run_check(graph, root, &self.config, sink)
    }

    /// Load a layout document and run a pass over it. Returns the report and
    /// the (possibly normalized) graph.
    pub fn check_layout<S: DiagnosticSink + ?Sized>(
        &self,
        layout: &LayoutSnapshot,
        sink: &mut S,
    ) -> Result<(WatertightReport, NodeGraph, NodeId), GraphError> {
        let (mut graph, root) = NodeGraph::from_layout(layout)?;
        let report = self.check(&mut graph, root, sink);
        Ok((report, graph, root))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
