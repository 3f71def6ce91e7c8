//! Check results.
//!
//! A [`WatertightReport`] is the value returned by a check pass. It carries
//! the aggregate verdict, one [`NodeVerdict`] per evaluated node (with its
//! grid position and per-face outcomes), every [`UnsafeFace`], and the build
//! problems found on the way. It serializes to JSON for tooling.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use watertight_graph::builder::{BuildReport, DanglingLink, DisplacedLink, OverlapError};
use watertight_graph::graph::NodeGraph;
use watertight_graph::grid::{Direction, GridPos};
use watertight_graph::node::NodeId;

use crate::config::MemoPolicy;
use crate::safety::{FaceOutcome, SafetyOutcome};

// ---------------------------------------------------------------------------
// UnsafeFace
// ---------------------------------------------------------------------------

/// Why a face is unsafe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeakCause {
    /// Open with nothing on the other side.
    Void,
    /// Open onto a neighbor that is itself unsafe.
    Neighbor(NodeId),
}

/// A face through which something can escape. This is a normal negative
/// result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsafeFace {
    pub node: NodeId,
    pub direction: Direction,
    pub cause: LeakCause,
}

// ---------------------------------------------------------------------------
// NodeVerdict
// ---------------------------------------------------------------------------

/// Verdict for one evaluated node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeVerdict {
    pub label: String,
    /// `None` if the node was evaluated without being placed (reached only
    /// through a link to an overlapping node).
    pub position: Option<GridPos>,
    pub safe: bool,
    pub faces: BTreeMap<Direction, FaceOutcome>,
}

// ---------------------------------------------------------------------------
// WatertightReport
// ---------------------------------------------------------------------------

/// Result of one build + check pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatertightReport {
    pub root: NodeId,
    /// True iff the root exists and no evaluated node is unsafe.
    pub watertight: bool,
    pub memo_policy: MemoPolicy,
    /// Nodes placed on the grid by the builder.
    pub placed: usize,
    pub links_rewritten: usize,
    pub overlaps: Vec<OverlapError>,
    pub dangling: Vec<DanglingLink>,
    pub displaced: Vec<DisplacedLink>,
    pub verdicts: BTreeMap<NodeId, NodeVerdict>,
    pub unsafe_faces: Vec<UnsafeFace>,
}

impl WatertightReport {
    /// Report for a root that is not in the graph.
    pub fn missing_root(root: NodeId, memo_policy: MemoPolicy) -> Self {
        Self {
            root,
            watertight: false,
            memo_policy,
            placed: 0,
            links_rewritten: 0,
            overlaps: Vec::new(),
            dangling: Vec::new(),
            displaced: Vec::new(),
            verdicts: BTreeMap::new(),
            unsafe_faces: Vec::new(),
        }
    }

    /// Assemble a report from the builder and engine results.
    pub fn assemble(
        graph: &NodeGraph,
        build: BuildReport,
        outcome: &SafetyOutcome,
        memo_policy: MemoPolicy,
    ) -> Self {
        let mut verdicts = BTreeMap::new();
        let mut unsafe_faces = Vec::new();

        for (&id, safety) in &outcome.nodes {
            let mut faces = BTreeMap::new();
            for dir in Direction::ALL {
                let face = safety.face(dir);
                faces.insert(dir, face);
                let cause = match face {
                    FaceOutcome::Void => Some(LeakCause::Void),
                    FaceOutcome::ThroughNeighbor {
                        neighbor,
                        safe: false,
                    } => Some(LeakCause::Neighbor(neighbor)),
                    _ => None,
                };
                if let Some(cause) = cause {
                    unsafe_faces.push(UnsafeFace {
                        node: id,
                        direction: dir,
                        cause,
                    });
                }
            }
            let label = graph.get(id).map(|n| n.label.clone()).unwrap_or_default();
            verdicts.insert(
                id,
                NodeVerdict {
                    label,
                    position: build.position_of(id),
                    safe: safety.safe,
                    faces,
                },
            );
        }

        Self {
            root: build.root,
            watertight: outcome.all_safe(),
            memo_policy,
            placed: build.node_count(),
            links_rewritten: build.links_rewritten,
            overlaps: build.overlaps,
            dangling: build.dangling,
            displaced: build.displaced,
            verdicts,
            unsafe_faces,
        }
    }

    /// Verdict for `node`, if it was evaluated.
    pub fn is_node_safe(&self, node: NodeId) -> Option<bool> {
        self.verdicts.get(&node).map(|v| v.safe)
    }

    /// Ids of every unsafe node, in id order.
    pub fn unsafe_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.verdicts
            .iter()
            .filter(|(_, v)| !v.safe)
            .map(|(&id, _)| id)
    }

    /// Faces open directly onto the void. These are the root causes of every
    /// leak in the report.
    pub fn void_faces(&self) -> impl Iterator<Item = &UnsafeFace> {
        self.unsafe_faces
            .iter()
            .filter(|f| f.cause == LeakCause::Void)
    }

    pub fn evaluated(&self) -> usize {
        self.verdicts.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safety::SafetyEngine;
    use watertight_graph::builder::build;
    use watertight_graph::node::Node;

    #[test]
    fn assemble_lists_void_and_neighbor_leaks() {
        let mut graph = NodeGraph::new();
        let a = graph.add_node(Node::enclosed("a").with_open(Direction::North));
        let b = graph.add_node(
            Node::enclosed("b")
                .with_open(Direction::South)
                .with_open(Direction::Top),
        );
        graph.link(a, Direction::North, b).unwrap();
        let build_report = build(&mut graph, a).unwrap();

        let mut engine = SafetyEngine::new(&graph);
        engine.run(a, |_, _| {});
        let outcome = engine.into_outcome();

        let report =
            WatertightReport::assemble(&graph, build_report, &outcome, MemoPolicy::Optimistic);
        assert!(!report.watertight);
        assert_eq!(report.placed, 2);
        assert_eq!(report.evaluated(), 2);
        assert_eq!(report.unsafe_nodes().collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(
            report.void_faces().copied().collect::<Vec<_>>(),
            vec![UnsafeFace {
                node: b,
                direction: Direction::Top,
                cause: LeakCause::Void,
            }]
        );
        assert!(report.unsafe_faces.contains(&UnsafeFace {
            node: a,
            direction: Direction::North,
            cause: LeakCause::Neighbor(b),
        }));
        assert_eq!(report.verdicts[&b].position, Some(GridPos::new(0, 0, 1)));
        assert_eq!(report.verdicts[&b].label, "b");
    }

    #[test]
    fn missing_root_report_is_not_watertight() {
        let report = WatertightReport::missing_root(NodeId(9), MemoPolicy::Strict);
        assert!(!report.watertight);
        assert_eq!(report.evaluated(), 0);
    }

    #[test]
    fn report_serializes_to_json() {
        let mut graph = NodeGraph::new();
        let a = graph.add_node(Node::enclosed("a"));
        let build_report = build(&mut graph, a).unwrap();
        let mut engine = SafetyEngine::new(&graph);
        engine.run(a, |_, _| {});
        let report = WatertightReport::assemble(
            &graph,
            build_report,
            &engine.into_outcome(),
            MemoPolicy::Optimistic,
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["watertight"], serde_json::json!(true));
        assert_eq!(json["verdicts"]["0"]["faces"]["top"], serde_json::json!("blocked"));
    }
}
