//! Graph builder: assigns grid positions and normalizes neighbor links.
//!
//! Designers author a layout as a loose tree of links hanging off a root.
//! Links are often one-sided, and cells that are adjacent on the grid are
//! frequently not linked at all. [`build`] turns that into a consistent grid
//! graph in two steps:
//!
//! 1. **Collect.** Depth-first walk from the root over all six links in
//!    [`Direction::ALL`] order. Each newly reached node is placed at its
//!    parent's position plus the unit offset of the link direction. A node
//!    that lands on an already claimed cell is an [`OverlapError`]: it is
//!    logged and recorded, the walk does not descend through it, and
//!    everything else continues. A link to a node already placed in a
//!    different cell is recorded as a [`DisplacedLink`].
//! 2. **Normalize.** For every placed node and every direction whose adjacent
//!    cell is also placed, both nodes' links are pointed at each other. Links
//!    are only ever set, never cleared.
//!
//! [`collect_positions`] runs step 1 alone without touching the graph.
//!
//! # Example
//!
//! ```
//! use watertight_graph::prelude::*;
//!
//! let mut graph = NodeGraph::new();
//! let hall = graph.add_node(Node::new("hall"));
//! let den = graph.add_node(Node::new("den"));
//! graph.link(hall, Direction::East, den).unwrap();
//!
//! let report = build(&mut graph, hall).unwrap();
//! assert_eq!(report.position_of(den), Some(GridPos::new(1, 0, 0)));
//! // The missing back-link was filled in.
//! assert_eq!(graph.neighbor(den, Direction::West), Some(hall));
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::graph::NodeGraph;
use crate::grid::{Direction, GridPos};
use crate::node::NodeId;
use crate::GraphError;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Two distinct nodes resolved to the same grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("overlapping nodes: {node} reached at {position}, already occupied by {existing}")]
pub struct OverlapError {
    /// The node that arrived second and was left unplaced on this path.
    pub node: NodeId,
    /// The node already holding the cell.
    pub existing: NodeId,
    pub position: GridPos,
}

/// A link whose target id is not in the arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DanglingLink {
    pub node: NodeId,
    pub direction: Direction,
    pub target: NodeId,
}

/// A link to a node that was already placed somewhere other than the cell
/// the link implies. The link is left as authored; normalization may
/// overwrite it if the implied cell is occupied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplacedLink {
    pub node: NodeId,
    pub direction: Direction,
    pub target: NodeId,
    /// Cell the link implies for `target`.
    pub implied: GridPos,
    /// Cell `target` was actually placed at.
    pub placed: GridPos,
}

/// Result of a build: where every reachable node sits, plus what went wrong.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    pub root: NodeId,
    /// Cell → node. `BTreeMap` keeps iteration deterministic.
    positions: BTreeMap<GridPos, NodeId>,
    /// Node → cell, the inverse of `positions`.
    placed: BTreeMap<NodeId, GridPos>,
    pub overlaps: Vec<OverlapError>,
    pub dangling: Vec<DanglingLink>,
    pub displaced: Vec<DisplacedLink>,
    /// Number of link slots changed by the normalization pass.
    pub links_rewritten: usize,
}

impl BuildReport {
    /// The cell a node was placed at, if it was reached and placed.
    pub fn position_of(&self, node: NodeId) -> Option<GridPos> {
        self.placed.get(&node).copied()
    }

    /// The node placed at `pos`, if any.
    pub fn node_at(&self, pos: GridPos) -> Option<NodeId> {
        self.positions.get(&pos).copied()
    }

    /// Iterate `(position, node)` pairs in position order.
    pub fn positions(&self) -> impl Iterator<Item = (GridPos, NodeId)> + '_ {
        self.positions.iter().map(|(&p, &n)| (p, n))
    }

    /// Number of placed nodes.
    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    /// No overlaps, dangling links or displaced links.
    pub fn is_clean(&self) -> bool {
        self.overlaps.is_empty() && self.dangling.is_empty() && self.displaced.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Place every node reachable from `root` without modifying the graph.
pub fn collect_positions(graph: &NodeGraph, root: NodeId) -> Result<BuildReport, GraphError> {
    graph.node(root)?;

    let mut report = BuildReport {
        root,
        positions: BTreeMap::new(),
        placed: BTreeMap::new(),
        overlaps: Vec::new(),
        dangling: Vec::new(),
        displaced: Vec::new(),
        links_rewritten: 0,
    };
    let mut visited: HashSet<NodeId> = HashSet::new();
    // (node, cell implied for it, link that reached it)
    let mut stack: Vec<(NodeId, GridPos, Option<(NodeId, Direction)>)> =
        vec![(root, GridPos::ORIGIN, None)];

    // Checking on pop and pushing children in reverse reproduces the
    // pre-order of a recursive walk.
    while let Some((id, pos, via)) = stack.pop() {
        if visited.contains(&id) {
            let placed = report.placed.get(&id).copied();
            if let (Some(placed), Some((from, dir))) = (placed, via) {
                if placed != pos {
                    tracing::warn!(
                        node = %from,
                        direction = %dir,
                        target = %id,
                        implied = %pos,
                        placed = %placed,
                        "link points at a node placed in another cell"
                    );
                    report.displaced.push(DisplacedLink {
                        node: from,
                        direction: dir,
                        target: id,
                        implied: pos,
                        placed,
                    });
                }
            }
            continue;
        }
        if let Some(&existing) = report.positions.get(&pos) {
            tracing::error!(
                node = %id,
                existing = %existing,
                position = %pos,
                "overlapping nodes: cell already occupied"
            );
            report.overlaps.push(OverlapError {
                node: id,
                existing,
                position: pos,
            });
            continue;
        }

        report.positions.insert(pos, id);
        report.placed.insert(id, pos);
        visited.insert(id);

        let Some(node) = graph.get(id) else {
            continue;
        };
        let mut children: Vec<(NodeId, GridPos, Option<(NodeId, Direction)>)> =
            Vec::with_capacity(6);
        for dir in Direction::ALL {
            let Some(target) = node.link(dir) else {
                continue;
            };
            if !graph.contains(target) {
                tracing::warn!(
                    node = %id,
                    direction = %dir,
                    target = %target,
                    "link points outside the node graph, ignoring"
                );
                report.dangling.push(DanglingLink {
                    node: id,
                    direction: dir,
                    target,
                });
                continue;
            }
            children.push((target, pos.step(dir), Some((id, dir))));
        }
        stack.extend(children.into_iter().rev());
    }

    tracing::debug!(
        root = %root,
        placed = report.positions.len(),
        overlaps = report.overlaps.len(),
        dangling = report.dangling.len(),
        displaced = report.displaced.len(),
        "collected node positions"
    );
    Ok(report)
}

/// Collect positions from `root`, then force every pair of placed, adjacent
/// nodes to link to each other.
pub fn build(graph: &mut NodeGraph, root: NodeId) -> Result<BuildReport, GraphError> {
    let mut report = collect_positions(graph, root)?;
    report.links_rewritten = normalize_links(graph, &report.positions);
    tracing::debug!(
        root = %root,
        links_rewritten = report.links_rewritten,
        "normalized neighbor links"
    );
    Ok(report)
}

/// Returns the number of link slots that changed.
fn normalize_links(graph: &mut NodeGraph, positions: &BTreeMap<GridPos, NodeId>) -> usize {
    let mut rewritten = 0;
    for (&pos, &id) in positions {
        let Some(node) = graph.get_mut(id) else {
            continue;
        };
        for dir in Direction::ALL {
            if let Some(&other) = positions.get(&pos.step(dir)) {
                if node.link(dir) != Some(other) {
                    node.set_link(dir, Some(other));
                    rewritten += 1;
                }
            }
        }
    }
    rewritten
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
