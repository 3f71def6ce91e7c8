//! Safety propagation: decides which nodes can leak into the void.
//!
//! A face of node `n` in direction `d` is **safe** when any of these hold:
//!
//! 1. `n`'s own face in `d` is blocked;
//! 2. `n` has a neighbor in `d` whose opposite face is blocked;
//! 3. `n` has a neighbor in `d` and that neighbor is itself safe.
//!
//! A face with no blocker and no neighbor opens onto the void and is never
//! safe. A node is safe when all six faces are. All six faces are always
//! evaluated, in [`Direction::ALL`] order, even after one has failed.
//!
//! # Evaluation
//!
//! Each node moves through three states: [`NodeStatus::Unvisited`],
//! [`NodeStatus::InProgress`] and [`NodeStatus::Resolved`]. Evaluation of a
//! node that meets an open face onto an unvisited neighbor suspends and
//! evaluates that neighbor first. This uses an explicit stack of frames, not
//! the call stack, so deep layouts cannot overflow it.
//!
//! A node becomes in progress *before* its neighbors are looked at, and a
//! query against an in-progress node answers "safe, unless it has already
//! leaked". That is what lets evaluation terminate on cyclic layouts, and it
//! is also why a verdict resolved through a cycle can be optimistic. See
//! [`MemoPolicy`](crate::config::MemoPolicy) and [`SafetyOutcome::settle_strict`].
//!
//! Neighbors across a blocked face are not evaluated on the spot; they go on
//! a FIFO frontier. [`SafetyEngine::run`] seeds the frontier with the root
//! and drains it, so every node linked to the root ends up evaluated.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use watertight_graph::graph::NodeGraph;
use watertight_graph::grid::Direction;
use watertight_graph::node::{Face, NodeId};

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// How a single face was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceOutcome {
    /// This node's own face is blocked.
    Blocked,
    /// The neighbor's opposite face is blocked.
    ClosedByNeighbor { neighbor: NodeId },
    /// Open onto a neighbor; safe iff that neighbor was judged safe.
    ThroughNeighbor { neighbor: NodeId, safe: bool },
    /// Open, with nothing on the other side.
    Void,
}

impl FaceOutcome {
    #[inline]
    pub fn is_safe(self) -> bool {
        match self {
            FaceOutcome::Blocked | FaceOutcome::ClosedByNeighbor { .. } => true,
            FaceOutcome::ThroughNeighbor { safe, .. } => safe,
            FaceOutcome::Void => false,
        }
    }
}

/// Evaluation state of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeStatus {
    Unvisited,
    /// Being evaluated. `leaked` turns true as soon as one face fails.
    InProgress { leaked: bool },
    Resolved { safe: bool },
}

/// Final classification of one evaluated node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSafety {
    pub safe: bool,
    /// Indexed by [`Direction::index`].
    pub faces: [FaceOutcome; 6],
}

impl NodeSafety {
    #[inline]
    pub fn face(&self, dir: Direction) -> FaceOutcome {
        self.faces[dir.index()]
    }
}

/// Everything an engine learned, keyed by node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyOutcome {
    pub nodes: BTreeMap<NodeId, NodeSafety>,
}

impl SafetyOutcome {
    /// True iff at least one node was evaluated and none is unsafe.
    pub fn all_safe(&self) -> bool {
        !self.nodes.is_empty() && self.nodes.values().all(|n| n.safe)
    }

    pub fn is_safe(&self, node: NodeId) -> Option<bool> {
        self.nodes.get(&node).map(|n| n.safe)
    }

    /// Push unsafety backwards across open faces until a fixed point.
    ///
    /// Every node with an open face onto an unsafe neighbor becomes unsafe,
    /// and that face is rewritten to say so. Returns how many node verdicts
    /// flipped from safe to unsafe.
    pub fn settle_strict(&mut self) -> usize {
        // neighbor -> [(node, dir)] for every open face node --dir--> neighbor
        let mut dependents: BTreeMap<NodeId, Vec<(NodeId, Direction)>> = BTreeMap::new();
        for (&id, safety) in &self.nodes {
            for dir in Direction::ALL {
                if let FaceOutcome::ThroughNeighbor { neighbor, .. } = safety.face(dir) {
                    dependents.entry(neighbor).or_default().push((id, dir));
                }
            }
        }

        let mut worklist: VecDeque<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, s)| !s.safe)
            .map(|(&id, _)| id)
            .collect();
        let mut flipped = 0;

        while let Some(unsafe_node) = worklist.pop_front() {
            let Some(deps) = dependents.get(&unsafe_node) else {
                continue;
            };
            for &(dependent, dir) in deps {
                let Some(safety) = self.nodes.get_mut(&dependent) else {
                    continue;
                };
                safety.faces[dir.index()] = FaceOutcome::ThroughNeighbor {
                    neighbor: unsafe_node,
                    safe: false,
                };
                if safety.safe {
                    safety.safe = false;
                    flipped += 1;
                    worklist.push_back(dependent);
                }
            }
        }

        tracing::debug!(flipped, "strict settlement finished");
        flipped
    }
}

// ---------------------------------------------------------------------------
// SafetyEngine
// ---------------------------------------------------------------------------

/// A suspended node evaluation.
struct Frame {
    node: NodeId,
    /// Index into [`Direction::ALL`] of the next face to classify.
    next: usize,
    /// Neighbor being evaluated on behalf of face `next`.
    pending: Option<NodeId>,
    faces: [FaceOutcome; 6],
}

enum Advance {
    /// Evaluate this neighbor, then come back.
    Descend(NodeId),
    /// All six faces classified.
    Done,
}

/// Memoized safety evaluation over one [`NodeGraph`].
///
/// The engine borrows the graph immutably; build and normalize links first.
pub struct SafetyEngine<'g> {
    graph: &'g NodeGraph,
    status: Vec<NodeStatus>,
    queued: Vec<bool>,
    frontier: VecDeque<NodeId>,
    outcome: SafetyOutcome,
}

impl<'g> SafetyEngine<'g> {
    pub fn new(graph: &'g NodeGraph) -> Self {
        Self {
            graph,
            status: vec![NodeStatus::Unvisited; graph.len()],
            queued: vec![false; graph.len()],
            frontier: VecDeque::new(),
            outcome: SafetyOutcome::default(),
        }
    }

    /// Current state of `node`. Unknown ids read as unvisited.
    pub fn status(&self, node: NodeId) -> NodeStatus {
        self.status
            .get(node.index())
            .copied()
            .unwrap_or(NodeStatus::Unvisited)
    }

    /// Nodes waiting on the frontier.
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// Seed the frontier with `root` and drain it. `on_step` is called with
    /// each node taken off the frontier and evaluated, and its verdict.
    /// Returns whether every evaluated node is safe.
    pub fn run(&mut self, root: NodeId, mut on_step: impl FnMut(NodeId, bool)) -> bool {
        if !self.graph.contains(root) {
            return false;
        }
        self.enqueue(root);
        while let Some(node) = self.frontier.pop_front() {
            if self.status(node) != NodeStatus::Unvisited {
                continue;
            }
            let safe = self.evaluate(node);
            on_step(node, safe);
        }
        self.outcome.all_safe()
    }

    /// Evaluate `start` (and whatever it depends on) and return its verdict.
    ///
    /// Already known nodes answer from memory. Unknown ids are unsafe.
    pub fn evaluate(&mut self, start: NodeId) -> bool {
        if !self.graph.contains(start) {
            return false;
        }
        if let Some(safe) = self.query(start) {
            return safe;
        }

        let mut stack = vec![self.begin(start)];
        let mut returned: Option<bool> = None;

        while let Some(frame) = stack.last_mut() {
            if let Some(child_safe) = returned.take() {
                self.finish_pending(frame, child_safe);
            }
            match self.advance(frame) {
                Advance::Descend(next) => {
                    let child = self.begin(next);
                    stack.push(child);
                }
                Advance::Done => {
                    let safe = self.resolve(frame);
                    stack.pop();
                    returned = Some(safe);
                }
            }
        }

        returned.unwrap_or(false)
    }

    /// Consume the engine and return what it computed.
    pub fn into_outcome(self) -> SafetyOutcome {
        self.outcome
    }

    // -- internals ----------------------------------------------------------

    /// `Some(verdict)` for in-progress and resolved nodes.
    fn query(&self, node: NodeId) -> Option<bool> {
        match self.status(node) {
            NodeStatus::Unvisited => None,
            NodeStatus::InProgress { leaked } => Some(!leaked),
            NodeStatus::Resolved { safe } => Some(safe),
        }
    }

    fn enqueue(&mut self, node: NodeId) {
        if let Some(queued) = self.queued.get_mut(node.index()) {
            if !*queued {
                *queued = true;
                self.frontier.push_back(node);
            }
        }
    }

    fn begin(&mut self, node: NodeId) -> Frame {
        self.status[node.index()] = NodeStatus::InProgress { leaked: false };
        tracing::trace!(node = %node, "evaluating node");
        Frame {
            node,
            next: 0,
            pending: None,
            faces: [FaceOutcome::Void; 6],
        }
    }

    /// Classify faces of `frame` until one needs a neighbor evaluated first.
    fn advance(&mut self, frame: &mut Frame) -> Advance {
        while let Some(&dir) = Direction::ALL.get(frame.next) {
            let neighbor = self.graph.neighbor(frame.node, dir);
            let own_blocked = self
                .graph
                .face(frame.node, dir)
                .is_some_and(Face::is_blocked);
            let neighbor_blocked = neighbor
                .and_then(|nb| self.graph.face(nb, dir.opposite()))
                .is_some_and(Face::is_blocked);

            let outcome = match neighbor {
                _ if own_blocked => FaceOutcome::Blocked,
                Some(nb) if neighbor_blocked => FaceOutcome::ClosedByNeighbor { neighbor: nb },
                Some(nb) => match self.query(nb) {
                    Some(safe) => FaceOutcome::ThroughNeighbor { neighbor: nb, safe },
                    None => {
                        frame.pending = Some(nb);
                        return Advance::Descend(nb);
                    }
                },
                None => FaceOutcome::Void,
            };

            if own_blocked || neighbor_blocked {
                if let Some(nb) = neighbor {
                    if self.status(nb) == NodeStatus::Unvisited {
                        self.enqueue(nb);
                    }
                }
            }
            self.record(frame, dir, outcome);
        }
        Advance::Done
    }

    /// Record the verdict of the neighbor `frame` was waiting on.
    fn finish_pending(&mut self, frame: &mut Frame, child_safe: bool) {
        let Some(&dir) = Direction::ALL.get(frame.next) else {
            return;
        };
        let outcome = match frame.pending.take() {
            Some(neighbor) => FaceOutcome::ThroughNeighbor {
                neighbor,
                safe: child_safe,
            },
            None => FaceOutcome::Void,
        };
        self.record(frame, dir, outcome);
    }

    fn record(&mut self, frame: &mut Frame, dir: Direction, outcome: FaceOutcome) {
        frame.faces[dir.index()] = outcome;
        frame.next += 1;
        if !outcome.is_safe() {
            tracing::trace!(node = %frame.node, direction = %dir, ?outcome, "face leaks");
            self.status[frame.node.index()] = NodeStatus::InProgress { leaked: true };
        }
    }

    fn resolve(&mut self, frame: &Frame) -> bool {
        let safe = !matches!(
            self.status(frame.node),
            NodeStatus::InProgress { leaked: true }
        );
        self.status[frame.node.index()] = NodeStatus::Resolved { safe };
        self.outcome.nodes.insert(
            frame.node,
            NodeSafety {
                safe,
                faces: frame.faces,
            },
        );
        safe
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
