//! The node arena.
//!
//! [`NodeGraph`] owns every [`Node`] of a layout and hands out [`NodeId`]s in
//! insertion order. Nodes are never removed, so an id stays valid for the
//! life of the graph. Links between nodes are stored as ids and may be
//! one-sided or even point outside the arena; every neighbor read goes
//! through [`NodeGraph::neighbor`], which treats such dangling ids as absent.

use serde::{Deserialize, Serialize};

use crate::grid::Direction;
use crate::node::{Face, Node, NodeId};
use crate::GraphError;

/// Arena of room nodes addressed by [`NodeId`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeGraph {
    nodes: Vec<Node>,
}

impl NodeGraph {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Insert a node and return its id.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Like [`get`](Self::get) but returns an error for unknown ids.
    pub fn node(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.get(id).ok_or(GraphError::UnknownNode { node: id })
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, GraphError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(GraphError::UnknownNode { node: id })
    }

    /// Iterate `(id, node)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    /// The face of `id` in `dir`, or `None` if `id` is unknown.
    #[inline]
    pub fn face(&self, id: NodeId, dir: Direction) -> Option<Face> {
        self.get(id).map(|n| n.face(dir))
    }

    /// The neighbor of `id` in `dir`, if the link is set and its target
    /// exists in this arena.
    #[inline]
    pub fn neighbor(&self, id: NodeId, dir: Direction) -> Option<NodeId> {
        self.get(id)
            .and_then(|n| n.link(dir))
            .filter(|&target| self.contains(target))
    }

    /// Set a one-sided link `from --dir--> to`, as a designer would author it.
    pub fn link(&mut self, from: NodeId, dir: Direction, to: NodeId) -> Result<(), GraphError> {
        if !self.contains(to) {
            return Err(GraphError::UnknownNode { node: to });
        }
        self.node_mut(from)?.set_link(dir, Some(to));
        Ok(())
    }

    /// Link `a --dir--> b` and `b --opposite--> a`.
    pub fn link_both(&mut self, a: NodeId, dir: Direction, b: NodeId) -> Result<(), GraphError> {
        self.link(a, dir, b)?;
        self.link(b, dir.opposite(), a)
    }

    /// Remove the link of `id` in `dir`.
    pub fn unlink(&mut self, id: NodeId, dir: Direction) -> Result<(), GraphError> {
        self.node_mut(id)?.set_link(dir, None);
        Ok(())
    }

    /// Set the face of `id` in `dir`.
    pub fn set_face(&mut self, id: NodeId, dir: Direction, face: Face) -> Result<(), GraphError> {
        self.node_mut(id)?.set_face(dir, face)
    }

    /// Whether the face of `id` in `dir` is closed from either side: `id`'s
    /// own face is blocked, or its neighbor's opposite face is.
    pub fn face_closed(&self, id: NodeId, dir: Direction) -> bool {
        if self.face(id, dir).is_some_and(Face::is_blocked) {
            return true;
        }
        self.neighbor(id, dir)
            .and_then(|nb| self.face(nb, dir.opposite()))
            .is_some_and(Face::is_blocked)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
