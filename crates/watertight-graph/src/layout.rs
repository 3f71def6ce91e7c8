//! JSON layout documents.
//!
//! A [`LayoutSnapshot`] is the on-disk form of an authored layout: a root
//! label and a list of nodes, each with its faces and its links to other
//! nodes by label. Faces that are not listed are open.
//!
//! ```json
//! {
//!   "root": "hall",
//!   "nodes": [
//!     { "id": "hall", "faces": { "top": "ceiling", "bottom": "floor",
//!                                "east": "wall", "south": "wall", "west": "door" },
//!       "links": { "north": "den" } },
//!     { "id": "den",  "faces": { "top": "ceiling", "bottom": "floor",
//!                                "north": "wall", "east": "wall", "west": "wall" } }
//!   ]
//! }
//! ```
//!
//! Labels are informational inside a [`NodeGraph`], but in a layout document
//! they are the link keys, so they must be unique.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::graph::NodeGraph;
use crate::grid::Direction;
use crate::node::{Face, Node, NodeId};
use crate::GraphError;

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

/// One node in a layout document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: String,
    #[serde(default)]
    pub faces: BTreeMap<Direction, Face>,
    #[serde(default)]
    pub links: BTreeMap<Direction, String>,
}

/// A complete layout document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    /// Label of the node the builder starts from.
    pub root: String,
    pub nodes: Vec<NodeSnapshot>,
}

impl LayoutSnapshot {
    /// Parse a layout from JSON text.
    pub fn from_json(text: &str) -> Result<Self, GraphError> {
        serde_json::from_str(text).map_err(|e| GraphError::LayoutParse {
            details: e.to_string(),
        })
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).expect("LayoutSnapshot should always be JSON-serializable")
    }

    /// BLAKE3 hex digest of the canonical (compact) JSON form.
    ///
    /// Two layouts hash equal iff they serialize identically, which makes this
    /// a cheap way to confirm that a rebuild left the graph untouched.
    pub fn content_hash(&self) -> String {
        let json_bytes =
            serde_json::to_vec(self).expect("LayoutSnapshot should always be JSON-serializable");
        blake3::hash(&json_bytes).to_hex().to_string()
    }
}

// ---------------------------------------------------------------------------
// NodeGraph <-> LayoutSnapshot
// ---------------------------------------------------------------------------

impl NodeGraph {
    /// Build an arena from a layout document. Returns the graph and the id of
    /// the root node.
    ///
    /// # Errors
    ///
    /// - [`GraphError::DuplicateLabel`] if two nodes share an `id`.
    /// - [`GraphError::UnknownLabel`] if the root or a link names a missing node.
    /// - [`GraphError::BlockerOrientation`] for e.g. a door on a top face.
    pub fn from_layout(layout: &LayoutSnapshot) -> Result<(NodeGraph, NodeId), GraphError> {
        // Validate labels before creating anything.
        let mut ids: HashMap<&str, NodeId> = HashMap::with_capacity(layout.nodes.len());
        for (i, snapshot) in layout.nodes.iter().enumerate() {
            if ids.insert(snapshot.id.as_str(), NodeId(i as u32)).is_some() {
                return Err(GraphError::DuplicateLabel {
                    label: snapshot.id.clone(),
                });
            }
        }
        let root = *ids
            .get(layout.root.as_str())
            .ok_or_else(|| GraphError::UnknownLabel {
                label: layout.root.clone(),
                referenced_by: "root".to_owned(),
            })?;

        let mut graph = NodeGraph::new();
        for snapshot in &layout.nodes {
            let mut node = Node::new(snapshot.id.clone());
            for (&dir, &face) in &snapshot.faces {
                node.set_face(dir, face)?;
            }
            for (&dir, target) in &snapshot.links {
                let target_id =
                    *ids.get(target.as_str())
                        .ok_or_else(|| GraphError::UnknownLabel {
                            label: target.clone(),
                            referenced_by: snapshot.id.clone(),
                        })?;
                node.set_link(dir, Some(target_id));
            }
            graph.add_node(node);
        }
        Ok((graph, root))
    }

    /// Capture the arena as a layout document rooted at `root`.
    ///
    /// Every node in the arena is written, reachable or not. All six faces are
    /// written explicitly. Dangling links are dropped.
    pub fn capture_layout(&self, root: NodeId) -> Result<LayoutSnapshot, GraphError> {
        let root_label = self.node(root)?.label.clone();

        let mut seen: HashMap<&str, NodeId> = HashMap::with_capacity(self.len());
        for (id, node) in self.iter() {
            if seen.insert(node.label.as_str(), id).is_some() {
                return Err(GraphError::DuplicateLabel {
                    label: node.label.clone(),
                });
            }
        }

        let nodes = self
            .iter()
            .map(|(id, node)| {
                let faces = Direction::ALL
                    .iter()
                    .map(|&dir| (dir, node.face(dir)))
                    .collect();
                let links = Direction::ALL
                    .iter()
                    .filter_map(|&dir| {
                        let target = node.link(dir)?;
                        match self.get(target) {
                            Some(t) => Some((dir, t.label.clone())),
                            None => {
                                tracing::warn!(
                                    node = %id,
                                    direction = %dir,
                                    target = %target,
                                    "dropping dangling link from captured layout"
                                );
                                None
                            }
                        }
                    })
                    .collect();
                NodeSnapshot {
                    id: node.label.clone(),
                    faces,
                    links,
                }
            })
            .collect();

        Ok(LayoutSnapshot {
            root: root_label,
            nodes,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
