//! Room nodes, their faces, and node identifiers.
//!
//! A [`Node`] is one grid cell. Each of its six faces is either [`Face::Open`]
//! or [`Face::Blocked`] by a [`Blocker`], and each direction may hold a link
//! to a neighboring node by [`NodeId`]. Links are plain ids into the owning
//! [`NodeGraph`](crate::graph::NodeGraph); they do not own anything and may be
//! one-sided until the graph builder normalizes them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::Direction;
use crate::GraphError;

// ---------------------------------------------------------------------------
// NodeId
// ---------------------------------------------------------------------------

/// Stable index of a node inside its [`NodeGraph`](crate::graph::NodeGraph).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Blocker / Face
// ---------------------------------------------------------------------------

/// What obstructs a face. Ceilings and floors belong on vertical faces,
/// doors and walls on horizontal ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Blocker {
    Ceiling,
    Floor,
    Door,
    Wall,
}

impl Blocker {
    #[inline]
    pub fn is_vertical(self) -> bool {
        matches!(self, Blocker::Ceiling | Blocker::Floor)
    }

    /// Whether this blocker may be placed on a face in `dir`.
    #[inline]
    pub fn fits(self, dir: Direction) -> bool {
        self.is_vertical() == dir.is_vertical()
    }
}

/// State of one face of a node.
///
/// Serialized as a single lowercase word: `"open"`, `"ceiling"`, `"floor"`,
/// `"door"` or `"wall"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "FaceRepr", into = "FaceRepr")]
pub enum Face {
    #[default]
    Open,
    Blocked(Blocker),
}

impl Face {
    #[inline]
    pub fn is_blocked(self) -> bool {
        matches!(self, Face::Blocked(_))
    }

    #[inline]
    pub fn blocker(self) -> Option<Blocker> {
        match self {
            Face::Open => None,
            Face::Blocked(b) => Some(b),
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum FaceRepr {
    Open,
    Ceiling,
    Floor,
    Door,
    Wall,
}

impl From<FaceRepr> for Face {
    fn from(repr: FaceRepr) -> Self {
        match repr {
            FaceRepr::Open => Face::Open,
            FaceRepr::Ceiling => Face::Blocked(Blocker::Ceiling),
            FaceRepr::Floor => Face::Blocked(Blocker::Floor),
            FaceRepr::Door => Face::Blocked(Blocker::Door),
            FaceRepr::Wall => Face::Blocked(Blocker::Wall),
        }
    }
}

impl From<Face> for FaceRepr {
    fn from(face: Face) -> Self {
        match face {
            Face::Open => FaceRepr::Open,
            Face::Blocked(Blocker::Ceiling) => FaceRepr::Ceiling,
            Face::Blocked(Blocker::Floor) => FaceRepr::Floor,
            Face::Blocked(Blocker::Door) => FaceRepr::Door,
            Face::Blocked(Blocker::Wall) => FaceRepr::Wall,
        }
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A single room cell: a label, six faces and six optional neighbor links.
///
/// Arrays are indexed by [`Direction::index`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Designer-facing name. Informational only; two nodes may share one.
    pub label: String,
    faces: [Face; 6],
    links: [Option<NodeId>; 6],
}

impl Node {
    /// A node with every face open and no links.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            faces: [Face::Open; 6],
            links: [None; 6],
        }
    }

    /// A fully enclosed node: ceiling on top, floor below, walls around.
    pub fn enclosed(label: impl Into<String>) -> Self {
        let mut node = Self::new(label);
        for dir in Direction::ALL {
            node.faces[dir.index()] = Face::Blocked(default_blocker(dir));
        }
        node
    }

    #[inline]
    pub fn face(&self, dir: Direction) -> Face {
        self.faces[dir.index()]
    }

    /// Set the face in `dir`, rejecting blockers of the wrong orientation.
    pub fn set_face(&mut self, dir: Direction, face: Face) -> Result<(), GraphError> {
        if let Face::Blocked(blocker) = face {
            if !blocker.fits(dir) {
                return Err(GraphError::BlockerOrientation {
                    blocker,
                    direction: dir,
                });
            }
        }
        self.faces[dir.index()] = face;
        Ok(())
    }

    /// Builder-style helper: open the face in `dir`.
    pub fn with_open(mut self, dir: Direction) -> Self {
        self.faces[dir.index()] = Face::Open;
        self
    }

    /// Builder-style helper: block `dir` with the orientation-appropriate
    /// default (ceiling, floor or wall).
    pub fn with_blocked(mut self, dir: Direction) -> Self {
        self.faces[dir.index()] = Face::Blocked(default_blocker(dir));
        self
    }

    /// The raw link in `dir`. May be dangling; prefer
    /// [`NodeGraph::neighbor`](crate::graph::NodeGraph::neighbor).
    #[inline]
    pub fn link(&self, dir: Direction) -> Option<NodeId> {
        self.links[dir.index()]
    }

    #[inline]
    pub fn set_link(&mut self, dir: Direction, target: Option<NodeId>) {
        self.links[dir.index()] = target;
    }

    pub fn faces(&self) -> &[Face; 6] {
        &self.faces
    }
}

/// Ceiling for top, floor for bottom, wall for the horizontal faces.
pub fn default_blocker(dir: Direction) -> Blocker {
    match dir {
        Direction::Top => Blocker::Ceiling,
        Direction::Bottom => Blocker::Floor,
        _ => Blocker::Wall,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_node_is_fully_open() {
        let node = Node::new("hall");
        for dir in Direction::ALL {
            assert_eq!(node.face(dir), Face::Open);
            assert_eq!(node.link(dir), None);
        }
    }

    #[test]
    fn enclosed_node_uses_oriented_blockers() {
        let node = Node::enclosed("closet");
        assert_eq!(node.face(Direction::Top), Face::Blocked(Blocker::Ceiling));
        assert_eq!(node.face(Direction::Bottom), Face::Blocked(Blocker::Floor));
        assert_eq!(node.face(Direction::East), Face::Blocked(Blocker::Wall));
    }

    #[test]
    fn door_on_ceiling_is_rejected() {
        let mut node = Node::new("hall");
        let err = node
            .set_face(Direction::Top, Face::Blocked(Blocker::Door))
            .unwrap_err();
        assert!(matches!(err, GraphError::BlockerOrientation { .. }));
        assert_eq!(node.face(Direction::Top), Face::Open);
    }

    #[test]
    fn floor_on_top_face_is_allowed() {
        let mut node = Node::new("loft");
        node.set_face(Direction::Top, Face::Blocked(Blocker::Floor))
            .unwrap();
        assert!(node.face(Direction::Top).is_blocked());
    }

    #[test]
    fn face_serializes_as_single_word() {
        assert_eq!(serde_json::to_string(&Face::Open).unwrap(), "\"open\"");
        assert_eq!(
            serde_json::to_string(&Face::Blocked(Blocker::Door)).unwrap(),
            "\"door\""
        );
        let face: Face = serde_json::from_str("\"ceiling\"").unwrap();
        assert_eq!(face, Face::Blocked(Blocker::Ceiling));
    }
}
