//! Grid directions and integer cell positions.
//!
//! Room nodes sit on a unit 3D lattice. Each node has six faces, one per
//! axis-aligned [`Direction`], and a neighbor in direction `d` occupies the
//! cell at `position + d.offset()`.
//!
//! Axis conventions:
//! - X: east  (positive) / west   (negative)
//! - Y: top   (positive) / bottom (negative)
//! - Z: north (positive) / south  (negative)

use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// One of the six face directions of a room node.
///
/// The declaration order is the traversal order used by both the graph
/// builder and the safety engine, so results are deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Top,
    Bottom,
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All six directions in traversal order.
    pub const ALL: [Direction; 6] = [
        Direction::Top,
        Direction::Bottom,
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// The direction pointing back across the same face.
    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Bottom => Direction::Top,
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Unit offset to the adjacent cell in this direction.
    #[inline]
    pub fn offset(self) -> GridPos {
        match self {
            Direction::Top => GridPos::new(0, 1, 0),
            Direction::Bottom => GridPos::new(0, -1, 0),
            Direction::North => GridPos::new(0, 0, 1),
            Direction::East => GridPos::new(1, 0, 0),
            Direction::South => GridPos::new(0, 0, -1),
            Direction::West => GridPos::new(-1, 0, 0),
        }
    }

    /// Top and bottom faces take ceiling/floor blockers; the rest take
    /// door/wall blockers.
    #[inline]
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Top | Direction::Bottom)
    }

    /// Position of this direction in [`Direction::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Top => "top",
            Direction::Bottom => "bottom",
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// GridPos
// ---------------------------------------------------------------------------

/// An integer cell position. The traversal root always sits at the origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridPos {
    pub const ORIGIN: GridPos = GridPos::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The adjacent cell in `dir`.
    #[inline]
    pub fn step(self, dir: Direction) -> GridPos {
        self + dir.offset()
    }
}

impl Add for GridPos {
    type Output = GridPos;

    fn add(self, rhs: GridPos) -> GridPos {
        GridPos::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
