//! Integer positions and axis-aligned headings.

use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const ORIGIN: Position = Position::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) + self.z.abs_diff(other.z)
    }

    pub fn offset(self, (dx, dy, dz): (i32, i32, i32)) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// The adjacent cell in the direction of `heading`.
    pub fn step(self, heading: Orientation) -> Self {
        self.offset(heading.vector())
    }

    /// The adjacent cell opposite to `heading`.
    pub fn step_back(self, heading: Orientation) -> Self {
        let (dx, dy, dz) = heading.vector();
        self.offset((-dx, -dy, -dz))
    }

    /// The 6 axis-adjacent cells (no diagonals).
    ///
    /// Fixed order for determinism: +x, -x, +y, -y, +z, -z.
    pub fn neighbors(self) -> [Position; 6] {
        [
            self.offset((1, 0, 0)),
            self.offset((-1, 0, 0)),
            self.offset((0, 1, 0)),
            self.offset((0, -1, 0)),
            self.offset((0, 0, 1)),
            self.offset((0, 0, -1)),
        ]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Orientation {
    North,
    South,
    East,
    West,
    Up,
    Down,
}

impl Orientation {
    pub const ALL: [Orientation; 6] = [
        Orientation::North,
        Orientation::South,
        Orientation::East,
        Orientation::West,
        Orientation::Up,
        Orientation::Down,
    ];

    /// Headings reachable by rotation, in draw order.
    pub const HORIZONTAL: [Orientation; 4] = [
        Orientation::North,
        Orientation::East,
        Orientation::South,
        Orientation::West,
    ];

    pub fn vector(self) -> (i32, i32, i32) {
        match self {
            Orientation::North => (0, 1, 0),
            Orientation::South => (0, -1, 0),
            Orientation::East => (1, 0, 0),
            Orientation::West => (-1, 0, 0),
            Orientation::Up => (0, 0, 1),
            Orientation::Down => (0, 0, -1),
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Orientation::Up | Orientation::Down)
    }
}
