//! Grid geometry shared by every part of the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// A grid coordinate.
///
/// Used both as an absolute world position and as a body-relative offset
/// from a creature's head. Ordered row-major on `(x, y)` so that sets of
/// coordinates iterate deterministically.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const ORIGIN: Coord = Coord { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The four orthogonal neighbours.
    pub fn neighbours(&self) -> [Coord; 4] {
        [
            Coord::new(self.x - 1, self.y),
            Coord::new(self.x, self.y - 1),
            Coord::new(self.x, self.y + 1),
            Coord::new(self.x + 1, self.y),
        ]
    }

    /// Squared euclidean distance to another coordinate
    pub fn distance_squared(&self, other: &Coord) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    /// Componentwise sign, each in {-1, 0, 1}
    pub fn signum(&self) -> Coord {
        Coord::new(sign(self.x), sign(self.y))
    }
}

impl Add for Coord {
    type Output = Coord;

    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Coord {
    type Output = Coord;

    fn sub(self, rhs: Coord) -> Coord {
        Coord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Coord {
    type Output = Coord;

    fn neg(self) -> Coord {
        Coord::new(-self.x, -self.y)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Coord::new(x, y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Returns -1 if `x < 0`, 0 if `x == 0` and 1 otherwise.
pub fn sign(x: i32) -> i32 {
    x.signum()
}

/// World bounds. Valid coordinates lie in `[0, width] x [0, height]`,
/// both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSize {
    pub width: i32,
    pub height: i32,
}

impl WorldSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, pos: Coord) -> bool {
        (0..=self.width).contains(&pos.x) && (0..=self.height).contains(&pos.y)
    }

    /// Number of distinct coordinates inside the bounds
    pub fn cell_count(&self) -> u64 {
        (self.width.max(0) as u64 + 1) * (self.height.max(0) as u64 + 1)
    }
}
