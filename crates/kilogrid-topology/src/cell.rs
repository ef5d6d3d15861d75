//! Physical placement cells on the square lattice.
//!
//! A cell is where a robot physically sits. Cells are laid out on an
//! integer lattice whose pitch is the configured spacing, so a swarm of
//! `w × h` robots with spacing `s` occupies cells `(i·s, j·s)`.
//!
//! Two metrics matter:
//! - **Chebyshev** distance decides who is inside a robot's broadcast reach
//!   (the Moore neighbourhood of radius r).
//! - **Euclidean** distance is what the infrared channel measures.

use std::ops::{Add, Neg, Sub};

/// A position on the physical lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    /// Column
    pub x: i64,
    /// Row
    pub y: i64,
}

impl Cell {
    /// Lattice origin.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Create a new cell.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Chebyshev (king-move) distance.
    ///
    /// A robot at distance `d` is inside every Moore neighbourhood of
    /// radius `r >= d`.
    pub fn chebyshev(&self, other: &Self) -> u64 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx.max(dy)
    }

    /// Straight-line distance in lattice units.
    pub fn euclidean(&self, other: &Self) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        dx.hypot(dy)
    }

    /// The eight Moore directions, counter-clockwise from east.
    pub const MOORE_DIRECTIONS: [Self; 8] = [
        Self { x: 1, y: 0 },
        Self { x: 1, y: 1 },
        Self { x: 0, y: 1 },
        Self { x: -1, y: 1 },
        Self { x: -1, y: 0 },
        Self { x: -1, y: -1 },
        Self { x: 0, y: -1 },
        Self { x: 1, y: -1 },
    ];

    /// The eight cells one king-move away.
    pub fn moore_neighbors(&self) -> [Self; 8] {
        Self::MOORE_DIRECTIONS.map(|d| *self + d)
    }
}

impl Add for Cell {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Cell {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Neg for Cell {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
