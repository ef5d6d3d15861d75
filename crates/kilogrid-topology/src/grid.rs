//! Logical grid coordinates and the symmetries of a rectangle.
//!
//! The swarm has no compass. Whatever coordinate system it agrees on is the
//! true one up to one of the eight symmetries of the rectangle (the dihedral
//! group D4 restricted to the grid). Anything that scores a run must compare
//! positions modulo that choice.

/// A 1-based logical coordinate. `(1, 1)` is the elected origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    /// The origin every swarm elects.
    pub const ORIGIN: Self = Self { x: 1, y: 1 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for GridPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// One of the eight ways a `w × h` grid can be laid onto itself (or onto
/// its `h × w` transpose).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Symmetry {
    Identity,
    MirrorX,
    MirrorY,
    Rotate180,
    Transpose,
    Rotate90,
    Rotate270,
    AntiTranspose,
}

impl Symmetry {
    /// All eight transforms.
    pub const ALL: [Self; 8] = [
        Self::Identity,
        Self::MirrorX,
        Self::MirrorY,
        Self::Rotate180,
        Self::Transpose,
        Self::Rotate90,
        Self::Rotate270,
        Self::AntiTranspose,
    ];

    /// Map a true position on a `width × height` grid.
    ///
    /// The four axis-swapping transforms produce coordinates on the
    /// `height × width` grid.
    pub fn apply(self, pos: GridPos, width: i32, height: i32) -> GridPos {
        let GridPos { x, y } = pos;
        let (mx, my) = (width + 1 - x, height + 1 - y);
        match self {
            Self::Identity => GridPos::new(x, y),
            Self::MirrorX => GridPos::new(mx, y),
            Self::MirrorY => GridPos::new(x, my),
            Self::Rotate180 => GridPos::new(mx, my),
            Self::Transpose => GridPos::new(y, x),
            Self::Rotate90 => GridPos::new(my, x),
            Self::Rotate270 => GridPos::new(y, mx),
            Self::AntiTranspose => GridPos::new(my, mx),
        }
    }

    /// Whether the transform swaps the two axes.
    pub const fn swaps_axes(self) -> bool {
        matches!(
            self,
            Self::Transpose | Self::Rotate90 | Self::Rotate270 | Self::AntiTranspose
        )
    }
}
