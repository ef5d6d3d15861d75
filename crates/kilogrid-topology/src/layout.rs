//! Physical layout and radio-range lookup.
//!
//! The layout is the ground truth the robots never see: which cell each
//! robot occupies and who is inside its broadcast reach. The round driver
//! asks it for candidate recipients; the channel model asks it for true
//! distances before adding noise.

use thiserror::Error;

use crate::{Cell, GridPos};

/// Index of a robot in the simulation, in column-major placement order.
///
/// This is the simulator's handle, never visible to the protocol: robots
/// know each other only by their self-chosen identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotIndex(pub usize);

impl SlotIndex {
    #[inline]
    pub const fn value(&self) -> usize {
        self.0
    }
}

/// Errors building a layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("grid must have at least one robot per side, got {width}x{height}")]
    EmptyGrid { width: u32, height: u32 },

    #[error("spacing must be positive")]
    ZeroSpacing,
}

/// A `width × height` rectangle of robots placed `spacing` cells apart.
#[derive(Debug, Clone)]
pub struct Layout {
    width: u32,
    height: u32,
    spacing: u32,
    cells: Vec<Cell>,
}

impl Layout {
    /// Place `width × height` robots. Slot `i * height + j` sits at
    /// cell `(i · spacing, j · spacing)`.
    pub fn new(width: u32, height: u32, spacing: u32) -> Result<Self, LayoutError> {
        if width == 0 || height == 0 {
            return Err(LayoutError::EmptyGrid { width, height });
        }
        if spacing == 0 {
            return Err(LayoutError::ZeroSpacing);
        }

        let step = i64::from(spacing);
        let cells = (0..i64::from(width))
            .flat_map(|i| (0..i64::from(height)).map(move |j| Cell::new(i * step, j * step)))
            .collect();

        Ok(Self {
            width,
            height,
            spacing,
            cells,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn spacing(&self) -> u32 {
        self.spacing
    }

    /// Number of robots.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All slots in placement order.
    pub fn slots(&self) -> impl Iterator<Item = SlotIndex> + '_ {
        (0..self.cells.len()).map(SlotIndex)
    }

    /// The cell a slot occupies.
    pub fn cell(&self, slot: SlotIndex) -> Cell {
        self.cells[slot.0]
    }

    /// The true 1-based grid index of a slot.
    pub fn true_position(&self, slot: SlotIndex) -> GridPos {
        let h = self.height as usize;
        GridPos::new((slot.0 / h) as i32 + 1, (slot.0 % h) as i32 + 1)
    }

    /// Noise-free distance between two robots, in cells.
    pub fn true_distance(&self, a: SlotIndex, b: SlotIndex) -> f64 {
        self.cell(a).euclidean(&self.cell(b))
    }

    /// Every other robot within Chebyshev `radius` cells of `slot`.
    ///
    /// This is the broadcast reach. It is deliberately wider than true
    /// adjacency; receivers filter by measured distance.
    pub fn peers_within(&self, slot: SlotIndex, radius: u32) -> Vec<SlotIndex> {
        let centre = self.cell(slot);
        let reach = i64::from(radius / self.spacing);
        let h = i64::from(self.height);
        let w = i64::from(self.width);
        let (ci, cj) = (slot.0 as i64 / h, slot.0 as i64 % h);

        let mut peers = Vec::new();
        for i in (ci - reach).max(0)..=(ci + reach).min(w - 1) {
            for j in (cj - reach).max(0)..=(cj + reach).min(h - 1) {
                let other = SlotIndex((i * h + j) as usize);
                if other != slot && self.cell(other).chebyshev(&centre) <= u64::from(radius) {
                    peers.push(other);
                }
            }
        }
        peers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_empty_grid() {
        assert_eq!(
            Layout::new(0, 4, 1).unwrap_err(),
            LayoutError::EmptyGrid { width: 0, height: 4 }
        );
        assert_eq!(Layout::new(3, 3, 0).unwrap_err(), LayoutError::ZeroSpacing);
    }

    #[test]
    fn true_positions_are_one_based() {
        let layout = Layout::new(3, 2, 1).unwrap();
        assert_eq!(layout.true_position(SlotIndex(0)), GridPos::new(1, 1));
        assert_eq!(layout.true_position(SlotIndex(1)), GridPos::new(1, 2));
        assert_eq!(layout.true_position(SlotIndex(2)), GridPos::new(2, 1));
        assert_eq!(layout.true_position(SlotIndex(5)), GridPos::new(3, 2));
    }

    #[test]
    fn corner_reach_on_small_grid() {
        let layout = Layout::new(3, 3, 1).unwrap();
        // Radius 1 from a corner: the 3 adjacent robots
        assert_eq!(layout.peers_within(SlotIndex(0), 1).len(), 3);
        // Radius 3 covers the whole 3x3 grid
        assert_eq!(layout.peers_within(SlotIndex(0), 3).len(), 8);
    }

    #[test]
    fn interior_reach_is_full_moore_square() {
        let layout = Layout::new(10, 10, 1).unwrap();
        let centre = SlotIndex(5 * 10 + 5);
        assert_eq!(layout.peers_within(centre, 3).len(), 7 * 7 - 1);
    }

    #[test]
    fn spacing_scales_reach() {
        let layout = Layout::new(10, 10, 2).unwrap();
        let centre = SlotIndex(5 * 10 + 5);
        // 3 cells of reach with pitch 2 only covers one robot in each direction
        assert_eq!(layout.peers_within(centre, 3).len(), 8);
        assert!((layout.true_distance(centre, SlotIndex(5 * 10 + 6)) - 2.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn reach_is_symmetric(w in 1u32..9, h in 1u32..9, radius in 1u32..4, a in 0usize..81, b in 0usize..81) {
            let layout = Layout::new(w, h, 1).unwrap();
            let n = layout.len();
            let (a, b) = (SlotIndex(a % n), SlotIndex(b % n));
            let ab = layout.peers_within(a, radius).contains(&b);
            let ba = layout.peers_within(b, radius).contains(&a);
            prop_assert_eq!(ab, ba);
        }

        #[test]
        fn reach_matches_brute_force(w in 1u32..8, h in 1u32..8, radius in 1u32..4, spacing in 1u32..3, s in 0usize..64) {
            let layout = Layout::new(w, h, spacing).unwrap();
            let slot = SlotIndex(s % layout.len());
            let mut fast = layout.peers_within(slot, radius);
            fast.sort();
            let brute: Vec<_> = layout
                .slots()
                .filter(|&o| o != slot && layout.cell(o).chebyshev(&layout.cell(slot)) <= u64::from(radius))
                .collect();
            prop_assert_eq!(fast, brute);
        }
    }
}
