//! Kilogrid Swarm Topology
//!
//! Physical ground truth for a rectangular robot swarm.
//!
//! # Model
//!
//! Robots sit on a square lattice, `spacing` cells apart, forming a
//! `width × height` rectangle. Each robot can hear every other robot inside
//! its Moore neighbourhood of radius [`DEFAULT_BROADCAST_RADIUS`] cells.
//! That reach is wider than true adjacency on purpose: the robots must
//! work out which of the voices they hear belong to their eight (or fewer)
//! direct grid neighbours.
//!
//! # Coordinates
//!
//! - [`Cell`]: where a robot physically is (simulator-only)
//! - [`GridPos`]: a 1-based logical coordinate the swarm agrees on
//! - [`Symmetry`]: the eight ways those two can legitimately disagree

mod cell;
mod grid;
mod layout;

pub use cell::Cell;
pub use grid::{GridPos, Symmetry};
pub use layout::{Layout, LayoutError, SlotIndex};

/// Default broadcast reach in lattice cells.
pub const DEFAULT_BROADCAST_RADIUS: u32 = 3;

/// Maximum number of direct neighbours on a square lattice.
pub const MOORE_NEIGHBORS: usize = 8;

const _: () = assert!(Cell::MOORE_DIRECTIONS.len() == MOORE_NEIGHBORS);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_reach_exceeds_adjacency() {
        let layout = Layout::new(7, 7, 1).unwrap();
        let centre = SlotIndex(3 * 7 + 3);
        let heard = layout.peers_within(centre, DEFAULT_BROADCAST_RADIUS).len();
        assert!(heard > MOORE_NEIGHBORS);
    }
}
