//! Kilogrid Self-Localization Protocol
//!
//! A swarm of identical robots laid out on a rectangle works out, with no
//! coordinator and only range-limited broadcasts, who it is, what shape
//! it's in and where each robot sits.
//!
//! # Rounds
//!
//! Every node runs in global lock-step. A round is two barriers:
//!
//! 1. **send**: [`Node::send`] reads the state the last round left and
//!    produces at most one [`Payload`]
//! 2. **resolve**: [`Node::resolve`] consumes this round's inbox and is the
//!    only place state changes
//!
//! No node can see another's same-round mutation, and nothing in an inbox
//! outlives its round. Within a round, every aggregation is order-free
//! (min, set union) or breaks ties by lowest identity.
//!
//! # Routines
//!
//! Phases advance on a fixed [`Schedule`], never on protocol progress.
//!
//! - **R1, identity & topology**: resolve identity clashes, find grid
//!   neighbors from noisy distances, classify as corner, border or middle
//! - **R2, coordinates**: elect an origin corner, walk the perimeter to
//!   count the sides, place the perimeter, triangulate the interior
//! - **R3, display**: a derived LED pattern, see [`display`]
//!
//! A node that misses a one-shot window (the origin's grants, its role
//! decision) may never finish. That is tolerated, not retried.

mod dimension;
mod discovery;
pub mod display;
mod fix;
mod identity;
mod message;
mod node;
mod origin;
mod phase;
mod placement;
mod role;
mod triangulation;

pub use dimension::{DimensionSummary, SEED_COUNT};
pub use discovery::{acceptance_threshold, THRESHOLD_MARGIN, THRESHOLD_SCALE};
pub use display::{Animation, Color};
pub use fix::Fix;
pub use message::{Assignment, CountStep, Envelope, Payload, PeerTag};
pub use node::{Node, IDENTITY_RANGE};
pub use origin::CANDIDATE_RANGE;
pub use phase::{Phase, Schedule};
pub use placement::perimeter_position;
pub use role::{classify, Role};
pub use triangulation::{middle_of_run, MIN_REPORTS};

#[cfg(test)]
mod tests {
    use super::*;
    use kilogrid_topology::GridPos;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    /// Thresholds the perimeter walk produces on an `m × n` rectangle.
    fn walk_summary(m: u32, n: u32) -> DimensionSummary {
        DimensionSummary::new(m, m + n - 1, 2 * m + n - 2)
    }

    #[test]
    fn walk_summary_shape() {
        let s = walk_summary(3, 3);
        assert_eq!(s, DimensionSummary::new(3, 5, 7));
        assert_eq!(s.extent(), (3, 3));
    }

    proptest! {
        #[test]
        fn perimeter_walk_visits_every_border_cell_once(m in 3u32..40, n in 3u32..40) {
            let s = walk_summary(m, n);
            prop_assert_eq!(s.extent(), (m, n));

            let perimeter = 2 * (m + n) - 4;
            let cells: BTreeSet<GridPos> = (1..=perimeter)
                .map(|c| perimeter_position(c, s))
                .collect();
            prop_assert_eq!(cells.len() as u32, perimeter);

            for p in &cells {
                let on_edge = p.x == 1 || p.y == 1 || p.x == m as i32 || p.y == n as i32;
                prop_assert!(on_edge, "{} is not on the edge", p);
                prop_assert!(p.x >= 1 && p.x <= m as i32 && p.y >= 1 && p.y <= n as i32);
            }
            prop_assert_eq!(perimeter_position(1, s), GridPos::ORIGIN);
            prop_assert_eq!(perimeter_position(perimeter, s), GridPos::new(1, 2));
        }

        #[test]
        fn classification_is_order_free(mine in 0usize..9, mut counts in prop::collection::vec(0usize..9, 1..9)) {
            let forward = classify(mine, counts.iter().copied());
            counts.reverse();
            prop_assert_eq!(forward, classify(mine, counts.iter().copied()));
        }

        #[test]
        fn corner_record_never_repeats(values in prop::collection::vec(1u32..50, 0..12)) {
            let mut s = DimensionSummary::default();
            for v in values {
                s.record_corner(v);
            }
            let filled: Vec<u32> = [s.c1, s.c2, s.c3].into_iter().filter(|&c| c > 0).collect();
            let distinct: BTreeSet<u32> = filled.iter().copied().collect();
            prop_assert_eq!(filled.len(), distinct.len());
        }
    }
}
