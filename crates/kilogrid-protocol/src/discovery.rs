//! R1: Neighbor discovery from noisy distances.
//!
//! Broadcast reach covers several rings of robots, but only the first ring
//! (orthogonal ≈1, diagonal ≈√2) are grid neighbors. With the closest
//! distance ever heard as the unit, `1.5 · d_min + ε` sits between √2 and 2.

use crate::message::{Envelope, Payload};
use crate::node::Node;

/// Multiplier on the smallest observed distance.
pub const THRESHOLD_SCALE: f64 = 1.5;

/// Fixed slack added after scaling.
pub const THRESHOLD_MARGIN: f64 = 0.1;

/// Largest measured distance still accepted as a grid neighbor.
pub fn acceptance_threshold(min_observed_distance: f64) -> f64 {
    min_observed_distance * THRESHOLD_SCALE + THRESHOLD_MARGIN
}

pub(crate) fn resolve(node: &mut Node, inbox: &[Envelope]) {
    let threshold = acceptance_threshold(node.min_observed_distance);
    for env in inbox {
        if matches!(env.payload, Payload::Presence) && env.distance <= threshold {
            node.neighbor_ids.insert(env.sender);
        }
    }
}
