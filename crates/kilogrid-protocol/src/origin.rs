//! R2: Origin election among corners.
//!
//! Flood-min over the corner subset: each corner draws a random candidate
//! once and keeps shouting it; every other node relays the smallest value
//! it has heard. A corner that hears its own value come back from a
//! neighbor during the confirm window holds the minimum and becomes (1, 1).
//! A losing corner's neighbors have all moved on to something smaller, so
//! its own value never echoes back.

use std::ops::RangeInclusive;

use rand::Rng;
use tracing::debug;

use kilogrid_topology::GridPos;

use crate::message::{Envelope, Payload};
use crate::node::Node;
use crate::role::Role;

/// Range corner candidates are drawn from.
pub const CANDIDATE_RANGE: RangeInclusive<u32> = 0..=200_000;

/// Called on entry to the election: corners draw their candidate, once.
pub(crate) fn draw_candidate<R: Rng + ?Sized>(node: &mut Node, rng: &mut R) {
    if node.role == Role::Corner && node.origin_candidate.is_none() {
        let candidate = rng.gen_range(CANDIDATE_RANGE);
        node.origin_candidate = Some(candidate);
        debug!(identity = node.identity, candidate, "Corner drew origin candidate");
    }
}

pub(crate) fn outgoing(node: &Node) -> Option<Payload> {
    node.origin_candidate.map(Payload::Candidate)
}

/// Assignment ticks: non-corners lower toward the minimum.
pub(crate) fn relay(node: &mut Node, inbox: &[Envelope]) {
    if node.role == Role::Corner {
        return;
    }
    let smallest = node
        .from_neighbors(inbox)
        .filter_map(|env| match env.payload {
            Payload::Candidate(v) => Some(v),
            _ => None,
        })
        .min();

    if let Some(v) = smallest {
        if node.origin_candidate.map_or(true, |current| v < current) {
            node.origin_candidate = Some(v);
        }
    }
}

/// Confirm ticks: relaying continues; a corner hearing its own value echoed
/// is the origin.
pub(crate) fn confirm(node: &mut Node, inbox: &[Envelope]) {
    if node.role != Role::Corner {
        relay(node, inbox);
        return;
    }
    if node.is_origin || node.position.is_known() {
        return;
    }
    let Some(own) = node.origin_candidate else {
        return;
    };

    let echoed = node
        .from_neighbors(inbox)
        .any(|env| env.payload == Payload::Candidate(own));
    if echoed {
        node.is_origin = true;
        node.fix_position(GridPos::ORIGIN);
        debug!(identity = node.identity, tick = node.clock, candidate = own, "Origin confirmed");
    }
}
