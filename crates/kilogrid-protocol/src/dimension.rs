//! R2: Counting the rectangle's sides by walking its perimeter.
//!
//! The node at (2, 1) starts a relay count at 2 (the origin is 1). Each
//! perimeter node without a position takes the first count it hears, adds
//! one and passes it on. Every corner along the way writes its own count
//! into the next free threshold, so after three corners the summary reads
//! `(c1, c2, c3)`: the perimeter indices where the walk turned. The walk
//! ends at (1, 2), which hands the finished summary to the origin.
//!
//! # Keeping the walk directional
//!
//! Diagonal adjacency means the border cell just before a corner can also
//! hear, and be heard by, the border cell just after it. To stop the walk
//! cutting the corner, a border node that has a corner ahead of it (a
//! corner neighbor that is neither its own count source nor the origin)
//! tags its count `toward_corner`:
//!
//! | receiver              | accepts                        |
//! |-----------------------|--------------------------------|
//! | border, no position   | untagged counts                |
//! | corner, no position   | tagged counts                  |
//! | node at (1, 2)        | untagged counts above 2        |
//! | origin                | any count above 2 (walk done)  |
//!
//! Among several acceptable counts in one tick the smallest wins, ties to
//! the lowest sender identity, so arrival order never matters.

use kilogrid_topology::GridPos;
use tracing::debug;

use crate::message::{CountStep, Envelope, Payload};
use crate::node::Node;
use crate::role::Role;

/// Perimeter indices at which the walk turned a corner.
///
/// Filled strictly in order; a zero entry is still unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DimensionSummary {
    pub c1: u32,
    pub c2: u32,
    pub c3: u32,
}

impl DimensionSummary {
    pub const fn new(c1: u32, c2: u32, c3: u32) -> Self {
        Self { c1, c2, c3 }
    }

    /// All three corners recorded, in increasing order.
    pub const fn is_complete(&self) -> bool {
        self.c1 > 0 && self.c1 < self.c2 && self.c2 < self.c3
    }

    /// Record a corner's count in the next free slot, skipping values
    /// already recorded.
    pub fn record_corner(&mut self, count: u32) {
        if self.c1 == 0 {
            self.c1 = count;
        } else if self.c2 == 0 && count != self.c1 {
            self.c2 = count;
        } else if self.c3 == 0 && count != self.c1 && count != self.c2 {
            self.c3 = count;
        }
    }

    /// Side lengths `(along the first side, along the second)`.
    pub fn extent(&self) -> (u32, u32) {
        (self.c1, self.c2.saturating_sub(self.c1) + 1)
    }
}

/// Count the walk starts from.
pub const SEED_COUNT: u32 = 2;

const FIRST_STEP: GridPos = GridPos::new(2, 1);
const LAST_STEP: GridPos = GridPos::new(1, 2);

pub(crate) fn outgoing(node: &Node) -> Option<Payload> {
    if node.dimension_count == 0 {
        return None;
    }
    let toward_corner = match node.role {
        Role::Border => has_corner_ahead(node),
        Role::Corner if !node.position.is_known() => false,
        _ => return None,
    };
    Some(Payload::Count(CountStep {
        count: node.dimension_count,
        summary: node.summary,
        toward_corner,
    }))
}

pub(crate) fn resolve(node: &mut Node, inbox: &[Envelope]) {
    let at = node.position.known();

    if at == Some(FIRST_STEP) && node.role == Role::Border && node.dimension_count == 0 {
        node.dimension_count = SEED_COUNT;
        node.summary = DimensionSummary::default();
        debug!(identity = node.identity, "Perimeter walk seeded");
        return;
    }

    if node.is_origin {
        if let Some((_, step)) = best(node, inbox, |s| s.count > SEED_COUNT) {
            node.dimension_count = 1;
            node.summary = step.summary;
            if node.closing_count.is_none() {
                debug!(identity = node.identity, perimeter = step.count, summary = ?step.summary, "Perimeter walk closed");
            }
            node.closing_count = Some(step.count);
        }
        return;
    }

    if node.dimension_count != 0 {
        return;
    }

    if at == Some(LAST_STEP) {
        if let Some((sender, step)) = best(node, inbox, |s| !s.toward_corner && s.count > SEED_COUNT) {
            take_step(node, sender, step);
        }
        return;
    }

    if at.is_some() {
        return;
    }

    match node.role {
        Role::Border => {
            if let Some((sender, step)) = best(node, inbox, |s| !s.toward_corner) {
                take_step(node, sender, step);
            }
        }
        Role::Corner => {
            if let Some((sender, step)) = best(node, inbox, |s| s.toward_corner) {
                take_step(node, sender, step);
                let count = node.dimension_count;
                node.summary.record_corner(count);
                debug!(identity = node.identity, count, summary = ?node.summary, "Corner recorded threshold");
            }
        }
        _ => {}
    }
}

fn take_step(node: &mut Node, sender: u8, step: CountStep) {
    node.dimension_count = step.count + 1;
    node.summary = step.summary;
    node.count_source = Some(sender);
}

/// Smallest acceptable count from a neighbor, ties to the lowest sender.
fn best<F>(node: &Node, inbox: &[Envelope], accept: F) -> Option<(u8, CountStep)>
where
    F: Fn(&CountStep) -> bool,
{
    node.from_neighbors(inbox)
        .filter_map(|env| match env.payload {
            Payload::Count(step) if accept(&step) => Some((env.sender, step)),
            _ => None,
        })
        .min_by_key(|(sender, step)| (step.count, *sender))
}

/// A corner neighbor that is neither where my count came from nor the origin.
fn has_corner_ahead(node: &Node) -> bool {
    node.neighbor_roles.iter().any(|(&id, &role)| {
        role == Role::Corner
            && node.neighbor_ids.contains(&id)
            && Some(id) != node.count_source
            && Some(id) != node.origin_identity
    })
}
