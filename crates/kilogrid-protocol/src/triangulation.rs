//! R2: Interior nodes infer their coordinate from aligned neighbors.
//!
//! An interior cell at (x, y) is surrounded by columns x−1, x, x+1 and rows
//! y−1, y, y+1. Once three consecutive values show up on an axis, the middle
//! one is mine. Axes fill independently, and a half-known node reports the
//! axis it has, which lets knowledge seep inward from the perimeter.

use std::collections::BTreeSet;

use tracing::debug;

use crate::message::{Envelope, Payload};
use crate::node::Node;
use crate::role::Role;

/// Reports needed in one tick before trying.
pub const MIN_REPORTS: usize = 3;

pub(crate) fn outgoing(node: &Node) -> Option<Payload> {
    match node.position.axes() {
        (None, None) => None,
        (x, y) => Some(Payload::PositionReport { x, y }),
    }
}

/// Middle of the first run of three consecutive values.
pub fn middle_of_run(values: &BTreeSet<i32>) -> Option<i32> {
    values
        .iter()
        .find(|&&v| values.contains(&(v + 1)) && values.contains(&(v + 2)))
        .map(|v| v + 1)
}

pub(crate) fn resolve(node: &mut Node, inbox: &[Envelope]) {
    if node.role != Role::Middle || node.position.is_known() {
        return;
    }

    let reports: Vec<_> = node
        .from_neighbors(inbox)
        .filter_map(|env| match env.payload {
            Payload::PositionReport { x, y } => Some((x, y)),
            _ => None,
        })
        .collect();
    if reports.len() < MIN_REPORTS {
        return;
    }

    let xs: BTreeSet<i32> = reports.iter().filter_map(|(x, _)| *x).collect();
    let ys: BTreeSet<i32> = reports.iter().filter_map(|(_, y)| *y).collect();

    let before = node.position;
    node.position = node.position.merge(middle_of_run(&xs), middle_of_run(&ys));

    if node.position != before {
        if let Some(pos) = node.position.known() {
            debug!(identity = node.identity, tick = node.clock, position = %pos, "Position fixed");
        }
    }
}
