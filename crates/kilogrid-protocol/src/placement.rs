//! R2: Position grants from the origin and perimeter placement.
//!
//! Two steps bracket the perimeter walk. Before it, the origin hands out
//! (2, 1), (1, 2) and (2, 2) to its immediate neighbors. After it, the
//! sealed summary floods the swarm and every perimeter node turns its walk
//! index into a coordinate.

use std::sync::Arc;

use tracing::debug;

use kilogrid_topology::GridPos;

use crate::dimension::DimensionSummary;
use crate::message::{Assignment, Envelope, Payload};
use crate::node::Node;
use crate::role::Role;

/// The origin's grants, if it can see the quorum it needs: exactly two
/// border neighbors and at least one middle neighbor.
///
/// The lower-identity border gets (2, 1) and so starts the walk.
pub(crate) fn origin_assignments(node: &Node) -> Option<Payload> {
    if !node.is_origin {
        return None;
    }

    // Ascending identity
    let borders: Vec<u8> = neighbors_with_role(node, Role::Border).collect();
    let middle = neighbors_with_role(node, Role::Middle).next()?;
    let [first, second] = borders[..] else {
        return None;
    };

    let grants: Arc<[Assignment]> = Arc::new([
        Assignment {
            target: first,
            position: GridPos::new(2, 1),
        },
        Assignment {
            target: second,
            position: GridPos::new(1, 2),
        },
        Assignment {
            target: middle,
            position: GridPos::new(2, 2),
        },
    ]);
    Some(Payload::Assignments(grants))
}

fn neighbors_with_role(node: &Node, wanted: Role) -> impl Iterator<Item = u8> + '_ {
    node.neighbor_roles
        .iter()
        .filter(move |(id, role)| **role == wanted && node.neighbor_ids.contains(*id))
        .map(|(id, _)| *id)
}

/// Take the grant addressed to me. Hearing any grant also tells a node
/// which of its neighbors is the origin.
pub(crate) fn adopt_assignment(node: &mut Node, inbox: &[Envelope]) {
    let granted: Vec<(u8, Option<GridPos>)> = node
        .from_neighbors(inbox)
        .filter_map(|env| match &env.payload {
            Payload::Assignments(grants) => Some((
                env.sender,
                grants
                    .iter()
                    .find(|a| a.target == node.identity)
                    .map(|a| a.position),
            )),
            _ => None,
        })
        .collect();

    for (origin, position) in granted {
        node.origin_identity.get_or_insert(origin);
        if let Some(pos) = position {
            node.fix_position(pos);
        }
    }
}

/// Map a 1-based perimeter index to a coordinate, walking the four sides
/// of a `c1 × (c2 − c1 + 1)` rectangle in order.
pub fn perimeter_position(count: u32, summary: DimensionSummary) -> GridPos {
    let count = count as i32;
    let (c1, c2, c3) = (
        summary.c1 as i32,
        summary.c2 as i32,
        summary.c3 as i32,
    );
    let height = c2 - c1 + 1;

    if count <= c1 {
        GridPos::new(count, 1)
    } else if count <= c2 {
        GridPos::new(c1, count - c1 + 1)
    } else if count <= c3 {
        GridPos::new(c1 - (count - c2), height)
    } else {
        GridPos::new(1, height - (count - c3))
    }
}

/// Seal at the origin, relay everywhere else, and place the perimeter.
pub(crate) fn resolve_relative(node: &mut Node, inbox: &[Envelope]) {
    if node.sealed_summary.is_none() {
        if node.is_origin {
            if node.closing_count.is_some() && node.summary.is_complete() {
                node.sealed_summary = Some(node.summary);
                debug!(identity = node.identity, tick = node.clock, summary = ?node.summary, "Summary sealed");
            }
        } else {
            node.sealed_summary = node
                .from_neighbors(inbox)
                .filter_map(|env| match env.payload {
                    Payload::Summary(s) => Some((env.sender, s)),
                    _ => None,
                })
                .min_by_key(|(sender, _)| *sender)
                .map(|(_, s)| s);
        }
    }

    if !node.role.is_perimeter() || node.position.is_known() || node.dimension_count == 0 {
        return;
    }
    if let Some(summary) = node.sealed_summary {
        node.fix_position(perimeter_position(node.dimension_count, summary));
    }
}
