//! R1: Structural role from local degree.
//!
//! On a full rectangle a corner has 3 grid neighbors, a border cell 5 and an
//! interior cell 8. Comparing my degree with my neighbors' is enough:
//! - fewer than all of them → corner
//! - at least as many as all of them → interior
//! - anything in between → border

use tracing::debug;

use crate::message::{Envelope, Payload};
use crate::node::Node;

/// Structural classification of a robot within the rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    #[default]
    Undecided,
    Corner,
    Border,
    Middle,
}

impl Role {
    pub const fn is_decided(self) -> bool {
        !matches!(self, Role::Undecided)
    }

    /// Corners and border cells make up the perimeter.
    pub const fn is_perimeter(self) -> bool {
        matches!(self, Role::Corner | Role::Border)
    }
}

/// Classify from my degree and the degrees my neighbors reported.
///
/// `None` if no neighbor reported: there is nothing to compare against.
pub fn classify<I>(my_count: usize, neighbor_counts: I) -> Option<Role>
where
    I: IntoIterator<Item = usize>,
{
    let mut counts = neighbor_counts.into_iter();
    let first = counts.next()?;
    let (min, max) = counts.fold((first, first), |(lo, hi), c| (lo.min(c), hi.max(c)));

    Some(if my_count < min {
        Role::Corner
    } else if my_count >= max {
        Role::Middle
    } else {
        Role::Border
    })
}

pub(crate) fn outgoing(node: &Node) -> Option<Payload> {
    node.role.is_decided().then_some(Payload::RoleAnnounce(node.role))
}

/// Collection ticks: remember each neighbor's reported degree.
pub(crate) fn collect(node: &mut Node, inbox: &[Envelope]) {
    let reports: Vec<_> = node
        .from_neighbors(inbox)
        .filter_map(|env| match env.payload {
            Payload::NeighborCount(count) => Some((env.sender, count)),
            _ => None,
        })
        .collect();
    node.neighbor_counts.extend(reports);
}

/// Decision ticks: decide once, then gather the neighbors' decisions.
pub(crate) fn decide(node: &mut Node, inbox: &[Envelope]) {
    if !node.role.is_decided() {
        let decided = classify(
            node.neighbor_ids.len(),
            node.neighbor_counts.values().copied(),
        );
        if let Some(role) = decided {
            node.role = role;
            debug!(
                identity = node.identity,
                tick = node.clock,
                ?role,
                degree = node.neighbor_ids.len(),
                "Role decided"
            );
        }
    }

    let announced: Vec<_> = node
        .from_neighbors(inbox)
        .filter_map(|env| match env.payload {
            Payload::RoleAnnounce(role) if role.is_decided() => Some((env.sender, role)),
            _ => None,
        })
        .collect();
    for (sender, role) in announced {
        node.neighbor_roles.entry(sender).or_insert(role);
    }
}
