//! R1: Identity conflict resolution.
//!
//! Every node shouts `(identity, tie_break, everyone I've heard)`. Whoever
//! notices its identity paired with a foreign tie-break, either directly
//! or in a relayed peer list, blacklists that identity and redraws. No
//! negotiation: both sides of a clash may redraw, and that's fine.
//!
//! The same ticks double as the distance calibration window: the smallest
//! distance sample heard here sets the neighbor acceptance threshold used
//! by discovery.

use std::sync::Arc;

use rand::seq::IteratorRandom;
use rand::Rng;
use tracing::debug;

use crate::message::{Envelope, Payload, PeerTag};
use crate::node::{Node, IDENTITY_RANGE};

pub(crate) fn outgoing(node: &Node) -> Payload {
    let known_peers: Arc<[PeerTag]> = node.known_peers.iter().copied().collect();
    Payload::Hello {
        identity: node.identity,
        tie_break: node.tie_break,
        known_peers,
    }
}

pub(crate) fn resolve<R: Rng + ?Sized>(node: &mut Node, inbox: &[Envelope], rng: &mut R) {
    let mut collided = false;

    for env in inbox {
        node.min_observed_distance = node.min_observed_distance.min(env.distance);

        let Payload::Hello {
            identity,
            tie_break,
            known_peers,
        } = &env.payload
        else {
            continue;
        };

        let heard = PeerTag {
            identity: *identity,
            tie_break: *tie_break,
        };
        node.known_peers.insert(heard);

        collided |= clashes(node, heard) || known_peers.iter().any(|p| clashes(node, *p));
    }

    // Every clash this tick is judged against the pre-redraw identity and costs one redraw
    if collided {
        redraw(node, rng);
    }
}

/// Same identity, different tie-break.
fn clashes(node: &Node, tag: PeerTag) -> bool {
    tag.identity == node.identity && tag.tie_break != node.tie_break
}

/// Retire the current identity for good and pick a fresh one.
///
/// If every identity is blacklisted the node keeps what it has.
fn redraw<R: Rng + ?Sized>(node: &mut Node, rng: &mut R) {
    let old = node.identity;
    node.blacklist.insert(old);

    let Some(new) = IDENTITY_RANGE
        .filter(|id| !node.blacklist.contains(id))
        .choose(rng)
    else {
        return;
    };

    node.identity = new;
    debug!(tick = node.clock, old, new, "Identity collision, redrew");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn hello(identity: u8, tie_break: u8, peers: &[PeerTag], distance: f64) -> Envelope {
        Envelope::new(
            identity,
            distance,
            Payload::Hello {
                identity,
                tie_break,
                known_peers: peers.iter().copied().collect(),
            },
        )
    }

    #[test]
    fn direct_collision_redraws_and_blacklists() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut node = Node::with_identity(42, 1);

        resolve(&mut node, &[hello(42, 2, &[], 1.0)], &mut rng);

        assert_ne!(node.identity, 42);
        assert!(node.blacklist.contains(&42));
    }

    #[test]
    fn relayed_collision_redraws() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut node = Node::with_identity(42, 1);
        let relayed = [PeerTag { identity: 42, tie_break: 9 }];

        resolve(&mut node, &[hello(7, 0, &relayed, 2.0)], &mut rng);

        assert_ne!(node.identity, 42);
    }

    #[test]
    fn own_echo_is_not_a_collision() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut node = Node::with_identity(42, 1);
        let relayed = [PeerTag { identity: 42, tie_break: 1 }];

        resolve(&mut node, &[hello(7, 0, &relayed, 2.0)], &mut rng);

        assert_eq!(node.identity, 42);
        assert!(node.blacklist.is_empty());
        assert!(node.known_peers.contains(&PeerTag { identity: 7, tie_break: 0 }));
    }

    #[test]
    fn redraw_avoids_blacklist() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut node = Node::with_identity(1, 1);
        node.blacklist.extend(2..=255);

        resolve(&mut node, &[hello(1, 2, &[], 1.0)], &mut rng);

        // Everything is blacklisted now; the node keeps its identity
        assert_eq!(node.identity, 1);
        assert_eq!(node.blacklist.len(), 255);
    }

    #[test]
    fn tracks_minimum_distance_from_any_message() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut node = Node::with_identity(1, 1);

        let inbox = [
            hello(2, 0, &[], 1.4),
            Envelope::new(3, 0.97, Payload::Presence),
            hello(4, 0, &[], 2.1),
        ];
        resolve(&mut node, &inbox, &mut rng);

        assert!((node.min_observed_distance - 0.97).abs() < 1e-12);
    }

    #[test]
    fn outgoing_carries_known_peers() {
        let mut node = Node::with_identity(5, 6);
        node.known_peers.insert(PeerTag { identity: 9, tie_break: 1 });

        match outgoing(&node) {
            Payload::Hello {
                identity,
                tie_break,
                known_peers,
            } => {
                assert_eq!((identity, tie_break), (5, 6));
                assert_eq!(&*known_peers, &[PeerTag { identity: 9, tie_break: 1 }]);
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }
}
