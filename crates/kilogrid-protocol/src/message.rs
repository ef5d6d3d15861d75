//! Broadcast payloads and the envelope the channel wraps them in.
//!
//! A node produces at most one [`Payload`] per tick. The round driver
//! copies it into an [`Envelope`] for every receiver that survives the
//! loss draw, stamping each copy with its own noisy distance sample.
//! Payloads that are shared by many receivers keep their bulk behind an
//! `Arc`, so fan-out is a reference-count bump.

use std::sync::Arc;

use kilogrid_topology::GridPos;

use crate::dimension::DimensionSummary;
use crate::role::Role;

/// A self-chosen identity paired with the tie-break drawn at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeerTag {
    pub identity: u8,
    pub tie_break: u8,
}

/// "The node calling itself `target` is at `position`."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Assignment {
    pub target: u8,
    pub position: GridPos,
}

/// One step of the perimeter walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CountStep {
    /// Sender's index along the border chain
    pub count: u32,
    /// Corner thresholds recorded so far
    pub summary: DimensionSummary,
    /// Addressed to a corner ahead of the sender; border nodes ignore it
    pub toward_corner: bool,
}

/// Phase-dependent message content.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Identity resolution: who I am, and everyone I have heard of
    Hello {
        identity: u8,
        tie_break: u8,
        known_peers: Arc<[PeerTag]>,
    },
    /// Neighbor discovery: just my presence (identity is on the envelope)
    Presence,
    /// Role collection: how many true neighbors I found
    NeighborCount(usize),
    /// Role decision: what I decided
    RoleAnnounce(Role),
    /// Origin election: the smallest corner candidate I know
    Candidate(u32),
    /// Origin's position grants to its immediate neighbors
    Assignments(Arc<[Assignment]>),
    /// Perimeter walk step
    Count(CountStep),
    /// The sealed rectangle dimensions
    Summary(DimensionSummary),
    /// Whatever axes of my position I know
    PositionReport { x: Option<i32>, y: Option<i32> },
}

/// A payload as received: sender identity plus the measured distance.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Identity the sender held when it broadcast
    pub sender: u8,
    /// Noisy distance sample for this copy
    pub distance: f64,
    pub payload: Payload,
}

impl Envelope {
    pub fn new(sender: u8, distance: f64, payload: Payload) -> Self {
        Self {
            sender,
            distance,
            payload,
        }
    }
}
