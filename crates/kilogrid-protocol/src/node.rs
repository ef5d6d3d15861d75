//! The per-robot state machine and its phase dispatcher.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use tracing::debug;

use kilogrid_topology::GridPos;

use crate::dimension::DimensionSummary;
use crate::fix::Fix;
use crate::message::{Envelope, Payload, PeerTag};
use crate::phase::{Phase, Schedule};
use crate::role::Role;
use crate::{dimension, discovery, identity, origin, placement, role, triangulation};

/// Inclusive identity range.
pub const IDENTITY_RANGE: std::ops::RangeInclusive<u8> = 1..=255;

/// One simulated robot.
///
/// All mutation happens in [`Node::resolve`] (plus the failure draw in
/// [`Node::check_failure`]). [`Node::send`] only reads.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) identity: u8,
    pub(crate) tie_break: u8,
    pub(crate) failed: bool,
    pub(crate) clock: u64,
    pub(crate) phase: Phase,
    pub(crate) role: Role,

    // R1
    pub(crate) blacklist: BTreeSet<u8>,
    pub(crate) known_peers: BTreeSet<PeerTag>,
    pub(crate) min_observed_distance: f64,
    pub(crate) neighbor_ids: BTreeSet<u8>,
    pub(crate) neighbor_counts: BTreeMap<u8, usize>,
    pub(crate) neighbor_roles: BTreeMap<u8, Role>,

    // R2
    pub(crate) origin_candidate: Option<u32>,
    pub(crate) is_origin: bool,
    pub(crate) origin_identity: Option<u8>,
    pub(crate) position: Fix,
    pub(crate) dimension_count: u32,
    pub(crate) summary: DimensionSummary,
    pub(crate) count_source: Option<u8>,
    pub(crate) closing_count: Option<u32>,
    pub(crate) sealed_summary: Option<DimensionSummary>,

    pub(crate) messages_received: u64,
}

impl Node {
    /// A fresh robot with random identity and tie-break.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let identity = rng.gen_range(IDENTITY_RANGE);
        let tie_break = rng.gen();
        Self::with_identity(identity, tie_break)
    }

    /// A fresh robot with a chosen identity. Useful for seeding collisions.
    pub fn with_identity(identity: u8, tie_break: u8) -> Self {
        Self {
            identity,
            tie_break,
            failed: false,
            clock: 0,
            phase: Phase::IdAssignment,
            role: Role::Undecided,
            blacklist: BTreeSet::new(),
            known_peers: BTreeSet::new(),
            min_observed_distance: f64::INFINITY,
            neighbor_ids: BTreeSet::new(),
            neighbor_counts: BTreeMap::new(),
            neighbor_roles: BTreeMap::new(),
            origin_candidate: None,
            is_origin: false,
            origin_identity: None,
            position: Fix::Unknown,
            dimension_count: 0,
            summary: DimensionSummary::default(),
            count_source: None,
            closing_count: None,
            sealed_summary: None,
            messages_received: 0,
        }
    }

    pub fn identity(&self) -> u8 {
        self.identity
    }

    pub fn tie_break(&self) -> u8 {
        self.tie_break
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Last tick this node resolved.
    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn position(&self) -> Fix {
        self.position
    }

    pub fn is_origin(&self) -> bool {
        self.is_origin
    }

    pub fn neighbor_ids(&self) -> &BTreeSet<u8> {
        &self.neighbor_ids
    }

    pub fn neighbor_roles(&self) -> &BTreeMap<u8, Role> {
        &self.neighbor_roles
    }

    pub fn min_observed_distance(&self) -> f64 {
        self.min_observed_distance
    }

    pub fn origin_candidate(&self) -> Option<u32> {
        self.origin_candidate
    }

    /// Index along the perimeter walk; 0 until counted.
    pub fn dimension_count(&self) -> u32 {
        self.dimension_count
    }

    /// Corner thresholds as known locally (possibly still filling in).
    pub fn summary(&self) -> DimensionSummary {
        self.summary
    }

    /// The origin's sealed summary, once it has reached this node.
    pub fn sealed_summary(&self) -> Option<DimensionSummary> {
        self.sealed_summary
    }

    /// Messages delivered into this node's inbox over the whole run.
    pub fn messages_received(&self) -> u64 {
        self.messages_received
    }

    /// Sample permanent failure if `tick` is a check point.
    ///
    /// Returns true only on the tick the node fails.
    pub fn check_failure<R: Rng + ?Sized>(
        &mut self,
        tick: u64,
        probability: f64,
        schedule: &Schedule,
        rng: &mut R,
    ) -> bool {
        if self.failed || !schedule.is_failure_check(tick) {
            return false;
        }
        rng.gen::<f64>() < probability && self.fail(tick)
    }

    /// Fail permanently at `tick`, keeping all state as it stands.
    ///
    /// Returns false if the node had already failed.
    pub fn fail(&mut self, tick: u64) -> bool {
        if self.failed {
            return false;
        }
        self.failed = true;
        debug!(identity = self.identity, tick, phase = %self.phase, "Node failed");
        true
    }

    /// Send phase: what this node broadcasts this tick, read from the state
    /// left by the previous resolve.
    pub fn send(&self) -> Option<Payload> {
        if self.failed {
            return None;
        }
        match self.phase {
            Phase::IdAssignment => Some(identity::outgoing(self)),
            Phase::NeighborList => Some(Payload::Presence),
            Phase::RoleCollection => Some(Payload::NeighborCount(self.neighbor_ids.len())),
            Phase::RoleDecision => role::outgoing(self),
            Phase::OriginAssignment | Phase::OriginConfirm => origin::outgoing(self),
            Phase::OriginBroadcastPositions => placement::origin_assignments(self),
            Phase::DimensionCount => dimension::outgoing(self),
            Phase::RelativePosition => self.sealed_summary.map(Payload::Summary),
            Phase::GlobalPosition => triangulation::outgoing(self),
            Phase::DisplaySync | Phase::DisplayMap => None,
        }
    }

    /// Resolve phase: advance the clock and phase, then run the handler for
    /// the phase in force. The inbox holds only this tick's messages.
    pub fn resolve<R: Rng + ?Sized>(
        &mut self,
        tick: u64,
        inbox: &[Envelope],
        schedule: &Schedule,
        rng: &mut R,
    ) {
        if self.failed {
            return;
        }
        self.clock = tick;
        self.messages_received += inbox.len() as u64;

        let scheduled = schedule.phase_at(tick);
        if scheduled > self.phase {
            self.enter(scheduled, rng);
        }

        match self.phase {
            Phase::IdAssignment => identity::resolve(self, inbox, rng),
            Phase::NeighborList => discovery::resolve(self, inbox),
            Phase::RoleCollection => role::collect(self, inbox),
            Phase::RoleDecision => role::decide(self, inbox),
            Phase::OriginAssignment => origin::relay(self, inbox),
            Phase::OriginConfirm => origin::confirm(self, inbox),
            Phase::OriginBroadcastPositions => placement::adopt_assignment(self, inbox),
            Phase::DimensionCount => dimension::resolve(self, inbox),
            Phase::RelativePosition => placement::resolve_relative(self, inbox),
            Phase::GlobalPosition => triangulation::resolve(self, inbox),
            Phase::DisplaySync | Phase::DisplayMap => {}
        }
    }

    fn enter<R: Rng + ?Sized>(&mut self, next: Phase, rng: &mut R) {
        debug_assert!(next > self.phase);
        self.phase = next;
        if next == Phase::OriginAssignment {
            origin::draw_candidate(self, rng);
        }
    }

    /// Messages whose sender is a confirmed neighbor.
    pub(crate) fn from_neighbors<'a>(
        &'a self,
        inbox: &'a [Envelope],
    ) -> impl Iterator<Item = &'a Envelope> + 'a {
        inbox
            .iter()
            .filter(move |env| self.neighbor_ids.contains(&env.sender))
    }

    /// Write the final coordinate. A no-op if one is already known.
    pub(crate) fn fix_position(&mut self, pos: GridPos) {
        if self.position.is_known() {
            return;
        }
        self.position = Fix::Known(pos);
        debug!(
            identity = self.identity,
            tick = self.clock,
            role = ?self.role,
            position = %pos,
            "Position fixed"
        );
    }
}
