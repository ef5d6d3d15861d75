//! Protocol milestones for the run timeline.

use std::collections::BTreeMap;

use kilogrid_protocol::{DimensionSummary, Role};
use kilogrid_topology::{GridPos, SlotIndex};
use serde::{Deserialize, Serialize};

/// Read-out of one robot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeState {
    pub slot: SlotIndex,
    /// Where the robot really is
    pub true_position: GridPos,
    pub identity: u8,
    pub role: Role,
    /// Final coordinate, once fixed
    pub position: Option<GridPos>,
    pub is_origin: bool,
    pub failed: bool,
}

/// Something that happened to a node during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProtocolEvent {
    /// A robot was placed, before the first round
    NodeJoined {
        slot: SlotIndex,
        identity: u8,
        true_position: GridPos,
        tick: u64,
    },

    /// Redrew after an identity clash
    IdentityChanged {
        slot: SlotIndex,
        from: u8,
        to: u8,
        tick: u64,
    },

    RoleDecided {
        slot: SlotIndex,
        role: Role,
        tick: u64,
    },

    /// Won the corner election and took (1, 1)
    OriginConfirmed {
        slot: SlotIndex,
        identity: u8,
        tick: u64,
    },

    PositionFixed {
        slot: SlotIndex,
        position: GridPos,
        tick: u64,
    },

    /// The origin closed the perimeter walk
    SummarySealed {
        slot: SlotIndex,
        summary: DimensionSummary,
        tick: u64,
    },

    /// Permanent failure
    NodeFailed { slot: SlotIndex, tick: u64 },
}

impl ProtocolEvent {
    /// Tick the event happened on.
    pub fn tick(&self) -> u64 {
        match self {
            ProtocolEvent::NodeJoined { tick, .. }
            | ProtocolEvent::IdentityChanged { tick, .. }
            | ProtocolEvent::RoleDecided { tick, .. }
            | ProtocolEvent::OriginConfirmed { tick, .. }
            | ProtocolEvent::PositionFixed { tick, .. }
            | ProtocolEvent::SummarySealed { tick, .. }
            | ProtocolEvent::NodeFailed { tick, .. } => *tick,
        }
    }

    /// The robot it happened to.
    pub fn slot(&self) -> SlotIndex {
        match self {
            ProtocolEvent::NodeJoined { slot, .. }
            | ProtocolEvent::IdentityChanged { slot, .. }
            | ProtocolEvent::RoleDecided { slot, .. }
            | ProtocolEvent::OriginConfirmed { slot, .. }
            | ProtocolEvent::PositionFixed { slot, .. }
            | ProtocolEvent::SummarySealed { slot, .. }
            | ProtocolEvent::NodeFailed { slot, .. } => *slot,
        }
    }
}

/// The swarm at one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshSnapshot {
    pub tick: u64,
    /// In slot order
    pub nodes: Vec<NodeState>,
    pub node_count: usize,
    pub positioned_count: usize,
    pub failed_count: usize,
    /// Sealed by the origin, if it has happened yet
    pub summary: Option<DimensionSummary>,
}

impl MeshSnapshot {
    /// Build from per-node states, sorting them into slot order.
    pub fn from_nodes(tick: u64, mut nodes: Vec<NodeState>, summary: Option<DimensionSummary>) -> Self {
        nodes.sort_by_key(|n| n.slot);
        let positioned_count = nodes
            .iter()
            .filter(|n| !n.failed && n.position.is_some())
            .count();
        let failed_count = nodes.iter().filter(|n| n.failed).count();
        Self {
            tick,
            node_count: nodes.len(),
            nodes,
            positioned_count,
            failed_count,
            summary,
        }
    }

    /// Replay the timeline through `up_to_tick` inclusive.
    pub fn from_events(events: &[ProtocolEvent], up_to_tick: u64) -> Self {
        let mut nodes: BTreeMap<SlotIndex, NodeState> = BTreeMap::new();
        let mut summary = None;

        for event in events.iter().take_while(|e| e.tick() <= up_to_tick) {
            if let ProtocolEvent::NodeJoined {
                slot,
                identity,
                true_position,
                ..
            } = event
            {
                nodes.insert(
                    *slot,
                    NodeState {
                        slot: *slot,
                        true_position: *true_position,
                        identity: *identity,
                        role: Role::Undecided,
                        position: None,
                        is_origin: false,
                        failed: false,
                    },
                );
                continue;
            }

            let Some(node) = nodes.get_mut(&event.slot()) else {
                continue;
            };
            match event {
                ProtocolEvent::IdentityChanged { to, .. } => node.identity = *to,
                ProtocolEvent::RoleDecided { role, .. } => node.role = *role,
                ProtocolEvent::OriginConfirmed { .. } => node.is_origin = true,
                ProtocolEvent::PositionFixed { position, .. } => node.position = Some(*position),
                ProtocolEvent::SummarySealed { summary: s, .. } => summary = Some(*s),
                ProtocolEvent::NodeFailed { .. } => node.failed = true,
                ProtocolEvent::NodeJoined { .. } => {}
            }
        }

        Self::from_nodes(up_to_tick, nodes.into_values().collect(), summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(slot: usize, identity: u8) -> ProtocolEvent {
        ProtocolEvent::NodeJoined {
            slot: SlotIndex(slot),
            identity,
            true_position: GridPos::new(slot as i32 + 1, 1),
            tick: 0,
        }
    }

    #[test]
    fn event_serialization() {
        let event = ProtocolEvent::PositionFixed {
            slot: SlotIndex(4),
            position: GridPos::new(2, 3),
            tick: 1071,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"PositionFixed\""));
        assert!(json.contains("1071"));

        let parsed: ProtocolEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
        assert_eq!(parsed.tick(), 1071);
        assert_eq!(parsed.slot(), SlotIndex(4));
    }

    #[test]
    fn replay_stops_at_the_requested_tick() {
        let events = vec![
            joined(0, 10),
            joined(1, 20),
            ProtocolEvent::IdentityChanged { slot: SlotIndex(1), from: 20, to: 21, tick: 3 },
            ProtocolEvent::RoleDecided { slot: SlotIndex(0), role: Role::Corner, tick: 180 },
            ProtocolEvent::OriginConfirmed { slot: SlotIndex(0), identity: 10, tick: 321 },
            ProtocolEvent::PositionFixed { slot: SlotIndex(0), position: GridPos::ORIGIN, tick: 321 },
            ProtocolEvent::NodeFailed { slot: SlotIndex(1), tick: 401 },
            ProtocolEvent::SummarySealed {
                slot: SlotIndex(0),
                summary: DimensionSummary::new(3, 5, 7),
                tick: 970,
            },
        ];

        let early = MeshSnapshot::from_events(&events, 200);
        assert_eq!(early.node_count, 2);
        assert_eq!(early.nodes[1].identity, 21);
        assert_eq!(early.nodes[0].role, Role::Corner);
        assert!(!early.nodes[0].is_origin);
        assert_eq!(early.positioned_count, 0);
        assert_eq!(early.failed_count, 0);

        let late = MeshSnapshot::from_events(&events, 1000);
        assert!(late.nodes[0].is_origin);
        assert_eq!(late.nodes[0].position, Some(GridPos::ORIGIN));
        assert_eq!(late.positioned_count, 1);
        assert_eq!(late.failed_count, 1);
        assert_eq!(late.summary, Some(DimensionSummary::new(3, 5, 7)));
    }

    #[test]
    fn snapshot_default() {
        let snap = MeshSnapshot::default();
        assert_eq!(snap.tick, 0);
        assert_eq!(snap.node_count, 0);
        assert!(snap.summary.is_none());
    }
}
