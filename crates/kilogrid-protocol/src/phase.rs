//! The fixed, time-triggered phase schedule.
//!
//! Phases advance on the node's own clock, never on message content. A
//! node that misses the window for a one-shot step simply moves on; the
//! schedule does not wait for protocol progress.

/// Protocol phase, in schedule order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    // R1: identity & topology
    IdAssignment,
    NeighborList,
    RoleCollection,
    RoleDecision,
    // R2: coordinate bootstrap
    OriginAssignment,
    OriginConfirm,
    OriginBroadcastPositions,
    DimensionCount,
    RelativePosition,
    GlobalPosition,
    // R3: display
    DisplaySync,
    DisplayMap,
}

impl Phase {
    /// All phases in schedule order.
    pub const ALL: [Self; 12] = [
        Self::IdAssignment,
        Self::NeighborList,
        Self::RoleCollection,
        Self::RoleDecision,
        Self::OriginAssignment,
        Self::OriginConfirm,
        Self::OriginBroadcastPositions,
        Self::DimensionCount,
        Self::RelativePosition,
        Self::GlobalPosition,
        Self::DisplaySync,
        Self::DisplayMap,
    ];

    /// Position in the schedule.
    pub const fn ordinal(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::IdAssignment => "id-assignment",
            Self::NeighborList => "neighbor-list",
            Self::RoleCollection => "role-collection",
            Self::RoleDecision => "role-decision",
            Self::OriginAssignment => "origin-assignment",
            Self::OriginConfirm => "origin-confirm",
            Self::OriginBroadcastPositions => "origin-broadcast-positions",
            Self::DimensionCount => "dimension-count",
            Self::RelativePosition => "relative-position",
            Self::GlobalPosition => "global-position",
            Self::DisplaySync => "display-sync",
            Self::DisplayMap => "display-map",
        };
        f.write_str(name)
    }
}

/// Start tick of every phase plus the failure-check cadence.
///
/// Ticks are 1-based node clock values: the first round a node runs is
/// tick 1.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Schedule {
    /// Start tick of each phase, indexed by [`Phase::ordinal`]
    pub starts: [u64; 12],
    /// Total ticks in a run
    pub run_length: u64,
    /// Failure is sampled once per window...
    pub failure_window: u64,
    /// ...when `(tick - 1) % failure_window == failure_offset`
    pub failure_offset: u64,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            starts: [1, 60, 140, 180, 260, 320, 370, 400, 970, 1070, 1270, 1300],
            run_length: 1350,
            failure_window: 150,
            failure_offset: 100,
        }
    }
}

impl Schedule {
    /// First tick of `phase`.
    pub fn start_of(&self, phase: Phase) -> u64 {
        self.starts[phase.ordinal()]
    }

    /// The phase in force at `tick`.
    ///
    /// Ticks before the first start belong to the first phase.
    pub fn phase_at(&self, tick: u64) -> Phase {
        Phase::ALL
            .iter()
            .rev()
            .find(|p| self.start_of(**p) <= tick)
            .copied()
            .unwrap_or(Phase::IdAssignment)
    }

    /// Whether failure is sampled at `tick`.
    pub fn is_failure_check(&self, tick: u64) -> bool {
        self.failure_window > 0
            && tick > 0
            && (tick - 1) % self.failure_window == self.failure_offset
    }

    /// Start ticks strictly increase, the run reaches the last phase, and
    /// the failure offset falls inside its window so checks actually fire.
    pub fn is_well_formed(&self) -> bool {
        self.starts.windows(2).all(|w| w[0] < w[1])
            && self.run_length >= self.starts[self.starts.len() - 1]
            && self.failure_offset < self.failure_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_is_well_formed() {
        assert!(Schedule::default().is_well_formed());
    }

    #[test]
    fn failure_offset_must_fit_its_window() {
        let s = Schedule {
            failure_offset: 200,
            ..Schedule::default()
        };
        assert!(!s.is_well_formed());
        assert!((1..=s.run_length).all(|t| !s.is_failure_check(t)));

        let empty = Schedule {
            failure_window: 0,
            failure_offset: 0,
            ..Schedule::default()
        };
        assert!(!empty.is_well_formed());

        let last = Schedule {
            failure_offset: 149,
            ..Schedule::default()
        };
        assert!(last.is_well_formed());
        assert!(last.is_failure_check(150));
    }

    #[test]
    fn phase_boundaries() {
        let s = Schedule::default();
        assert_eq!(s.phase_at(0), Phase::IdAssignment);
        assert_eq!(s.phase_at(59), Phase::IdAssignment);
        assert_eq!(s.phase_at(60), Phase::NeighborList);
        assert_eq!(s.phase_at(399), Phase::OriginBroadcastPositions);
        assert_eq!(s.phase_at(400), Phase::DimensionCount);
        assert_eq!(s.phase_at(1300), Phase::DisplayMap);
        assert_eq!(s.phase_at(1_000_000), Phase::DisplayMap);
    }

    #[test]
    fn phases_never_regress_over_time() {
        let s = Schedule::default();
        let mut prev = s.phase_at(1);
        for tick in 2..=s.run_length {
            let p = s.phase_at(tick);
            assert!(p >= prev, "phase regressed at tick {}", tick);
            prev = p;
        }
        assert_eq!(prev, Phase::DisplayMap);
    }

    #[test]
    fn failure_checks_once_per_window() {
        let s = Schedule::default();
        let checks: Vec<_> = (1..=s.run_length).filter(|&t| s.is_failure_check(t)).collect();
        assert_eq!(checks[..3], [101, 251, 401]);
        for w in checks.windows(2) {
            assert_eq!(w[1] - w[0], s.failure_window);
        }
    }

    #[test]
    fn unordered_starts_are_rejected() {
        let mut s = Schedule::default();
        s.starts.swap(3, 4);
        assert!(!s.is_well_formed());
    }
}
