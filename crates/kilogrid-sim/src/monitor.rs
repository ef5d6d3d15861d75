//! Convergence tracking and the end-of-run report.
//!
//! Robots pick their own orientation: the origin may be any true corner
//! and the first walk step may go along either side. A run is scored
//! against whichever of the eight grid symmetries fits best.

use kilogrid_protocol::{DimensionSummary, Node};
use kilogrid_topology::{Layout, Symmetry};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Records the first tick every live robot held a final position.
#[derive(Debug, Clone, Default)]
pub struct ConvergenceMonitor {
    convergence_tick: Option<u64>,
}

impl ConvergenceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look at the swarm after a round. Returns true on the tick
    /// convergence is first reached.
    pub fn observe(&mut self, tick: u64, nodes: &[Node]) -> bool {
        if self.convergence_tick.is_some() {
            return false;
        }
        let mut live = nodes.iter().filter(|n| !n.is_failed()).peekable();
        if live.peek().is_none() {
            return false;
        }
        if live.all(|n| n.position().is_known()) {
            self.convergence_tick = Some(tick);
            info!(tick, "All live robots positioned");
            return true;
        }
        false
    }

    pub fn convergence_tick(&self) -> Option<u64> {
        self.convergence_tick
    }
}

/// How well a set of positions matches the layout under one symmetry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    pub symmetry: Symmetry,
    /// Live robots whose position matches
    pub matching: usize,
}

/// The best-fitting symmetry, ties to the earlier one in [`Symmetry::ALL`].
///
/// `None` if no live robot matches under any of them.
pub fn best_alignment(layout: &Layout, nodes: &[Node]) -> Option<Alignment> {
    let (w, h) = (layout.width() as i32, layout.height() as i32);
    let placed: Vec<_> = layout
        .slots()
        .zip(nodes)
        .filter(|(_, n)| !n.is_failed())
        .filter_map(|(slot, n)| n.position().known().map(|p| (layout.true_position(slot), p)))
        .collect();

    Symmetry::ALL
        .iter()
        .map(|&symmetry| Alignment {
            symmetry,
            matching: placed
                .iter()
                .filter(|(truth, got)| symmetry.apply(*truth, w, h) == *got)
                .count(),
        })
        .fold(None, |best: Option<Alignment>, a| match best {
            Some(b) if b.matching >= a.matching => Some(b),
            _ if a.matching > 0 => Some(a),
            _ => best,
        })
}

/// Summary of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub grid_width: u32,
    pub grid_height: u32,
    pub seed: u64,
    /// Rounds executed
    pub ticks: u64,
    pub node_count: usize,
    pub failed: usize,
    /// Live robots with a final position
    pub positioned: usize,
    /// Fraction of live robots placed correctly under the best symmetry
    pub accuracy: f64,
    pub symmetry: Option<Symmetry>,
    pub convergence_tick: Option<u64>,
    /// Messages delivered per robot over the run
    pub average_messages: f64,
    /// The origin's sealed summary
    pub summary: Option<DimensionSummary>,
}

impl RunReport {
    pub fn converged(&self) -> bool {
        self.convergence_tick.is_some()
    }
}
