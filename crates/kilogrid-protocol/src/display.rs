//! R3: The LED a node shows.
//!
//! Purely derived from node state and the tick. Nothing here feeds back
//! into the protocol.

use kilogrid_topology::GridPos;

use crate::node::Node;
use crate::phase::{Phase, Schedule};
use crate::role::Role;

/// LED colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Color {
    Grey,
    LightBlue,
    LightGreen,
    Orange,
    Red,
    Green,
    Blue,
    Pink,
    Black,
    White,
    Yellow,
    Brown,
}

/// What DISPLAY_MAP shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Animation {
    /// Bands along x + y that drift over time. Works on any grid.
    #[default]
    DiagonalWave,
    /// A static face, drawn for a 10×10 grid.
    SmileyFace,
    /// Keep the row banding from the sync phase.
    RowSync,
}

const SYNC_PALETTE: [Color; 5] = [Color::Green, Color::Blue, Color::Pink, Color::Orange, Color::White];
const WAVE_PALETTE: [Color; 3] = [Color::Red, Color::Orange, Color::Yellow];
const WAVE_SPEED: f64 = 0.2;
const WAVE_BAND: f64 = 5.0;

const SMILEY: [(i32, i32); 14] = [
    // eyes
    (3, 8),
    (8, 8),
    (3, 7),
    (8, 7),
    // mouth
    (1, 5),
    (10, 5),
    (2, 4),
    (9, 4),
    (3, 3),
    (4, 3),
    (5, 3),
    (6, 3),
    (7, 3),
    (8, 3),
];

fn banded(value: i32) -> Color {
    SYNC_PALETTE[(value - 1).rem_euclid(SYNC_PALETTE.len() as i32) as usize]
}

/// DISPLAY_SYNC pattern, `elapsed` ticks into the phase: red, then by
/// column, then by row for good.
pub fn sync_banding(pos: GridPos, elapsed: u64) -> Color {
    match elapsed {
        0 | 1 => Color::Red,
        2 | 3 => banded(pos.x),
        _ => banded(pos.y),
    }
}

/// DISPLAY_MAP frame for a positioned node.
pub fn animate(animation: Animation, pos: GridPos, tick: u64) -> Color {
    match animation {
        Animation::DiagonalWave => {
            let val = f64::from(pos.x + pos.y) - tick as f64 * WAVE_SPEED;
            let band = (val / WAVE_BAND).trunc() as i64;
            WAVE_PALETTE[band.rem_euclid(WAVE_PALETTE.len() as i64) as usize]
        }
        Animation::SmileyFace => {
            if SMILEY.contains(&(pos.x, pos.y)) {
                Color::Yellow
            } else {
                Color::Black
            }
        }
        Animation::RowSync => banded(pos.y),
    }
}

fn role_color(role: Role) -> Color {
    match role {
        Role::Corner => Color::Red,
        Role::Middle => Color::Green,
        Role::Border => Color::Blue,
        Role::Undecided => Color::Orange,
    }
}

/// The node's LED at its current clock.
pub fn marker(node: &Node, animation: Animation, schedule: &Schedule) -> Color {
    if node.is_failed() {
        return Color::Brown;
    }
    let position = node.position().known();

    match node.phase() {
        Phase::IdAssignment => Color::Grey,
        Phase::NeighborList => Color::LightBlue,
        Phase::RoleCollection => Color::Orange,
        Phase::RoleDecision => role_color(node.role()),
        Phase::OriginAssignment | Phase::OriginConfirm => {
            if node.is_origin() {
                Color::Black
            } else if node.role() != Role::Corner && node.origin_candidate().is_some() {
                Color::Pink
            } else {
                Color::Grey
            }
        }
        Phase::OriginBroadcastPositions => match position.map(|p| (p.x, p.y)) {
            Some((1, 1)) => Color::Black,
            Some((1, 2)) => Color::Red,
            Some((2, 1)) => Color::Blue,
            Some((2, 2)) => Color::Green,
            _ => Color::Grey,
        },
        Phase::DimensionCount => {
            if node.dimension_count() > 0 {
                Color::LightBlue
            } else {
                Color::Grey
            }
        }
        Phase::RelativePosition | Phase::GlobalPosition => {
            if position.is_some() {
                Color::LightGreen
            } else {
                Color::Grey
            }
        }
        Phase::DisplaySync => position.map_or(Color::Grey, |pos| {
            let elapsed = node.clock().saturating_sub(schedule.start_of(Phase::DisplaySync));
            sync_banding(pos, elapsed)
        }),
        Phase::DisplayMap => position.map_or(Color::Grey, |pos| animate(animation, pos, node.clock())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fix::Fix;

    #[test]
    fn sync_goes_red_then_columns_then_rows() {
        let pos = GridPos::new(2, 7);
        assert_eq!(sync_banding(pos, 0), Color::Red);
        assert_eq!(sync_banding(pos, 1), Color::Red);
        assert_eq!(sync_banding(pos, 2), Color::Blue);
        assert_eq!(sync_banding(pos, 3), Color::Blue);
        assert_eq!(sync_banding(pos, 4), Color::Blue);
        assert_eq!(sync_banding(pos, 40), Color::Blue);
        assert_eq!(sync_banding(GridPos::new(1, 5), 10), Color::White);
        assert_eq!(sync_banding(GridPos::new(1, 6), 10), Color::Green);
    }

    #[test]
    fn diagonal_wave_is_constant_along_antidiagonals() {
        for tick in [0, 13, 400, 1333] {
            let a = animate(Animation::DiagonalWave, GridPos::new(2, 5), tick);
            let b = animate(Animation::DiagonalWave, GridPos::new(5, 2), tick);
            assert_eq!(a, b);
        }
        assert_eq!(animate(Animation::DiagonalWave, GridPos::new(1, 1), 0), Color::Red);
        assert_eq!(animate(Animation::DiagonalWave, GridPos::new(3, 3), 0), Color::Orange);
    }

    #[test]
    fn smiley_lights_its_pixels() {
        assert_eq!(animate(Animation::SmileyFace, GridPos::new(3, 8), 0), Color::Yellow);
        assert_eq!(animate(Animation::SmileyFace, GridPos::new(5, 5), 0), Color::Black);
    }

    #[test]
    fn failed_is_brown_and_unplaced_is_grey() {
        let schedule = Schedule::default();
        let mut node = Node::with_identity(1, 1);
        node.phase = Phase::DisplayMap;
        assert_eq!(marker(&node, Animation::SmileyFace, &schedule), Color::Grey);

        node.position = Fix::Known(GridPos::new(3, 8));
        assert_eq!(marker(&node, Animation::SmileyFace, &schedule), Color::Yellow);

        node.failed = true;
        assert_eq!(marker(&node, Animation::SmileyFace, &schedule), Color::Brown);
    }

    #[test]
    fn sync_is_timed_from_phase_start() {
        let schedule = Schedule::default();
        let mut node = Node::with_identity(1, 1);
        node.phase = Phase::DisplaySync;
        node.position = Fix::Known(GridPos::new(3, 1));
        node.clock = schedule.start_of(Phase::DisplaySync) + 1;
        assert_eq!(marker(&node, Animation::default(), &schedule), Color::Red);
        node.clock += 2;
        assert_eq!(marker(&node, Animation::default(), &schedule), Color::Pink);
    }
}
