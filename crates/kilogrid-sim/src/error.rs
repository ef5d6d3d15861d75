//! Error types for building a simulation.

use kilogrid_topology::LayoutError;
use thiserror::Error;

/// Result type for simulation setup.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A configuration the simulator refuses to run.
///
/// Once a simulation is built, nothing fails: the protocol expresses every
/// fault as missing state, never as an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Bad grid shape or spacing
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    /// A probability outside [0, 1]
    #[error("{name} must be within [0, 1], got {value}")]
    Probability { name: &'static str, value: f64 },

    /// Negative or non-finite noise
    #[error("Distance noise must be finite and non-negative, got {0}")]
    Noise(f64),

    /// Broadcast reach of zero cells
    #[error("Broadcast radius must be at least one cell")]
    ZeroRadius,

    /// Phase starts out of order, the run ends before the last phase, or
    /// the failure offset lies outside its window
    #[error("Schedule is not well formed: {0:?}")]
    Schedule(Vec<u64>),

    /// Caller-built robots don't fill the grid
    #[error("Expected {expected} robots for the grid, got {got}")]
    NodeCount { expected: usize, got: usize },
}
