//! Kilogrid Swarm Simulator
//!
//! Drives a rectangle of [`kilogrid_protocol::Node`]s through the full
//! phase schedule over a lossy, noisy broadcast channel and reports how
//! well they localized.
//!
//! # Architecture
//!
//! - **Config**: one explicit [`SimulationConfig`] value per run
//! - **Channel**: per-delivery loss and Gaussian distance error
//! - **Simulation**: lock-step send/resolve rounds, timeline recording
//! - **Monitor**: convergence tick and symmetry-aware accuracy
//!
//! # Usage
//!
//! ```no_run
//! use kilogrid_sim::{Simulation, SimulationConfig};
//!
//! let mut sim = Simulation::new(SimulationConfig::default().with_seed(7))?;
//! let report = sim.run();
//! println!("accuracy {:.2}", report.accuracy);
//! # Ok::<(), kilogrid_sim::ConfigError>(())
//! ```

mod channel;
mod config;
mod error;
mod events;
mod monitor;
mod simulation;

pub use channel::ChannelModel;
pub use config::SimulationConfig;
pub use error::{ConfigError, Result};
pub use events::{MeshSnapshot, NodeState, ProtocolEvent};
pub use monitor::{best_alignment, Alignment, ConvergenceMonitor, RunReport};
pub use simulation::Simulation;
