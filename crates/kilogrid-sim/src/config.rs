//! Simulation configuration.

use kilogrid_protocol::{Animation, Schedule, IDENTITY_RANGE};
use kilogrid_topology::DEFAULT_BROADCAST_RADIUS;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, Result};

/// Everything a run depends on. Two runs with equal configs are identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Robots along the x axis
    pub grid_width: u32,
    /// Robots along the y axis
    pub grid_height: u32,
    /// Cells between adjacent robots
    pub spacing: u32,
    /// Broadcast reach, Chebyshev cells
    pub broadcast_radius: u32,
    /// Chance a live node fails at each failure check
    pub failure_probability: f64,
    /// Chance any single delivery is dropped
    pub loss_probability: f64,
    /// Standard deviation of the distance measurement error
    pub distance_noise: f64,
    /// Seed for the run's only random source
    pub seed: u64,
    pub schedule: Schedule,
    pub animation: Animation,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_width: 10,
            grid_height: 10,
            spacing: 1,
            broadcast_radius: DEFAULT_BROADCAST_RADIUS,
            failure_probability: 0.001,
            loss_probability: 0.10,
            distance_noise: 0.02,
            seed: 42,
            schedule: Schedule::default(),
            animation: Animation::default(),
        }
    }
}

impl SimulationConfig {
    /// A `width × height` grid with no failures, loss or noise.
    pub fn ideal(width: u32, height: u32) -> Self {
        Self::default()
            .with_grid(width, height)
            .with_failure_probability(0.0)
            .with_loss_probability(0.0)
            .with_distance_noise(0.0)
    }

    pub fn with_grid(mut self, width: u32, height: u32) -> Self {
        self.grid_width = width;
        self.grid_height = height;
        self
    }

    pub fn with_spacing(mut self, spacing: u32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_broadcast_radius(mut self, radius: u32) -> Self {
        self.broadcast_radius = radius;
        self
    }

    pub fn with_failure_probability(mut self, p: f64) -> Self {
        self.failure_probability = p;
        self
    }

    pub fn with_loss_probability(mut self, p: f64) -> Self {
        self.loss_probability = p;
        self
    }

    pub fn with_distance_noise(mut self, sigma: f64) -> Self {
        self.distance_noise = sigma;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_animation(mut self, animation: Animation) -> Self {
        self.animation = animation;
        self
    }

    /// Number of robots.
    pub fn node_count(&self) -> usize {
        self.grid_width as usize * self.grid_height as usize
    }

    /// Check everything that isn't the layout's business.
    ///
    /// Grids the protocol can't fully localize (a side under 3, more robots
    /// than identities) are allowed, with a warning.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("failure_probability", self.failure_probability),
            ("loss_probability", self.loss_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Probability { name, value });
            }
        }
        if !self.distance_noise.is_finite() || self.distance_noise < 0.0 {
            return Err(ConfigError::Noise(self.distance_noise));
        }
        if self.broadcast_radius == 0 {
            return Err(ConfigError::ZeroRadius);
        }
        if !self.schedule.is_well_formed() {
            return Err(ConfigError::Schedule(self.schedule.starts.to_vec()));
        }

        if self.grid_width < 3 || self.grid_height < 3 {
            warn!(
                width = self.grid_width,
                height = self.grid_height,
                "Grid has a side shorter than 3; positions will not converge"
            );
        }
        let identities = IDENTITY_RANGE.count();
        if self.node_count() > identities {
            warn!(
                nodes = self.node_count(),
                identities, "More robots than identities; clashes cannot all resolve"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
        assert!(SimulationConfig::ideal(3, 3).validate().is_ok());
    }

    #[test]
    fn rejects_bad_probabilities() {
        let err = SimulationConfig::default()
            .with_loss_probability(1.5)
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Probability {
                name: "loss_probability",
                value: 1.5
            }
        );

        let err = SimulationConfig::default()
            .with_failure_probability(f64::NAN)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Probability { name: "failure_probability", .. }));
    }

    #[test]
    fn rejects_bad_noise_radius_and_schedule() {
        assert_eq!(
            SimulationConfig::default().with_distance_noise(-0.1).validate(),
            Err(ConfigError::Noise(-0.1))
        );
        assert_eq!(
            SimulationConfig::default().with_broadcast_radius(0).validate(),
            Err(ConfigError::ZeroRadius)
        );

        let unreachable_failures = Schedule {
            failure_offset: 200,
            ..Schedule::default()
        };
        assert!(matches!(
            SimulationConfig::ideal(3, 3)
                .with_failure_probability(1.0)
                .with_schedule(unreachable_failures)
                .validate(),
            Err(ConfigError::Schedule(_))
        ));

        let mut schedule = Schedule::default();
        schedule.run_length = 10;
        assert!(matches!(
            SimulationConfig::default().with_schedule(schedule).validate(),
            Err(ConfigError::Schedule(_))
        ));
    }

    #[test]
    fn json_round_trip_with_partial_input() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"grid_width": 4, "seed": 7}"#).unwrap();
        assert_eq!(config.grid_width, 4);
        assert_eq!(config.grid_height, 10);
        assert_eq!(config.seed, 7);
        assert_eq!(config.schedule, Schedule::default());

        let json = serde_json::to_string(&config).unwrap();
        let back: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
