//! Lossy broadcast channel with noisy distance sensing.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{ConfigError, Result};

/// Per-delivery loss and the distance error a receiver measures.
#[derive(Debug, Clone)]
pub struct ChannelModel {
    loss_probability: f64,
    noise: Option<Normal<f64>>,
}

impl ChannelModel {
    pub fn new(loss_probability: f64, distance_noise: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&loss_probability) {
            return Err(ConfigError::Probability {
                name: "loss_probability",
                value: loss_probability,
            });
        }
        let noise = if distance_noise > 0.0 {
            Some(Normal::new(0.0, distance_noise).map_err(|_| ConfigError::Noise(distance_noise))?)
        } else if distance_noise == 0.0 {
            None
        } else {
            return Err(ConfigError::Noise(distance_noise));
        };
        Ok(Self {
            loss_probability,
            noise,
        })
    }

    /// A channel that delivers everything and measures exactly.
    pub fn perfect() -> Self {
        Self {
            loss_probability: 0.0,
            noise: None,
        }
    }

    /// Whether this delivery is lost.
    pub fn should_drop<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        self.loss_probability > 0.0 && rng.gen::<f64>() < self.loss_probability
    }

    /// True distance plus zero-mean Gaussian error, floored at zero.
    pub fn measured_distance<R: Rng + ?Sized>(&self, true_distance: f64, rng: &mut R) -> f64 {
        match &self.noise {
            Some(normal) => (true_distance + normal.sample(rng)).max(0.0),
            None => true_distance,
        }
    }

    pub fn loss_probability(&self) -> f64 {
        self.loss_probability
    }
}
