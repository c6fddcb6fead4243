use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Per-gene Gaussian mutation bounded to `[0, target]`.
///
/// Each gene mutates with probability `rate` by a delta drawn from
/// `Normal(mean, std)`. Values pushed above the target are reflected back
/// below it; values pushed below zero are clamped to zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianMutation {
    rate: f64,
    mean: f64,
    std: f64,
    target: f64,
}

impl GaussianMutation {
    pub fn new(rate: f64, mean: f64, std: f64, target: f64) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::InvalidMutation(format!(
                "rate {rate} must be within [0, 1]"
            )));
        }
        if !mean.is_finite() {
            return Err(ConfigError::InvalidMutation(format!(
                "mean {mean} must be finite"
            )));
        }
        if !std.is_finite() || std < 0.0 {
            return Err(ConfigError::InvalidMutation(format!(
                "standard deviation {std} must be finite and non-negative"
            )));
        }
        if !target.is_finite() || target <= 0.0 {
            return Err(ConfigError::InvalidTarget(target));
        }
        Ok(Self {
            rate,
            mean,
            std,
            target,
        })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std(&self) -> f64 {
        self.std
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Mutates `genome` in place and returns how many genes were touched.
    pub fn mutate<R: Rng + ?Sized>(&self, genome: &mut [f64], rng: &mut R) -> usize {
        let mut count = 0;
        for gene in genome.iter_mut() {
            if !rng.random_bool(self.rate) {
                continue;
            }
            let delta = self.mean + self.std * rng.sample::<f64, _>(StandardNormal);
            *gene = self.bound(*gene + delta);
            count += 1;
        }
        count
    }

    fn bound(&self, value: f64) -> f64 {
        if value > self.target {
            (self.target - (value - self.target)).max(0.0)
        } else if value < 0.0 {
            0.0
        } else {
            value
        }
    }
}
