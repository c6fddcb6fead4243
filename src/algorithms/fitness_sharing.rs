//! Fitness sharing: niche-discounted tournament selection.
//!
//! Raw aggregate scores are divided by each organism's niche count,
//!
//! ```text
//! m_i = sum_j sh(d_ij),   sh(d) = 1 - (d / sigma)^alpha  if d < sigma, else 0
//! ```
//!
//! where `d_ij` is the p-norm distance between genomes `i` and `j`. Every
//! organism shares with itself (`d_ii = 0`), so `m_i >= 1`. Tournaments are
//! then run on the shared scores.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::tournament::{check_size, run_tournaments};
use crate::Selector;
use crate::matrix::distance_matrix;
use crate::snapshot::{ScoreSnapshot, SelectionError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessSharing {
    pub tournament_size: usize,
    /// Exponent of the p-norm used for genome distances.
    pub pnorm_exp: f64,
    /// Shape of the sharing function.
    pub alpha: f64,
    /// Niche radius.
    pub sigma: f64,
}

impl Default for FitnessSharing {
    fn default() -> Self {
        Self {
            tournament_size: 8,
            pnorm_exp: 2.0,
            alpha: 1.0,
            sigma: 1.0,
        }
    }
}

/// Sharing function contribution for a single distance.
pub fn sharing(distance: f64, alpha: f64, sigma: f64) -> f64 {
    if distance < sigma {
        1.0 - (distance / sigma).powf(alpha)
    } else {
        0.0
    }
}

/// Niche count for every row of a distance matrix.
pub fn niche_counts(distances: &[Vec<f64>], alpha: f64, sigma: f64) -> Vec<f64> {
    distances
        .iter()
        .map(|row| row.iter().map(|&d| sharing(d, alpha, sigma)).sum())
        .collect()
}

/// Divides each raw score by its niche count.
pub fn shared_fitness(counts: &[f64], raw: &[f64]) -> Vec<f64> {
    counts
        .iter()
        .zip(raw)
        .map(|(&count, &score)| if count > 0.0 { score / count } else { score })
        .collect()
}

impl FitnessSharing {
    /// Shared scores for a snapshot.
    pub fn transform(&self, snapshot: &ScoreSnapshot) -> Vec<f64> {
        let distances = distance_matrix(snapshot.genomes(), self.pnorm_exp);
        let counts = niche_counts(&distances, self.alpha, self.sigma);
        let n = counts.len();
        if n > 1 && counts.iter().all(|&c| c >= n as f64) {
            log::warn!("fitness sharing: all {n} organisms occupy one niche; sharing has no effect");
        }
        shared_fitness(&counts, snapshot.aggregates())
    }
}

impl Selector for FitnessSharing {
    fn select<R: Rng + ?Sized>(
        &self,
        snapshot: &ScoreSnapshot,
        rng: &mut R,
    ) -> Result<Vec<usize>, SelectionError> {
        self.validate(snapshot.len())?;
        let shared = self.transform(snapshot);
        Ok(run_tournaments(&shared, self.tournament_size, rng))
    }

    fn validate(&self, population_size: usize) -> Result<(), SelectionError> {
        check_size(self.tournament_size, population_size)?;
        if !self.pnorm_exp.is_finite() || self.pnorm_exp <= 0.0 {
            return Err(SelectionError::InvalidParameter {
                name: "p-norm exponent",
                value: self.pnorm_exp,
            });
        }
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(SelectionError::InvalidParameter {
                name: "sharing alpha",
                value: self.alpha,
            });
        }
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(SelectionError::InvalidParameter {
                name: "sharing sigma",
                value: self.sigma,
            });
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fitness sharing"
    }
}
