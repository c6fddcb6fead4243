//! Novelty search: tournaments over distance to the nearest neighbours.
//!
//! An organism's novelty is the mean distance to its `k` nearest other
//! organisms in phenotype space. Rare phenotypes score high.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::tournament::{check_size, run_tournaments};
use crate::Selector;
use crate::matrix::{distance_matrix, scalar_distance_matrix};
use crate::snapshot::{ScoreSnapshot, SelectionError};

/// The phenotype space novelty is measured in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoveltyMetric {
    /// Absolute difference between aggregate scores.
    #[default]
    Aggregate,
    /// p-norm distance between score vectors.
    ScoreVector,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoveltySearch {
    pub tournament_size: usize,
    /// Number of nearest neighbours averaged.
    pub k: usize,
    #[serde(default)]
    pub metric: NoveltyMetric,
    /// Only used by [`NoveltyMetric::ScoreVector`].
    #[serde(default = "default_pnorm_exp")]
    pub pnorm_exp: f64,
}

fn default_pnorm_exp() -> f64 {
    2.0
}

impl Default for NoveltySearch {
    fn default() -> Self {
        Self {
            tournament_size: 8,
            k: 15,
            metric: NoveltyMetric::Aggregate,
            pnorm_exp: default_pnorm_exp(),
        }
    }
}

/// The `k` smallest distances from each organism to the others, ascending.
/// The diagonal is skipped, so duplicates of an organism count at distance 0.
pub fn nearest_neighbours(distances: &[Vec<f64>], k: usize) -> Vec<Vec<f64>> {
    distances
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut others: Vec<f64> = row
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, &d)| d)
                .collect();
            others.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
            others.truncate(k);
            others
        })
        .collect()
}

/// Mean of each neighbourhood; an empty neighbourhood scores 0.
pub fn novelty_scores(neighbourhoods: &[Vec<f64>]) -> Vec<f64> {
    neighbourhoods
        .iter()
        .map(|n| {
            if n.is_empty() {
                0.0
            } else {
                n.iter().sum::<f64>() / n.len() as f64
            }
        })
        .collect()
}

impl NoveltySearch {
    /// Novelty score per slot.
    pub fn transform(&self, snapshot: &ScoreSnapshot) -> Vec<f64> {
        let distances = match self.metric {
            NoveltyMetric::Aggregate => scalar_distance_matrix(snapshot.aggregates()),
            NoveltyMetric::ScoreVector => distance_matrix(snapshot.scores(), self.pnorm_exp),
        };
        novelty_scores(&nearest_neighbours(&distances, self.k))
    }
}

impl Selector for NoveltySearch {
    fn select<R: Rng + ?Sized>(
        &self,
        snapshot: &ScoreSnapshot,
        rng: &mut R,
    ) -> Result<Vec<usize>, SelectionError> {
        self.validate(snapshot.len())?;
        let novelty = self.transform(snapshot);
        Ok(run_tournaments(&novelty, self.tournament_size, rng))
    }

    fn validate(&self, population_size: usize) -> Result<(), SelectionError> {
        check_size(self.tournament_size, population_size)?;
        // a lone organism has no neighbours to measure against
        if self.k == 0 || (population_size > 1 && self.k >= population_size) {
            return Err(SelectionError::NeighbourhoodOutOfRange {
                k: self.k,
                population: population_size,
            });
        }
        if self.metric == NoveltyMetric::ScoreVector
            && (!self.pnorm_exp.is_finite() || self.pnorm_exp <= 0.0)
        {
            return Err(SelectionError::InvalidParameter {
                name: "p-norm exponent",
                value: self.pnorm_exp,
            });
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "novelty search"
    }
}
