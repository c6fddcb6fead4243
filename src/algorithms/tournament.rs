use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

use crate::Selector;
use crate::snapshot::{ScoreSnapshot, SelectionError};

/// Tournament selection over aggregate scores.
///
/// Each of the N picks draws `size` distinct slots and keeps the one with
/// the highest value. Entrants are drawn without replacement, unlike the
/// classic formulation that samples them uniformly with replacement; a
/// slot never meets itself, and a tournament as large as the population
/// always finds the global best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub size: usize,
}

impl Tournament {
    pub fn new(size: usize) -> Self {
        Self { size }
    }
}

impl Default for Tournament {
    fn default() -> Self {
        Self { size: 8 }
    }
}

pub(crate) fn check_size(size: usize, population: usize) -> Result<(), SelectionError> {
    if size == 0 || size > population {
        return Err(SelectionError::TournamentSizeOutOfRange { size, population });
    }
    Ok(())
}

/// Runs one tournament and returns the winning slot.
/// Ties keep the entrant drawn first.
pub fn tournament<R: Rng + ?Sized>(values: &[f64], size: usize, rng: &mut R) -> usize {
    let mut entrants = index::sample(rng, values.len(), size).into_iter();
    let Some(mut best) = entrants.next() else {
        return 0;
    };
    for idx in entrants {
        if values[idx] > values[best] {
            best = idx;
        }
    }
    best
}

/// N independent tournaments over `values`.
pub(crate) fn run_tournaments<R: Rng + ?Sized>(
    values: &[f64],
    size: usize,
    rng: &mut R,
) -> Vec<usize> {
    (0..values.len())
        .map(|_| tournament(values, size, rng))
        .collect()
}

impl Selector for Tournament {
    fn select<R: Rng + ?Sized>(
        &self,
        snapshot: &ScoreSnapshot,
        rng: &mut R,
    ) -> Result<Vec<usize>, SelectionError> {
        self.validate(snapshot.len())?;
        Ok(run_tournaments(snapshot.aggregates(), self.size, rng))
    }

    fn validate(&self, population_size: usize) -> Result<(), SelectionError> {
        check_size(self.size, population_size)
    }

    fn name(&self) -> &'static str {
        "tournament"
    }
}
