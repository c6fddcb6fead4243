use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use crate::Selector;
use crate::snapshot::{ScoreSnapshot, SelectionError};

/// Epsilon-lexicase selection.
///
/// Every pick shuffles the objectives and filters the whole population
/// through them one at a time, keeping candidates within `epsilon` of the
/// best remaining score. Survivors of the last objective are broken at
/// random.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpsilonLexicase {
    /// Absolute tolerance below the per-objective maximum.
    pub epsilon: f64,
}

impl EpsilonLexicase {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }
}

impl Default for EpsilonLexicase {
    fn default() -> Self {
        Self { epsilon: 0.0 }
    }
}

/// One lexicase pick over an N×M score matrix.
pub fn lexicase_pick<R: Rng + ?Sized>(scores: &[Vec<f64>], epsilon: f64, rng: &mut R) -> usize {
    let objectives = scores.first().map_or(0, Vec::len);
    let mut order: Vec<usize> = (0..objectives).collect();
    order.shuffle(rng);

    let mut candidates: Vec<usize> = (0..scores.len()).collect();
    for obj in order {
        if candidates.len() <= 1 {
            break;
        }
        let best = candidates
            .iter()
            .map(|&c| scores[c][obj])
            .fold(f64::NEG_INFINITY, f64::max);
        candidates.retain(|&c| scores[c][obj] >= best - epsilon);
    }

    match candidates.as_slice() {
        [only] => *only,
        survivors => survivors.choose(rng).copied().unwrap_or(0),
    }
}

impl Selector for EpsilonLexicase {
    fn select<R: Rng + ?Sized>(
        &self,
        snapshot: &ScoreSnapshot,
        rng: &mut R,
    ) -> Result<Vec<usize>, SelectionError> {
        self.validate(snapshot.len())?;
        Ok((0..snapshot.len())
            .map(|_| lexicase_pick(snapshot.scores(), self.epsilon, rng))
            .collect())
    }

    fn validate(&self, population_size: usize) -> Result<(), SelectionError> {
        if population_size == 0 {
            return Err(SelectionError::EmptyPopulation);
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(SelectionError::InvalidParameter {
                name: "lexicase epsilon",
                value: self.epsilon,
            });
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "epsilon lexicase"
    }
}
