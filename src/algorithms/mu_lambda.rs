use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::Selector;
use crate::snapshot::{ScoreSnapshot, SelectionError};

/// Deterministic (μ, λ) truncation selection.
///
/// The μ best slots are chosen by walking score groups from the top, then
/// repeated in order until all λ (population size) parent slots are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuLambda {
    pub mu: usize,
}

impl MuLambda {
    pub fn new(mu: usize) -> Self {
        Self { mu }
    }
}

impl Default for MuLambda {
    fn default() -> Self {
        Self { mu: 100 }
    }
}

/// Groups slot indices by distinct value, highest value first.
/// Indices inside a group keep their original order.
pub fn fitness_groups(values: &[f64]) -> Vec<(f64, Vec<usize>)> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    // stable sort keeps insertion order within equal values
    order.sort_by(|&a, &b| values[b].partial_cmp(&values[a]).unwrap_or(Ordering::Equal));

    let mut groups: Vec<(f64, Vec<usize>)> = Vec::new();
    for idx in order {
        match groups.last_mut() {
            Some((value, members)) if *value == values[idx] => members.push(idx),
            _ => groups.push((values[idx], vec![idx])),
        }
    }
    groups
}

impl Selector for MuLambda {
    fn select<R: Rng + ?Sized>(
        &self,
        snapshot: &ScoreSnapshot,
        _rng: &mut R,
    ) -> Result<Vec<usize>, SelectionError> {
        let lambda = snapshot.len();
        self.validate(lambda)?;

        let mut best = Vec::with_capacity(self.mu);
        for (_, members) in fitness_groups(snapshot.aggregates()) {
            let remaining = self.mu - best.len();
            if remaining == 0 {
                break;
            }
            best.extend(members.into_iter().take(remaining));
        }

        Ok(best.iter().copied().cycle().take(lambda).collect())
    }

    fn validate(&self, population_size: usize) -> Result<(), SelectionError> {
        if self.mu == 0 || self.mu > population_size {
            return Err(SelectionError::MuOutOfRange {
                mu: self.mu,
                lambda: population_size,
            });
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mu-lambda"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_descend_and_keep_order() {
        let groups = fitness_groups(&[5.0, 10.0, 5.0, 1.0, 10.0]);
        assert_eq!(
            groups,
            vec![(10.0, vec![1, 4]), (5.0, vec![0, 2]), (1.0, vec![3])]
        );
    }

    #[test]
    fn empty_values_have_no_groups() {
        assert!(fitness_groups(&[]).is_empty());
    }
}
