//! Read-only, per-generation view of the population's scores.
//!
//! A [`ScoreSnapshot`] copies the aggregate scores, score vectors and genomes
//! out of the live population so selection can run without borrowing it.
//! It is only meaningful for the generation it was built from.

use crate::organism::{Organism, OrganismError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectionError {
    #[error("population is empty")]
    EmptyPopulation,
    #[error("population has {found} organisms, expected {expected}")]
    PopulationSizeMismatch { expected: usize, found: usize },
    #[error("row {index} has {found} objectives, expected {expected}")]
    ObjectiveCountMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("organism {index} has a non-finite aggregate score")]
    NonFiniteScore { index: usize },
    #[error("organism {index}: {source}")]
    Organism {
        index: usize,
        #[source]
        source: OrganismError,
    },
    #[error("mu ({mu}) must be between 1 and lambda ({lambda})")]
    MuOutOfRange { mu: usize, lambda: usize },
    #[error("tournament size ({size}) must be between 1 and the population size ({population})")]
    TournamentSizeOutOfRange { size: usize, population: usize },
    #[error("neighbourhood size k ({k}) must be between 1 and population size - 1 ({population} - 1)")]
    NeighbourhoodOutOfRange { k: usize, population: usize },
    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSnapshot {
    aggregates: Vec<f64>,
    scores: Vec<Vec<f64>>,
    genomes: Vec<Vec<f64>>,
    objective_count: usize,
}

impl ScoreSnapshot {
    /// Snapshots a scored population.
    ///
    /// Fails if the population does not have `population_size` members, if
    /// any member is unscored, or if any score vector is not
    /// `objective_count` long.
    pub fn build(
        population: &[Organism],
        population_size: usize,
        objective_count: usize,
    ) -> Result<Self, SelectionError> {
        if population.len() != population_size {
            return Err(SelectionError::PopulationSizeMismatch {
                expected: population_size,
                found: population.len(),
            });
        }
        let mut scores = Vec::with_capacity(population.len());
        let mut genomes = Vec::with_capacity(population.len());
        for (index, org) in population.iter().enumerate() {
            let score = org
                .score()
                .map_err(|source| SelectionError::Organism { index, source })?;
            if score.len() != objective_count {
                return Err(SelectionError::ObjectiveCountMismatch {
                    index,
                    expected: objective_count,
                    found: score.len(),
                });
            }
            scores.push(score.to_vec());
            genomes.push(org.genome().to_vec());
        }
        Self::from_parts(scores, genomes)
    }

    /// Snapshot from raw score vectors, using the scores as genomes too.
    pub fn from_scores(scores: Vec<Vec<f64>>) -> Result<Self, SelectionError> {
        let genomes = scores.clone();
        Self::from_parts(scores, genomes)
    }

    /// Snapshot from raw score vectors and genomes.
    /// Aggregates are the row sums of `scores`.
    pub fn from_parts(
        scores: Vec<Vec<f64>>,
        genomes: Vec<Vec<f64>>,
    ) -> Result<Self, SelectionError> {
        let Some(first) = scores.first() else {
            return Err(SelectionError::EmptyPopulation);
        };
        let objective_count = first.len();
        if genomes.len() != scores.len() {
            return Err(SelectionError::PopulationSizeMismatch {
                expected: scores.len(),
                found: genomes.len(),
            });
        }
        for (index, (score, genome)) in scores.iter().zip(&genomes).enumerate() {
            if score.len() != objective_count || score.is_empty() {
                return Err(SelectionError::ObjectiveCountMismatch {
                    index,
                    expected: objective_count.max(1),
                    found: score.len(),
                });
            }
            if genome.len() != objective_count {
                return Err(SelectionError::ObjectiveCountMismatch {
                    index,
                    expected: objective_count,
                    found: genome.len(),
                });
            }
        }

        let aggregates: Vec<f64> = scores.iter().map(|s| s.iter().sum()).collect();
        if let Some(index) = aggregates.iter().position(|a| !a.is_finite()) {
            return Err(SelectionError::NonFiniteScore { index });
        }

        Ok(Self {
            aggregates,
            scores,
            genomes,
            objective_count,
        })
    }

    pub fn len(&self) -> usize {
        self.aggregates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }

    pub fn objective_count(&self) -> usize {
        self.objective_count
    }

    /// Aggregate score per slot.
    pub fn aggregates(&self) -> &[f64] {
        &self.aggregates
    }

    /// N×M score matrix.
    pub fn scores(&self) -> &[Vec<f64>] {
        &self.scores
    }

    /// N×M genome matrix.
    pub fn genomes(&self) -> &[Vec<f64>] {
        &self.genomes
    }
}
