//! The generational loop: evaluate, select, reproduce.
//!
//! [`DiagnosticWorld`] owns the population, the random generator and the
//! injected evaluator, selector and mutation operator. Each
//! [`Evolver::step`] runs one generation in strict order:
//!
//! 1. **Evaluate** every unscored organism. Unmutated clones arrive already
//!    scored (they inherited their parent's evaluation) and are skipped.
//! 2. **Select** parent slots from a [`ScoreSnapshot`] of the population.
//! 3. **Reproduce**: each parent slot yields one offspring in the same
//!    position of the next population. Offspring that mutation left
//!    untouched inherit the parent's evaluation.
//!
//! Any contract violation aborts the generation with a [`WorldError`].
//!
//! # Determinism
//!
//! All randomness comes from one seeded [`Pcg64`]. The world serializes
//! together with the generator, so a checkpoint resumes exactly.

use rand::prelude::SeedableRng;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::algorithms::SelectionScheme;
use crate::config::{ConfigError, ExperimentConfig};
use crate::diagnostics::Diagnostic;
use crate::mutation::GaussianMutation;
use crate::organism::{Evaluation, Organism, OrganismError};
use crate::snapshot::{ScoreSnapshot, SelectionError};
use crate::{Evaluator, Evolver, Selector};

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("organism {index}: {source}")]
    Organism {
        index: usize,
        #[source]
        source: OrganismError,
    },
    #[error("selection failed: {0}")]
    Selection(#[from] SelectionError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("selection returned {found} parents, expected {expected}")]
    ParentCount { expected: usize, found: usize },
    #[error("parent index {index} is outside the population of {population}")]
    ParentOutOfRange { index: usize, population: usize },
}

/// Summary of one generation, taken after evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub best_aggregate: f64,
    pub mean_aggregate: f64,
    /// Highest optimized-objective count of any organism.
    pub max_optimized: usize,
    /// Objectives optimized by at least one organism.
    pub unique_optimized: usize,
    /// Organisms scored this generation (the rest inherited a score).
    pub evaluated: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticWorld<E = Diagnostic, S = SelectionScheme> {
    population: Vec<Organism>,
    evaluator: E,
    selector: S,
    mutation: GaussianMutation,
    population_size: usize,
    objective_count: usize,
    generation: usize,
    rng: Pcg64,
}

impl DiagnosticWorld<Diagnostic, SelectionScheme> {
    /// Builds a world from a validated configuration.
    pub fn from_config(config: &ExperimentConfig) -> Result<Self, WorldError> {
        config.validate()?;
        log::info!(
            "diagnostic: {}, selection: {}, N = {}, M = {}",
            config.diagnostic.name(),
            config.selection.name(),
            config.population_size,
            config.objective_count
        );
        Self::new(
            config.build_diagnostic()?,
            config.selection.clone(),
            config.build_mutation()?,
            config.population_size,
            config.objective_count,
            config.seed,
        )
    }
}

impl<E: Evaluator, S: Selector> DiagnosticWorld<E, S> {
    /// Creates the initial population: `population_size` zero-filled,
    /// unscored genomes of length `objective_count`.
    pub fn new(
        evaluator: E,
        selector: S,
        mutation: GaussianMutation,
        population_size: usize,
        objective_count: usize,
        seed: u64,
    ) -> Result<Self, WorldError> {
        if population_size == 0 {
            return Err(ConfigError::PopulationTooSmall.into());
        }
        if objective_count == 0 {
            return Err(ConfigError::NoObjectives.into());
        }
        selector.validate(population_size)?;

        let population = (0..population_size)
            .map(|index| {
                Organism::new(objective_count)
                    .map_err(|source| WorldError::Organism { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            population,
            evaluator,
            selector,
            mutation,
            population_size,
            objective_count,
            generation: 0,
            rng: Pcg64::seed_from_u64(seed),
        })
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn population_size(&self) -> usize {
        self.population_size
    }

    pub fn objective_count(&self) -> usize {
        self.objective_count
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn selector(&self) -> &S {
        &self.selector
    }

    pub fn mutation(&self) -> &GaussianMutation {
        &self.mutation
    }

    /// Scores every organism that is not already scored.
    /// Returns how many were evaluated.
    pub fn evaluation_step(&mut self) -> Result<usize, WorldError> {
        let evaluator = &self.evaluator;
        let score = |(index, org): (usize, &Organism)| {
            evaluator
                .evaluate(org.genome())
                .map(|e| (index, e))
                .map_err(|source| WorldError::Organism { index, source })
        };

        #[cfg(feature = "parallel")]
        let evaluations: Vec<(usize, Evaluation)> = self
            .population
            .par_iter()
            .enumerate()
            .filter(|(_, org)| !org.is_scored())
            .map(score)
            .collect::<Result<_, _>>()?;
        #[cfg(not(feature = "parallel"))]
        let evaluations: Vec<(usize, Evaluation)> = self
            .population
            .iter()
            .enumerate()
            .filter(|(_, org)| !org.is_scored())
            .map(score)
            .collect::<Result<_, _>>()?;

        let evaluated = evaluations.len();
        for (index, evaluation) in evaluations {
            self.population[index]
                .set_evaluation(evaluation)
                .map_err(|source| WorldError::Organism { index, source })?;
        }
        log::debug!(
            "generation {}: evaluated {} of {} organisms",
            self.generation,
            evaluated,
            self.population.len()
        );
        Ok(evaluated)
    }

    /// Read-only score view of the current, fully scored population.
    pub fn snapshot(&self) -> Result<ScoreSnapshot, WorldError> {
        Ok(ScoreSnapshot::build(
            &self.population,
            self.population_size,
            self.objective_count,
        )?)
    }

    /// Runs the selector and checks its output: one in-range parent per slot.
    pub fn selection_step(&mut self) -> Result<Vec<usize>, WorldError> {
        let snapshot = self.snapshot()?;
        let parents = self.selector.select(&snapshot, &mut self.rng)?;
        if parents.len() != self.population_size {
            return Err(WorldError::ParentCount {
                expected: self.population_size,
                found: parents.len(),
            });
        }
        if let Some(&index) = parents.iter().find(|&&p| p >= self.population_size) {
            return Err(WorldError::ParentOutOfRange {
                index,
                population: self.population_size,
            });
        }
        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "generation {}: {} selected {} distinct parents",
                self.generation,
                self.selector.name(),
                count_distinct(&parents, self.population_size)
            );
        }
        Ok(parents)
    }

    /// Replaces the population with one offspring per parent slot.
    pub fn reproduction_step(&mut self, parents: &[usize]) -> Result<(), WorldError> {
        if parents.len() != self.population_size {
            return Err(WorldError::ParentCount {
                expected: self.population_size,
                found: parents.len(),
            });
        }

        let mut next = Vec::with_capacity(self.population_size);
        let mut clones = 0;
        for (slot, &parent_idx) in parents.iter().enumerate() {
            let parent = self
                .population
                .get(parent_idx)
                .ok_or(WorldError::ParentOutOfRange {
                    index: parent_idx,
                    population: self.population_size,
                })?;
            let wrap = |source| WorldError::Organism { index: slot, source };

            let mut child = Organism::from_genome(parent.genome().to_vec()).map_err(wrap)?;
            let mutations = self
                .mutation
                .mutate(child.genome_mut().map_err(wrap)?, &mut self.rng);
            if mutations == 0 {
                let inherited = parent.evaluation().map_err(|source| WorldError::Organism {
                    index: parent_idx,
                    source,
                })?;
                child.inherit(inherited).map_err(wrap)?;
                clones += 1;
            }
            next.push(child);
        }

        log::debug!(
            "generation {}: {} of {} offspring are unmutated clones",
            self.generation,
            clones,
            self.population_size
        );
        self.population = next;
        Ok(())
    }

    /// Population summary. Every organism must be scored.
    pub fn stats(&self, evaluated: usize) -> Result<GenerationStats, WorldError> {
        let mut best_aggregate = f64::NEG_INFINITY;
        let mut total = 0.0;
        let mut max_optimized = 0;
        let mut optimized_anywhere = vec![false; self.objective_count];

        for (index, org) in self.population.iter().enumerate() {
            let evaluation = org
                .evaluation()
                .map_err(|source| WorldError::Organism { index, source })?;
            best_aggregate = best_aggregate.max(evaluation.aggregate());
            total += evaluation.aggregate();
            max_optimized = max_optimized.max(evaluation.optimized_count());
            for (seen, &opt) in optimized_anywhere.iter_mut().zip(evaluation.optimal()) {
                *seen |= opt;
            }
        }

        Ok(GenerationStats {
            generation: self.generation,
            best_aggregate,
            mean_aggregate: total / self.population.len() as f64,
            max_optimized,
            unique_optimized: optimized_anywhere.iter().filter(|&&o| o).count(),
            evaluated,
        })
    }

    /// Runs `generations` steps, stopping at the first error.
    pub fn run(&mut self, generations: usize) -> Result<Vec<GenerationStats>, WorldError> {
        let mut history = Vec::with_capacity(generations);
        for _ in 0..generations {
            history.push(self.step()?);
        }
        Ok(history)
    }
}

fn count_distinct(indices: &[usize], population: usize) -> usize {
    let mut seen = vec![false; population];
    for &i in indices {
        seen[i] = true;
    }
    seen.iter().filter(|&&s| s).count()
}

impl<E: Evaluator, S: Selector> Evolver for DiagnosticWorld<E, S> {
    fn step(&mut self) -> Result<GenerationStats, WorldError> {
        let evaluated = self.evaluation_step()?;
        let stats = self.stats(evaluated)?;
        let parents = self.selection_step()?;
        self.reproduction_step(&parents)?;

        log::info!(
            "generation {}: best {:.3}, mean {:.3}, max optimized {}, unique optimized {}",
            stats.generation,
            stats.best_aggregate,
            stats.mean_aggregate,
            stats.max_optimized,
            stats.unique_optimized
        );
        self.generation += 1;
        Ok(stats)
    }

    fn population(&self) -> &[Organism] {
        &self.population
    }
}
