use rand::Rng;

pub use config::{ConfigError, ExperimentConfig, MutationConfig};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use mutation::GaussianMutation;
pub use organism::{Evaluation, Organism, OrganismError, OrganismState};
pub use snapshot::{ScoreSnapshot, SelectionError};
pub use world::{DiagnosticWorld, GenerationStats, WorldError};

/// A fitness landscape that scores a genome.
/// Implementations must be pure: the same genome always yields the same evaluation.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, genome: &[f64]) -> Result<Evaluation, OrganismError>;
}

/// A selection scheme: turns one generation's scores into parent slot indices.
///
/// The returned vector has exactly one entry per population slot and may
/// repeat indices. Schemes never touch the live population, only the
/// [`ScoreSnapshot`] built from it.
pub trait Selector {
    fn select<R: Rng + ?Sized>(
        &self,
        snapshot: &ScoreSnapshot,
        rng: &mut R,
    ) -> Result<Vec<usize>, SelectionError>;

    /// Checks the scheme's parameters against a population size.
    fn validate(&self, population_size: usize) -> Result<(), SelectionError>;

    fn name(&self) -> &'static str;
}

/// The master engine trait.
pub trait Evolver {
    fn step(&mut self) -> Result<GenerationStats, WorldError>;
    fn population(&self) -> &[Organism];
}

pub mod config;
pub mod diagnostics;
pub mod matrix;
pub mod mutation;
pub mod organism;
pub mod snapshot;
pub mod world;

pub mod algorithms {
    pub mod fitness_sharing;
    pub mod lexicase;
    pub mod mu_lambda;
    pub mod novelty;
    pub mod scheme;
    pub mod tournament;

    pub use fitness_sharing::FitnessSharing;
    pub use lexicase::EpsilonLexicase;
    pub use mu_lambda::MuLambda;
    pub use novelty::{NoveltyMetric, NoveltySearch};
    pub use scheme::{SelectionKind, SelectionScheme};
    pub use tournament::Tournament;
}
