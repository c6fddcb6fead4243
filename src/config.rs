//! Experiment configuration.
//!
//! Loaded from JSON; every field has a default so partial files work:
//!
//! ```json
//! {
//!   "population_size": 512,
//!   "objective_count": 100,
//!   "diagnostic": "ContraEcology",
//!   "selection": { "EpsilonLexicase": { "epsilon": 0.0 } }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::Selector;
use crate::algorithms::SelectionScheme;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::mutation::GaussianMutation;
use crate::snapshot::SelectionError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown selection scheme selector: {0}")]
    UnknownSelection(u8),
    #[error("Unknown diagnostic selector: {0}")]
    UnknownDiagnostic(u8),
    #[error("Population size must be at least 1")]
    PopulationTooSmall,
    #[error("Objective count must be at least 1")]
    NoObjectives,
    #[error("Target must be finite and positive, got {0}")]
    InvalidTarget(f64),
    #[error("Accuracy must be finite and non-negative, got {0}")]
    InvalidAccuracy(f64),
    #[error("Credit must be within [0, 1], got {0}")]
    InvalidCredit(f64),
    #[error("Invalid mutation parameters: {0}")]
    InvalidMutation(String),
    #[error("Invalid selection parameters: {0}")]
    InvalidSelection(#[from] SelectionError),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Mutation settings; the upper bound is the experiment target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Per-gene mutation probability.
    pub rate: f64,
    pub mean: f64,
    pub std: f64,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            rate: 0.007,
            mean: 0.0,
            std: 1.0,
        }
    }
}

/// Top-level configuration for one diagnostic run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Seed for the run's single random generator.
    pub seed: u64,
    /// N: organisms per generation.
    pub population_size: usize,
    /// M: genes per genome and objectives per score vector.
    pub objective_count: usize,
    pub generations: usize,
    /// T: upper bound of every gene.
    pub target: f64,
    /// Absolute tolerance for flagging an objective optimal.
    pub accuracy: f64,
    /// Multiplier for genes a diagnostic does not reward.
    pub credit: f64,
    pub diagnostic: DiagnosticKind,
    pub mutation: MutationConfig,
    pub selection: SelectionScheme,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            population_size: 512,
            objective_count: 100,
            generations: 1000,
            target: 100.0,
            accuracy: 0.99,
            credit: 0.0,
            diagnostic: DiagnosticKind::default(),
            mutation: MutationConfig::default(),
            selection: SelectionScheme::default(),
        }
    }
}

impl ExperimentConfig {
    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::PopulationTooSmall);
        }
        if self.objective_count == 0 {
            return Err(ConfigError::NoObjectives);
        }
        self.build_diagnostic()?;
        self.build_mutation()?;
        self.selection.validate(self.population_size)?;
        Ok(())
    }

    pub fn build_diagnostic(&self) -> Result<Diagnostic, ConfigError> {
        Diagnostic::new(self.diagnostic, self.target, self.credit, self.accuracy)
    }

    pub fn build_mutation(&self) -> Result<GaussianMutation, ConfigError> {
        GaussianMutation::new(
            self.mutation.rate,
            self.mutation.mean,
            self.mutation.std,
            self.target,
        )
    }
}
