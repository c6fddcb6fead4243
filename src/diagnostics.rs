//! Diagnostic fitness landscapes.
//!
//! Each landscape scores a genome gene-by-gene relative to a target value
//! `T`. Genes the landscape rewards keep their value as their score; genes
//! it does not reward are multiplied by `credit` (0 zeroes them, 1 leaves
//! them untouched). The maximum attainable score per objective is `T` in
//! every landscape, so an objective is optimal iff `T - score <= accuracy`.
//!
//! | Kind | Rewarded genes |
//! |------|----------------|
//! | `Exploitation` | all of them |
//! | `StructuredExploitation` | the leading non-increasing run |
//! | `ContraEcology` | only the highest gene |
//! | `Exploration` | the non-increasing run starting at the highest gene |

use serde::{Deserialize, Serialize};

use crate::Evaluator;
use crate::config::ConfigError;
use crate::organism::{Evaluation, OrganismError, first_argmax};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Every gene scores its own value.
    #[default]
    Exploitation,
    /// Only the leading non-increasing run of genes is rewarded.
    StructuredExploitation,
    /// Only the single highest gene is rewarded.
    ContraEcology,
    /// Only the non-increasing run starting at the highest gene is rewarded.
    Exploration,
}

impl TryFrom<u8> for DiagnosticKind {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Exploitation),
            1 => Ok(Self::StructuredExploitation),
            2 => Ok(Self::ContraEcology),
            3 => Ok(Self::Exploration),
            other => Err(ConfigError::UnknownDiagnostic(other)),
        }
    }
}

impl DiagnosticKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Exploitation => "exploitation",
            Self::StructuredExploitation => "structured exploitation",
            Self::ContraEcology => "contradictory ecology",
            Self::Exploration => "exploration",
        }
    }

    /// Raw score vector for `genome`.
    pub fn score(&self, genome: &[f64], credit: f64) -> Vec<f64> {
        if genome.is_empty() {
            return Vec::new();
        }
        let rewarded = match self {
            Self::Exploitation => 0..genome.len(),
            Self::StructuredExploitation => 0..descending_run_end(genome, 0) + 1,
            Self::ContraEcology => {
                let active = first_argmax(genome);
                active..active + 1
            }
            Self::Exploration => {
                let start = first_argmax(genome);
                start..descending_run_end(genome, start) + 1
            }
        };
        genome
            .iter()
            .enumerate()
            .map(|(i, &g)| if rewarded.contains(&i) { g } else { g * credit })
            .collect()
    }
}

/// Last index of the non-increasing run that begins at `from`.
fn descending_run_end(genome: &[f64], from: usize) -> usize {
    let mut end = from;
    while end + 1 < genome.len() && genome[end + 1] <= genome[end] {
        end += 1;
    }
    end
}

/// A landscape bound to a target, credit and accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    kind: DiagnosticKind,
    target: f64,
    credit: f64,
    accuracy: f64,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        target: f64,
        credit: f64,
        accuracy: f64,
    ) -> Result<Self, ConfigError> {
        if !target.is_finite() || target <= 0.0 {
            return Err(ConfigError::InvalidTarget(target));
        }
        if !(0.0..=1.0).contains(&credit) {
            return Err(ConfigError::InvalidCredit(credit));
        }
        if !accuracy.is_finite() || accuracy < 0.0 {
            return Err(ConfigError::InvalidAccuracy(accuracy));
        }
        Ok(Self {
            kind,
            target,
            credit,
            accuracy,
        })
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn credit(&self) -> f64 {
        self.credit
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Flags each objective whose score is within `accuracy` of the target.
    pub fn optimal_vector(&self, score: &[f64]) -> Vec<bool> {
        score
            .iter()
            .map(|&s| self.target - s <= self.accuracy)
            .collect()
    }
}

impl Evaluator for Diagnostic {
    fn evaluate(&self, genome: &[f64]) -> Result<Evaluation, OrganismError> {
        let score = self.kind.score(genome, self.credit);
        let optimal = self.optimal_vector(&score);
        Evaluation::new(score, optimal)
    }
}
