//! Organisms: a real-valued genome plus a single-assignment evaluation record.
//!
//! An organism is either [`OrganismState::Unscored`] or
//! [`OrganismState::Scored`]. The derived data (score vector, optimal
//! vector, aggregate score, optimized count, start position) lives in one
//! [`Evaluation`] value, so the fields can never disagree about whether
//! they have been set.
//!
//! # Lifecycle
//!
//! 1. Born `Unscored` (zero-filled for the first generation, copied from a
//!    parent afterwards). The genome is only writable in this state.
//! 2. Moves to `Scored` exactly once, either through
//!    [`Organism::set_evaluation`] or, for unmutated clones,
//!    [`Organism::inherit`].
//! 3. [`Organism::reset`] clears the record before the slot is reused.
//!
//! Setting a record twice or reading a missing one returns an
//! [`OrganismError`]; both indicate a caller bug.

use serde::{Deserialize, Serialize};

/// Genome value every gene starts from in the initial population.
pub const START_VALUE: f64 = 0.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrganismError {
    #[error("genome must have at least one gene")]
    EmptyGenome,
    #[error("organism is already scored; reset it before setting a new evaluation")]
    AlreadyScored,
    #[error("organism has not been scored")]
    NotScored,
    #[error("genome cannot be modified while the organism is scored")]
    GenomeLocked,
    #[error("{what} has length {found}, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("optimized count {count} exceeds objective count {objectives}")]
    CountOutOfRange { count: usize, objectives: usize },
    #[error("start position {start} is outside 0..{objectives}")]
    StartOutOfRange { start: usize, objectives: usize },
    #[error("optimized count {count} disagrees with {flagged} objectives flagged optimal")]
    CountMismatch { count: usize, flagged: usize },
    #[error("aggregate {aggregate} disagrees with score sum {sum}")]
    AggregateMismatch { aggregate: f64, sum: f64 },
    #[error("start position {start} is not the first maximum score at {expected}")]
    StartMismatch { start: usize, expected: usize },
}

/// Relative tolerance allowed between a stored aggregate and its score sum.
const AGGREGATE_TOLERANCE: f64 = 1e-9;

/// Everything derived from scoring one genome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    score: Vec<f64>,
    optimal: Vec<bool>,
    aggregate: f64,
    optimized: usize,
    start: usize,
}

impl Evaluation {
    /// Builds an evaluation, deriving the aggregate score, optimized count
    /// and start position from the two vectors.
    pub fn new(score: Vec<f64>, optimal: Vec<bool>) -> Result<Self, OrganismError> {
        if score.is_empty() {
            return Err(OrganismError::EmptyGenome);
        }
        if optimal.len() != score.len() {
            return Err(OrganismError::LengthMismatch {
                what: "optimal vector",
                expected: score.len(),
                found: optimal.len(),
            });
        }
        let aggregate = score.iter().sum();
        let optimized = optimal.iter().filter(|&&o| o).count();
        let start = first_argmax(&score);
        Ok(Self {
            score,
            optimal,
            aggregate,
            optimized,
            start,
        })
    }

    /// Rebuilds an evaluation from previously computed parts.
    ///
    /// The parts must agree with the vectors: `optimized` is the number of
    /// flags set, `aggregate` the score sum and `start` the first maximum.
    pub fn from_parts(
        score: Vec<f64>,
        optimal: Vec<bool>,
        optimized: usize,
        aggregate: f64,
        start: usize,
    ) -> Result<Self, OrganismError> {
        if score.is_empty() {
            return Err(OrganismError::EmptyGenome);
        }
        if optimal.len() != score.len() {
            return Err(OrganismError::LengthMismatch {
                what: "optimal vector",
                expected: score.len(),
                found: optimal.len(),
            });
        }
        if optimized > score.len() {
            return Err(OrganismError::CountOutOfRange {
                count: optimized,
                objectives: score.len(),
            });
        }
        if start >= score.len() {
            return Err(OrganismError::StartOutOfRange {
                start,
                objectives: score.len(),
            });
        }
        let flagged = optimal.iter().filter(|&&o| o).count();
        if optimized != flagged {
            return Err(OrganismError::CountMismatch {
                count: optimized,
                flagged,
            });
        }
        let sum: f64 = score.iter().sum();
        let agrees = (aggregate - sum).abs() <= AGGREGATE_TOLERANCE * sum.abs().max(1.0);
        if !agrees {
            return Err(OrganismError::AggregateMismatch { aggregate, sum });
        }
        let expected = first_argmax(&score);
        if start != expected {
            return Err(OrganismError::StartMismatch { start, expected });
        }
        Ok(Self {
            score,
            optimal,
            aggregate,
            optimized,
            start,
        })
    }

    pub fn score(&self) -> &[f64] {
        &self.score
    }

    pub fn optimal(&self) -> &[bool] {
        &self.optimal
    }

    /// Sum of the score vector.
    pub fn aggregate(&self) -> f64 {
        self.aggregate
    }

    /// Number of objectives flagged optimal.
    pub fn optimized_count(&self) -> usize {
        self.optimized
    }

    /// Index of the highest score (first occurrence).
    pub fn start(&self) -> usize {
        self.start
    }

    /// Whether objective `obj` is optimized, or `None` if out of range.
    pub fn optimized_at(&self, obj: usize) -> Option<bool> {
        self.optimal.get(obj).copied()
    }

    pub fn objective_count(&self) -> usize {
        self.score.len()
    }
}

/// Index of the first maximum. NaN never wins; an empty slice yields 0.
pub(crate) fn first_argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] || values[best].is_nan() {
            best = i;
        }
    }
    best
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum OrganismState {
    #[default]
    Unscored,
    Scored(Evaluation),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organism {
    genome: Vec<f64>,
    state: OrganismState,
}

impl Organism {
    /// An initial-population organism with `objectives` genes at [`START_VALUE`].
    pub fn new(objectives: usize) -> Result<Self, OrganismError> {
        Self::from_genome(vec![START_VALUE; objectives])
    }

    /// An unscored organism owning `genome`.
    pub fn from_genome(genome: Vec<f64>) -> Result<Self, OrganismError> {
        if genome.is_empty() {
            return Err(OrganismError::EmptyGenome);
        }
        Ok(Self {
            genome,
            state: OrganismState::Unscored,
        })
    }

    pub fn genome(&self) -> &[f64] {
        &self.genome
    }

    /// Mutable genome access, only while unscored.
    pub fn genome_mut(&mut self) -> Result<&mut [f64], OrganismError> {
        match self.state {
            OrganismState::Unscored => Ok(&mut self.genome),
            OrganismState::Scored(_) => Err(OrganismError::GenomeLocked),
        }
    }

    pub fn objective_count(&self) -> usize {
        self.genome.len()
    }

    pub fn state(&self) -> &OrganismState {
        &self.state
    }

    pub fn is_scored(&self) -> bool {
        matches!(self.state, OrganismState::Scored(_))
    }

    /// Stores a fresh evaluation. Fails if one is already stored or the
    /// vector lengths do not match the genome.
    pub fn set_evaluation(&mut self, evaluation: Evaluation) -> Result<(), OrganismError> {
        if self.is_scored() {
            return Err(OrganismError::AlreadyScored);
        }
        if evaluation.objective_count() != self.genome.len() {
            return Err(OrganismError::LengthMismatch {
                what: "score vector",
                expected: self.genome.len(),
                found: evaluation.objective_count(),
            });
        }
        self.state = OrganismState::Scored(evaluation);
        Ok(())
    }

    /// Copies a parent's evaluation verbatim. Only valid for a clone whose
    /// genome was left untouched by mutation.
    pub fn inherit(&mut self, parent: &Evaluation) -> Result<(), OrganismError> {
        self.set_evaluation(parent.clone())
    }

    /// Clears the evaluation so the slot can be scored again.
    pub fn reset(&mut self) {
        self.state = OrganismState::Unscored;
    }

    pub fn evaluation(&self) -> Result<&Evaluation, OrganismError> {
        match &self.state {
            OrganismState::Scored(evaluation) => Ok(evaluation),
            OrganismState::Unscored => Err(OrganismError::NotScored),
        }
    }

    pub fn score(&self) -> Result<&[f64], OrganismError> {
        self.evaluation().map(Evaluation::score)
    }

    pub fn optimal(&self) -> Result<&[bool], OrganismError> {
        self.evaluation().map(Evaluation::optimal)
    }

    pub fn aggregate(&self) -> Result<f64, OrganismError> {
        self.evaluation().map(Evaluation::aggregate)
    }

    pub fn optimized_count(&self) -> Result<usize, OrganismError> {
        self.evaluation().map(Evaluation::optimized_count)
    }

    pub fn start(&self) -> Result<usize, OrganismError> {
        self.evaluation().map(Evaluation::start)
    }
}
