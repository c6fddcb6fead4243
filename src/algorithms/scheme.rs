use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{EpsilonLexicase, FitnessSharing, MuLambda, NoveltySearch, Tournament};
use crate::Selector;
use crate::config::ConfigError;
use crate::snapshot::{ScoreSnapshot, SelectionError};

/// Which scheme to run, without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionKind {
    MuLambda,
    Tournament,
    FitnessSharing,
    NoveltySearch,
    EpsilonLexicase,
}

impl TryFrom<u8> for SelectionKind {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::MuLambda),
            1 => Ok(Self::Tournament),
            2 => Ok(Self::FitnessSharing),
            3 => Ok(Self::NoveltySearch),
            4 => Ok(Self::EpsilonLexicase),
            other => Err(ConfigError::UnknownSelection(other)),
        }
    }
}

impl SelectionKind {
    /// The scheme with its default parameters.
    pub fn default_scheme(self) -> SelectionScheme {
        match self {
            Self::MuLambda => SelectionScheme::MuLambda(MuLambda::default()),
            Self::Tournament => SelectionScheme::Tournament(Tournament::default()),
            Self::FitnessSharing => SelectionScheme::FitnessSharing(FitnessSharing::default()),
            Self::NoveltySearch => SelectionScheme::NoveltySearch(NoveltySearch::default()),
            Self::EpsilonLexicase => SelectionScheme::EpsilonLexicase(EpsilonLexicase::default()),
        }
    }
}

/// A configured selection scheme. Serialized externally tagged, e.g.
/// `{"Tournament": {"size": 8}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectionScheme {
    MuLambda(MuLambda),
    Tournament(Tournament),
    FitnessSharing(FitnessSharing),
    NoveltySearch(NoveltySearch),
    EpsilonLexicase(EpsilonLexicase),
}

impl Default for SelectionScheme {
    fn default() -> Self {
        Self::Tournament(Tournament::default())
    }
}

impl SelectionScheme {
    pub fn kind(&self) -> SelectionKind {
        match self {
            Self::MuLambda(_) => SelectionKind::MuLambda,
            Self::Tournament(_) => SelectionKind::Tournament,
            Self::FitnessSharing(_) => SelectionKind::FitnessSharing,
            Self::NoveltySearch(_) => SelectionKind::NoveltySearch,
            Self::EpsilonLexicase(_) => SelectionKind::EpsilonLexicase,
        }
    }
}

impl Selector for SelectionScheme {
    fn select<R: Rng + ?Sized>(
        &self,
        snapshot: &ScoreSnapshot,
        rng: &mut R,
    ) -> Result<Vec<usize>, SelectionError> {
        match self {
            Self::MuLambda(s) => s.select(snapshot, rng),
            Self::Tournament(s) => s.select(snapshot, rng),
            Self::FitnessSharing(s) => s.select(snapshot, rng),
            Self::NoveltySearch(s) => s.select(snapshot, rng),
            Self::EpsilonLexicase(s) => s.select(snapshot, rng),
        }
    }

    fn validate(&self, population_size: usize) -> Result<(), SelectionError> {
        match self {
            Self::MuLambda(s) => s.validate(population_size),
            Self::Tournament(s) => s.validate(population_size),
            Self::FitnessSharing(s) => s.validate(population_size),
            Self::NoveltySearch(s) => s.validate(population_size),
            Self::EpsilonLexicase(s) => s.validate(population_size),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::MuLambda(s) => s.name(),
            Self::Tournament(s) => s.name(),
            Self::FitnessSharing(s) => s.name(),
            Self::NoveltySearch(s) => s.name(),
            Self::EpsilonLexicase(s) => s.name(),
        }
    }
}
