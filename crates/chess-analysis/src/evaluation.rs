//! Pluggable strategies used by the analyzer.
//!
//! The analyzer never decides on its own how good a move is or which
//! other moves to suggest. It asks an [`Evaluator`] and an
//! [`AlternativeSelector`]. The random implementations here are stand-ins
//! until a search-backed evaluator exists; tests inject deterministic ones.

use chess_rules::PlayedMove;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Failure reported by an evaluator strategy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("evaluator failed: {0}")]
pub struct EvaluatorError(pub String);

impl EvaluatorError {
    /// Creates an error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Scores a move played from a position.
///
/// Scores are expected in `[-1, 1]`; the analyzer clamps anything outside
/// that range and rejects non-finite values.
pub trait Evaluator {
    /// Evaluates `played`, made from the position described by `fen_before`.
    fn evaluate(&mut self, fen_before: &str, played: &PlayedMove) -> Result<f64, EvaluatorError>;
}

impl<F> Evaluator for F
where
    F: FnMut(&str, &PlayedMove) -> Result<f64, EvaluatorError>,
{
    fn evaluate(&mut self, fen_before: &str, played: &PlayedMove) -> Result<f64, EvaluatorError> {
        self(fen_before, played)
    }
}

/// Uniform random evaluation in `[-1, 1]`.
#[derive(Debug, Clone)]
pub struct RandomEvaluator {
    rng: StdRng,
}

impl RandomEvaluator {
    /// Creates an evaluator seeded from system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a reproducible evaluator.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for RandomEvaluator {
    fn evaluate(&mut self, _fen_before: &str, _played: &PlayedMove) -> Result<f64, EvaluatorError> {
        Ok(self.rng.gen_range(-1.0..=1.0))
    }
}

/// Picks alternative moves to show next to a played move.
pub trait AlternativeSelector {
    /// Chooses at most `limit` moves from `candidates`, returned as SAN.
    ///
    /// `candidates` never contains the move that was actually played.
    fn select(&mut self, candidates: Vec<PlayedMove>, limit: usize) -> Vec<String>;
}

/// An unranked random subset of the legal moves.
#[derive(Debug, Clone)]
pub struct RandomAlternatives {
    rng: StdRng,
}

impl RandomAlternatives {
    /// Creates a selector seeded from system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a reproducible selector.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomAlternatives {
    fn default() -> Self {
        Self::new()
    }
}

impl AlternativeSelector for RandomAlternatives {
    fn select(&mut self, mut candidates: Vec<PlayedMove>, limit: usize) -> Vec<String> {
        candidates.shuffle(&mut self.rng);
        candidates.into_iter().take(limit).map(|m| m.san).collect()
    }
}

/// Takes the first legal moves in generation order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstAlternatives;

impl AlternativeSelector for FirstAlternatives {
    fn select(&mut self, candidates: Vec<PlayedMove>, limit: usize) -> Vec<String> {
        candidates.into_iter().take(limit).map(|m| m.san).collect()
    }
}
