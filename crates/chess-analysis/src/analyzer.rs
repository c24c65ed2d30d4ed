//! Game analysis with move quality classification.
//!
//! This module provides the [`MoveAnalyzer`], which replays a finished
//! game move by move and builds a [`GameAnalysis`] from it.

use chess_rules::{RulesEngine, RulesError, StandardRules};
use thiserror::Error;
use tracing::debug;

use crate::evaluation::{
    AlternativeSelector, Evaluator, EvaluatorError, RandomAlternatives, RandomEvaluator,
};
use crate::quality::{BestMove, GameAnalysis, MoveEvaluation, QualityBadge};
use crate::tactics::{Arrow, TacticalTag};

/// Errors that can occur during game analysis.
///
/// Any error aborts the whole analysis; no partial result is returned.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// An input move could not be replayed.
    #[error("move {ply} ({san}) does not replay: {source}")]
    Replay {
        /// 1-based ply of the failing move.
        ply: usize,
        /// The move as given.
        san: String,
        /// What the rules engine reported.
        source: RulesError,
    },
    /// The evaluator strategy failed.
    #[error(transparent)]
    Evaluator(#[from] EvaluatorError),
    /// The evaluator produced NaN or an infinity.
    #[error("evaluator returned a non-finite score for move {ply}")]
    NonFinite {
        /// 1-based ply of the move.
        ply: usize,
    },
}

/// Configuration for game analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Maximum number of alternatives listed per move.
    pub max_alternatives: usize,
    /// Moves scoring strictly above this count towards the player score.
    pub score_threshold: f64,
    /// Moves scoring strictly above this are listed as best moves.
    pub best_move_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_alternatives: 3,
            score_threshold: 0.5,
            best_move_threshold: 0.7,
        }
    }
}

/// Replays finished games and classifies every move.
///
/// The analyzer is generic over its [`Evaluator`] and
/// [`AlternativeSelector`], so given deterministic strategies the output
/// is fully reproducible.
pub struct MoveAnalyzer<E, A> {
    evaluator: E,
    alternatives: A,
    config: AnalysisConfig,
}

impl MoveAnalyzer<RandomEvaluator, RandomAlternatives> {
    /// Creates an analyzer with the random placeholder strategies.
    pub fn random() -> Self {
        Self::new(RandomEvaluator::new(), RandomAlternatives::new())
    }
}

impl<E: Evaluator, A: AlternativeSelector> MoveAnalyzer<E, A> {
    /// Creates an analyzer with the default configuration.
    pub fn new(evaluator: E, alternatives: A) -> Self {
        Self::with_config(evaluator, alternatives, AnalysisConfig::default())
    }

    /// Creates an analyzer with an explicit configuration.
    pub fn with_config(evaluator: E, alternatives: A, config: AnalysisConfig) -> Self {
        Self {
            evaluator,
            alternatives,
            config,
        }
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyzes a game given as SAN moves from the standard starting position.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Replay`] if a move is not legal at its point
    /// in the game, or an evaluator error.
    pub fn analyze<S: AsRef<str>>(&mut self, moves: &[S]) -> Result<GameAnalysis, AnalyzerError> {
        let mut rules = StandardRules::new();
        self.analyze_with(&mut rules, moves)
    }

    /// Analyzes a game by replaying `moves` on `rules` from its current position.
    ///
    /// On success `rules` is left at the final position. On error it is left
    /// wherever replay stopped and should be discarded.
    pub fn analyze_with<R, S>(
        &mut self,
        rules: &mut R,
        moves: &[S],
    ) -> Result<GameAnalysis, AnalyzerError>
    where
        R: RulesEngine,
        S: AsRef<str>,
    {
        let mut moves_analysis = Vec::with_capacity(moves.len());

        for (index, san) in moves.iter().enumerate() {
            let san = san.as_ref();
            let ply = index + 1;

            let fen_before = rules.fen();
            let candidates = rules.legal_moves();
            let played = rules.play_san(san).map_err(|source| AnalyzerError::Replay {
                ply,
                san: san.to_string(),
                source,
            })?;
            let is_checkmate = rules.is_checkmate();

            let evaluation = if is_checkmate {
                1.0
            } else {
                let raw = self.evaluator.evaluate(&fen_before, &played)?;
                if !raw.is_finite() {
                    return Err(AnalyzerError::NonFinite { ply });
                }
                raw.clamp(-1.0, 1.0)
            };

            let best_alternatives = if is_checkmate {
                Vec::new()
            } else {
                let others = candidates
                    .into_iter()
                    .filter(|m| m.san != played.san)
                    .collect();
                self.alternatives
                    .select(others, self.config.max_alternatives)
                    .into_iter()
                    .take(self.config.max_alternatives)
                    .collect()
            };

            let tag = TacticalTag::classify(&played, is_checkmate);
            debug!(ply, san = %played.san, evaluation, ?tag, "analyzed move");

            moves_analysis.push(MoveEvaluation {
                move_number: move_number(index),
                san: played.san.clone(),
                evaluation,
                best_alternatives,
                tactical_tag: tag,
                tactical_idea: tag.idea().to_string(),
                arrows: vec![Arrow::for_move(&played, tag)],
                quality: QualityBadge::for_move(evaluation, is_checkmate),
            });
        }

        Ok(self.summarize(moves_analysis))
    }

    fn summarize(&self, moves_analysis: Vec<MoveEvaluation>) -> GameAnalysis {
        let total = moves_analysis.len();
        let strong = moves_analysis
            .iter()
            .filter(|m| m.evaluation > self.config.score_threshold)
            .count();
        let player_score = if total == 0 {
            0.0
        } else {
            strong as f64 / total as f64 * 100.0
        };

        let best_moves = moves_analysis
            .iter()
            .filter(|m| m.evaluation > self.config.best_move_threshold || m.is_checkmate())
            .map(|m| BestMove {
                move_number: m.move_number,
                player_move: m.san.clone(),
                best_move: m.san.clone(),
                evaluation: m.evaluation,
            })
            .collect();

        debug!(moves = total, player_score, "game analysis complete");

        GameAnalysis {
            player_score,
            best_moves,
            moves_analysis,
        }
    }
}

/// Full move number for a 0-based ply index.
fn move_number(index: usize) -> u32 {
    (index / 2 + 1) as u32
}
