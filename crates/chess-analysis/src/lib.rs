//! Post-game move analysis.
//!
//! This crate replays a finished game and produces a per-move report:
//! an evaluation, a quality badge, a tactical annotation with a board
//! arrow, and a few alternative moves.
//!
//! # Overview
//!
//! - [`Evaluator`] - Pluggable position evaluator (random placeholder by default)
//! - [`AlternativeSelector`] - Pluggable choice of alternative moves
//! - [`MoveQuality`] - Quality category derived from an evaluation
//! - [`TacticalTag`] - Coarse classification of what a move does
//! - [`MoveAnalyzer`] - Runs the pipeline over a move list
//! - [`AnalysisCursor`] - Paged navigation through a finished analysis
//!
//! # Example
//!
//! ```
//! use chess_analysis::{EvaluatorError, FirstAlternatives, MoveAnalyzer};
//! use chess_rules::PlayedMove;
//!
//! let evaluator = |_fen: &str, _played: &PlayedMove| -> Result<f64, EvaluatorError> { Ok(0.6) };
//! let mut analyzer = MoveAnalyzer::new(evaluator, FirstAlternatives);
//! let analysis = analyzer.analyze(&["e4", "e5", "Nf3"]).unwrap();
//! assert_eq!(analysis.moves_analysis.len(), 3);
//! assert_eq!(analysis.player_score, 100.0);
//! ```

pub mod analyzer;
pub mod evaluation;
pub mod quality;
pub mod replay;
pub mod tactics;

pub use analyzer::{AnalysisConfig, AnalyzerError, MoveAnalyzer};
pub use evaluation::{
    AlternativeSelector, Evaluator, EvaluatorError, FirstAlternatives, RandomAlternatives,
    RandomEvaluator,
};
pub use quality::{BestMove, GameAnalysis, MoveEvaluation, MoveQuality, QualityBadge};
pub use replay::{evaluation_series, AnalysisCursor, ChartPoint};
pub use tactics::{Arrow, TacticalTag};
