//! Stepping through a finished analysis.

use chess_rules::{RulesEngine, StandardRules, STARTING_FEN};
use serde::{Deserialize, Serialize};

use crate::analyzer::AnalyzerError;
use crate::quality::{GameAnalysis, MoveEvaluation};

/// One point of the evaluation chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Move number, followed by ` ♔` when the move delivered mate.
    pub label: String,
    /// Evaluation of the move.
    pub value: f64,
}

/// Builds the evaluation chart for an analysis, one point per move.
pub fn evaluation_series(analysis: &GameAnalysis) -> Vec<ChartPoint> {
    analysis
        .moves_analysis
        .iter()
        .map(|m| ChartPoint {
            label: if m.san.contains('#') {
                format!("{} ♔", m.move_number)
            } else {
                m.move_number.to_string()
            },
            value: m.evaluation,
        })
        .collect()
}

/// A position in a finished analysis, moved one ply at a time.
///
/// The index always stays within `0..len`. The board shown for an index is
/// the position after that move was played.
#[derive(Debug, Clone)]
pub struct AnalysisCursor {
    analysis: GameAnalysis,
    fens: Vec<String>,
    index: usize,
}

impl AnalysisCursor {
    /// Creates a cursor on the first move, replaying the game once to
    /// record the position after every move.
    pub fn new(analysis: GameAnalysis) -> Result<Self, AnalyzerError> {
        let mut rules = StandardRules::new();
        let mut fens = Vec::with_capacity(analysis.len());
        for (index, m) in analysis.moves_analysis.iter().enumerate() {
            rules
                .play_san(&m.san)
                .map_err(|source| AnalyzerError::Replay {
                    ply: index + 1,
                    san: m.san.clone(),
                    source,
                })?;
            fens.push(rules.fen());
        }
        Ok(Self {
            analysis,
            fens,
            index: 0,
        })
    }

    /// The analysis being browsed.
    pub fn analysis(&self) -> &GameAnalysis {
        &self.analysis
    }

    /// Current 0-based move index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of moves in the game.
    pub fn len(&self) -> usize {
        self.analysis.len()
    }

    /// Returns true if the game had no moves.
    pub fn is_empty(&self) -> bool {
        self.analysis.is_empty()
    }

    /// The move under the cursor, if the game had any moves.
    pub fn current(&self) -> Option<&MoveEvaluation> {
        self.analysis.moves_analysis.get(self.index)
    }

    /// FEN after the move under the cursor.
    pub fn fen(&self) -> &str {
        self.fens
            .get(self.index)
            .map(String::as_str)
            .unwrap_or(STARTING_FEN)
    }

    /// Label of the current full move, e.g. `"Move 3"`.
    pub fn label(&self) -> String {
        format!("Move {}", self.index / 2 + 1)
    }

    /// Moves to the first move and returns the new index.
    pub fn first(&mut self) -> usize {
        self.seek(0)
    }

    /// Moves to the final move and returns the new index.
    pub fn last(&mut self) -> usize {
        self.seek(usize::MAX)
    }

    /// Steps back one move, staying put at the start.
    pub fn previous(&mut self) -> usize {
        self.seek(self.index.saturating_sub(1))
    }

    /// Steps forward one move, staying put at the end.
    pub fn next(&mut self) -> usize {
        self.seek(self.index.saturating_add(1))
    }

    /// Moves to `index`, clamped to the valid range, and returns the new index.
    pub fn seek(&mut self, index: usize) -> usize {
        self.index = index.min(self.len().saturating_sub(1));
        self.index
    }

    /// Returns true if there is a move before the current one.
    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    /// Returns true if there is a move after the current one.
    pub fn has_next(&self) -> bool {
        self.index + 1 < self.len()
    }
}
