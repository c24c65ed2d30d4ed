//! Move quality classification and analysis result types.

use serde::{Deserialize, Serialize};

use crate::tactics::{Arrow, TacticalTag};

/// Classification of move quality based on the magnitude of its evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveQuality {
    /// |evaluation| >= 0.9, or any mating move
    Brilliant,
    /// |evaluation| >= 0.7
    Great,
    /// |evaluation| >= 0.5
    Good,
    /// |evaluation| >= 0.3
    Inaccuracy,
    /// |evaluation| >= 0.1
    Mistake,
    /// Everything below
    Blunder,
}

impl MoveQuality {
    /// Classifies a move from its evaluation.
    ///
    /// The category is derived from the absolute value of `evaluation`.
    /// A mating move is always [`MoveQuality::Brilliant`].
    pub fn from_evaluation(evaluation: f64, is_checkmate: bool) -> Self {
        if is_checkmate {
            return MoveQuality::Brilliant;
        }
        match evaluation.abs() {
            e if e >= 0.9 => MoveQuality::Brilliant,
            e if e >= 0.7 => MoveQuality::Great,
            e if e >= 0.5 => MoveQuality::Good,
            e if e >= 0.3 => MoveQuality::Inaccuracy,
            e if e >= 0.1 => MoveQuality::Mistake,
            _ => MoveQuality::Blunder,
        }
    }

    /// Returns the lowercase name used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            MoveQuality::Brilliant => "brilliant",
            MoveQuality::Great => "great",
            MoveQuality::Good => "good",
            MoveQuality::Inaccuracy => "inaccuracy",
            MoveQuality::Mistake => "mistake",
            MoveQuality::Blunder => "blunder",
        }
    }

    fn emoji(self) -> &'static str {
        match self {
            MoveQuality::Brilliant => "💫",
            MoveQuality::Great => "⭐",
            MoveQuality::Good => "✨",
            MoveQuality::Inaccuracy => "⚠️",
            MoveQuality::Mistake => "❌",
            MoveQuality::Blunder => "💀",
        }
    }

    fn color(self) -> &'static str {
        match self {
            MoveQuality::Brilliant => "rgba(94, 234, 212, 0.9)",
            MoveQuality::Great => "rgba(56, 189, 248, 0.9)",
            MoveQuality::Good => "rgba(52, 211, 153, 0.9)",
            MoveQuality::Inaccuracy => "rgba(250, 204, 21, 0.9)",
            MoveQuality::Mistake => "rgba(251, 146, 60, 0.9)",
            MoveQuality::Blunder => "rgba(239, 68, 68, 0.9)",
        }
    }
}

/// The badge shown next to a move: category, emoji and background color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityBadge {
    /// Quality category.
    #[serde(rename = "type")]
    pub kind: MoveQuality,
    /// Emoji displayed on the badge.
    pub emoji: String,
    /// CSS color of the badge.
    pub color: String,
}

impl QualityBadge {
    /// Builds the badge for a move. Mating moves get a crown.
    pub fn for_move(evaluation: f64, is_checkmate: bool) -> Self {
        let kind = MoveQuality::from_evaluation(evaluation, is_checkmate);
        let emoji = if is_checkmate { "👑" } else { kind.emoji() };
        QualityBadge {
            kind,
            emoji: emoji.to_string(),
            color: kind.color().to_string(),
        }
    }
}

/// Analysis result for a single move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveEvaluation {
    /// Full move number (1-based, shared by both plies).
    pub move_number: u32,
    /// The move in SAN.
    #[serde(rename = "move")]
    pub san: String,
    /// Evaluation in [-1, 1].
    pub evaluation: f64,
    /// Up to three other legal moves from the same position.
    pub best_alternatives: Vec<String>,
    /// Coarse classification of the move.
    pub tactical_tag: TacticalTag,
    /// Human-readable annotation for the tag.
    pub tactical_idea: String,
    /// Board arrows highlighting the move.
    pub arrows: Vec<Arrow>,
    /// Quality badge.
    pub quality: QualityBadge,
}

impl MoveEvaluation {
    /// Returns true if this move delivered mate.
    pub fn is_checkmate(&self) -> bool {
        self.tactical_tag == TacticalTag::Checkmate
    }
}

/// A move singled out as one of the best of the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestMove {
    /// Full move number.
    pub move_number: u32,
    /// The move that was played.
    pub player_move: String,
    /// The recommended move. Without a search engine this is the played move.
    pub best_move: String,
    /// Evaluation of the played move.
    pub evaluation: f64,
}

/// Complete analysis of a finished game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameAnalysis {
    /// Share of moves with evaluation above 0.5, as a percentage (0-100).
    pub player_score: f64,
    /// Moves with evaluation above 0.7 or delivering mate.
    pub best_moves: Vec<BestMove>,
    /// One entry per played move, in game order.
    pub moves_analysis: Vec<MoveEvaluation>,
}

impl GameAnalysis {
    /// Returns the number of analyzed moves.
    pub fn len(&self) -> usize {
        self.moves_analysis.len()
    }

    /// Returns true if the game had no moves.
    pub fn is_empty(&self) -> bool {
        self.moves_analysis.is_empty()
    }

    /// Returns the played moves in SAN, in game order.
    pub fn moves(&self) -> Vec<String> {
        self.moves_analysis.iter().map(|m| m.san.clone()).collect()
    }
}
