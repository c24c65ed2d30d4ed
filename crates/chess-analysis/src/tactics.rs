//! Tactical classification of a single move.

use chess_rules::{PlayedMove, Rank, Role};
use serde::{Deserialize, Serialize};

/// Coarse classification of what a move does, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TacticalTag {
    /// The move delivered mate.
    Checkmate,
    /// The move captured a piece.
    Capture,
    /// The move gave check.
    Check,
    /// A pawn reached the second or seventh rank.
    PawnAdvance,
    /// Anything else.
    Positional,
}

impl TacticalTag {
    /// Classifies a played move.
    ///
    /// Priority is checkmate, capture, check, pawn advance, positional.
    pub fn classify(played: &PlayedMove, is_checkmate: bool) -> Self {
        if is_checkmate {
            TacticalTag::Checkmate
        } else if played.is_capture() {
            TacticalTag::Capture
        } else if played.gives_check() {
            TacticalTag::Check
        } else if played.role == Role::Pawn
            && matches!(played.to.rank(), Rank::Second | Rank::Seventh)
        {
            TacticalTag::PawnAdvance
        } else {
            TacticalTag::Positional
        }
    }

    /// The annotation shown for this tag.
    pub fn idea(self) -> &'static str {
        match self {
            TacticalTag::Checkmate => "Checkmate! Decisive victory",
            TacticalTag::Capture => "Material capture - gaining a material advantage",
            TacticalTag::Check => "Check - pressure on the opposing king",
            TacticalTag::PawnAdvance => "Pawn advance - creating promotion threats",
            TacticalTag::Positional => "Positional move - improving piece placement",
        }
    }

    /// The arrow color used to highlight moves with this tag.
    pub fn arrow_color(self) -> &'static str {
        match self {
            TacticalTag::Checkmate => "rgba(255, 215, 0, 0.7)",
            TacticalTag::Capture => "rgba(255, 0, 0, 0.5)",
            TacticalTag::Check => "rgba(255, 165, 0, 0.5)",
            TacticalTag::PawnAdvance => "rgba(0, 255, 0, 0.5)",
            TacticalTag::Positional => "rgba(0, 0, 255, 0.5)",
        }
    }
}

/// An arrow drawn on the board from one square to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrow {
    /// Origin square, e.g. `"e2"`.
    pub from: String,
    /// Target square, e.g. `"e4"`.
    pub to: String,
    /// CSS color.
    pub color: String,
}

impl Arrow {
    /// The arrow for a played move, colored by its tag.
    pub fn for_move(played: &PlayedMove, tag: TacticalTag) -> Self {
        Arrow {
            from: played.from.to_string(),
            to: played.to.to_string(),
            color: tag.arrow_color().to_string(),
        }
    }
}
