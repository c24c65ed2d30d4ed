//! The rules engine abstraction.
//!
//! [`RulesEngine`] is the only surface sessions and analyzers use to ask
//! questions about a position or to change it. Implementations own the
//! current position and enough history to undo moves.

use shakmaty::{Color, Piece, Role, Square};
use thiserror::Error;

/// Errors reported by a rules engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    /// The SAN string could not be parsed.
    #[error("invalid SAN: {0}")]
    InvalidSan(String),
    /// The move is not legal in the current position.
    #[error("illegal move: {0}")]
    IllegalMove(String),
    /// The square name could not be parsed.
    #[error("invalid square: {0}")]
    InvalidSquare(String),
    /// The promotion piece is not one of `q`, `r`, `b` or `n`.
    #[error("invalid promotion piece: {0}")]
    InvalidPromotion(String),
    /// The FEN string could not be parsed into a legal position.
    #[error("invalid FEN: {0}")]
    InvalidFen(String),
    /// No more moves can be made.
    #[error("game has already ended")]
    GameOver,
}

/// Parses a square name such as `"e4"`.
pub fn parse_square(name: &str) -> Result<Square, RulesError> {
    name.trim()
        .parse()
        .map_err(|_| RulesError::InvalidSquare(name.to_string()))
}

/// Parses a promotion piece letter, case-insensitively.
pub fn parse_promotion(name: &str) -> Result<Role, RulesError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "q" | "queen" => Ok(Role::Queen),
        "r" | "rook" => Ok(Role::Rook),
        "b" | "bishop" => Ok(Role::Bishop),
        "n" | "knight" => Ok(Role::Knight),
        _ => Err(RulesError::InvalidPromotion(name.to_string())),
    }
}

/// A move as it was (or would be) played in a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedMove {
    /// Origin square.
    pub from: Square,
    /// Destination square. For castling this is the king's target square.
    pub to: Square,
    /// The piece that moved.
    pub role: Role,
    /// The piece that was captured, if any.
    pub capture: Option<Role>,
    /// The promotion piece, if any.
    pub promotion: Option<Role>,
    /// SAN including the `+` or `#` suffix.
    pub san: String,
}

impl PlayedMove {
    /// Returns true if this move captured a piece.
    pub fn is_capture(&self) -> bool {
        self.capture.is_some()
    }

    /// Returns true if the SAN carries a check marker.
    pub fn gives_check(&self) -> bool {
        self.san.contains('+')
    }

    /// Returns true if the SAN carries a mate marker.
    pub fn gives_mate(&self) -> bool {
        self.san.ends_with('#')
    }
}

/// Everything a game session or analyzer needs from a chess rules engine.
///
/// Implementations keep the current position plus an undo stack. All
/// mutating methods either fully apply or leave the position untouched.
pub trait RulesEngine {
    /// Returns the current position as a FEN string.
    fn fen(&self) -> String;

    /// Returns the side to move.
    fn side_to_move(&self) -> Color;

    /// Returns the piece on `square`, if any.
    fn piece_at(&self, square: Square) -> Option<Piece>;

    /// Returns every legal move in the current position.
    fn legal_moves(&self) -> Vec<PlayedMove>;

    /// Returns the legal moves of the piece standing on `square`.
    fn legal_moves_from(&self, square: Square) -> Vec<PlayedMove> {
        self.legal_moves()
            .into_iter()
            .filter(|m| m.from == square)
            .collect()
    }

    /// Plays the move from `from` to `to`.
    ///
    /// `promotion` is only consulted when the move is a promotion, and
    /// defaults to a queen there.
    fn play(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Role>,
    ) -> Result<PlayedMove, RulesError>;

    /// Plays a move given in SAN.
    fn play_san(&mut self, san: &str) -> Result<PlayedMove, RulesError>;

    /// Takes back the last move, returning it.
    fn undo(&mut self) -> Option<PlayedMove>;

    /// Returns to the standard starting position and clears history.
    fn reset(&mut self);

    /// Returns true if the side to move is in check.
    fn is_check(&self) -> bool;

    /// Returns true if the side to move is checkmated.
    fn is_checkmate(&self) -> bool;

    /// Returns true if the position is drawn.
    fn is_draw(&self) -> bool;

    /// Returns true if no more moves can be made.
    fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_draw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_square_names() {
        assert_eq!(parse_square("e4"), Ok(Square::E4));
        assert_eq!(parse_square(" h8 "), Ok(Square::H8));
        assert_eq!(
            parse_square("i9"),
            Err(RulesError::InvalidSquare("i9".to_string()))
        );
    }

    #[test]
    fn parses_promotion_letters() {
        assert_eq!(parse_promotion("q"), Ok(Role::Queen));
        assert_eq!(parse_promotion("N"), Ok(Role::Knight));
        assert_eq!(parse_promotion("rook"), Ok(Role::Rook));
        assert!(matches!(
            parse_promotion("k"),
            Err(RulesError::InvalidPromotion(_))
        ));
    }
}
