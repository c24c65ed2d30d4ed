use chess_rules::Square;
use thiserror::Error;

use crate::mode::GameMode;

/// Errors reported by game sessions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The move is not legal in the current position.
    #[error("illegal move {from}{to}")]
    IllegalMove { from: Square, to: Square },
    /// The game has ended; start a new one first.
    #[error("game is over")]
    GameOver,
    /// The computer is about to move; human moves are refused until it has.
    #[error("computer move pending")]
    AutoplayPending,
    /// The mode cannot be selected.
    #[error("game mode {0} is disabled")]
    ModeDisabled(GameMode),
}
