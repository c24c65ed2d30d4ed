//! Interactive chess game sessions.
//!
//! A [`GameSession`] tracks one game: every move is validated by a
//! [`chess_rules::RulesEngine`], status flags are always read back from the
//! engine, and the moment a game ends its history is handed to the
//! [`chess_analysis::MoveAnalyzer`].
//!
//! [`SessionHandle`] wraps a session for concurrent use. In AI modes it
//! schedules the computer's reply as a delayed task and refuses human
//! moves until the reply has been played.

mod error;
mod handle;
mod mode;
mod selector;
mod session;

pub use error::SessionError;
pub use handle::{SessionHandle, DEFAULT_AUTOPLAY_DELAY};
pub use mode::GameMode;
pub use selector::{FirstMoveSelector, MoveSelector, RandomMoveSelector, TierSelectors};
pub use session::{GameSession, GameStatus, SessionSnapshot};
