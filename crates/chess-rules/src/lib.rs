//! Rules capability consumed by game sessions and the move analyzer.
//!
//! This crate provides:
//! - [`RulesEngine`] - Trait describing everything a session needs from a chess rules engine
//! - [`StandardRules`] - Standard chess implementation backed by `shakmaty`
//! - [`PlayedMove`] - A move together with its SAN and the squares it touched
//!
//! Sessions and analyzers never talk to `shakmaty` directly; they go through
//! the trait so the rules implementation can be swapped out.
//!
//! # Example
//!
//! ```
//! use chess_rules::{RulesEngine, StandardRules, Square};
//!
//! let mut rules = StandardRules::new();
//! let played = rules.play(Square::E2, Square::E4, None).unwrap();
//! assert_eq!(played.san, "e4");
//! assert_eq!(rules.legal_moves().len(), 20);
//! ```

mod engine;
mod standard;

pub use engine::{parse_promotion, parse_square, PlayedMove, RulesEngine, RulesError};
pub use shakmaty::{Color, Piece, Rank, Role, Square};
pub use standard::{StandardRules, STARTING_FEN};
