//! Standard chess rules backed by `shakmaty`.

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, File, Move, Piece, Position, Role, Square};

use crate::engine::{PlayedMove, RulesEngine, RulesError};

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Half-moves without capture or pawn move after which the game is drawn.
const FIFTY_MOVE_PLIES: u32 = 100;

/// A position and the move that was played from it.
#[derive(Debug, Clone)]
struct Frame {
    position: Chess,
    played: PlayedMove,
}

/// Standard chess with full history tracking.
///
/// Besides the current position this keeps an undo stack and the
/// repetition keys of every position reached, so threefold repetition is
/// reported as a draw.
#[derive(Debug, Clone)]
pub struct StandardRules {
    position: Chess,
    start: Chess,
    frames: Vec<Frame>,
    keys: Vec<String>,
}

impl Default for StandardRules {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardRules {
    /// Creates a game at the standard starting position.
    pub fn new() -> Self {
        Self::from_position(Chess::default())
    }

    /// Creates a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        let parsed: Fen = fen
            .parse()
            .map_err(|_| RulesError::InvalidFen(fen.to_string()))?;
        let position: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|_| RulesError::InvalidFen(fen.to_string()))?;
        Ok(Self::from_position(position))
    }

    fn from_position(position: Chess) -> Self {
        let key = repetition_key(&position);
        StandardRules {
            start: position.clone(),
            position,
            frames: Vec::new(),
            keys: vec![key],
        }
    }

    /// Returns the position the game started from as FEN.
    pub fn start_fen(&self) -> String {
        Fen::from_position(self.start.clone(), EnPassantMode::Legal).to_string()
    }

    /// Returns the moves played so far, oldest first.
    pub fn history(&self) -> Vec<PlayedMove> {
        self.frames.iter().map(|f| f.played.clone()).collect()
    }

    /// Counts how many times the current position has occurred.
    pub fn position_count(&self) -> usize {
        match self.keys.last() {
            Some(current) => self.keys.iter().filter(|k| *k == current).count(),
            None => 0,
        }
    }

    fn push(&mut self, m: &Move) -> Result<PlayedMove, RulesError> {
        let played = describe(&self.position, m)
            .ok_or_else(|| RulesError::IllegalMove(format!("{:?}", m)))?;
        let before = self.position.clone();
        self.position.play_unchecked(m);
        self.keys.push(repetition_key(&self.position));
        self.frames.push(Frame {
            position: before,
            played: played.clone(),
        });
        Ok(played)
    }
}

impl RulesEngine for StandardRules {
    fn fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    fn side_to_move(&self) -> Color {
        self.position.turn()
    }

    fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position.board().piece_at(square)
    }

    fn legal_moves(&self) -> Vec<PlayedMove> {
        if self.is_game_over() {
            return Vec::new();
        }
        self.position
            .legal_moves()
            .iter()
            .filter_map(|m| describe(&self.position, m))
            .collect()
    }

    fn play(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Role>,
    ) -> Result<PlayedMove, RulesError> {
        if self.is_game_over() {
            return Err(RulesError::GameOver);
        }

        let wanted = promotion.unwrap_or(Role::Queen);
        let legal = self.position.legal_moves();
        let matching = legal.iter().find(|m| {
            m.from() == Some(from)
                && destination(m) == to
                && m.promotion().map_or(true, |role| role == wanted)
        });

        match matching {
            Some(m) => {
                let m = m.clone();
                self.push(&m)
            }
            None => Err(RulesError::IllegalMove(format!("{}{}", from, to))),
        }
    }

    fn play_san(&mut self, san: &str) -> Result<PlayedMove, RulesError> {
        if self.is_game_over() {
            return Err(RulesError::GameOver);
        }

        let parsed: SanPlus = san
            .parse()
            .map_err(|_| RulesError::InvalidSan(san.to_string()))?;
        let m = parsed
            .san
            .to_move(&self.position)
            .map_err(|_| RulesError::IllegalMove(san.to_string()))?;
        self.push(&m)
    }

    fn undo(&mut self) -> Option<PlayedMove> {
        let frame = self.frames.pop()?;
        self.keys.pop();
        self.position = frame.position;
        Some(frame.played)
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn is_check(&self) -> bool {
        self.position.is_check()
    }

    fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    fn is_draw(&self) -> bool {
        self.position.is_stalemate()
            || self.position.is_insufficient_material()
            || self.position.halfmoves() >= FIFTY_MOVE_PLIES
            || self.position_count() >= 3
    }
}

/// Builds a [`PlayedMove`] for `m` without touching `position`.
fn describe(position: &Chess, m: &Move) -> Option<PlayedMove> {
    let from = m.from()?;
    let mut after = position.clone();
    let san = SanPlus::from_move_and_play_unchecked(&mut after, m).to_string();
    Some(PlayedMove {
        from,
        to: destination(m),
        role: m.role(),
        capture: m.capture(),
        promotion: m.promotion(),
        san,
    })
}

/// Where the moving piece lands. Castling moves land the king on the g or c file.
fn destination(m: &Move) -> Square {
    match *m {
        Move::Castle { king, rook } => {
            let file = if rook.file() > king.file() {
                File::G
            } else {
                File::C
            };
            Square::from_coords(file, king.rank())
        }
        _ => m.to(),
    }
}

/// Board, side to move, castling rights and en passant square.
fn repetition_key(position: &Chess) -> String {
    let fen = Fen::from_position(position.clone(), EnPassantMode::Legal).to_string();
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play_all(rules: &mut StandardRules, moves: &[&str]) {
        for san in moves {
            rules.play_san(san).unwrap();
        }
    }

    #[test]
    fn new_game_is_starting_position() {
        let rules = StandardRules::new();
        assert_eq!(rules.fen(), STARTING_FEN);
        assert_eq!(rules.side_to_move(), Color::White);
        assert_eq!(rules.legal_moves().len(), 20);
        assert!(!rules.is_game_over());
    }

    #[test]
    fn play_by_squares_reports_san() {
        let mut rules = StandardRules::new();
        let played = rules.play(Square::E2, Square::E4, None).unwrap();
        assert_eq!(played.san, "e4");
        assert_eq!(played.role, Role::Pawn);
        assert!(!played.is_capture());
        assert_eq!(rules.side_to_move(), Color::Black);
    }

    #[test]
    fn illegal_move_leaves_position_untouched() {
        let mut rules = StandardRules::new();
        let before = rules.fen();
        let result = rules.play(Square::E2, Square::E5, None);
        assert!(matches!(result, Err(RulesError::IllegalMove(_))));
        assert_eq!(rules.fen(), before);
        assert!(rules.history().is_empty());
    }

    #[test]
    fn invalid_san_is_rejected() {
        let mut rules = StandardRules::new();
        assert!(matches!(
            rules.play_san("zz9"),
            Err(RulesError::InvalidSan(_))
        ));
        assert!(matches!(
            rules.play_san("e5"),
            Err(RulesError::IllegalMove(_))
        ));
    }

    #[test]
    fn legal_moves_from_square() {
        let rules = StandardRules::new();
        let mut targets: Vec<Square> = rules
            .legal_moves_from(Square::E2)
            .iter()
            .map(|m| m.to)
            .collect();
        targets.sort();
        assert_eq!(targets, vec![Square::E3, Square::E4]);
        assert!(rules.legal_moves_from(Square::E4).is_empty());
    }

    #[test]
    fn fools_mate_is_checkmate() {
        let mut rules = StandardRules::new();
        play_all(&mut rules, &["f3", "e5", "g4"]);
        let mate = rules.play_san("Qh4#").unwrap();
        assert_eq!(mate.san, "Qh4#");
        assert!(mate.gives_mate());
        assert!(rules.is_checkmate());
        assert!(rules.is_check());
        assert!(rules.is_game_over());
        assert!(!rules.is_draw());
        assert!(rules.legal_moves().is_empty());
        assert_eq!(rules.play_san("e4"), Err(RulesError::GameOver));
    }

    #[test]
    fn check_marker_in_san() {
        let mut rules = StandardRules::new();
        play_all(&mut rules, &["e4", "f5"]);
        let check = rules.play_san("Qh5+").unwrap();
        assert!(check.gives_check());
        assert!(rules.is_check());
    }

    #[test]
    fn stalemate_is_draw() {
        let rules = StandardRules::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(rules.is_draw());
        assert!(rules.is_game_over());
        assert!(!rules.is_checkmate());
    }

    #[test]
    fn insufficient_material_is_draw() {
        let rules = StandardRules::from_fen("8/8/8/8/8/8/8/4K2k w - - 0 1").unwrap();
        assert!(rules.is_draw());
    }

    #[test]
    fn threefold_repetition_is_draw() {
        let mut rules = StandardRules::new();
        play_all(&mut rules, &["Nf3", "Nf6", "Ng1", "Ng8"]);
        assert_eq!(rules.position_count(), 2);
        assert!(!rules.is_draw());
        play_all(&mut rules, &["Nf3", "Nf6", "Ng1", "Ng8"]);
        assert_eq!(rules.position_count(), 3);
        assert!(rules.is_draw());
    }

    #[test]
    fn undo_restores_previous_position() {
        let mut rules = StandardRules::new();
        rules.play_san("e4").unwrap();
        let after_e4 = rules.fen();
        rules.play_san("e5").unwrap();

        let undone = rules.undo().unwrap();
        assert_eq!(undone.san, "e5");
        assert_eq!(rules.fen(), after_e4);
        assert_eq!(rules.history().len(), 1);

        rules.undo().unwrap();
        assert_eq!(rules.fen(), STARTING_FEN);
        assert!(rules.undo().is_none());
    }

    #[test]
    fn castling_targets_king_square() {
        let mut rules = StandardRules::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let targets: Vec<Square> = rules
            .legal_moves_from(Square::E1)
            .iter()
            .map(|m| m.to)
            .collect();
        assert!(targets.contains(&Square::G1));
        assert!(targets.contains(&Square::C1));

        let castle = rules.play(Square::E1, Square::G1, None).unwrap();
        assert_eq!(castle.san, "O-O");
        assert_eq!(rules.piece_at(Square::G1).map(|p| p.role), Some(Role::King));
        assert_eq!(rules.piece_at(Square::F1).map(|p| p.role), Some(Role::Rook));
    }

    #[test]
    fn promotion_defaults_to_queen() {
        let mut rules = StandardRules::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let promoted = rules.play(Square::A7, Square::A8, None).unwrap();
        assert_eq!(promoted.promotion, Some(Role::Queen));
        assert!(promoted.san.starts_with("a8=Q"));
    }

    #[test]
    fn underpromotion_is_honoured() {
        let mut rules = StandardRules::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let promoted = rules.play(Square::A7, Square::A8, Some(Role::Knight)).unwrap();
        assert_eq!(promoted.promotion, Some(Role::Knight));
    }

    #[test]
    fn reset_returns_to_start() {
        let mut rules = StandardRules::new();
        play_all(&mut rules, &["d4", "d5", "c4"]);
        rules.reset();
        assert_eq!(rules.fen(), STARTING_FEN);
        assert!(rules.history().is_empty());
        assert_eq!(rules.start_fen(), STARTING_FEN);
    }

    #[test]
    fn invalid_fen_is_rejected() {
        assert!(matches!(
            StandardRules::from_fen("not a fen"),
            Err(RulesError::InvalidFen(_))
        ));
    }
}
