//! The game session state machine.

use chess_analysis::{
    AlternativeSelector, Evaluator, GameAnalysis, MoveAnalyzer, RandomAlternatives,
    RandomEvaluator,
};
use chess_rules::{Color, PlayedMove, Role, RulesEngine, Square, StandardRules};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::mode::GameMode;
use crate::selector::TierSelectors;

/// Where the game stands, always derived from the rules engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Moves can still be played; `check` is set when the side to move is in check.
    InProgress { check: bool },
    /// The side to move has been mated.
    Checkmate { winner: Color },
    /// Stalemate, insufficient material, repetition or the 50-move rule.
    Drawn,
}

impl GameStatus {
    /// Returns true for `Checkmate` and `Drawn`.
    pub fn is_game_over(self) -> bool {
        !matches!(self, GameStatus::InProgress { .. })
    }
}

/// Serializable view of a session for clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub fen: String,
    /// `"white"` or `"black"`.
    pub turn: String,
    pub mode: GameMode,
    pub history: Vec<String>,
    pub in_check: bool,
    pub is_checkmate: bool,
    pub is_draw: bool,
    pub is_game_over: bool,
    /// Square currently selected by the player, if any.
    pub selected: Option<String>,
    /// Legal destinations of the selected piece.
    pub highlighted: Vec<String>,
    /// Origin and destination of the last move.
    pub last_move: Option<[String; 2]>,
    /// Set once a finished game has been analyzed.
    pub analysis: Option<GameAnalysis>,
}

/// A single game: the position, the moves played and the mode.
///
/// Every move goes through the rules engine. Status flags are never
/// stored; they are read back from the engine whenever asked for.
pub struct GameSession<R = StandardRules, E = RandomEvaluator, A = RandomAlternatives> {
    rules: R,
    mode: GameMode,
    history: Vec<String>,
    selected: Option<Square>,
    highlighted: Vec<Square>,
    last_move: Option<(Square, Square)>,
    analysis: Option<GameAnalysis>,
    analyzer: MoveAnalyzer<E, A>,
    selectors: TierSelectors,
}

impl GameSession {
    /// A local game from the starting position with the default strategies.
    pub fn new() -> Self {
        Self::with_parts(
            StandardRules::new(),
            MoveAnalyzer::random(),
            TierSelectors::default(),
        )
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, E, A> GameSession<R, E, A>
where
    R: RulesEngine,
    E: Evaluator,
    A: AlternativeSelector,
{
    /// Builds a session from explicit strategies. `rules` is reset first.
    pub fn with_parts(mut rules: R, analyzer: MoveAnalyzer<E, A>, selectors: TierSelectors) -> Self {
        rules.reset();
        Self {
            rules,
            mode: GameMode::Local,
            history: Vec::new(),
            selected: None,
            highlighted: Vec::new(),
            last_move: None,
            analysis: None,
            analyzer,
            selectors,
        }
    }

    /// Current position as FEN.
    pub fn fen(&self) -> String {
        self.rules.fen()
    }

    /// Color to move.
    pub fn turn(&self) -> Color {
        self.rules.side_to_move()
    }

    /// Current game mode.
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Moves played so far, in SAN.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// The analysis of the finished game, once there is one.
    pub fn analysis(&self) -> Option<&GameAnalysis> {
        self.analysis.as_ref()
    }

    /// Computes the game status from the current position.
    pub fn status(&self) -> GameStatus {
        if self.rules.is_checkmate() {
            GameStatus::Checkmate {
                winner: !self.rules.side_to_move(),
            }
        } else if self.rules.is_draw() {
            GameStatus::Drawn
        } else {
            GameStatus::InProgress {
                check: self.rules.is_check(),
            }
        }
    }

    /// Returns true once the game has ended by mate or draw.
    pub fn is_game_over(&self) -> bool {
        self.status().is_game_over()
    }

    /// Selects a square and returns the legal destinations from it.
    ///
    /// Squares that do not hold a piece of the side to move select
    /// nothing and return an empty list.
    pub fn select_square(&mut self, square: Square) -> Vec<Square> {
        let own_piece = self
            .rules
            .piece_at(square)
            .is_some_and(|piece| piece.color == self.rules.side_to_move());

        if !own_piece {
            self.clear_selection();
            return Vec::new();
        }

        let mut targets: Vec<Square> = self
            .rules
            .legal_moves_from(square)
            .into_iter()
            .map(|m| m.to)
            .collect();
        targets.dedup();

        self.selected = Some(square);
        self.highlighted = targets.clone();
        targets
    }

    /// Plays a move. Promotions default to a queen.
    ///
    /// Returns `false` and leaves the session untouched if the move is not
    /// legal. When the move ends the game the full history is analyzed
    /// before this returns.
    pub fn apply_move(&mut self, from: Square, to: Square, promotion: Option<Role>) -> bool {
        self.play_move(from, to, promotion).is_ok()
    }

    /// Like [`apply_move`](Self::apply_move), but says why a move was refused.
    pub fn play_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Role>,
    ) -> Result<PlayedMove, SessionError> {
        if self.is_game_over() {
            return Err(SessionError::GameOver);
        }
        let played = match self.rules.play(from, to, promotion) {
            Ok(played) => played,
            Err(err) => {
                warn!(%from, %to, error = %err, "move rejected");
                return Err(SessionError::IllegalMove { from, to });
            }
        };

        self.history.push(played.san.clone());
        self.last_move = Some((played.from, played.to));
        self.clear_selection();
        debug!(san = %played.san, ply = self.history.len(), "move applied");

        if self.rules.is_game_over() {
            self.finish();
        }
        Ok(played)
    }

    /// Lets the computer play for the side to move.
    ///
    /// Does nothing outside AI modes or once the game is over.
    pub fn autoplay_move(&mut self) -> Option<PlayedMove> {
        if !self.mode.is_ai() || self.is_game_over() {
            return None;
        }
        let legal = self.rules.legal_moves();
        let choice = self.selectors.for_mode(self.mode)?.choose(&legal)?;
        self.play_move(choice.from, choice.to, choice.promotion).ok()
    }

    /// Starts a new game in the current mode.
    pub fn reset(&mut self) {
        self.rules.reset();
        self.history.clear();
        self.clear_selection();
        self.last_move = None;
        self.analysis = None;
        debug!(mode = %self.mode, "session reset");
    }

    /// Switches mode and starts a new game.
    pub fn change_mode(&mut self, mode: GameMode) -> Result<(), SessionError> {
        if !mode.is_enabled() {
            return Err(SessionError::ModeDisabled(mode));
        }
        self.mode = mode;
        self.reset();
        info!(%mode, "game mode changed");
        Ok(())
    }

    /// Replaces the move selector for one AI tier.
    pub fn selectors_mut(&mut self) -> &mut TierSelectors {
        &mut self.selectors
    }

    /// Captures the client-facing state of the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        let status = self.status();
        SessionSnapshot {
            fen: self.fen(),
            turn: color_name(self.turn()).to_string(),
            mode: self.mode,
            history: self.history.clone(),
            in_check: self.rules.is_check(),
            is_checkmate: matches!(status, GameStatus::Checkmate { .. }),
            is_draw: status == GameStatus::Drawn,
            is_game_over: status.is_game_over(),
            selected: self.selected.map(|s| s.to_string()),
            highlighted: self.highlighted.iter().map(|s| s.to_string()).collect(),
            last_move: self
                .last_move
                .map(|(from, to)| [from.to_string(), to.to_string()]),
            analysis: self.analysis.clone(),
        }
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.highlighted.clear();
    }

    fn finish(&mut self) {
        info!(moves = self.history.len(), status = ?self.status(), "game over");
        match self.analyzer.analyze(&self.history) {
            Ok(analysis) => {
                info!(player_score = analysis.player_score, "game analyzed");
                self.analysis = Some(analysis);
            }
            Err(err) => {
                warn!(error = %err, "game analysis failed");
                self.analysis = None;
            }
        }
    }
}

fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_analysis::{EvaluatorError, FirstAlternatives};
    use chess_rules::STARTING_FEN;

    use crate::selector::FirstMoveSelector;

    type FixedSession = GameSession<
        StandardRules,
        fn(&str, &PlayedMove) -> Result<f64, EvaluatorError>,
        FirstAlternatives,
    >;

    fn neutral(_: &str, _: &PlayedMove) -> Result<f64, EvaluatorError> {
        Ok(0.6)
    }

    fn session() -> FixedSession {
        GameSession::with_parts(
            StandardRules::new(),
            MoveAnalyzer::new(neutral as fn(&str, &PlayedMove) -> _, FirstAlternatives),
            TierSelectors::uniform(|| FirstMoveSelector),
        )
    }

    fn play(session: &mut FixedSession, from: Square, to: Square) {
        assert!(session.apply_move(from, to, None), "{from}{to} rejected");
    }

    #[test]
    fn starts_in_progress() {
        let session = session();
        assert_eq!(session.fen(), STARTING_FEN);
        assert_eq!(session.turn(), Color::White);
        assert_eq!(session.status(), GameStatus::InProgress { check: false });
        assert!(session.history().is_empty());
        assert_eq!(session.mode(), GameMode::Local);
    }

    #[test]
    fn selecting_own_piece_lists_targets() {
        let mut session = session();
        let mut targets = session.select_square(Square::G1);
        targets.sort();
        assert_eq!(targets, vec![Square::F3, Square::H3]);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.selected.as_deref(), Some("g1"));
        assert_eq!(snapshot.highlighted.len(), 2);
    }

    #[test]
    fn selecting_empty_or_enemy_square_is_empty() {
        let mut session = session();
        session.select_square(Square::E2);
        assert!(session.select_square(Square::E4).is_empty());
        assert!(session.select_square(Square::E7).is_empty());
        assert!(session.snapshot().selected.is_none());
    }

    #[test]
    fn accepted_move_extends_history() {
        let mut session = session();
        play(&mut session, Square::E2, Square::E4);
        assert_eq!(session.history(), ["e4"]);
        assert_eq!(session.turn(), Color::Black);
        assert_eq!(
            session.snapshot().last_move,
            Some(["e2".to_string(), "e4".to_string()])
        );
    }

    #[test]
    fn illegal_move_changes_nothing() {
        let mut session = session();
        play(&mut session, Square::E2, Square::E4);
        let before = session.snapshot();

        assert!(!session.apply_move(Square::E4, Square::E6, None));
        assert!(!session.apply_move(Square::A3, Square::A4, None));
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn check_is_reported() {
        let mut session = session();
        play(&mut session, Square::E2, Square::E4);
        play(&mut session, Square::F7, Square::F5);
        play(&mut session, Square::D1, Square::H5);
        assert_eq!(session.status(), GameStatus::InProgress { check: true });
        assert!(session.snapshot().in_check);
        assert_eq!(session.history().last().map(String::as_str), Some("Qh5+"));
    }

    #[test]
    fn checkmate_runs_analysis() {
        let mut session = session();
        play(&mut session, Square::F2, Square::F3);
        play(&mut session, Square::E7, Square::E5);
        play(&mut session, Square::G2, Square::G4);
        assert!(session.analysis().is_none());
        play(&mut session, Square::D8, Square::H4);

        assert_eq!(
            session.status(),
            GameStatus::Checkmate {
                winner: Color::Black
            }
        );
        let analysis = session.analysis().unwrap();
        assert_eq!(analysis.moves(), vec!["f3", "e5", "g4", "Qh4#"]);
        assert_eq!(analysis.moves_analysis[3].evaluation, 1.0);

        assert!(!session.apply_move(Square::A2, Square::A3, None));
        assert_eq!(session.history().len(), 4);
    }

    #[test]
    fn reset_returns_to_start() {
        let mut session = session();
        play(&mut session, Square::F2, Square::F3);
        play(&mut session, Square::E7, Square::E5);
        play(&mut session, Square::G2, Square::G4);
        play(&mut session, Square::D8, Square::H4);
        session.select_square(Square::A2);

        session.reset();
        assert_eq!(session.fen(), STARTING_FEN);
        assert!(session.history().is_empty());
        assert!(session.analysis().is_none());
        assert!(!session.is_game_over());
        assert!(session.snapshot().last_move.is_none());
    }

    #[test]
    fn change_mode_resets_and_rejects_online() {
        let mut session = session();
        play(&mut session, Square::E2, Square::E4);

        session.change_mode(GameMode::AiHard).unwrap();
        assert_eq!(session.mode(), GameMode::AiHard);
        assert!(session.history().is_empty());

        play(&mut session, Square::D2, Square::D4);
        let err = session.change_mode(GameMode::Online).unwrap_err();
        assert_eq!(err, SessionError::ModeDisabled(GameMode::Online));
        assert_eq!(session.mode(), GameMode::AiHard);
        assert_eq!(session.history(), ["d4"]);
    }

    #[test]
    fn autoplay_only_in_ai_modes() {
        let mut session = session();
        play(&mut session, Square::E2, Square::E4);
        assert!(session.autoplay_move().is_none());

        session.change_mode(GameMode::AiEasy).unwrap();
        play(&mut session, Square::E2, Square::E4);
        let reply = session.autoplay_move().unwrap();
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history()[1], reply.san);
        assert_eq!(session.turn(), Color::White);
    }

    #[test]
    fn with_parts_starts_from_standard_position() {
        let rules = StandardRules::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let session = GameSession::with_parts(
            rules,
            MoveAnalyzer::new(neutral as fn(&str, &PlayedMove) -> _, FirstAlternatives),
            TierSelectors::default(),
        );
        assert_eq!(session.fen(), STARTING_FEN);
    }
}
