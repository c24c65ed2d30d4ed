//! API models for serialization.

use chess_analysis::GameAnalysis;
use chess_session::GameMode;
use serde::{Deserialize, Deserializer, Serialize};

/// A player's rating and aggregate statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRating {
    pub id: i64,
    pub username: String,
    pub rating: i32,
    pub games_played: i32,
    /// Running mean of every recorded accuracy.
    pub average_accuracy: f64,
    /// Highest recorded accuracy.
    pub best_accuracy: f64,
    pub win_count: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl PlayerRating {
    /// Share of games won, between 0.0 and 1.0.
    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            self.win_count as f64 / self.games_played as f64
        }
    }
}

/// One recorded game result. Never modified after insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPerformance {
    pub id: i64,
    pub player_id: i64,
    pub game_id: Option<i64>,
    pub accuracy: f64,
    pub rating_change: i32,
    pub is_win: bool,
    pub created_at: String,
}

/// Body of `POST /api/players/:username/performance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewPerformance {
    /// Accepted for compatibility; the player is resolved from the URL.
    #[serde(default)]
    pub player_id: Option<i64>,
    #[serde(default)]
    pub game_id: Option<i64>,
    pub accuracy: f64,
    pub rating_change: i32,
    /// `true`/`false` or `1`/`0`.
    #[serde(deserialize_with = "bool_or_int")]
    pub is_win: bool,
}

impl NewPerformance {
    /// Checks the values a JSON schema cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if !self.accuracy.is_finite() || !(0.0..=100.0).contains(&self.accuracy) {
            return Err(format!(
                "accuracy must be between 0 and 100, got {}",
                self.accuracy
            ));
        }
        Ok(())
    }
}

fn bool_or_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Int(other) => Err(serde::de::Error::custom(format!(
            "isWin must be 0 or 1, got {other}"
        ))),
    }
}

/// A stored performance together with the rating it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPerformance {
    pub performance: PlayerPerformance,
    /// The player's rating as of this performance's commit.
    pub rating: PlayerRating,
}

/// Body of `POST /api/players/:username/results`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    #[serde(default)]
    pub game_id: Option<i64>,
    pub accuracy: f64,
    pub is_win: bool,
}

/// Response of `POST /api/players/:username/results`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultOutcome {
    pub rating_change: i32,
    pub new_rating: i32,
    pub performance: PlayerPerformance,
}

/// Body of `POST /api/games`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGame {
    pub moves: Vec<String>,
}

/// A finished game as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: i64,
    /// Final position.
    pub fen: String,
    pub moves: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Response of `POST /api/games`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    pub game_id: i64,
    pub analysis: GameAnalysis,
}

/// Body of `POST /api/sessions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSession {
    #[serde(default)]
    pub mode: Option<GameMode>,
}

/// Body of `PUT /api/sessions/:id/mode`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeChange {
    pub mode: GameMode,
}

/// Body of `POST /api/sessions/:id/select`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquareSelection {
    pub square: String,
}

/// Response of `POST /api/sessions/:id/select`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionTargets {
    pub square: String,
    pub targets: Vec<String>,
}

/// Body of `POST /api/sessions/:id/moves`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    pub from: String,
    pub to: String,
    /// Promotion piece letter; a queen when omitted.
    #[serde(default)]
    pub promotion: Option<String>,
}

/// A session and its identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: String,
    #[serde(flatten)]
    pub state: chess_session::SessionSnapshot,
}
