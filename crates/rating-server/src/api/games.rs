//! Finished game API handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chess_analysis::{GameAnalysis, MoveAnalyzer};
use chess_rules::{RulesEngine, StandardRules};
use tracing::info;

use crate::error::ApiError;
use crate::models::{NewGame, SavedGame};
use crate::repo::GameStore;
use crate::AppState;

/// Analyze a finished game and store it.
///
/// # Endpoint
///
/// `POST /api/games`
///
/// Body: `{moves: [san, ...]}`
///
/// # Response
///
/// - `201 Created`: `{gameId, analysis}`
/// - `400 Bad Request`: Empty or illegal move list
pub async fn create_game(
    State(state): State<AppState>,
    payload: Result<Json<NewGame>, JsonRejection>,
) -> Result<(StatusCode, Json<SavedGame>), ApiError> {
    let Json(game) = payload?;
    if game.moves.is_empty() {
        return Err(ApiError::Validation(
            "a game needs at least one move".to_string(),
        ));
    }

    let mut rules = StandardRules::new();
    for san in &game.moves {
        rules.play_san(san)?;
    }

    let analysis = MoveAnalyzer::random().analyze(&game.moves)?;
    let game_id = GameStore::new(state.db.clone()).save(&rules.fen(), &game.moves, &analysis)?;
    info!(
        game_id,
        moves = game.moves.len(),
        player_score = analysis.player_score,
        "game stored"
    );

    Ok((StatusCode::CREATED, Json(SavedGame { game_id, analysis })))
}

/// Fetch the stored analysis of a game.
///
/// # Endpoint
///
/// `GET /api/games/:id/analysis`
///
/// # Response
///
/// - `200 OK`: The analysis
/// - `404 Not Found`: No such game
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<GameAnalysis>, ApiError> {
    GameStore::new(state.db.clone())
        .analysis(id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("game {id} not found")))
}
