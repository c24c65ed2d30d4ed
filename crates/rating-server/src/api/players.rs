//! Player rating API handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::error::ApiError;
use crate::models::{GameResult, NewPerformance, PlayerPerformance, PlayerRating, ResultOutcome};
use crate::rating;
use crate::AppState;

/// Get a player's rating, creating it with defaults on first lookup.
///
/// # Endpoint
///
/// `GET /api/players/:username/rating`
///
/// # Response
///
/// - `200 OK`: JSON player rating
/// - `500 Internal Server Error`: Database error
pub async fn get_rating(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<PlayerRating>, ApiError> {
    let rating = state.rankings.get_or_create_rating(&username)?;
    Ok(Json(rating))
}

/// Record the outcome of a game for an existing player.
///
/// # Endpoint
///
/// `POST /api/players/:username/performance`
///
/// Body: `{playerId?, gameId?, accuracy, ratingChange, isWin}`
///
/// # Response
///
/// - `200 OK`: The created performance
/// - `400 Bad Request`: Body does not match the schema
/// - `404 Not Found`: The player has no rating yet
pub async fn record_performance(
    State(state): State<AppState>,
    Path(username): Path<String>,
    payload: Result<Json<NewPerformance>, JsonRejection>,
) -> Result<Json<PlayerPerformance>, ApiError> {
    let Json(performance) = payload?;
    performance.validate().map_err(ApiError::Validation)?;

    let recorded = state.rankings.record_performance(&username, &performance)?;
    Ok(Json(recorded.performance))
}

/// List a player's recorded performances, newest first.
///
/// # Endpoint
///
/// `GET /api/players/:username/performances`
pub async fn list_performances(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<PlayerPerformance>>, ApiError> {
    if state.rankings.get_rating(&username)?.is_none() {
        return Err(ApiError::NotFound(format!("player {username} not found")));
    }
    Ok(Json(state.rankings.list_performances(&username)?))
}

/// Score a finished game and record it.
///
/// The server computes the rating change from accuracy and result. Unlike
/// `performance`, this endpoint creates the player's rating when missing.
///
/// # Endpoint
///
/// `POST /api/players/:username/results`
///
/// Body: `{gameId?, accuracy, isWin}`
///
/// # Response
///
/// - `201 Created`: `{ratingChange, newRating, performance}`
/// - `400 Bad Request`: Body is invalid
pub async fn record_result(
    State(state): State<AppState>,
    Path(username): Path<String>,
    payload: Result<Json<GameResult>, JsonRejection>,
) -> Result<(StatusCode, Json<ResultOutcome>), ApiError> {
    let Json(result) = payload?;
    let performance = NewPerformance {
        player_id: None,
        game_id: result.game_id,
        accuracy: result.accuracy,
        rating_change: rating::rating_change(result.accuracy, result.is_win),
        is_win: result.is_win,
    };
    performance.validate().map_err(ApiError::Validation)?;

    state.rankings.get_or_create_rating(&username)?;
    let recorded = state.rankings.record_performance(&username, &performance)?;

    Ok((
        StatusCode::CREATED,
        Json(ResultOutcome {
            rating_change: recorded.performance.rating_change,
            new_rating: recorded.rating.rating,
            performance: recorded.performance,
        }),
    ))
}
