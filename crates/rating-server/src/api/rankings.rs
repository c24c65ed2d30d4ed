//! Leaderboard API handler.

use axum::{extract::State, Json};

use crate::error::ApiError;
use crate::models::PlayerRating;
use crate::AppState;

/// List all players, highest rating first.
///
/// # Endpoint
///
/// `GET /api/rankings`
///
/// # Response
///
/// - `200 OK`: JSON array of player ratings
/// - `500 Internal Server Error`: Database error
pub async fn list_rankings(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlayerRating>>, ApiError> {
    Ok(Json(state.rankings.list_rankings()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewPerformance;
    use crate::test_support::{extract_json, test_state};
    use axum::{http::StatusCode, response::IntoResponse};

    #[tokio::test]
    async fn test_list_rankings_empty() {
        let state = test_state();
        let response = list_rankings(State(state)).await.into_response();
        let (status, rankings): (_, Vec<PlayerRating>) = extract_json(response).await;
        assert_eq!(status, StatusCode::OK);
        assert!(rankings.is_empty());
    }

    #[tokio::test]
    async fn test_list_rankings_ordered() {
        let state = test_state();
        for (name, change) in [("ana", -16), ("bob", 40), ("cy", 5)] {
            state.rankings.create_rating(name).unwrap();
            state
                .rankings
                .record_performance(
                    name,
                    &NewPerformance {
                        player_id: None,
                        game_id: None,
                        accuracy: 50.0,
                        rating_change: change,
                        is_win: change > 0,
                    },
                )
                .unwrap();
        }

        let response = list_rankings(State(state)).await.into_response();
        assert!(response.headers().get("cache-control").is_none());
        let (_, rankings): (_, Vec<PlayerRating>) = extract_json(response).await;
        let ratings: Vec<i32> = rankings.iter().map(|r| r.rating).collect();
        assert_eq!(ratings, vec![1240, 1205, 1184]);
    }
}
