//! Interactive game session API handlers.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chess_rules::{parse_promotion, parse_square};
use chess_session::{GameMode, SessionHandle};

use crate::error::ApiError;
use crate::models::{
    ModeChange, MoveRequest, NewSession, SelectionTargets, SessionView, SquareSelection,
};
use crate::AppState;

async fn find(state: &AppState, id: &str) -> Result<SessionHandle, ApiError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("session {id} not found")))
}

/// Start a new session, optionally in a given mode.
///
/// # Endpoint
///
/// `POST /api/sessions`
///
/// Body: `{mode?}`. An empty body starts a local game.
///
/// # Response
///
/// - `201 Created`: The new session
/// - `400 Bad Request`: Malformed body, unknown or disabled mode
pub async fn create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        NewSession::default()
    } else {
        serde_json::from_slice::<NewSession>(&body)
            .map_err(|e| ApiError::Validation(format!("invalid session body: {e}")))?
    };
    let mode = request.mode.unwrap_or_default();
    if !mode.is_enabled() {
        return Err(ApiError::Validation(format!("mode {mode} is not available")));
    }

    let (id, handle) = state.sessions.create().await;
    let snapshot = if mode == GameMode::Local {
        handle.snapshot().await
    } else {
        handle.change_mode(mode).await?
    };
    Ok((
        StatusCode::CREATED,
        Json(SessionView {
            id,
            state: snapshot,
        }),
    ))
}

/// `GET /api/sessions/:id`
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let snapshot = find(&state, &id).await?.snapshot().await;
    Ok(Json(SessionView {
        id,
        state: snapshot,
    }))
}

/// Select a square and list the legal destinations of its piece.
///
/// # Endpoint
///
/// `POST /api/sessions/:id/select`
///
/// Body: `{square}`
pub async fn select_square(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SquareSelection>, JsonRejection>,
) -> Result<Json<SelectionTargets>, ApiError> {
    let Json(body) = payload?;
    let square = parse_square(&body.square)?;
    let targets = find(&state, &id).await?.select_square(square).await;
    Ok(Json(SelectionTargets {
        square: square.to_string(),
        targets: targets.iter().map(|s| s.to_string()).collect(),
    }))
}

/// Play a move.
///
/// # Endpoint
///
/// `POST /api/sessions/:id/moves`
///
/// Body: `{from, to, promotion?}`
///
/// # Response
///
/// - `200 OK`: Session state after the move
/// - `409 Conflict`: Game over, or the computer has not replied yet
/// - `422 Unprocessable Entity`: Illegal move
pub async fn play_move(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> Result<Json<SessionView>, ApiError> {
    let Json(body) = payload?;
    let from = parse_square(&body.from)?;
    let to = parse_square(&body.to)?;
    let promotion = body.promotion.as_deref().map(parse_promotion).transpose()?;

    let snapshot = find(&state, &id)
        .await?
        .apply_move(from, to, promotion)
        .await?;
    Ok(Json(SessionView {
        id,
        state: snapshot,
    }))
}

/// `POST /api/sessions/:id/reset`
pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let snapshot = find(&state, &id).await?.reset().await;
    Ok(Json(SessionView {
        id,
        state: snapshot,
    }))
}

/// Discard a session, cancelling any pending computer reply.
///
/// # Endpoint
///
/// `DELETE /api/sessions/:id`
///
/// # Response
///
/// - `204 No Content`: The session is gone
/// - `404 Not Found`: No such session
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .sessions
        .remove(&id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| ApiError::NotFound(format!("session {id} not found")))
}

/// Switch the game mode. The board is reset.
///
/// # Endpoint
///
/// `PUT /api/sessions/:id/mode`
///
/// Body: `{mode}`
pub async fn change_mode(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ModeChange>, JsonRejection>,
) -> Result<Json<SessionView>, ApiError> {
    let Json(body) = payload?;
    let snapshot = find(&state, &id).await?.change_mode(body.mode).await?;
    Ok(Json(SessionView {
        id,
        state: snapshot,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{extract_json, test_state};
    use axum::response::IntoResponse;

    async fn new_session(state: &AppState, mode: Option<GameMode>) -> SessionView {
        let body = Bytes::from(serde_json::to_vec(&NewSession { mode }).unwrap());
        let response = create_session(State(state.clone()), body)
            .await
            .into_response();
        let (status, view): (_, SessionView) = extract_json(response).await;
        assert_eq!(status, StatusCode::CREATED);
        view
    }

    fn move_body(from: &str, to: &str) -> Result<Json<MoveRequest>, JsonRejection> {
        Ok(Json(MoveRequest {
            from: from.to_string(),
            to: to.to_string(),
            promotion: None,
        }))
    }

    #[tokio::test]
    async fn test_create_defaults_to_local() {
        let state = test_state();
        let response = create_session(State(state.clone()), Bytes::new())
            .await
            .into_response();
        let (_, view): (_, SessionView) = extract_json(response).await;
        assert_eq!(view.state.mode, GameMode::Local);
        assert!(view.state.history.is_empty());
        assert!(state.sessions.get(&view.id).await.is_some());
    }

    #[tokio::test]
    async fn test_create_online_rejected() {
        let state = test_state();
        let body = Bytes::from_static(br#"{"mode":"online"}"#);
        let response = create_session(State(state), body).await.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_body() {
        let state = test_state();
        let bodies: [&'static [u8]; 3] = [br#"{"mode":"ai-impossible"}"#, b"{not json", b"\"local\""];
        for body in bodies {
            let response = create_session(State(state.clone()), Bytes::from_static(body))
                .await
                .into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
        assert!(state.sessions.get("anything").await.is_none());
    }

    #[tokio::test]
    async fn test_delete_session_cancels_reply() {
        let state = test_state();
        let view = new_session(&state, Some(GameMode::AiMedium)).await;
        play_move(State(state.clone()), Path(view.id.clone()), move_body("e2", "e4"))
            .await
            .unwrap();
        let handle = state.sessions.get(&view.id).await.unwrap();
        assert!(handle.is_pending());

        let status = delete_session(State(state.clone()), Path(view.id.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(!handle.is_pending());
        assert!(state.sessions.get(&view.id).await.is_none());

        let response = delete_session(State(state), Path(view.id))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_select_then_move() {
        let state = test_state();
        let view = new_session(&state, None).await;

        let selection = Ok(Json(SquareSelection {
            square: "e2".to_string(),
        }));
        let response = select_square(State(state.clone()), Path(view.id.clone()), selection)
            .await
            .into_response();
        let (_, targets): (_, SelectionTargets) = extract_json(response).await;
        assert_eq!(targets.targets.len(), 2);
        assert!(targets.targets.contains(&"e4".to_string()));

        let response = play_move(State(state), Path(view.id), move_body("e2", "e4"))
            .await
            .into_response();
        let (status, after): (_, SessionView) = extract_json(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(after.state.history, vec!["e4".to_string()]);
        assert_eq!(after.state.turn, "black");
        assert_eq!(
            after.state.last_move,
            Some(["e2".to_string(), "e4".to_string()])
        );
    }

    #[tokio::test]
    async fn test_illegal_move_is_422() {
        let state = test_state();
        let view = new_session(&state, None).await;
        let response = play_move(State(state.clone()), Path(view.id.clone()), move_body("e2", "e5"))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = get_session(State(state), Path(view.id)).await.into_response();
        let (_, unchanged): (_, SessionView) = extract_json(response).await;
        assert!(unchanged.state.history.is_empty());
    }

    #[tokio::test]
    async fn test_bad_square_is_400() {
        let state = test_state();
        let view = new_session(&state, None).await;
        let response = play_move(State(state), Path(view.id), move_body("z9", "e4"))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let state = test_state();
        let response = get_session(State(state), Path("nope".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ai_session_refuses_move_while_reply_pending() {
        let state = test_state();
        let view = new_session(&state, Some(GameMode::AiEasy)).await;
        assert_eq!(view.state.mode, GameMode::AiEasy);

        let response = play_move(State(state.clone()), Path(view.id.clone()), move_body("e2", "e4"))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let response = play_move(State(state.clone()), Path(view.id.clone()), move_body("d2", "d4"))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let settled = state.sessions.get(&view.id).await.unwrap().settle().await;
        assert_eq!(settled.history.len(), 2);
        assert_eq!(settled.turn, "white");
    }

    #[tokio::test]
    async fn test_reset_and_change_mode() {
        let state = test_state();
        let view = new_session(&state, None).await;
        play_move(State(state.clone()), Path(view.id.clone()), move_body("e2", "e4"))
            .await
            .unwrap();

        let response = reset_session(State(state.clone()), Path(view.id.clone()))
            .await
            .into_response();
        let (_, reset): (_, SessionView) = extract_json(response).await;
        assert!(reset.state.history.is_empty());
        assert_eq!(reset.state.fen, chess_rules::STARTING_FEN);

        let body = Ok(Json(ModeChange {
            mode: GameMode::AiHard,
        }));
        let response = change_mode(State(state.clone()), Path(view.id.clone()), body)
            .await
            .into_response();
        let (_, changed): (_, SessionView) = extract_json(response).await;
        assert_eq!(changed.state.mode, GameMode::AiHard);

        let body = Ok(Json(ModeChange {
            mode: GameMode::Online,
        }));
        let response = change_mode(State(state), Path(view.id), body)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
