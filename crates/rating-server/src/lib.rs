//! Rating Server Library
//!
//! HTTP front end for interactive chess sessions, post-game analysis and a
//! persistent player leaderboard. The binary in `main.rs` only loads
//! configuration and serves [`router`].

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod rating;
pub mod repo;
pub mod sessions;

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post, put};
use axum::Router;
use db::DbPool;
use repo::{RankingStore, SqliteRankingStore};
use sessions::SessionRegistry;
use tower_http::cors::{Any, CorsLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: DbPool,
    pub rankings: Arc<dyn RankingStore>,
    /// Live game sessions.
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(db: DbPool, autoplay_delay: Duration) -> Self {
        Self {
            rankings: Arc::new(SqliteRankingStore::new(db.clone())),
            sessions: SessionRegistry::new(autoplay_delay),
            db,
        }
    }
}

/// Health check endpoint.
///
/// Returns "ok" to indicate the server is running.
pub async fn health() -> &'static str {
    "ok"
}

/// Builds the application router with all routes and layers.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route(
            "/api/players/:username/rating",
            get(api::players::get_rating),
        )
        .route(
            "/api/players/:username/performance",
            post(api::players::record_performance),
        )
        .route(
            "/api/players/:username/performances",
            get(api::players::list_performances),
        )
        .route(
            "/api/players/:username/results",
            post(api::players::record_result),
        )
        .route("/api/rankings", get(api::rankings::list_rankings))
        .route("/api/games", post(api::games::create_game))
        .route("/api/games/:id/analysis", get(api::games::get_analysis))
        .route("/api/sessions", post(api::sessions::create_session))
        .route(
            "/api/sessions/:id",
            get(api::sessions::get_session).delete(api::sessions::delete_session),
        )
        .route(
            "/api/sessions/:id/select",
            post(api::sessions::select_square),
        )
        .route("/api/sessions/:id/moves", post(api::sessions::play_move))
        .route("/api/sessions/:id/reset", post(api::sessions::reset_session))
        .route("/api/sessions/:id/mode", put(api::sessions::change_mode))
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::log_requests))
        .layer(cors)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::StatusCode;

    pub fn test_state() -> AppState {
        let db = db::init_db(":memory:").expect("Failed to init test db");
        AppState::new(db, Duration::from_millis(20))
    }

    /// Helper to extract response body as JSON
    pub async fn extract_json<T: serde::de::DeserializeOwned>(
        response: axum::response::Response,
    ) -> (StatusCode, T) {
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: T = serde_json::from_slice(&body).unwrap();
        (status, json)
    }
}
