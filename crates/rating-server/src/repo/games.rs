//! Finished games and their analyses.

use chess_analysis::GameAnalysis;
use rusqlite::OptionalExtension;

use crate::db::{self, DbPool};
use crate::models::Game;
use crate::repo::StoreError;

/// Repository for finished games.
#[derive(Clone)]
pub struct GameStore {
    db: DbPool,
}

impl GameStore {
    /// Create a new game store with the given database pool.
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Stores a game and its analysis together, returning the game id.
    pub fn save(
        &self,
        fen: &str,
        moves: &[String],
        analysis: &GameAnalysis,
    ) -> Result<i64, StoreError> {
        let moves_json = serde_json::to_string(moves)?;
        let best_json = serde_json::to_string(&analysis.best_moves)?;
        let analysis_json = serde_json::to_string(&analysis.moves_analysis)?;

        let conn = db::lock(&self.db)?;
        db::immediate(&conn, |conn| {
            let now = db::now();
            conn.execute(
                "INSERT INTO games (fen, moves, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
                (fen, &moves_json, &now),
            )?;
            let game_id = conn.last_insert_rowid();

            conn.execute(
                "INSERT INTO game_analysis
                    (game_id, player_score, best_moves, moves_analysis, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (game_id, analysis.player_score, &best_json, &analysis_json, &now),
            )?;
            Ok(game_id)
        })
    }

    /// Get a game by id.
    ///
    /// Returns `None` if the game doesn't exist.
    pub fn get(&self, id: i64) -> Result<Option<Game>, StoreError> {
        let conn = db::lock(&self.db)?;
        let row = conn
            .query_row(
                "SELECT id, fen, moves, created_at, updated_at FROM games WHERE id = ?1",
                [id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((id, fen, moves, created_at, updated_at)) => Ok(Some(Game {
                id,
                fen,
                moves: serde_json::from_str(&moves)?,
                created_at,
                updated_at,
            })),
            None => Ok(None),
        }
    }

    /// The most recent analysis stored for a game.
    pub fn analysis(&self, game_id: i64) -> Result<Option<GameAnalysis>, StoreError> {
        let conn = db::lock(&self.db)?;
        let row = conn
            .query_row(
                "SELECT player_score, best_moves, moves_analysis FROM game_analysis
                 WHERE game_id = ?1 ORDER BY id DESC LIMIT 1",
                [game_id],
                |row| {
                    Ok((
                        row.get::<_, f64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((player_score, best_moves, moves_analysis)) => Ok(Some(GameAnalysis {
                player_score,
                best_moves: serde_json::from_str(&best_moves)?,
                moves_analysis: serde_json::from_str(&moves_analysis)?,
            })),
            None => Ok(None),
        }
    }
}
