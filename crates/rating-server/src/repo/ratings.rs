//! Player ratings and the performance log.

use rusqlite::{Connection, ErrorCode, OptionalExtension, Row};
use tracing::info;

use crate::db::{self, DbPool};
use crate::models::{NewPerformance, PlayerPerformance, PlayerRating, RecordedPerformance};
use crate::repo::StoreError;

/// Storage for player ratings.
///
/// The store is the only writer of rating aggregates; they change solely
/// through [`record_performance`](RankingStore::record_performance).
pub trait RankingStore: Send + Sync {
    /// Looks up a player's rating.
    fn get_rating(&self, username: &str) -> Result<Option<PlayerRating>, StoreError>;

    /// Creates a rating with default values.
    ///
    /// Fails with [`StoreError::Conflict`] if the player already has one.
    fn create_rating(&self, username: &str) -> Result<PlayerRating, StoreError>;

    /// Returns the player's rating, creating a default one first if needed.
    fn get_or_create_rating(&self, username: &str) -> Result<PlayerRating, StoreError>;

    /// Appends a performance and updates the player's aggregates atomically.
    ///
    /// The returned rating is read inside the same transaction, so it is the
    /// one this performance produced even under concurrent writers.
    ///
    /// Fails with [`StoreError::NotFound`] if the player has no rating.
    fn record_performance(
        &self,
        username: &str,
        performance: &NewPerformance,
    ) -> Result<RecordedPerformance, StoreError>;

    /// All ratings, highest first.
    fn list_rankings(&self) -> Result<Vec<PlayerRating>, StoreError>;

    /// A player's recorded performances, newest first.
    fn list_performances(&self, username: &str) -> Result<Vec<PlayerPerformance>, StoreError>;
}

const RATING_COLUMNS: &str = "id, username, rating, games_played, average_accuracy, \
     best_accuracy, win_count, created_at, updated_at";

const PERFORMANCE_COLUMNS: &str =
    "id, player_id, game_id, accuracy, rating_change, is_win, created_at";

/// [`RankingStore`] backed by SQLite.
#[derive(Clone)]
pub struct SqliteRankingStore {
    db: DbPool,
}

impl SqliteRankingStore {
    /// Create a new store with the given database pool.
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

fn rating_from_row(row: &Row<'_>) -> rusqlite::Result<PlayerRating> {
    Ok(PlayerRating {
        id: row.get(0)?,
        username: row.get(1)?,
        rating: row.get(2)?,
        games_played: row.get(3)?,
        average_accuracy: row.get(4)?,
        best_accuracy: row.get(5)?,
        win_count: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn performance_from_row(row: &Row<'_>) -> rusqlite::Result<PlayerPerformance> {
    Ok(PlayerPerformance {
        id: row.get(0)?,
        player_id: row.get(1)?,
        game_id: row.get(2)?,
        accuracy: row.get(3)?,
        rating_change: row.get(4)?,
        is_win: row.get::<_, i32>(5)? != 0,
        created_at: row.get(6)?,
    })
}

fn select_rating(conn: &Connection, username: &str) -> Result<Option<PlayerRating>, StoreError> {
    let sql = format!("SELECT {RATING_COLUMNS} FROM player_ratings WHERE username = ?1");
    Ok(conn
        .query_row(&sql, [username], rating_from_row)
        .optional()?)
}

fn insert_rating(conn: &Connection, username: &str) -> Result<PlayerRating, StoreError> {
    let now = db::now();
    let inserted = conn.execute(
        "INSERT INTO player_ratings (username, created_at, updated_at) VALUES (?1, ?2, ?2)",
        (username, &now),
    );

    match inserted {
        Ok(_) => {}
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
            return Err(StoreError::Conflict(format!("rating for {username}")));
        }
        Err(e) => return Err(e.into()),
    }

    info!(username, "player rating created");
    select_rating(conn, username)?
        .ok_or_else(|| StoreError::Internal(format!("rating for {username} vanished")))
}

impl RankingStore for SqliteRankingStore {
    fn get_rating(&self, username: &str) -> Result<Option<PlayerRating>, StoreError> {
        let conn = db::lock(&self.db)?;
        select_rating(&conn, username)
    }

    fn create_rating(&self, username: &str) -> Result<PlayerRating, StoreError> {
        let conn = db::lock(&self.db)?;
        insert_rating(&conn, username)
    }

    fn get_or_create_rating(&self, username: &str) -> Result<PlayerRating, StoreError> {
        let conn = db::lock(&self.db)?;
        db::immediate(&conn, |conn| match select_rating(conn, username)? {
            Some(rating) => Ok(rating),
            None => insert_rating(conn, username),
        })
    }

    fn record_performance(
        &self,
        username: &str,
        performance: &NewPerformance,
    ) -> Result<RecordedPerformance, StoreError> {
        let conn = db::lock(&self.db)?;

        let recorded = db::immediate(&conn, |conn| {
            let rating = select_rating(conn, username)?
                .ok_or_else(|| StoreError::NotFound(format!("player {username}")))?;
            let now = db::now();

            conn.execute(
                "INSERT INTO player_performance
                    (player_id, game_id, accuracy, rating_change, is_win, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (
                    rating.id,
                    performance.game_id,
                    performance.accuracy,
                    performance.rating_change,
                    performance.is_win as i32,
                    &now,
                ),
            )?;
            let id = conn.last_insert_rowid();

            let games = rating.games_played as f64;
            let average = (rating.average_accuracy * games + performance.accuracy) / (games + 1.0);
            let best = rating.best_accuracy.max(performance.accuracy);

            conn.execute(
                "UPDATE player_ratings SET
                    rating = rating + ?1,
                    games_played = games_played + 1,
                    average_accuracy = ?2,
                    best_accuracy = ?3,
                    win_count = win_count + ?4,
                    updated_at = ?5
                 WHERE id = ?6",
                (
                    performance.rating_change,
                    average,
                    best,
                    performance.is_win as i32,
                    &now,
                    rating.id,
                ),
            )?;

            let updated = select_rating(conn, username)?
                .ok_or_else(|| StoreError::Internal(format!("rating for {username} vanished")))?;

            Ok(RecordedPerformance {
                performance: PlayerPerformance {
                    id,
                    player_id: rating.id,
                    game_id: performance.game_id,
                    accuracy: performance.accuracy,
                    rating_change: performance.rating_change,
                    is_win: performance.is_win,
                    created_at: now,
                },
                rating: updated,
            })
        })?;

        info!(
            username,
            rating_change = recorded.performance.rating_change,
            new_rating = recorded.rating.rating,
            accuracy = recorded.performance.accuracy,
            "performance recorded"
        );
        Ok(recorded)
    }

    fn list_rankings(&self) -> Result<Vec<PlayerRating>, StoreError> {
        let conn = db::lock(&self.db)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {RATING_COLUMNS} FROM player_ratings ORDER BY rating DESC, username ASC"
        ))?;

        let ratings = stmt
            .query_map([], rating_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ratings)
    }

    fn list_performances(&self, username: &str) -> Result<Vec<PlayerPerformance>, StoreError> {
        let conn = db::lock(&self.db)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PERFORMANCE_COLUMNS} FROM player_performance
             WHERE player_id = (SELECT id FROM player_ratings WHERE username = ?1)
             ORDER BY id DESC"
        ))?;

        let performances = stmt
            .query_map([username], performance_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(performances)
    }
}
