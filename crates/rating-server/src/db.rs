//! Database module for the rating server.

use rusqlite::{Connection, Result as SqliteResult, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::repo::StoreError;

/// Thread-safe database connection pool.
pub type DbPool = Arc<Mutex<Connection>>;

/// How long a writer waits for another connection's lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Initialize database with schema.
///
/// Creates all necessary tables:
/// - `player_ratings`: One row per player with aggregate statistics
/// - `player_performance`: Append-only log of per-game results
/// - `games`: Finished games with their final position and moves
/// - `game_analysis`: Move analysis produced for a finished game
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file (use `:memory:` for in-memory)
///
/// # Errors
///
/// Returns an error if the database cannot be opened or schema creation fails.
pub fn init_db<P: AsRef<Path>>(path: P) -> SqliteResult<DbPool> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;

    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS player_ratings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            rating INTEGER NOT NULL DEFAULT 1200,
            games_played INTEGER NOT NULL DEFAULT 0,
            average_accuracy REAL NOT NULL DEFAULT 0,
            best_accuracy REAL NOT NULL DEFAULT 0,
            win_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS games (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            fen TEXT NOT NULL,
            moves TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS player_performance (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            player_id INTEGER NOT NULL REFERENCES player_ratings(id),
            game_id INTEGER,
            accuracy REAL NOT NULL,
            rating_change INTEGER NOT NULL,
            is_win INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS game_analysis (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            game_id INTEGER NOT NULL REFERENCES games(id),
            player_score REAL NOT NULL,
            best_moves TEXT NOT NULL,
            moves_analysis TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_ratings_rating ON player_ratings(rating);
        CREATE INDEX IF NOT EXISTS idx_performance_player ON player_performance(player_id);
        CREATE INDEX IF NOT EXISTS idx_analysis_game ON game_analysis(game_id);
        ",
    )?;

    Ok(Arc::new(Mutex::new(conn)))
}

/// Locks the pool, turning a poisoned lock into a store error.
pub fn lock(db: &DbPool) -> Result<MutexGuard<'_, Connection>, StoreError> {
    db.lock()
        .map_err(|_| StoreError::Internal("database lock poisoned".to_string()))
}

/// Runs `f` inside a `BEGIN IMMEDIATE` transaction.
///
/// The write lock is taken up front, so concurrent read-modify-write
/// sequences on the same database are serialized. The transaction is
/// rolled back when `f` fails and when the commit itself fails, so the
/// connection is always back in autocommit mode afterwards.
pub fn immediate<T>(
    conn: &Connection,
    f: impl FnOnce(&Connection) -> Result<T, StoreError>,
) -> Result<T, StoreError> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}

/// Current time as an RFC 3339 string, the format stored in every timestamp column.
pub fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_db_creates_tables() {
        let db = init_db(":memory:").expect("Failed to init db");
        let conn = db.lock().unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"player_ratings".to_string()));
        assert!(tables.contains(&"player_performance".to_string()));
        assert!(tables.contains(&"games".to_string()));
        assert!(tables.contains(&"game_analysis".to_string()));
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let path = std::env::temp_dir().join(format!("ratings-{}.db", uuid::Uuid::new_v4()));
        init_db(&path).unwrap();
        init_db(&path).unwrap();
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_rating_defaults() {
        let db = init_db(":memory:").unwrap();
        let conn = db.lock().unwrap();
        conn.execute(
            "INSERT INTO player_ratings (username, created_at, updated_at) VALUES ('ana', 'x', 'x')",
            [],
        )
        .unwrap();

        let (rating, games, wins): (i32, i32, i32) = conn
            .query_row(
                "SELECT rating, games_played, win_count FROM player_ratings WHERE username = 'ana'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!((rating, games, wins), (1200, 0, 0));
    }

    #[test]
    fn test_immediate_rolls_back_on_error() {
        let db = init_db(":memory:").unwrap();
        let conn = db.lock().unwrap();

        let result: Result<(), StoreError> = immediate(&conn, |conn| {
            conn.execute(
                "INSERT INTO games (fen, moves, created_at, updated_at) VALUES ('f', '[]', 'x', 'x')",
                [],
            )?;
            Err(StoreError::Internal("boom".to_string()))
        });
        assert!(result.is_err());

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    fn insert_game(conn: &Connection) -> Result<i64, StoreError> {
        conn.execute(
            "INSERT INTO games (fen, moves, created_at, updated_at) VALUES ('f', '[]', 'x', 'x')",
            [],
        )?;
        Ok(conn.last_insert_rowid())
    }

    #[test]
    fn test_failed_commit_leaves_connection_usable() {
        let path = std::env::temp_dir().join(format!("ratings-{}.db", uuid::Uuid::new_v4()));
        let writer = init_db(&path).unwrap();
        let reader = init_db(&path).unwrap();

        // An open read transaction holds a shared lock, so COMMIT is busy.
        let reader_conn = reader.lock().unwrap();
        reader_conn.execute_batch("BEGIN;").unwrap();
        let _: i64 = reader_conn
            .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))
            .unwrap();

        let conn = writer.lock().unwrap();
        conn.busy_timeout(Duration::from_millis(20)).unwrap();
        assert!(immediate(&conn, insert_game).is_err());
        assert!(conn.is_autocommit());

        reader_conn.execute_batch("COMMIT;").unwrap();
        drop(reader_conn);

        immediate(&conn, insert_game).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);

        drop(conn);
        drop(writer);
        drop(reader);
        let _ = std::fs::remove_file(&path);
    }
}
