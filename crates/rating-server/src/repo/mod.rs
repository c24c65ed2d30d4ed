//! Repository modules for database operations.

pub mod games;
pub mod ratings;

pub use games::GameStore;
pub use ratings::{RankingStore, SqliteRankingStore};

use thiserror::Error;

/// Errors reported by the stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("{0} not found")]
    NotFound(String),
    /// The record already exists.
    #[error("{0} already exists")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("stored JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Internal(String),
}
