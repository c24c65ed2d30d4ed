//! HTTP API handlers.

pub mod games;
pub mod players;
pub mod rankings;
pub mod sessions;
