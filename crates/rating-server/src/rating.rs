//! Rating calculation.
//!
//! A game moves a rating by a fixed base (+32 for a win, -16 otherwise)
//! plus an accuracy bonus of one point per ten percent above 50.

const WIN_BASE: i32 = 32;
const LOSS_BASE: i32 = -16;
const MIN_CHANGE: i32 = -32;
const MAX_CHANGE: i32 = 48;

/// Rating every new player starts with.
pub const INITIAL_RATING: i32 = 1200;

/// Rating change for one game.
///
/// # Arguments
/// * `accuracy` - Accuracy in percent (0-100)
/// * `is_win` - Whether the player won
pub fn rating_change(accuracy: f64, is_win: bool) -> i32 {
    let base = if is_win { WIN_BASE } else { LOSS_BASE };
    let bonus = ((accuracy - 50.0) / 10.0).floor() as i32;
    (base + bonus).clamp(MIN_CHANGE, MAX_CHANGE)
}

/// Applies a change to a rating. There is no lower bound.
pub fn new_rating(current: i32, change: i32) -> i32 {
    current + change
}
