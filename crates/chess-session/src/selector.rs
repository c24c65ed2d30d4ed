//! Move selection for the computer side.

use chess_rules::PlayedMove;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::mode::GameMode;

/// Picks the computer's reply from the legal moves.
pub trait MoveSelector: Send {
    /// Chooses one of `legal`, or `None` if there is nothing to play.
    fn choose(&mut self, legal: &[PlayedMove]) -> Option<PlayedMove>;
}

/// Plays a uniformly random legal move.
#[derive(Debug, Clone)]
pub struct RandomMoveSelector {
    rng: StdRng,
}

impl RandomMoveSelector {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomMoveSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveSelector for RandomMoveSelector {
    fn choose(&mut self, legal: &[PlayedMove]) -> Option<PlayedMove> {
        legal.choose(&mut self.rng).cloned()
    }
}

/// Always plays the first legal move. Useful for reproducible games.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMoveSelector;

impl MoveSelector for FirstMoveSelector {
    fn choose(&mut self, legal: &[PlayedMove]) -> Option<PlayedMove> {
        legal.first().cloned()
    }
}

/// One selector per difficulty tier.
///
/// All tiers default to [`RandomMoveSelector`], so easy, medium and hard
/// currently play identically.
pub struct TierSelectors {
    easy: Box<dyn MoveSelector>,
    medium: Box<dyn MoveSelector>,
    hard: Box<dyn MoveSelector>,
}

impl TierSelectors {
    /// Uses the same kind of selector for every tier.
    pub fn uniform<S, F>(mut make: F) -> Self
    where
        S: MoveSelector + 'static,
        F: FnMut() -> S,
    {
        Self {
            easy: Box::new(make()),
            medium: Box::new(make()),
            hard: Box::new(make()),
        }
    }

    /// Replaces the selector used for `mode`. Non-AI modes are ignored.
    pub fn set(&mut self, mode: GameMode, selector: impl MoveSelector + 'static) {
        if let Some(slot) = self.slot(mode) {
            *slot = Box::new(selector);
        }
    }

    /// The selector for `mode`, if it is an AI mode.
    pub fn for_mode(&mut self, mode: GameMode) -> Option<&mut dyn MoveSelector> {
        match self.slot(mode) {
            Some(slot) => Some(slot.as_mut()),
            None => None,
        }
    }

    fn slot(&mut self, mode: GameMode) -> Option<&mut Box<dyn MoveSelector>> {
        match mode {
            GameMode::AiEasy => Some(&mut self.easy),
            GameMode::AiMedium => Some(&mut self.medium),
            GameMode::AiHard => Some(&mut self.hard),
            GameMode::Local | GameMode::Online => None,
        }
    }
}

impl Default for TierSelectors {
    fn default() -> Self {
        Self::uniform(RandomMoveSelector::new)
    }
}
