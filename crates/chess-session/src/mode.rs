//! Game modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Who plays the second side of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    /// Two players sharing one board.
    #[default]
    Local,
    AiEasy,
    AiMedium,
    AiHard,
    /// Reserved for network play; currently disabled.
    Online,
}

impl GameMode {
    /// Every mode, in menu order.
    pub const ALL: [GameMode; 5] = [
        GameMode::Local,
        GameMode::AiEasy,
        GameMode::AiMedium,
        GameMode::AiHard,
        GameMode::Online,
    ];

    /// Returns true if the computer answers each human move.
    pub fn is_ai(self) -> bool {
        matches!(self, GameMode::AiEasy | GameMode::AiMedium | GameMode::AiHard)
    }

    /// Returns true if a session may switch to this mode.
    pub fn is_enabled(self) -> bool {
        self != GameMode::Online
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Local => "local",
            GameMode::AiEasy => "ai-easy",
            GameMode::AiMedium => "ai-medium",
            GameMode::AiHard => "ai-hard",
            GameMode::Online => "online",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| format!("unknown game mode: {s}"))
    }
}
