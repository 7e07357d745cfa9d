//! Registry and sweeper configuration.

use std::time::Duration;

use chain_reaction_engine::GameConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Settings shared by every room in a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Maximum members a room will seat.
    pub max_players: usize,

    /// Length of generated room ids.
    pub room_id_len: usize,

    /// Rules handed to the engine for every game.
    pub game: GameConfig,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: 10,
            room_id_len: 8,
            game: GameConfig::default(),
        }
    }
}

impl RoomConfig {
    /// Clamp and fix any out-of-range values so the config is safe to use.
    ///
    /// Called by [`RoomRegistry::new`](crate::RoomRegistry::new). Ids
    /// shorter than 4 characters are lengthened to 4, a room must seat at
    /// least as many players as it takes to start a game, and the game
    /// rules are validated too.
    pub fn validated(mut self) -> Self {
        self.game = self.game.validated();
        if self.room_id_len < 4 {
            warn!(room_id_len = self.room_id_len, "room_id_len below 4, clamping");
            self.room_id_len = 4;
        }
        if self.max_players < self.game.min_players {
            warn!(
                max_players = self.max_players,
                min_players = self.game.min_players,
                "room max_players below game min_players, clamping"
            );
            self.max_players = self.game.min_players;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// SweepConfig
// ---------------------------------------------------------------------------

/// How often the sweeper runs and how old a room must be to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub interval: Duration,
    pub max_age: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60 * 60),
            max_age: Duration::from_secs(24 * 60 * 60),
        }
    }
}
