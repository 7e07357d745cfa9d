//! A single room: the stored snapshot and who is seated.

use std::time::Duration;

use chain_reaction_protocol::{ChainReaction, GameState, PlayerId, RoomId};
use tokio::time::Instant;

/// One game and its members, as stored by the registry.
///
/// `game_state` is only ever replaced wholesale with the output of an
/// engine operation. `player_ids` is an insertion-ordered set.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub game_state: GameState,
    pub player_ids: Vec<PlayerId>,
    pub created_at: Instant,
}

impl Room {
    pub(crate) fn new(id: RoomId, game_state: GameState) -> Self {
        Self {
            id,
            game_state,
            player_ids: Vec::new(),
            created_at: Instant::now(),
        }
    }

    pub fn has_player(&self, id: &PlayerId) -> bool {
        self.player_ids.contains(id)
    }

    pub fn player_count(&self) -> usize {
        self.player_ids.len()
    }

    /// Time since creation, measured against `now`.
    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }
}

/// What a registry move hands back: the explosions in order, and the
/// snapshot after the move was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub reactions: Vec<ChainReaction>,
    pub game_state: GameState,
}
