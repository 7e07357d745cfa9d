//! Game rules configuration.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Colors assigned to seats in join order. Seat 11 wraps back to the
/// first color.
pub const PLAYER_COLORS: [&str; 10] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD", "#98D8C8", "#F7DC6F",
    "#85C1E2", "#F8B739",
];

/// Rules for a single game.
///
/// `max_dots_per_cell` and `initial_dots_per_player` are copied into the
/// [`GameState`](chain_reaction_protocol::GameState) when a game is
/// created; after that the snapshot's values win. The remaining fields
/// stay engine-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// A cell explodes when it reaches this many dots.
    pub max_dots_per_cell: u32,

    /// Single dots dealt to each active player by `start_game`.
    pub initial_dots_per_player: u32,

    /// Minimum active players required to start.
    pub min_players: usize,

    /// Maximum active players a game will seat.
    pub max_players: usize,

    /// Seat colors, indexed by join slot (cycled).
    pub palette: Vec<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_dots_per_cell: 4,
            initial_dots_per_player: 3,
            min_players: 2,
            max_players: 10,
            palette: PLAYER_COLORS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl GameConfig {
    /// Lowest explosion threshold that still lets a cascade settle.
    pub const MIN_DOTS_PER_CELL: u32 = 2;

    /// Clamp and fix any out-of-range values so the config is safe to use.
    ///
    /// Called automatically by the engine constructors. Rules:
    /// - `min_players` at least 2.
    /// - `max_players` at least `min_players`.
    /// - `max_dots_per_cell` at least [`Self::MIN_DOTS_PER_CELL`]. The
    ///   engine raises it further per board with
    ///   `BoardSize::min_stable_threshold`.
    /// - `initial_dots_per_player` at least 1.
    /// - An empty palette falls back to [`PLAYER_COLORS`].
    pub fn validated(mut self) -> Self {
        if self.min_players < 2 {
            warn!(min_players = self.min_players, "min_players below 2, clamping");
            self.min_players = 2;
        }
        if self.max_players < self.min_players {
            warn!(
                max_players = self.max_players,
                min_players = self.min_players,
                "max_players below min_players, clamping"
            );
            self.max_players = self.min_players;
        }
        if self.max_dots_per_cell < Self::MIN_DOTS_PER_CELL {
            warn!(
                max_dots_per_cell = self.max_dots_per_cell,
                min = Self::MIN_DOTS_PER_CELL,
                "max_dots_per_cell too low, clamping"
            );
            self.max_dots_per_cell = Self::MIN_DOTS_PER_CELL;
        }
        if self.initial_dots_per_player == 0 {
            warn!("initial_dots_per_player is 0, clamping to 1");
            self.initial_dots_per_player = 1;
        }
        if self.palette.is_empty() {
            self.palette = PLAYER_COLORS.iter().map(|c| c.to_string()).collect();
        }
        self
    }

    /// Color for the seat at `slot`, cycling through the palette.
    pub fn color_for_slot(&self, slot: usize) -> String {
        match self.palette.len() {
            0 => PLAYER_COLORS[slot % PLAYER_COLORS.len()].to_string(),
            len => self.palette[slot % len].clone(),
        }
    }
}
