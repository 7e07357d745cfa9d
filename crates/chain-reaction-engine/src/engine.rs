//! The game engine: every rule that changes a [`GameState`].
//!
//! An engine owns one state value. Callers build a fresh engine from a
//! stored snapshot, run one operation, and read the snapshot back out;
//! the engine is thrown away afterwards. Reads and writes across that
//! boundary always copy, so nothing outside can alias the board.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use chain_reaction_protocol::{
    BoardSize, ChainReaction, GameState, Move, Player, PlayerId, Position, RoomId,
};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::{EngineError, GameConfig, cascade};

// ---------------------------------------------------------------------------
// GamePhase
// ---------------------------------------------------------------------------

/// Where a game is in its lifecycle.
///
/// ```text
/// Forming → Active → Over
///    │                 ↑
///    └─────────────────┘  (a player leaves before the deal)
/// ```
///
/// - **Forming**: players joining, no dots on the board.
/// - **Active**: dots in play, turns rotating.
/// - **Over**: terminal; `winner` is set or nobody was left holding dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Forming,
    Active,
    Over,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forming => write!(f, "Forming"),
            Self::Active => write!(f, "Active"),
            Self::Over => write!(f, "Over"),
        }
    }
}

// ---------------------------------------------------------------------------
// GameEngine
// ---------------------------------------------------------------------------

/// Applies the rules of Chain Reaction to one [`GameState`].
#[derive(Debug, Clone)]
pub struct GameEngine {
    state: GameState,
    config: GameConfig,
}

impl GameEngine {
    /// A fresh game with default rules and no players.
    pub fn new(room_id: RoomId, board_size: BoardSize) -> Self {
        Self::with_config(room_id, board_size, GameConfig::default())
    }

    /// A fresh game with the given rules and no players.
    ///
    /// The explosion threshold is raised to
    /// [`BoardSize::min_stable_threshold`] if `config` asks for less, so a
    /// 3×3 board with `max_dots_per_cell: 2` plays at 4.
    pub fn with_config(room_id: RoomId, board_size: BoardSize, config: GameConfig) -> Self {
        let config = config.validated();
        let mut state = GameState::empty(
            room_id,
            board_size,
            config.max_dots_per_cell,
            config.initial_dots_per_player,
        );
        settle_threshold(&mut state);
        Self { state, config }
    }

    /// Rehydrates an engine from a stored snapshot using default rules.
    pub fn from_state(state: GameState) -> Self {
        Self::from_state_with_config(state, GameConfig::default())
    }

    /// Rehydrates an engine from a stored snapshot.
    ///
    /// The snapshot's own `max_dots_per_cell` and `initial_dots_per_player`
    /// win over `config`; only the threshold floor for its board is
    /// enforced. Run [`GameState::check`] first on snapshots from outside
    /// the process.
    pub fn from_state_with_config(mut state: GameState, config: GameConfig) -> Self {
        settle_threshold(&mut state);
        Self {
            state,
            config: config.validated(),
        }
    }

    /// Replaces the engine's state with a copy of `snapshot`, raising its
    /// threshold to the board's floor like
    /// [`from_state_with_config`](Self::from_state_with_config).
    pub fn load_game_state(&mut self, snapshot: &GameState) {
        self.state = snapshot.clone();
        settle_threshold(&mut self.state);
    }

    /// A copy of the current state.
    pub fn game_state(&self) -> GameState {
        self.state.clone()
    }

    /// Consumes the engine, handing back its state without copying.
    pub fn into_state(self) -> GameState {
        self.state
    }

    /// The validated rules this engine enforces for seating and starting.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Derives the lifecycle phase from the state. Nothing stores it, so a
    /// rehydrated engine always agrees with its snapshot.
    pub fn phase(&self) -> GamePhase {
        if self.state.is_game_over {
            GamePhase::Over
        } else if self.has_dots() {
            GamePhase::Active
        } else {
            GamePhase::Forming
        }
    }

    /// Id of the player whose turn it is.
    pub fn current_player_id(&self) -> Option<PlayerId> {
        self.state.current_player().map(|p| p.id.clone())
    }

    // -- Players ----------------------------------------------------------

    /// Seats a player at the end of the turn order.
    ///
    /// Joining twice with the same id returns the existing seat unchanged.
    ///
    /// # Errors
    /// [`EngineError::Capacity`] if the game already has
    /// `config.max_players` active players.
    pub fn add_player(
        &mut self,
        id: PlayerId,
        name: impl Into<String>,
    ) -> Result<Player, EngineError> {
        if let Some(existing) = self.state.player(&id) {
            return Ok(existing.clone());
        }

        let active = self.state.active_players().count();
        if active >= self.config.max_players {
            return Err(EngineError::Capacity {
                max: self.config.max_players,
            });
        }

        let slot = self.state.players.len();
        let player = Player {
            id,
            name: name.into(),
            color: self.config.color_for_slot(slot),
            is_active: true,
            dot_count: 0,
        };
        self.state.players.push(player.clone());

        debug!(
            room_id = %self.state.id,
            player_id = %player.id,
            slot,
            "player seated"
        );
        Ok(player)
    }

    /// Takes a player out of the game.
    ///
    /// The seat stays in the turn order (marked inactive) so indices do
    /// not shift, and every cell the player owned becomes empty. Unknown
    /// ids are ignored.
    ///
    /// The win condition is evaluated afterwards whatever the phase. Before
    /// the deal nobody holds dots, so any departure from the lobby ends the
    /// game with no winner.
    pub fn remove_player(&mut self, id: &PlayerId) {
        let Some(index) = self.state.players.iter().position(|p| &p.id == id) else {
            return;
        };

        self.state.players[index].is_active = false;
        for cell in self.state.board.iter_mut().flatten() {
            if cell.is_owned_by(id) {
                cell.clear();
            }
        }

        self.update_dot_counts();
        self.check_win_condition();
        if !self.state.is_game_over && self.state.current_player_index == index {
            self.advance_turn();
        }

        info!(
            room_id = %self.state.id,
            player_id = %id,
            game_over = self.state.is_game_over,
            "player removed from game"
        );
    }

    // -- Start ------------------------------------------------------------

    /// Deals the opening dots using the thread-local RNG.
    ///
    /// # Errors
    /// See [`start_game_with`](Self::start_game_with).
    pub fn start_game(&mut self) -> Result<(), EngineError> {
        self.start_game_with(&mut rand::rng())
    }

    /// Deals `initial_dots_per_player` single dots to every active player,
    /// in turn order, onto distinct cells chosen by shuffling the board
    /// with `rng`.
    ///
    /// If the board runs out of cells mid-deal the remaining dots are not
    /// placed.
    ///
    /// # Errors
    /// - [`EngineError::GameOver`] if the game has ended
    /// - [`EngineError::AlreadyStarted`] if dots are already on the board
    /// - [`EngineError::InsufficientPlayers`] with fewer than
    ///   `config.min_players` active players
    pub fn start_game_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), EngineError> {
        match self.phase() {
            GamePhase::Over => return Err(EngineError::GameOver),
            GamePhase::Active => return Err(EngineError::AlreadyStarted),
            GamePhase::Forming => {}
        }

        let seated: Vec<PlayerId> = self
            .state
            .active_players()
            .map(|p| p.id.clone())
            .collect();
        if seated.len() < self.config.min_players {
            return Err(EngineError::InsufficientPlayers {
                required: self.config.min_players,
                found: seated.len(),
            });
        }

        let mut free: Vec<Position> = self.state.board_size.positions().collect();
        free.shuffle(rng);
        let mut free = free.into_iter();

        let per_player = self.state.initial_dots_per_player as usize;
        let wanted = per_player * seated.len();
        let mut dealt = 0;
        'deal: for id in &seated {
            for _ in 0..per_player {
                let Some(pos) = free.next() else {
                    break 'deal;
                };
                if let Some(cell) = self.state.cell_mut(pos) {
                    cell.dots = 1;
                    cell.owner = Some(id.clone());
                    dealt += 1;
                }
            }
        }
        if dealt < wanted {
            warn!(
                room_id = %self.state.id,
                board = %self.state.board_size,
                dealt,
                wanted,
                "board too small for the opening deal"
            );
        }

        if !self.current_is_active() {
            self.advance_turn();
        }
        self.update_dot_counts();

        info!(
            room_id = %self.state.id,
            players = seated.len(),
            board = %self.state.board_size,
            "game started"
        );
        Ok(())
    }

    // -- Moves ------------------------------------------------------------

    /// Returns `true` if `mv` would be accepted by [`make_move`](Self::make_move).
    pub fn is_valid_move(&self, mv: &Move) -> bool {
        self.validate_move(mv).is_ok()
    }

    /// Cells the current player may place on, in row-major order.
    pub fn legal_positions(&self) -> Vec<Position> {
        let Some(current) = self.state.current_player() else {
            return Vec::new();
        };
        if self.state.is_game_over || !current.is_active {
            return Vec::new();
        }
        self.state
            .cells()
            .filter(|c| c.owner.is_none() || c.is_owned_by(&current.id))
            .map(|c| c.position)
            .collect()
    }

    /// Places one dot for the mover, stamping explosions with the current
    /// wall-clock time.
    ///
    /// # Errors
    /// See [`make_move_at`](Self::make_move_at).
    pub fn make_move(&mut self, mv: &Move) -> Result<Vec<ChainReaction>, EngineError> {
        self.make_move_at(mv, unix_millis())
    }

    /// Places one dot for the mover and resolves the resulting cascade.
    ///
    /// Returns the explosions in the order they happened, each stamped
    /// with `timestamp`. If the game continues, the turn passes to the
    /// next active player.
    ///
    /// # Errors
    /// - [`EngineError::GameOver`] if the game has ended
    /// - [`EngineError::TurnOrder`] if it is not the mover's turn
    /// - [`EngineError::OutOfBounds`] if the position is off the board
    /// - [`EngineError::IllegalCell`] if an opponent owns the cell
    pub fn make_move_at(
        &mut self,
        mv: &Move,
        timestamp: u64,
    ) -> Result<Vec<ChainReaction>, EngineError> {
        self.validate_move(mv)?;

        let Some(cell) = self.state.cell_mut(mv.position) else {
            return Err(EngineError::OutOfBounds {
                position: mv.position,
            });
        };
        cell.dots = cell.dots.saturating_add(1);
        cell.owner = Some(mv.player_id.clone());

        let reactions = cascade::resolve(&mut self.state, mv.position, &mv.player_id, timestamp);

        self.update_dot_counts();
        self.check_win_condition();
        if !self.state.is_game_over {
            self.advance_turn();
        }

        debug!(
            room_id = %self.state.id,
            player_id = %mv.player_id,
            position = %mv.position,
            explosions = reactions.len(),
            "move applied"
        );
        if self.state.is_game_over {
            info!(
                room_id = %self.state.id,
                winner = ?self.state.winner.as_ref().map(|w| w.id.as_str()),
                "game over"
            );
        }

        Ok(reactions)
    }

    fn validate_move(&self, mv: &Move) -> Result<(), EngineError> {
        if self.state.is_game_over {
            return Err(EngineError::GameOver);
        }

        match self.state.current_player() {
            Some(current) if current.id == mv.player_id && current.is_active => {}
            _ => {
                return Err(EngineError::TurnOrder {
                    player: mv.player_id.clone(),
                });
            }
        }

        let Some(cell) = self.state.cell(mv.position) else {
            return Err(EngineError::OutOfBounds {
                position: mv.position,
            });
        };
        if cell.owner.is_some() && !cell.is_owned_by(&mv.player_id) {
            return Err(EngineError::IllegalCell {
                position: mv.position,
            });
        }

        Ok(())
    }

    // -- Bookkeeping ------------------------------------------------------

    fn has_dots(&self) -> bool {
        self.state.cells().any(|c| !c.is_empty())
    }

    fn current_is_active(&self) -> bool {
        self.state.current_player().is_some_and(|p| p.is_active)
    }

    /// Recomputes every player's `dot_count` from the board.
    fn update_dot_counts(&mut self) {
        let board = &self.state.board;
        for player in &mut self.state.players {
            player.dot_count = board
                .iter()
                .flatten()
                .filter(|c| c.is_owned_by(&player.id))
                .map(|c| c.dots)
                .sum();
        }
    }

    /// One active player holding dots wins; none holding dots ends the
    /// game with no winner.
    fn check_win_condition(&mut self) {
        let mut holders = self
            .state
            .active_players()
            .filter(|p| p.dot_count > 0)
            .cloned();
        let outcome = match (holders.next(), holders.next()) {
            (Some(winner), None) => Some(Some(winner)),
            (None, _) => Some(None),
            _ => None,
        };
        drop(holders);

        if let Some(winner) = outcome {
            self.state.is_game_over = true;
            self.state.winner = winner;
        }
    }

    /// Moves the turn to the next active player, wrapping around.
    fn advance_turn(&mut self) {
        let len = self.state.players.len();
        if !self.state.players.iter().any(|p| p.is_active) {
            return;
        }
        let mut index = self.state.current_player_index;
        loop {
            index = (index + 1) % len;
            if self.state.players[index].is_active {
                break;
            }
        }
        self.state.current_player_index = index;
    }
}

/// Raises `state.max_dots_per_cell` to the lowest value that lets every
/// cascade on its board stop.
fn settle_threshold(state: &mut GameState) {
    let floor = state.board_size.min_stable_threshold();
    if state.max_dots_per_cell < floor {
        warn!(
            room_id = %state.id,
            board = %state.board_size,
            max_dots_per_cell = state.max_dots_per_cell,
            floor,
            "threshold never settles on this board, raising"
        );
        state.max_dots_per_cell = floor;
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `GameEngine`, named
    //! `test_{function}_{scenario}_{expected}`.

    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    // -- Helpers ----------------------------------------------------------

    fn pid(id: &str) -> PlayerId {
        PlayerId::from(id)
    }

    fn engine(rows: usize, cols: usize) -> GameEngine {
        GameEngine::new(RoomId::from("TEST0001"), BoardSize::new(rows, cols))
    }

    fn engine_with(names: &[&str]) -> GameEngine {
        let mut e = engine(6, 8);
        for name in names {
            e.add_player(pid(name), *name).unwrap();
        }
        e
    }

    /// Hand-places dots so tests don't depend on the shuffle.
    fn put(e: &mut GameEngine, row: usize, col: usize, dots: u32, owner: &str) {
        let mut state = e.game_state();
        let cell = state.cell_mut(Position::new(row, col)).unwrap();
        cell.dots = dots;
        cell.owner = Some(pid(owner));
        e.load_game_state(&state);
        e.update_dot_counts();
    }

    fn mv(player: &str, row: usize, col: usize) -> Move {
        Move::new(player, Position::new(row, col))
    }

    /// Marks a seat inactive without going through `remove_player`, which
    /// would end a game that has not been dealt yet.
    fn deactivate(e: &mut GameEngine, id: &str) {
        let mut state = e.game_state();
        if let Some(p) = state.players.iter_mut().find(|p| p.id == pid(id)) {
            p.is_active = false;
        }
        e.load_game_state(&state);
    }

    /// Fills every cell one dot short of exploding, all owned by `a`, except
    /// a single `b` dot in the last cell.
    fn saturated(rows: usize, cols: usize, max_dots_per_cell: u32) -> GameEngine {
        let config = GameConfig {
            max_dots_per_cell,
            ..GameConfig::default()
        };
        let size = BoardSize::new(rows, cols);
        let mut e = GameEngine::with_config(RoomId::from("TEST0001"), size, config);
        e.add_player(pid("a"), "Ann").unwrap();
        e.add_player(pid("b"), "Bob").unwrap();
        let mut state = e.game_state();
        let threshold = state.max_dots_per_cell;
        for cell in state.board.iter_mut().flatten() {
            cell.dots = threshold - 1;
            cell.owner = Some(pid("a"));
        }
        let last = &mut state.board[rows - 1][cols - 1];
        last.dots = 1;
        last.owner = Some(pid("b"));
        e.load_game_state(&state);
        e.update_dot_counts();
        e
    }

    // =====================================================================
    // add_player()
    // =====================================================================

    #[test]
    fn test_add_player_appends_with_palette_color() {
        let mut e = engine(6, 8);

        let a = e.add_player(pid("a"), "Ann").unwrap();
        let b = e.add_player(pid("b"), "Bob").unwrap();

        assert_eq!(a.color, "#FF6B6B");
        assert_eq!(b.color, "#4ECDC4");
        assert!(a.is_active);
        assert_eq!(a.dot_count, 0);
        let state = e.game_state();
        assert_eq!(state.players.len(), 2);
        assert_eq!(state.players[1].id, pid("b"));
    }

    #[test]
    fn test_add_player_twice_returns_existing_unchanged() {
        let mut e = engine(6, 8);
        let first = e.add_player(pid("a"), "Ann").unwrap();

        let again = e.add_player(pid("a"), "Someone Else").unwrap();

        assert_eq!(first, again);
        assert_eq!(e.game_state().players.len(), 1);
    }

    #[test]
    fn test_add_player_at_capacity_returns_capacity_error() {
        let mut e = engine(6, 8);
        for i in 0..10 {
            e.add_player(pid(&format!("p{i}")), "x").unwrap();
        }

        let result = e.add_player(pid("p10"), "late");

        assert_eq!(result, Err(EngineError::Capacity { max: 10 }));
        assert_eq!(e.game_state().players.len(), 10);
    }

    #[test]
    fn test_add_player_after_departure_reuses_capacity_and_cycles_color() {
        let mut e = engine(6, 8);
        for i in 0..10 {
            e.add_player(pid(&format!("p{i}")), "x").unwrap();
        }
        e.start_game_with(&mut StdRng::seed_from_u64(3)).unwrap();
        e.remove_player(&pid("p3"));

        let late = e.add_player(pid("p10"), "late").unwrap();

        // Eleventh slot wraps to the first color.
        assert_eq!(late.color, "#FF6B6B");
    }

    // =====================================================================
    // remove_player()
    // =====================================================================

    #[test]
    fn test_remove_player_unknown_is_noop() {
        let mut e = engine_with(&["a", "b"]);
        let before = e.game_state();

        e.remove_player(&pid("ghost"));

        assert_eq!(e.game_state(), before);
    }

    #[test]
    fn test_remove_player_in_lobby_ends_game_without_winner() {
        let mut e = engine_with(&["a", "b"]);

        e.remove_player(&pid("b"));

        // Nobody holds dots before the deal, so there is no winner to name.
        let state = e.game_state();
        assert!(state.is_game_over);
        assert!(state.winner.is_none());
        assert!(!state.players[1].is_active);
        assert_eq!(e.phase(), GamePhase::Over);

        e.remove_player(&pid("a"));

        let state = e.game_state();
        assert!(state.is_game_over);
        assert!(state.winner.is_none());
        assert_eq!(e.start_game(), Err(EngineError::GameOver));
    }

    #[test]
    fn test_remove_player_clears_cells_and_keeps_seat() {
        let mut e = engine_with(&["a", "b", "c"]);
        put(&mut e, 0, 0, 2, "a");
        put(&mut e, 1, 1, 3, "b");
        put(&mut e, 2, 2, 1, "c");

        e.remove_player(&pid("b"));

        let state = e.game_state();
        assert_eq!(state.players.len(), 3);
        assert!(!state.players[1].is_active);
        assert_eq!(state.players[1].dot_count, 0);
        assert!(state.board[1][1].is_empty());
        assert!(state.board[1][1].owner.is_none());
        assert!(!state.is_game_over);
    }

    #[test]
    fn test_remove_player_leaving_one_holder_declares_winner() {
        let mut e = engine_with(&["a", "b"]);
        put(&mut e, 0, 0, 1, "a");
        put(&mut e, 5, 7, 1, "b");

        e.remove_player(&pid("b"));

        let state = e.game_state();
        assert!(state.is_game_over);
        assert_eq!(state.winner.unwrap().id, pid("a"));
    }

    #[test]
    fn test_remove_player_last_active_ends_without_winner() {
        let mut e = engine_with(&["a", "b"]);
        put(&mut e, 0, 0, 1, "a");
        put(&mut e, 5, 7, 1, "b");
        e.remove_player(&pid("b"));

        e.remove_player(&pid("a"));

        let state = e.game_state();
        assert!(state.is_game_over);
        assert!(state.winner.is_none());
    }

    #[test]
    fn test_remove_player_current_turn_passes_to_next_active() {
        let mut e = engine_with(&["a", "b", "c"]);
        put(&mut e, 0, 0, 1, "a");
        put(&mut e, 1, 0, 1, "b");
        put(&mut e, 2, 0, 1, "c");
        assert_eq!(e.current_player_id(), Some(pid("a")));

        e.remove_player(&pid("a"));

        assert_eq!(e.current_player_id(), Some(pid("b")));
    }

    // =====================================================================
    // start_game()
    // =====================================================================

    #[test]
    fn test_start_game_with_one_player_returns_insufficient() {
        let mut e = engine_with(&["a"]);

        let result = e.start_game();

        assert_eq!(
            result,
            Err(EngineError::InsufficientPlayers {
                required: 2,
                found: 1
            })
        );
        assert_eq!(e.phase(), GamePhase::Forming);
    }

    #[test]
    fn test_start_game_counts_only_active_players() {
        let mut e = engine_with(&["a", "b"]);
        deactivate(&mut e, "b");

        assert!(matches!(
            e.start_game(),
            Err(EngineError::InsufficientPlayers { found: 1, .. })
        ));
    }

    #[test]
    fn test_start_game_deals_distinct_single_dots() {
        let mut e = engine_with(&["a", "b"]);

        e.start_game_with(&mut StdRng::seed_from_u64(7)).unwrap();

        let state = e.game_state();
        let owned: Vec<_> = state.cells().filter(|c| !c.is_empty()).collect();
        assert_eq!(owned.len(), 6);
        assert!(owned.iter().all(|c| c.dots == 1));
        assert_eq!(owned.iter().filter(|c| c.is_owned_by(&pid("a"))).count(), 3);
        assert_eq!(owned.iter().filter(|c| c.is_owned_by(&pid("b"))).count(), 3);
        assert_eq!(state.players[0].dot_count, 3);
        assert_eq!(state.players[1].dot_count, 3);
        assert_eq!(state.current_player_index, 0);
        assert!(!state.is_game_over);
        assert_eq!(e.phase(), GamePhase::Active);
    }

    #[test]
    fn test_start_game_same_seed_same_deal() {
        let mut first = engine_with(&["a", "b", "c"]);
        let mut second = engine_with(&["a", "b", "c"]);

        first.start_game_with(&mut StdRng::seed_from_u64(42)).unwrap();
        second.start_game_with(&mut StdRng::seed_from_u64(42)).unwrap();

        assert_eq!(first.game_state(), second.game_state());
    }

    #[test]
    fn test_start_game_twice_returns_already_started() {
        let mut e = engine_with(&["a", "b"]);
        e.start_game().unwrap();

        assert_eq!(e.start_game(), Err(EngineError::AlreadyStarted));
    }

    #[test]
    fn test_start_game_small_board_under_deals() {
        // 2x2 board, 2 players × 3 dots: only 4 cells to go round.
        let mut e = engine(2, 2);
        e.add_player(pid("a"), "Ann").unwrap();
        e.add_player(pid("b"), "Bob").unwrap();

        e.start_game().unwrap();

        let state = e.game_state();
        assert!(state.cells().all(|c| c.dots == 1));
        assert_eq!(state.players[0].dot_count, 3);
        assert_eq!(state.players[1].dot_count, 1);
    }

    #[test]
    fn test_start_game_skips_departed_first_seat() {
        let mut e = engine_with(&["a", "b", "c"]);
        deactivate(&mut e, "a");

        e.start_game().unwrap();

        assert_eq!(e.current_player_id(), Some(pid("b")));
        assert_eq!(e.game_state().players[0].dot_count, 0);
    }

    // =====================================================================
    // is_valid_move() / make_move()
    // =====================================================================

    #[test]
    fn test_is_valid_move_rules() {
        let mut e = engine_with(&["a", "b"]);
        put(&mut e, 0, 0, 1, "a");
        put(&mut e, 0, 1, 1, "b");

        assert!(e.is_valid_move(&mv("a", 0, 0)), "own cell");
        assert!(e.is_valid_move(&mv("a", 3, 3)), "empty cell");
        assert!(!e.is_valid_move(&mv("a", 0, 1)), "opponent cell");
        assert!(!e.is_valid_move(&mv("b", 3, 3)), "not b's turn");
        assert!(!e.is_valid_move(&mv("a", 6, 0)), "off the board");
        assert!(!e.is_valid_move(&mv("ghost", 3, 3)), "unknown player");
    }

    #[test]
    fn test_make_move_wrong_turn_returns_turn_order_error() {
        let mut e = engine_with(&["a", "b"]);
        put(&mut e, 0, 0, 1, "a");
        put(&mut e, 0, 1, 1, "b");
        let before = e.game_state();

        let result = e.make_move(&mv("b", 3, 3));

        assert_eq!(result, Err(EngineError::TurnOrder { player: pid("b") }));
        assert_eq!(e.game_state(), before);
    }

    #[test]
    fn test_make_move_opponent_cell_returns_illegal_cell() {
        let mut e = engine_with(&["a", "b"]);
        put(&mut e, 0, 0, 1, "a");
        put(&mut e, 0, 1, 1, "b");
        let before = e.game_state();

        let result = e.make_move(&mv("a", 0, 1));

        assert_eq!(
            result,
            Err(EngineError::IllegalCell {
                position: Position::new(0, 1)
            })
        );
        assert_eq!(e.game_state(), before);
    }

    #[test]
    fn test_make_move_off_board_returns_out_of_bounds() {
        let mut e = engine_with(&["a", "b"]);
        let before = e.game_state();

        let result = e.make_move(&mv("a", 0, 99));

        assert!(matches!(result, Err(EngineError::OutOfBounds { .. })));
        assert_eq!(e.game_state(), before);
    }

    #[test]
    fn test_make_move_quiet_placement_advances_turn() {
        let mut e = engine_with(&["a", "b"]);
        put(&mut e, 0, 0, 1, "a");
        put(&mut e, 5, 7, 1, "b");

        let reactions = e.make_move(&mv("a", 0, 0)).unwrap();

        assert!(reactions.is_empty());
        let state = e.game_state();
        assert_eq!(state.board[0][0].dots, 2);
        assert_eq!(state.players[0].dot_count, 2);
        assert_eq!(state.current_player_index, 1);
    }

    #[test]
    fn test_make_move_turn_skips_inactive_players() {
        let mut e = engine_with(&["a", "b", "c"]);
        put(&mut e, 0, 0, 1, "a");
        put(&mut e, 2, 2, 1, "b");
        put(&mut e, 4, 4, 1, "c");
        e.remove_player(&pid("b"));

        e.make_move(&mv("a", 0, 0)).unwrap();
        assert_eq!(e.current_player_id(), Some(pid("c")));

        e.make_move(&mv("c", 4, 4)).unwrap();
        assert_eq!(e.current_player_id(), Some(pid("a")));
    }

    #[test]
    fn test_make_move_capturing_last_opponent_dot_wins() {
        let mut e = engine(1, 3);
        e.add_player(pid("a"), "Ann").unwrap();
        e.add_player(pid("b"), "Bob").unwrap();
        put(&mut e, 0, 1, 3, "a");
        put(&mut e, 0, 2, 1, "b");

        let reactions = e.make_move_at(&mv("a", 0, 1), 1_000).unwrap();

        assert_eq!(reactions.len(), 1);
        assert_eq!(reactions[0].timestamp, 1_000);
        let state = e.game_state();
        assert!(state.is_game_over);
        assert_eq!(state.winner.as_ref().unwrap().id, pid("a"));
        assert_eq!(state.winner.unwrap().dot_count, 3);
        assert_eq!(state.players[1].dot_count, 0);
        // No turn advance once the game has ended.
        assert_eq!(state.current_player_index, 0);
        assert_eq!(e.phase(), GamePhase::Over);
    }

    #[test]
    fn test_make_move_after_game_over_returns_game_over() {
        let mut e = engine(1, 3);
        e.add_player(pid("a"), "Ann").unwrap();
        e.add_player(pid("b"), "Bob").unwrap();
        put(&mut e, 0, 1, 3, "a");
        put(&mut e, 0, 2, 1, "b");
        e.make_move(&mv("a", 0, 1)).unwrap();

        assert_eq!(e.make_move(&mv("a", 0, 0)), Err(EngineError::GameOver));
        assert!(!e.is_valid_move(&mv("a", 0, 0)));
        assert_eq!(e.start_game(), Err(EngineError::GameOver));
    }

    #[test]
    fn test_make_move_saturated_three_by_three_at_threshold_two_settles() {
        let mut e = saturated(3, 3, 2);
        assert_eq!(e.game_state().max_dots_per_cell, 4);

        let reactions = e.make_move(&mv("a", 1, 1)).unwrap();

        let state = e.game_state();
        assert!(!reactions.is_empty());
        assert!(state.cells().all(|c| c.dots < state.max_dots_per_cell));
        assert!(state.check().is_ok());
    }

    #[test]
    fn test_make_move_saturated_six_by_eight_at_threshold_three_settles() {
        let mut e = saturated(6, 8, 3);
        assert_eq!(e.game_state().max_dots_per_cell, 4);

        let reactions = e.make_move(&mv("a", 2, 3)).unwrap();

        let state = e.game_state();
        assert!(!reactions.is_empty());
        assert!(state.cells().all(|c| c.dots < state.max_dots_per_cell));
        assert!(state.check().is_ok());
    }

    #[test]
    fn test_make_move_single_row_at_threshold_two_keeps_threshold() {
        let mut e = saturated(1, 5, 2);
        assert_eq!(e.game_state().max_dots_per_cell, 2);

        e.make_move(&mv("a", 0, 0)).unwrap();

        let state = e.game_state();
        assert!(state.cells().all(|c| c.dots < 2));
    }

    // =====================================================================
    // legal_positions()
    // =====================================================================

    #[test]
    fn test_legal_positions_excludes_opponent_cells() {
        let mut e = engine(1, 3);
        e.add_player(pid("a"), "Ann").unwrap();
        e.add_player(pid("b"), "Bob").unwrap();
        put(&mut e, 0, 0, 1, "a");
        put(&mut e, 0, 2, 1, "b");

        assert_eq!(
            e.legal_positions(),
            vec![Position::new(0, 0), Position::new(0, 1)]
        );
    }

    // =====================================================================
    // load_game_state() / game_state()
    // =====================================================================

    #[test]
    fn test_game_state_returns_independent_copy() {
        let mut e = engine_with(&["a", "b"]);
        let mut snapshot = e.game_state();
        snapshot.board[0][0].dots = 3;
        snapshot.players[0].name = "Mallory".into();

        assert!(e.game_state().board[0][0].is_empty());
        assert_eq!(e.game_state().players[0].name, "a");

        e.load_game_state(&snapshot);
        snapshot.board[0][0].dots = 0;
        assert_eq!(e.game_state().board[0][0].dots, 3);
    }

    #[test]
    fn test_from_state_threshold_below_board_floor_is_raised() {
        let mut state = engine_with(&["a", "b"]).into_state();
        state.max_dots_per_cell = 2;

        let e = GameEngine::from_state(state.clone());

        assert_eq!(e.game_state().max_dots_per_cell, 4);
        let mut loaded = engine(6, 8);
        loaded.load_game_state(&state);
        assert_eq!(loaded.game_state().max_dots_per_cell, 4);
    }

    #[test]
    fn test_with_config_keeps_threshold_at_board_floor() {
        let config = GameConfig {
            max_dots_per_cell: 3,
            ..GameConfig::default()
        };
        let size = BoardSize::new(1, 8);

        let e = GameEngine::with_config(RoomId::from("TEST0001"), size, config);

        assert_eq!(e.game_state().max_dots_per_cell, 3);
    }
}
