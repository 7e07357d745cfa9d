//! Room registry: creates rooms, seats players, and runs every game
//! operation against the room's stored snapshot.

use std::collections::HashMap;
use std::time::Duration;

use chain_reaction_engine::GameEngine;
use chain_reaction_protocol::{BoardSize, GameState, Move, PlayerId, RoomId};
use rand::Rng;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::{MoveOutcome, Room, RoomConfig, RoomError};

/// Characters used in generated room ids.
const ROOM_ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Owns every room and the snapshot inside it.
///
/// The registry never keeps a live [`GameEngine`]. Each game operation
/// rebuilds one from the room's stored [`GameState`], applies the change,
/// and stores the engine's output back. The snapshot is therefore the only
/// source of truth, and a failed operation leaves it untouched because
/// nothing is written until the engine returns `Ok`.
///
/// All mutators take `&mut self`. Share a registry between tasks as
/// `Arc<tokio::sync::Mutex<RoomRegistry>>`; holding the lock for the
/// whole of one call is what keeps each room's operations serialized.
///
/// Room membership (`Room::player_ids`) is tracked here, separately from
/// the seats inside the game. A player who leaves keeps an inactive seat
/// in the snapshot but stops counting towards `RoomConfig::max_players`.
///
/// ## Lifecycle
///
/// ```text
/// create() ─→ add_player()* ─→ start_game() ─→ make_move()* ─→ game over
///                                                         │
///   remove_player() of last member, delete(), or sweep ───┴─→ gone
/// ```
///
/// # Example
///
/// ```
/// use chain_reaction_protocol::{BoardSize, PlayerId};
/// use chain_reaction_room::RoomRegistry;
///
/// let mut registry = RoomRegistry::default();
/// let room = registry.create(BoardSize::SMALL).id;
/// registry.add_player(&room, PlayerId::from("a"), "Ann").unwrap();
/// registry.add_player(&room, PlayerId::from("b"), "Bob").unwrap();
///
/// let state = registry.start_game(&room).unwrap();
/// assert_eq!(state.total_dots(), 6);
/// ```
#[derive(Debug)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    config: RoomConfig,
}

impl RoomRegistry {
    /// An empty registry. `config` is validated first.
    pub fn new(config: RoomConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            config: config.validated(),
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    // -- Rooms ------------------------------------------------------------

    /// Creates an empty room with a fresh id and returns a copy of it.
    ///
    /// The opening snapshot comes from [`GameEngine::with_config`], so the
    /// room plays at no less than the board's stable threshold.
    pub fn create(&mut self, board_size: BoardSize) -> Room {
        let id = self.unused_room_id();
        let engine = GameEngine::with_config(id.clone(), board_size, self.config.game.clone());
        let room = Room::new(id.clone(), engine.into_state());
        self.rooms.insert(id.clone(), room.clone());
        info!(room_id = %id, board = %board_size, "room created");
        room
    }

    pub fn get(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    /// Removes a room. Returns it if it existed.
    pub fn delete(&mut self, id: &RoomId) -> Option<Room> {
        let room = self.rooms.remove(id)?;
        info!(room_id = %id, "room destroyed");
        Some(room)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().cloned().collect()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// A fresh engine rebuilt from the room's stored snapshot.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if the room does not exist.
    pub fn engine_for(&self, id: &RoomId) -> Result<GameEngine, RoomError> {
        let room = self.room(id)?;
        Ok(GameEngine::from_state_with_config(
            room.game_state.clone(),
            self.config.game.clone(),
        ))
    }

    // -- Membership -------------------------------------------------------

    /// Seats a player in a room and returns the stored snapshot.
    ///
    /// Joining a room the player is already in returns the current
    /// snapshot without changing anything.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`] if the room does not exist
    /// - [`RoomError::RoomFull`] if the room seats `max_players` members
    /// - [`RoomError::Engine`] if the game refuses the player
    pub fn add_player(
        &mut self,
        room_id: &RoomId,
        player_id: PlayerId,
        name: impl Into<String>,
    ) -> Result<GameState, RoomError> {
        let room = self.room(room_id)?;
        if room.has_player(&player_id) {
            return Ok(room.game_state.clone());
        }
        if room.player_count() >= self.config.max_players {
            return Err(RoomError::RoomFull(room_id.clone()));
        }

        let mut engine = self.engine_for(room_id)?;
        engine.add_player(player_id.clone(), name)?;

        let state = engine.into_state();
        let room = self.room_mut(room_id)?;
        room.player_ids.push(player_id.clone());
        room.game_state = state.clone();

        info!(
            room_id = %room_id,
            player_id = %player_id,
            players = room.player_ids.len(),
            "player joined"
        );
        Ok(state)
    }

    /// Takes a player out of a room.
    ///
    /// Returns the updated snapshot, or `None` if the room does not exist
    /// or was deleted because its last member left. Players who are not
    /// members are ignored.
    pub fn remove_player(&mut self, room_id: &RoomId, player_id: &PlayerId) -> Option<GameState> {
        let room = self.rooms.get_mut(room_id)?;
        if !room.has_player(player_id) {
            return Some(room.game_state.clone());
        }

        let mut engine = GameEngine::from_state_with_config(
            room.game_state.clone(),
            self.config.game.clone(),
        );
        engine.remove_player(player_id);
        room.game_state = engine.into_state();
        room.player_ids.retain(|id| id != player_id);

        info!(
            room_id = %room_id,
            player_id = %player_id,
            players = room.player_ids.len(),
            "player left"
        );

        if room.player_ids.is_empty() {
            self.delete(room_id);
            return None;
        }
        self.rooms.get(room_id).map(|r| r.game_state.clone())
    }

    // -- Game -------------------------------------------------------------

    /// Deals the opening dots and returns the stored snapshot.
    ///
    /// # Errors
    /// [`RoomError::NotFound`], or [`RoomError::Engine`] if the game
    /// cannot start.
    pub fn start_game(&mut self, room_id: &RoomId) -> Result<GameState, RoomError> {
        let mut engine = self.engine_for(room_id)?;
        engine.start_game()?;
        self.persist(room_id, engine)
    }

    /// Applies one move and returns the explosions plus the stored
    /// snapshot.
    ///
    /// # Errors
    /// [`RoomError::NotFound`], or [`RoomError::Engine`] if the move is
    /// rejected.
    pub fn make_move(&mut self, room_id: &RoomId, mv: &Move) -> Result<MoveOutcome, RoomError> {
        let mut engine = self.engine_for(room_id)?;
        let reactions = engine.make_move(mv)?;
        let game_state = self.persist(room_id, engine)?;

        debug!(
            room_id = %room_id,
            player_id = %mv.player_id,
            explosions = reactions.len(),
            "move stored"
        );
        Ok(MoveOutcome {
            reactions,
            game_state,
        })
    }

    // -- Expiry -----------------------------------------------------------

    /// Deletes every room older than `max_age` and returns their ids.
    pub fn sweep_expired(&mut self, max_age: Duration) -> Vec<RoomId> {
        self.sweep_expired_at(Instant::now(), max_age)
    }

    /// [`sweep_expired`](Self::sweep_expired) against an explicit clock
    /// reading.
    pub fn sweep_expired_at(&mut self, now: Instant, max_age: Duration) -> Vec<RoomId> {
        let expired: Vec<RoomId> = self
            .rooms
            .values()
            .filter(|room| room.age_at(now) > max_age)
            .map(|room| room.id.clone())
            .collect();

        for id in &expired {
            self.rooms.remove(id);
            info!(room_id = %id, ?max_age, "room swept");
        }
        expired
    }

    // -- Internals --------------------------------------------------------

    fn room(&self, id: &RoomId) -> Result<&Room, RoomError> {
        self.rooms
            .get(id)
            .ok_or_else(|| RoomError::NotFound(id.clone()))
    }

    fn room_mut(&mut self, id: &RoomId) -> Result<&mut Room, RoomError> {
        self.rooms
            .get_mut(id)
            .ok_or_else(|| RoomError::NotFound(id.clone()))
    }

    fn persist(&mut self, room_id: &RoomId, engine: GameEngine) -> Result<GameState, RoomError> {
        let state = engine.into_state();
        self.room_mut(room_id)?.game_state = state.clone();
        Ok(state)
    }

    fn unused_room_id(&self) -> RoomId {
        loop {
            let id = generate_room_id(self.config.room_id_len);
            if !self.rooms.contains_key(&id) {
                return id;
            }
        }
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}

/// Random uppercase alphanumeric id of `len` characters.
fn generate_room_id(len: usize) -> RoomId {
    let mut rng = rand::rng();
    let id: String = (0..len)
        .map(|_| ROOM_ID_CHARSET[rng.random_range(0..ROOM_ID_CHARSET.len())] as char)
        .collect();
    RoomId::new(id)
}
