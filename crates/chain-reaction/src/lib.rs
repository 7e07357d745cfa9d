//! # Chain Reaction
//!
//! Game core for Chain Reaction, the multiplayer board game where dots
//! pile up in cells until a cell bursts and spills into its neighbors.
//!
//! The core is transport-agnostic. A server resolves a room in the
//! [`RoomRegistry`], and the registry rebuilds a [`GameEngine`] from the
//! room's stored [`GameState`], applies one operation, and stores the
//! result.
//!
//! ## Quick Start
//!
//! ```rust
//! use chain_reaction::prelude::*;
//!
//! let mut registry = RoomRegistry::new(RoomConfig::default());
//! let room = registry.create(BoardSize::SMALL).id;
//! registry.add_player(&room, PlayerId::from("ann"), "Ann")?;
//! registry.add_player(&room, PlayerId::from("bob"), "Bob")?;
//! let state = registry.start_game(&room)?;
//! assert_eq!(state.total_dots(), 6);
//!
//! let bytes = encode_snapshot(&JsonCodec, &state)?;
//! assert_eq!(decode_snapshot(&JsonCodec, &bytes)?, state);
//! # Ok::<(), ChainReactionError>(())
//! ```

mod error;
mod snapshot;
mod telemetry;

pub use error::ChainReactionError;
pub use snapshot::{decode_snapshot, encode_snapshot};
pub use telemetry::{DEFAULT_FILTER, init_tracing};

pub use chain_reaction_engine as engine;
pub use chain_reaction_protocol as protocol;
pub use chain_reaction_room as room;

pub mod prelude {
    pub use crate::{ChainReactionError, decode_snapshot, encode_snapshot, init_tracing};
    pub use chain_reaction_engine::{EngineError, GameConfig, GameEngine, GamePhase};
    pub use chain_reaction_protocol::{
        BoardSize, Cell, ChainReaction, Codec, GameState, JsonCodec, Move, Player, PlayerId,
        Position, ProtocolError, RoomId,
    };
    pub use chain_reaction_room::{
        MoveOutcome, Room, RoomConfig, RoomError, RoomRegistry, SweepConfig, spawn_sweeper,
    };
}
