//! Shared data model for Chain Reaction.
//!
//! This crate defines the values that cross every boundary in the system:
//!
//! - **Types** ([`GameState`], [`Cell`], [`Player`], [`Move`],
//!   [`ChainReaction`], etc.) — the snapshot the engine reads and writes,
//!   and the only thing a room persists between calls.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how a snapshot is turned
//!   into bytes and back.
//! - **Errors** ([`ProtocolError`]) — encoding, decoding, and malformed
//!   snapshots.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about rules or rooms. The engine
//! mutates these values; the registry stores them; the transport (outside
//! this workspace) ships them to clients.
//!
//! ```text
//! Registry (stores GameState) → Engine (mutates GameState) → Protocol (shapes + bytes)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    BoardSize, Cell, ChainReaction, GameState, Move, Player, PlayerId, Position, RoomId,
};
