//! Room registry for Chain Reaction.
//!
//! A room is one game snapshot plus the ids of the players seated in it.
//! Every mutation goes through the same cycle: rebuild a
//! [`GameEngine`](chain_reaction_engine::GameEngine) from the stored
//! snapshot, run one operation, store the result. A failed operation
//! stores nothing.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — creates, looks up, and deletes rooms
//! - [`Room`] — id, snapshot, members, creation time
//! - [`MoveOutcome`] — explosions plus the state after a move
//! - [`RoomConfig`] / [`SweepConfig`] — limits and expiry settings
//! - [`spawn_sweeper`] — background task that deletes stale rooms

mod config;
mod error;
mod registry;
mod room;
mod sweeper;

pub use config::{RoomConfig, SweepConfig};
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{MoveOutcome, Room};
pub use sweeper::spawn_sweeper;
