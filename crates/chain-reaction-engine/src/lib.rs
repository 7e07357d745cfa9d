//! Game-state engine for Chain Reaction.
//!
//! The engine is a transformation over an explicit [`GameState`] value:
//! build one from a snapshot, apply exactly one operation, take the
//! snapshot back out. It holds no locks, does no I/O, and never shares
//! its board with callers.
//!
//! # Key types
//!
//! - [`GameEngine`] — add/remove players, start, move, and queries
//! - [`GameConfig`] — player limits, dots per cell, color palette
//! - [`GamePhase`] — Forming → Active → Over
//! - [`EngineError`] — why an operation was rejected
//!
//! [`GameState`]: chain_reaction_protocol::GameState

mod cascade;
mod config;
mod engine;
mod error;

pub use config::{GameConfig, PLAYER_COLORS};
pub use engine::{GameEngine, GamePhase};
pub use error::EngineError;
