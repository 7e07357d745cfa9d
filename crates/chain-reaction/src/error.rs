//! Unified error type for the Chain Reaction core.

use chain_reaction_engine::EngineError;
use chain_reaction_protocol::ProtocolError;
use chain_reaction_room::RoomError;

/// Top-level error that wraps all crate-specific errors.
///
/// `?` converts any sub-crate error into this one.
#[derive(Debug, thiserror::Error)]
pub enum ChainReactionError {
    /// Snapshot encoding, decoding, or structural check failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The game rejected an operation.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A room lookup or membership operation failed.
    #[error(transparent)]
    Room(#[from] RoomError),
}
