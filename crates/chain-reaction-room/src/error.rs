//! Error types for the room layer.

use chain_reaction_engine::EngineError;
use chain_reaction_protocol::RoomId;

/// Errors that can occur during room operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist (never created, deleted, or swept).
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room already seats the maximum number of members.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The game rejected the operation. The stored snapshot is unchanged.
    #[error(transparent)]
    Engine(#[from] EngineError),
}
