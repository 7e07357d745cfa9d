//! Snapshot bytes: the form a [`GameState`] takes on the wire or on disk.
//!
//! Decoding is strict. Bytes that parse but describe an impossible board
//! are rejected, so a rehydrated engine never starts from a broken state.

use chain_reaction_protocol::{Codec, GameState};
use tracing::debug;

use crate::ChainReactionError;

/// Encodes a snapshot with `codec`.
///
/// # Errors
/// [`ChainReactionError::Protocol`] if encoding fails.
pub fn encode_snapshot<C: Codec>(
    codec: &C,
    state: &GameState,
) -> Result<Vec<u8>, ChainReactionError> {
    Ok(codec.encode(state)?)
}

/// Decodes a snapshot with `codec` and checks its structure.
///
/// # Errors
/// [`ChainReactionError::Protocol`] if the bytes do not decode or the
/// decoded state fails [`GameState::check`].
pub fn decode_snapshot<C: Codec>(
    codec: &C,
    bytes: &[u8],
) -> Result<GameState, ChainReactionError> {
    let state: GameState = codec.decode(bytes)?;
    state.check()?;
    debug!(room_id = %state.id, bytes = bytes.len(), "snapshot decoded");
    Ok(state)
}
