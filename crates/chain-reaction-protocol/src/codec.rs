//! Codec trait and implementations for serializing snapshots.
//!
//! Rooms hand their [`GameState`](crate::GameState) to a transport which
//! ships it to clients, and replicas reload it between calls. The codec
//! is the single place that decides how those bytes look. Swapping in a
//! binary format later only means adding another [`Codec`] impl.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` so a single codec can be shared by every room
/// task for the lifetime of the process.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// The JSON shape is the camelCase layout browser clients already read
/// (`currentPlayerIndex`, `isGameOver`, cells carrying `playerId`).
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use chain_reaction_protocol::{BoardSize, Codec, GameState, JsonCodec, RoomId};
///
/// let codec = JsonCodec;
/// let state = GameState::empty(RoomId::from("ABCD1234"), BoardSize::new(2, 3), 4, 3);
///
/// let bytes = codec.encode(&state).unwrap();
/// let decoded: GameState = codec.decode(&bytes).unwrap();
/// assert_eq!(state, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
