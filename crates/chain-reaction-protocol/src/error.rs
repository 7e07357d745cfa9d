//! Error types for the protocol layer.
//!
//! Each crate in the workspace defines its own error enum. A
//! `ProtocolError` always means the problem is in the shape or encoding
//! of a snapshot, never in game rules or room bookkeeping.

/// Errors that can occur while encoding, decoding, or checking snapshots.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, or
    /// negative numbers where counts are expected.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The snapshot parsed but breaks a structural invariant, e.g. the
    /// board does not match `boardSize` or an empty cell has an owner.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}
