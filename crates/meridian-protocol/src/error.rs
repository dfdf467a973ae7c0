//! Wire-level errors.
//!
//! `ProtocolError` covers two things that can go wrong "on the wire":
//! the codec failing to turn bytes into types (or back), and the remote
//! login protocol refusing or failing a handshake.

/// Failures encoding or decoding payloads, or in the login handshake.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// A payload couldn't be serialized.
    ///
    /// The inner string is the codec's own message. We keep a string
    /// rather than the `serde_json::Error` so the error stays `Clone`
    /// and can be copied into state machines and status maps.
    #[error("encode failed: {0}")]
    Encode(String),

    /// A body couldn't be parsed: malformed or truncated JSON, or valid
    /// JSON of the wrong shape.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The grid answered but refused the login (bad password, banned
    /// account, grid closed for maintenance, ...).
    #[error("login rejected: {0}")]
    LoginRejected(String),

    /// The grid could not be reached at all.
    #[error("grid unreachable: {0}")]
    Unreachable(String),
}
