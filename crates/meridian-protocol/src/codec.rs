//! Turning service payloads into request bodies and response bytes back
//! into payloads.
//!
//! The registry only ever talks to a [`Codec`]; it never calls `serde_json`
//! directly. Every Meridian service speaks JSON today, so [`JsonCodec`] is
//! the one implementation.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Body format shared by a client and the services it calls.
///
/// `Send + Sync + 'static` because the registry keeps its codec for its
/// whole life and uses it from whichever Tokio worker polls a request.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a request payload.
    ///
    /// # Errors
    /// [`ProtocolError::Encode`] when the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Parses a response body as `T`.
    ///
    /// # Errors
    /// [`ProtocolError::Decode`] for malformed or truncated bodies and for
    /// bodies of the wrong shape.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// JSON bodies via `serde_json`.
///
/// ## Example
///
/// ```rust
/// use meridian_protocol::{Codec, HealthReport, JsonCodec};
///
/// let codec = JsonCodec;
/// let body = br#"{"status":"ok","uptime":12.5,"version":"1.4.0"}"#;
///
/// let report: HealthReport = codec.decode(body).unwrap();
/// assert_eq!(report.status, "ok");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(|e| ProtocolError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(|e| ProtocolError::Decode(e.to_string()))
    }
}
