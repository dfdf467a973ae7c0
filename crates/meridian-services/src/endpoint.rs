//! Typed request descriptions.
//!
//! An [`Endpoint`] says WHAT to ask a service for (method, path and
//! body) without knowing WHERE the service lives. The registry joins it
//! with a connection's base URL at send time.

use meridian_protocol::{
    Codec, HarmonyRequest, JsonCodec, Position, PresenceRequest, ProtocolError,
    SongweaveRequest, WorldCoord,
};
use reqwest::Method;
use serde::Serialize;

/// One request against one service.
///
/// The path is kept as segments rather than a string so that values like
/// asset ids are percent-encoded when the URL is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    method: Method,
    segments: Vec<String>,
    body: Option<Vec<u8>>,
}

impl Endpoint {
    /// A `GET` request for the given path segments.
    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method: Method::GET,
            segments: segments.into_iter().map(Into::into).collect(),
            body: None,
        }
    }

    /// A `POST` request with a JSON body.
    ///
    /// # Errors
    /// [`ProtocolError::Encode`] if `body` can't be serialized.
    pub fn post<I, S, B>(segments: I, body: &B) -> Result<Self, ProtocolError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        B: Serialize,
    {
        Ok(Self {
            method: Method::POST,
            segments: segments.into_iter().map(Into::into).collect(),
            body: Some(JsonCodec.encode(body)?),
        })
    }

    /// `GET /health`, served by every service.
    pub fn health() -> Self {
        Self::get(["health"])
    }

    /// `GET /world/{x}/{z}` on the world engine.
    pub fn world_data(coord: WorldCoord) -> Self {
        Self::get(["world".to_string(), coord.x.to_string(), coord.z.to_string()])
    }

    /// `POST /songweave` on the song engine.
    pub fn songweave(
        song_id: impl Into<String>,
        position: Position,
    ) -> Result<Self, ProtocolError> {
        let body = SongweaveRequest {
            song_id: song_id.into(),
            position,
        };
        Self::post(["songweave"], &body)
    }

    /// `POST /harmony/field` on the harmony service.
    pub fn harmony_field(position: Position) -> Result<Self, ProtocolError> {
        Self::post(["harmony", "field"], &HarmonyRequest { position })
    }

    /// `POST /presence/nearby` on the presence service.
    pub fn presence_nearby(
        position: Position,
        radius: f32,
    ) -> Result<Self, ProtocolError> {
        Self::post(["presence", "nearby"], &PresenceRequest { position, radius })
    }

    /// `GET /assets/{id}` on the asset service.
    pub fn asset_manifest(asset_id: impl Into<String>) -> Self {
        Self::get(["assets".to_string(), asset_id.into()])
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The path as it would appear in a log line, e.g. `/world/3/7`.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    pub(crate) fn segments(&self) -> &[String] {
        &self.segments
    }

    pub(crate) fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}
