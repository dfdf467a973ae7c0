//! JSON bodies exchanged with the backend services.
//!
//! Response types use `#[serde(default)]` on optional fields so that a
//! service adding fields (or omitting ones it doesn't compute) never breaks
//! an older client.

use serde::{Deserialize, Serialize};

use crate::{Position, WorldCoord};

/// Body of `GET /health`, served by every service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Free-form status word, usually `"ok"`.
    pub status: String,
    /// Seconds since the service started.
    pub uptime: f64,
    /// Service build version.
    pub version: String,
}

/// Terrain and objects for one world cell (`GET /world/{x}/{z}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldData {
    pub coord: WorldCoord,
    #[serde(default)]
    pub biome: Option<String>,
    /// Row-major height samples.
    #[serde(default)]
    pub heightmap: Vec<f32>,
    /// Opaque object descriptors; their schema belongs to the renderer.
    #[serde(default)]
    pub objects: Vec<serde_json::Value>,
}

/// Body of `POST /songweave`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongweaveRequest {
    pub song_id: String,
    pub position: Position,
}

/// Reply to `POST /songweave`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongweaveResponse {
    pub song_id: String,
    /// Where to stream the woven audio from.
    pub stream_url: String,
    #[serde(default)]
    pub tempo: Option<f32>,
    #[serde(default)]
    pub key: Option<String>,
}

/// Body of `POST /harmony/field`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonyRequest {
    pub position: Position,
}

/// Harmonic field sampled at a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonyField {
    pub position: Position,
    /// Overall consonance, 0.0–1.0.
    pub resonance: f32,
    #[serde(default)]
    pub dominant_chord: Option<String>,
    #[serde(default)]
    pub overtones: Vec<f32>,
}

/// Body of `POST /presence/nearby`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceRequest {
    pub position: Position,
    pub radius: f32,
}

/// One agent returned by the presence service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyAgent {
    pub agent_id: String,
    pub display_name: String,
    pub position: Position,
}

/// Asset metadata (`GET /assets/{id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetManifest {
    pub asset_id: String,
    pub kind: String,
    pub url: String,
    #[serde(default)]
    pub size_bytes: Option<u64>,
}
