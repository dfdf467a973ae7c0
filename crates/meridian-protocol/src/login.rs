//! What the external login protocol reports.
//!
//! The login protocol itself (the legacy grid handshake) is a black box.
//! Meridian only sees two things from it: a stream of [`ProtocolState`]
//! values, and a [`LoginReply`] when a handshake succeeds.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::Position;

/// Connection state published by the login protocol handler.
///
/// This is the protocol's OWN view. The session layer maps it onto its
/// richer `LoginState`, where `Connected` does not yet mean "logged in".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProtocolState {
    #[default]
    Disconnected,
    Connecting,
    Authenticating,
    Connected,
    Error(String),
}

/// The simulator region the agent landed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionInfo {
    pub name: String,
    /// Region handle: packed global grid coordinates.
    pub handle: u64,
    /// Where the avatar spawned inside the region.
    #[serde(default)]
    pub position: Position,
}

/// Everything a successful handshake hands back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginReply {
    pub agent_id: String,
    pub session_id: String,
    /// Capability name → URL granting access to that sub-API.
    #[serde(default)]
    pub capabilities: HashMap<String, String>,
    pub region: RegionInfo,
    /// Message of the day, if the grid sent one.
    #[serde(default)]
    pub message: Option<String>,
}
