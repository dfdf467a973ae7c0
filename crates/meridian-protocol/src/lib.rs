//! Wire types for Meridian.
//!
//! This crate defines the vocabulary every other Meridian crate shares:
//!
//! - **Services** ([`Service`]): the fixed set of backend microservices
//!   and the port each one listens on.
//! - **Grids** ([`GridInfo`]): the virtual-world deployments a user can
//!   log into.
//! - **Payloads** ([`HealthReport`], [`WorldData`], [`Position`], ...):
//!   the JSON bodies exchanged with services.
//! - **Login** ([`ProtocolState`], [`LoginReply`]): what the external
//!   login protocol reports back.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how payloads become
//!   bytes and back.
//!
//! # Architecture
//!
//! ```text
//! Session / Services (above)  ← speak in these types
//!     ↕
//! Protocol (this crate)       ← types + codec, no I/O
//! ```

mod codec;
mod error;
mod login;
mod payload;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use login::{LoginReply, ProtocolState, RegionInfo};
pub use payload::{
    AssetManifest, HarmonyField, HarmonyRequest, HealthReport, NearbyAgent,
    PresenceRequest, SongweaveRequest, SongweaveResponse, WorldData,
};
pub use types::{GridInfo, Position, Service, WorldCoord};
