//! # Meridian
//!
//! The connection and session layer of a 3D virtual-world client.
//!
//! Meridian gives the rest of the client two things:
//! - a [`ServiceRegistry`] that health-checks, tracks and talks to the
//!   backend microservices (world, song, harmony, presence, assets)
//! - a [`SessionManager`] that logs an agent into a grid, remembers
//!   credentials in an encrypted store and keeps the session fresh
//!
//! [`MeridianClient`] wires both together with a [`GridDirectory`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use meridian::prelude::*;
//!
//! meridian::init_tracing();
//!
//! let client = MeridianClient::builder(my_login_protocol)
//!     .service_host("services.example.net")
//!     .build()
//!     .await?;
//!
//! client.connect_services().await;
//! let grid = client.find_grid("osgrid").await?;
//! client
//!     .login("osgrid", LoginCredentials::new("Ada Lovelace", password, &grid), true)
//!     .await?;
//! ```

mod client;
mod error;

pub use client::{ClientSessions, MeridianClient, MeridianClientBuilder};
pub use error::MeridianError;

pub use meridian_grid::{GridDirectory, GridError, default_catalog_path, default_grids};
pub use meridian_protocol::{
    AssetManifest, GridInfo, HarmonyField, HealthReport, LoginReply, NearbyAgent, Position,
    ProtocolError, ProtocolState, RegionInfo, Service, SongweaveResponse, WorldCoord, WorldData,
};
pub use meridian_services::{
    ConnectionStatus, Endpoint, RegistryConfig, ServiceError, ServiceRegistry, StatusMap,
};
pub use meridian_session::{
    LoginProtocol, LoginState, Session, SessionConfig, SessionError, SessionManager,
    probe_login_uri,
};
pub use meridian_vault::{
    CredentialStore, EncryptedFileStore, LoginCredentials, MemoryStore, VaultError, VaultKey,
};

/// Installs a `tracing` subscriber that prints to stderr.
///
/// Verbosity comes from `RUST_LOG` (e.g. `RUST_LOG=meridian_services=debug`)
/// and falls back to `info`. Calling it twice is harmless; only the first
/// call installs anything.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// Everything an application typically needs, in one import.
pub mod prelude {
    pub use crate::{
        ConnectionStatus, GridDirectory, GridInfo, LoginCredentials, LoginProtocol, LoginState,
        MeridianClient, MeridianError, Position, RegistryConfig, Service, ServiceRegistry,
        Session, SessionConfig, WorldCoord,
    };
}
