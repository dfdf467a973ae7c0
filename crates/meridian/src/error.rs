//! Unified error type for Meridian.

use meridian_grid::GridError;
use meridian_protocol::ProtocolError;
use meridian_services::ServiceError;
use meridian_session::SessionError;
use meridian_vault::VaultError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `meridian` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum MeridianError {
    /// Encoding/decoding or login-protocol failure.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Credential store failure (I/O, crypto, corrupt blob).
    #[error(transparent)]
    Vault(#[from] VaultError),

    /// Grid catalog failure (I/O, bad JSON, invalid grid).
    #[error(transparent)]
    Grid(#[from] GridError),

    /// A backend service failed or is not connected.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Login/session failure.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// No grid in the directory has this short id.
    #[error("unknown grid {0:?}")]
    UnknownGrid(String),

    /// The client could not be assembled (e.g. no platform directory for
    /// a default path).
    #[error("configuration error: {0}")]
    Config(String),
}
