//! Error types for the session layer.

use meridian_protocol::ProtocolError;
use meridian_vault::VaultError;

/// Errors that can occur while logging in, refreshing, or managing
/// stored credentials.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The login protocol refused or failed the handshake.
    #[error("login protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Storing or reading credentials failed. When this happens during a
    /// `remember` login, the handshake is never attempted.
    #[error("credential storage error: {0}")]
    Storage(#[from] VaultError),

    /// The operation needs a live session and there isn't one.
    #[error("no active session")]
    NoActiveSession,

    /// `login_with_stored` was asked for a grid with nothing remembered.
    #[error("no stored credentials for grid {0}")]
    NoStoredCredentials(String),

    /// A session is already live. Log out before logging in again.
    #[error("already logged in to grid {0}")]
    AlreadyLoggedIn(String),
}
