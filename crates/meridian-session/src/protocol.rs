//! The login protocol seam.
//!
//! Meridian doesn't speak the legacy grid login handshake itself. Whatever
//! does (an XML-RPC client, a UDP circuit driver, a test double) plugs in
//! through the [`LoginProtocol`] trait, and the
//! [`SessionManager`](crate::SessionManager) drives it.
//!
//! # Why a trait?
//!
//! The session state machine is the same no matter how the bytes move.
//! Tests swap in a scripted protocol that counts `connect` calls; the
//! application swaps in the real one. Neither needs framework changes.

use meridian_protocol::{GridInfo, LoginReply, ProtocolError, ProtocolState};
use meridian_vault::LoginCredentials;
use tokio::sync::watch;

/// Drives the external login handshake for one agent.
///
/// # Trait bounds
///
/// - `Send + Sync`: the manager (and so the protocol) may be moved between
///   Tokio worker threads or shared behind a mutex.
/// - `'static`: it lives as long as the session manager that owns it.
///
/// # State stream
///
/// The protocol publishes its own view of the connection through
/// [`state`](LoginProtocol::state). The session manager maps those values
/// onto [`LoginState`](crate::LoginState) while a login is in flight, and
/// reacts to `Disconnected` / `Error` once logged in.
pub trait LoginProtocol: Send + Sync + 'static {
    /// Performs the handshake with `grid`.
    ///
    /// # Returns
    /// - `Ok(LoginReply)`: the grid accepted the agent
    /// - `Err(ProtocolError)`: rejected, unreachable, or malformed reply
    fn connect(
        &self,
        grid: &GridInfo,
        credentials: &LoginCredentials,
    ) -> impl std::future::Future<Output = Result<LoginReply, ProtocolError>> + Send;

    /// Tells the grid the agent is leaving. Best effort: the caller logs a
    /// failure and disconnects anyway.
    fn logout_notice(
        &self,
    ) -> impl std::future::Future<Output = Result<(), ProtocolError>> + Send;

    /// Tears the connection down. Must be safe to call when not connected.
    fn disconnect(&self) -> impl std::future::Future<Output = ()> + Send;

    /// A receiver for the protocol's connection state.
    fn state(&self) -> watch::Receiver<ProtocolState>;
}
