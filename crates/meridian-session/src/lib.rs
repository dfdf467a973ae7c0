//! Login and session management for Meridian.
//!
//! This crate owns the agent's presence on a grid:
//!
//! 1. **Logging in**: driving the external login protocol ([`LoginProtocol`])
//!    through its handshake and mirroring its progress as a [`LoginState`]
//! 2. **Session tracking**: the one live [`Session`], with inactivity
//!    expiry and periodic re-authentication
//! 3. **Credentials**: optionally remembering them in a
//!    [`CredentialStore`](meridian_vault::CredentialStore) so the next
//!    login needs no password prompt
//!
//! # How it fits in the stack
//!
//! ```text
//! Client application (above)  ← calls login/logout, watches LoginState
//!     ↕
//! Session Layer (this crate)  ← one SessionManager per signed-in agent
//!     ↕
//! Login protocol + vault (below)  ← handshake, encrypted credentials
//! ```
//!
//! The service registry (`meridian-services`) runs independently of this
//! crate; a session is not required to talk to the backend services.

#![allow(async_fn_in_trait)]

mod error;
mod manager;
mod probe;
mod protocol;
mod session;

pub use error::SessionError;
pub use manager::SessionManager;
pub use probe::probe_login_uri;
pub use protocol::LoginProtocol;
pub use session::{LoginState, Session, SessionConfig};
