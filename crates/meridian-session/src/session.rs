//! Session types: what a logged-in agent looks like.
//!
//! A "session" is the client's record of a successful login. It tracks:
//! - WHERE the agent is logged in (`GridInfo`, landing region)
//! - WHO they logged in as (credentials, agent and session ids)
//! - WHEN they logged in and were last active, for the two clocks below
//!
//! Two independent clocks govern a session:
//! - **Inactivity**: idle longer than `inactivity_timeout` (1 h) and the
//!   session [`is_expired`](Session::is_expired).
//! - **Age**: older than `max_session_age` (24 h) and it
//!   [`needs_reauth`](Session::needs_reauth), however active it was.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use meridian_protocol::{GridInfo, LoginReply, ProtocolState, RegionInfo};
use meridian_vault::LoginCredentials;
use tokio::time::Instant;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Timeouts for the session layer.
///
/// Create with `SessionConfig::default()` and override only what you need.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Idle time after which a session counts as expired. Default: 1 hour.
    pub inactivity_timeout: Duration,

    /// Age after which `refresh_session` performs a full re-login.
    /// Default: 24 hours.
    pub max_session_age: Duration,

    /// Deadline for `test_grid_connection`. Default: 30 seconds.
    pub probe_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout: Duration::from_secs(60 * 60),
            max_session_age: Duration::from_secs(24 * 60 * 60),
            probe_timeout: Duration::from_secs(30),
        }
    }
}

// ---------------------------------------------------------------------------
// LoginState
// ---------------------------------------------------------------------------

/// Where the login state machine is.
///
/// ```text
///   Idle ──→ Authenticating ──→ Connecting ──→ EstablishingSession ──→ LoggedIn
///    ↑            │                 │                   │                 │
///    │            └────────→ Error(message) ←───────────┘                 │
///    └──────────────────(logout / protocol disconnect)────────────────────┘
/// ```
///
/// The order of `Authenticating` and `Connecting` follows whatever the
/// protocol reports; the manager enters `Authenticating` itself before the
/// handshake starts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoginState {
    #[default]
    Idle,
    Authenticating,
    Connecting,
    /// The handshake succeeded and the session is being set up.
    EstablishingSession,
    LoggedIn,
    Error(String),
}

impl LoginState {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, Self::LoggedIn)
    }

    /// `true` while a login is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Authenticating | Self::Connecting | Self::EstablishingSession
        )
    }
}

/// How a protocol state reads before the session exists. Once logged in
/// the manager applies its own rules instead.
impl From<ProtocolState> for LoginState {
    fn from(state: ProtocolState) -> Self {
        match state {
            ProtocolState::Disconnected => Self::Idle,
            ProtocolState::Connecting => Self::Connecting,
            ProtocolState::Authenticating => Self::Authenticating,
            ProtocolState::Connected => Self::EstablishingSession,
            ProtocolState::Error(message) => Self::Error(message),
        }
    }
}

impl fmt::Display for LoginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Authenticating => f.write_str("authenticating"),
            Self::Connecting => f.write_str("connecting"),
            Self::EstablishingSession => f.write_str("establishing session"),
            Self::LoggedIn => f.write_str("logged in"),
            Self::Error(message) => write!(f, "error: {message}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A live login on one grid.
///
/// Created only by the session manager, after a successful handshake.
/// `Instant` here is Tokio's clock, so tests can fast-forward through the
/// one-hour and one-day thresholds with a paused runtime.
#[derive(Debug, Clone)]
pub struct Session {
    pub grid: GridInfo,
    /// Kept so the session can re-authenticate on its own. `Debug` on
    /// `LoginCredentials` redacts the secret.
    pub credentials: LoginCredentials,
    pub login_time: Instant,
    pub last_activity: Instant,
    /// Capability name → URL, as granted by the grid.
    pub capabilities: HashMap<String, String>,
    pub region: RegionInfo,
    pub session_id: String,
    pub agent_id: String,
    inactivity_timeout: Duration,
    max_age: Duration,
}

impl Session {
    pub(crate) fn new(
        grid: GridInfo,
        credentials: LoginCredentials,
        reply: LoginReply,
        config: &SessionConfig,
    ) -> Self {
        let now = Instant::now();
        Self {
            grid,
            credentials,
            login_time: now,
            last_activity: now,
            capabilities: reply.capabilities,
            region: reply.region,
            session_id: reply.session_id,
            agent_id: reply.agent_id,
            inactivity_timeout: config.inactivity_timeout,
            max_age: config.max_session_age,
        }
    }

    /// `true` once the agent has been idle longer than the inactivity
    /// timeout the session was created with.
    pub fn is_expired(&self) -> bool {
        self.last_activity.elapsed() > self.inactivity_timeout
    }

    /// `true` once the session is older than the maximum session age.
    pub fn needs_reauth(&self) -> bool {
        self.login_time.elapsed() > self.max_age
    }

    /// Records activity now.
    pub(crate) fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_protocol::Position;

    fn session() -> Session {
        let grid = GridInfo::new("OSGrid", "http://login.osgrid.org/", "osgrid");
        let credentials = LoginCredentials::new("Ada Lovelace", "hunter2", &grid);
        let reply = LoginReply {
            agent_id: "agent-1".into(),
            session_id: "session-1".into(),
            capabilities: HashMap::from([("seed".to_string(), "http://caps/seed".to_string())]),
            region: RegionInfo {
                name: "Lbsa Plaza".into(),
                handle: 1,
                position: Position::new(128.0, 25.0, 128.0),
            },
            message: None,
        };
        Session::new(grid, credentials, reply, &SessionConfig::default())
    }

    // =====================================================================
    // Session clocks
    // =====================================================================

    #[tokio::test(start_paused = true)]
    async fn test_is_expired_fresh_session_returns_false() {
        let s = session();

        assert!(!s.is_expired());
        assert!(!s.needs_reauth());
        assert_eq!(s.login_time, s.last_activity);
    }

    #[tokio::test(start_paused = true)]
    async fn test_is_expired_after_hour_of_inactivity_returns_true() {
        let s = session();

        tokio::time::advance(Duration::from_secs(3601)).await;

        assert!(s.is_expired());
        assert!(!s.needs_reauth());
    }

    #[tokio::test(start_paused = true)]
    async fn test_is_expired_exactly_at_timeout_returns_false() {
        let s = session();

        tokio::time::advance(Duration::from_secs(3600)).await;

        assert!(!s.is_expired(), "expiry is strictly after the timeout");
    }

    #[tokio::test(start_paused = true)]
    async fn test_touch_resets_inactivity_clock_only() {
        let mut s = session();
        tokio::time::advance(Duration::from_secs(3000)).await;

        s.touch();
        tokio::time::advance(Duration::from_secs(3000)).await;

        assert!(!s.is_expired());
        assert!(s.last_activity > s.login_time);
    }

    #[tokio::test(start_paused = true)]
    async fn test_needs_reauth_after_a_day_returns_true() {
        let mut s = session();

        tokio::time::advance(Duration::from_secs(25 * 60 * 60)).await;
        s.touch();

        assert!(s.needs_reauth(), "activity does not reset session age");
        assert!(!s.is_expired());
    }

    #[tokio::test]
    async fn test_session_debug_hides_secret() {
        let s = session();

        let debug = format!("{s:?}");

        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("session-1"));
    }

    // =====================================================================
    // LoginState
    // =====================================================================

    #[test]
    fn test_from_protocol_state_maps_connected_to_establishing() {
        assert_eq!(
            LoginState::from(ProtocolState::Connected),
            LoginState::EstablishingSession
        );
        assert_eq!(LoginState::from(ProtocolState::Disconnected), LoginState::Idle);
        assert_eq!(
            LoginState::from(ProtocolState::Connecting),
            LoginState::Connecting
        );
        assert_eq!(
            LoginState::from(ProtocolState::Authenticating),
            LoginState::Authenticating
        );
        assert_eq!(
            LoginState::from(ProtocolState::Error("refused".into())),
            LoginState::Error("refused".into())
        );
    }

    #[test]
    fn test_is_busy_only_for_in_flight_states() {
        assert!(LoginState::Authenticating.is_busy());
        assert!(LoginState::EstablishingSession.is_busy());
        assert!(!LoginState::Idle.is_busy());
        assert!(!LoginState::LoggedIn.is_busy());
        assert!(!LoginState::Error("x".into()).is_busy());
    }

    #[test]
    fn test_display_includes_error_message() {
        assert_eq!(LoginState::Error("timeout".into()).to_string(), "error: timeout");
        assert_eq!(LoginState::EstablishingSession.to_string(), "establishing session");
    }
}
