//! The session manager: one agent's login state machine.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Driving the login protocol through a handshake
//! - Publishing every [`LoginState`] transition to subscribers
//! - Holding the single live [`Session`] and refreshing it
//! - Remembering (and forgetting) credentials in a [`CredentialStore`]
//!
//! # Concurrency note
//!
//! `SessionManager` is NOT shareable by itself: every state-changing method
//! takes `&mut self`. One agent logs in once at a time, and the borrow
//! checker enforces exactly that. If several tasks need it, wrap it in a
//! `tokio::sync::Mutex`. Readers that only care about progress should use
//! [`subscribe`](SessionManager::subscribe) instead of locking.
//!
//! # Cancellation
//!
//! Dropping a `login` future part-way leaves the state wherever it got to
//! (`Authenticating`, `Connecting`, ...) with no session. The next `login`
//! starts over and overwrites it.

use meridian_protocol::{GridInfo, LoginReply, ProtocolError, ProtocolState};
use meridian_vault::{CredentialStore, LoginCredentials};
use tokio::sync::watch;

use crate::{
    LoginProtocol, LoginState, Session, SessionConfig, SessionError, probe_login_uri,
};

/// Drives one agent's login and owns its session.
///
/// ## Lifecycle
///
/// ```text
/// login() ──→ [Authenticating] ──→ protocol handshake ──→ [LoggedIn]
///                    │                                         │
///                    ▼ (store or handshake fails)              │ refresh_session()
///               [Error(msg)]                                   │   (re-login past max age)
///                                                              ▼
///                                      logout() / protocol drop ──→ [Idle]
/// ```
pub struct SessionManager<P, S> {
    protocol: P,
    store: S,
    config: SessionConfig,

    /// At most one session per manager. `Some` exactly while the state is
    /// `LoggedIn`.
    session: Option<Session>,

    /// Our own receiver on the protocol's state stream. Changes are
    /// consumed during `login` and by `follow_protocol`.
    protocol_state: watch::Receiver<ProtocolState>,

    /// Published login state. Sending never fails, even with no
    /// subscribers, because the sender keeps the value.
    state: watch::Sender<LoginState>,
}

impl<P: LoginProtocol, S: CredentialStore> SessionManager<P, S> {
    /// Creates an idle manager around a protocol and a credential store.
    pub fn new(protocol: P, store: S, config: SessionConfig) -> Self {
        let protocol_state = protocol.state();
        let (state, _) = watch::channel(LoginState::Idle);
        Self {
            protocol,
            store,
            config,
            session: None,
            protocol_state,
            state,
        }
    }

    // -----------------------------------------------------------------
    // Login / logout
    // -----------------------------------------------------------------

    /// Logs in to `grid`.
    ///
    /// With `remember`, the credentials are stored BEFORE the handshake;
    /// if storing fails the handshake never happens. On success the new
    /// session's `login_time` and `last_activity` are both "now".
    ///
    /// # Errors
    /// - [`SessionError::AlreadyLoggedIn`]: a session is live; state is
    ///   left untouched
    /// - [`SessionError::Storage`]: `remember` was set and the store failed
    /// - [`SessionError::Protocol`]: the handshake failed
    ///
    /// Every error other than `AlreadyLoggedIn` leaves the state at
    /// `Error(message)`.
    pub async fn login(
        &mut self,
        grid: &GridInfo,
        credentials: LoginCredentials,
        remember: bool,
    ) -> Result<&Session, SessionError> {
        if let Some(session) = &self.session {
            return Err(SessionError::AlreadyLoggedIn(session.grid.to_string()));
        }

        self.set_state(LoginState::Authenticating);
        tracing::info!(%grid, remember, "logging in");

        if remember {
            if let Err(e) = self.store.store(&credentials, grid).await {
                tracing::warn!(%grid, error = %e, "could not store credentials, login aborted");
                self.set_state(LoginState::Error(e.to_string()));
                return Err(SessionError::Storage(e));
            }
        }

        let reply = match self.handshake(grid, &credentials).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(%grid, error = %e, "login failed");
                self.set_state(LoginState::Error(e.to_string()));
                return Err(SessionError::Protocol(e));
            }
        };

        self.set_state(LoginState::EstablishingSession);
        let session = Session::new(grid.clone(), credentials, reply, &self.config);
        tracing::info!(
            %grid,
            agent_id = %session.agent_id,
            region = %session.region.name,
            "logged in"
        );
        self.set_state(LoginState::LoggedIn);
        Ok(self.session.insert(session))
    }

    /// Logs in with the credentials remembered for `grid`.
    ///
    /// # Errors
    /// [`SessionError::NoStoredCredentials`] if nothing is stored, plus
    /// everything [`login`](Self::login) can return.
    pub async fn login_with_stored(&mut self, grid: &GridInfo) -> Result<&Session, SessionError> {
        let credentials = self
            .store
            .retrieve(grid)
            .await?
            .ok_or_else(|| SessionError::NoStoredCredentials(grid.to_string()))?;
        self.login(grid, credentials, false).await
    }

    /// Logs out.
    ///
    /// Sends the farewell notice if a session is live (a failure there is
    /// only logged), always disconnects the protocol, drops the session
    /// and returns to `Idle`. Stored credentials are NOT touched; use
    /// [`forget_credentials`](Self::forget_credentials) for that.
    pub async fn logout(&mut self) {
        if let Some(session) = &self.session {
            if let Err(e) = self.protocol.logout_notice().await {
                tracing::warn!(grid = %session.grid, error = %e, "logout notice failed, disconnecting anyway");
            }
        }

        self.protocol.disconnect().await;
        self.protocol_state.mark_unchanged();

        match self.session.take() {
            Some(session) => tracing::info!(grid = %session.grid, "logged out"),
            None => tracing::debug!("logout without an active session"),
        }
        self.set_state(LoginState::Idle);
    }

    // -----------------------------------------------------------------
    // Session upkeep
    // -----------------------------------------------------------------

    /// Marks the session active now and re-authenticates it if it has
    /// outlived the maximum session age.
    ///
    /// Re-authentication disconnects, then runs a full [`login`](Self::login)
    /// against the same grid with the session's credentials. Nothing is
    /// re-stored.
    ///
    /// # Errors
    /// [`SessionError::NoActiveSession`] without a session; otherwise
    /// whatever the re-login returns (the old session is gone either way).
    pub async fn refresh_session(&mut self) -> Result<&Session, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoActiveSession)?;
        session.touch();
        if !session.needs_reauth() {
            return self.session.as_ref().ok_or(SessionError::NoActiveSession);
        }

        let Some(stale) = self.session.take() else {
            return Err(SessionError::NoActiveSession);
        };
        tracing::info!(grid = %stale.grid, "session past maximum age, re-authenticating");
        self.protocol.disconnect().await;
        self.protocol_state.mark_unchanged();
        self.login(&stale.grid, stale.credentials, false).await
    }

    /// Marks the session active without checking its age.
    ///
    /// # Errors
    /// [`SessionError::NoActiveSession`] without a session.
    pub fn record_activity(&mut self) -> Result<(), SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoActiveSession)?;
        session.touch();
        Ok(())
    }

    // -----------------------------------------------------------------
    // Protocol state
    // -----------------------------------------------------------------

    /// Applies one state observed on the protocol's stream.
    ///
    /// Without a session the protocol state maps straight onto the login
    /// state (`Connected` reads as `EstablishingSession`). With a session:
    /// - `Connected` keeps `LoggedIn`
    /// - `Disconnected` drops the session and returns to `Idle`
    /// - `Error(m)` drops the session and enters `Error(m)`
    /// - `Connecting` / `Authenticating` are the protocol's own reconnect
    ///   chatter and are ignored
    pub fn handle_protocol_state(&mut self, observed: ProtocolState) {
        if self.session.is_none() {
            self.set_state(LoginState::from(observed));
            return;
        }

        match observed {
            ProtocolState::Connected => {}
            ProtocolState::Disconnected => self.end_session(LoginState::Idle),
            ProtocolState::Error(message) => self.end_session(LoginState::Error(message)),
            ProtocolState::Connecting | ProtocolState::Authenticating => {
                tracing::debug!(?observed, "ignoring protocol state while logged in");
            }
        }
    }

    /// Waits for the protocol to publish a new state, applies it, and
    /// returns the resulting login state.
    ///
    /// Returns `None` once the protocol's state stream has closed. Meant
    /// to be called in a loop by whoever owns the manager.
    pub async fn follow_protocol(&mut self) -> Option<LoginState> {
        self.protocol_state.changed().await.ok()?;
        let observed = self.protocol_state.borrow_and_update().clone();
        self.handle_protocol_state(observed);
        Some(self.login_state())
    }

    // -----------------------------------------------------------------
    // Credentials and grids
    // -----------------------------------------------------------------

    /// The credentials remembered for `grid`, if any.
    pub async fn stored_credentials(
        &self,
        grid: &GridInfo,
    ) -> Result<Option<LoginCredentials>, SessionError> {
        Ok(self.store.retrieve(grid).await?)
    }

    /// Forgets the credentials remembered for `grid`. Does not affect a
    /// live session.
    pub async fn forget_credentials(&self, grid: &GridInfo) -> Result<(), SessionError> {
        self.store.remove(grid).await?;
        tracing::info!(%grid, "stored credentials removed");
        Ok(())
    }

    /// `true` if `grid`'s login URI answers `200 OK` within the configured
    /// probe timeout. Never fails.
    pub async fn test_grid_connection(&self, grid: &GridInfo) -> bool {
        probe_login_uri(&grid.login_uri, self.config.probe_timeout).await
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn current_session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn login_state(&self) -> LoginState {
        self.state.borrow().clone()
    }

    /// A receiver that sees every login state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<LoginState> {
        self.state.subscribe()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn protocol(&self) -> &P {
        &self.protocol
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    /// Runs `connect`, mirroring whatever the protocol publishes meanwhile
    /// onto the login state.
    async fn handshake(
        &mut self,
        grid: &GridInfo,
        credentials: &LoginCredentials,
    ) -> Result<LoginReply, ProtocolError> {
        // Anything published before this attempt is stale.
        self.protocol_state.mark_unchanged();

        let connect = self.protocol.connect(grid, credentials);
        tokio::pin!(connect);
        let mut watching = true;

        let result = loop {
            tokio::select! {
                result = &mut connect => break result,
                changed = self.protocol_state.changed(), if watching => {
                    if changed.is_err() {
                        watching = false;
                        continue;
                    }
                    let observed = self.protocol_state.borrow_and_update().clone();
                    publish(&self.state, LoginState::from(observed));
                }
            }
        };

        // The last transitions can land in the same poll as the reply;
        // the caller decides what state follows.
        self.protocol_state.mark_unchanged();
        result
    }

    fn end_session(&mut self, next: LoginState) {
        if let Some(session) = self.session.take() {
            tracing::info!(grid = %session.grid, state = %next, "session ended by protocol");
        }
        self.set_state(next);
    }

    fn set_state(&self, next: LoginState) {
        publish(&self.state, next);
    }
}

/// Publishes `next` unless it equals the current state.
fn publish(state: &watch::Sender<LoginState>, next: LoginState) {
    state.send_if_modified(|current| {
        if *current == next {
            return false;
        }
        tracing::debug!(from = %current, to = %next, "login state changed");
        *current = next;
        true
    });
}

// =========================================================================
// Tests
// =========================================================================
