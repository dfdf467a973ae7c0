//! Per-service connection status.

use std::fmt;

/// What the registry last observed about a service.
///
/// ```text
///   Disconnected ──connect──→ Connecting ──ok──→ Connected
///        ↑                        │                  │
///        │                        └──fail──→ Error   │
///        └──────────────── disconnect ───────────────┘
/// ```
///
/// Only the registry writes these. A connect future that is dropped
/// mid-flight leaves the status at `Connecting`; the next connect call
/// for the same service simply overwrites it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// The last connect attempt failed, with a human-readable reason.
    Error(String),
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("disconnected"),
            Self::Connecting => f.write_str("connecting"),
            Self::Connected => f.write_str("connected"),
            Self::Error(reason) => write!(f, "error: {reason}"),
        }
    }
}
