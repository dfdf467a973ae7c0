//! Error types for the service layer.

use meridian_protocol::Service;

/// Errors that can occur while connecting to or calling a service.
///
/// Every variant names the offending [`Service`], so a status screen can
/// say exactly which backend is unhappy. Raw `reqwest` errors never
/// escape this crate; they are flattened into a reason string.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No live connection exists for the service. Returned without doing
    /// any network I/O.
    #[error("{0} is not connected")]
    Unavailable(Service),

    /// The connect-time health check failed.
    #[error("failed to connect to {service}: {reason}")]
    ConnectionFailed { service: Service, reason: String },

    /// The request reached the network but failed there, or the service
    /// answered with a non-success status.
    #[error("request to {service} failed: {reason}")]
    RequestFailed { service: Service, reason: String },

    /// The service answered, but the body wasn't the JSON we expected.
    #[error("could not decode response from {0}")]
    DecodingFailed(Service),

    /// The request hit its deadline.
    #[error("request to {0} timed out")]
    Timeout(Service),

    /// The shared HTTP client could not be built (TLS backend failed to
    /// initialise, for example).
    #[error("failed to initialise HTTP client: {0}")]
    ClientInit(String),
}

impl ServiceError {
    /// The service this error is about, if it is about one.
    pub fn service(&self) -> Option<Service> {
        match self {
            Self::Unavailable(s) | Self::DecodingFailed(s) | Self::Timeout(s) => Some(*s),
            Self::ConnectionFailed { service, .. } | Self::RequestFailed { service, .. } => {
                Some(*service)
            }
            Self::ClientInit(_) => None,
        }
    }

    /// Maps a transport error onto the taxonomy.
    pub(crate) fn from_transport(service: Service, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(service)
        } else {
            Self::RequestFailed {
                service,
                reason: transport_reason(err),
            }
        }
    }
}

/// A short, human-readable reason for a transport error.
///
/// `reqwest::Error`'s `Display` includes the full URL; the interesting
/// part ("connection refused") is usually in its source chain.
fn transport_reason(err: &reqwest::Error) -> String {
    use std::error::Error as _;

    let mut reason = if err.is_connect() {
        "connection failed".to_string()
    } else if err.is_status() {
        err.status()
            .map(|s| format!("unexpected status {s}"))
            .unwrap_or_else(|| "unexpected status".into())
    } else {
        "transport error".to_string()
    };

    // The innermost cause is the useful one ("Connection refused").
    let mut root = err.source();
    while let Some(next) = root.and_then(|e| e.source()) {
        root = Some(next);
    }
    if let Some(cause) = root {
        reason.push_str(": ");
        reason.push_str(&cause.to_string());
    }
    reason
}
