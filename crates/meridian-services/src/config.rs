//! Registry configuration: where services live and how long to wait.

use std::collections::HashMap;
use std::time::Duration;

use meridian_protocol::Service;

/// Environment variable overriding [`RegistryConfig::host`].
pub const HOST_ENV: &str = "MERIDIAN_SERVICE_HOST";
/// Environment variable overriding [`RegistryConfig::scheme`].
pub const SCHEME_ENV: &str = "MERIDIAN_SERVICE_SCHEME";

/// How the registry reaches its services.
///
/// Every service lives at `<scheme>://<host>:<port>`, where the port is
/// the service's well-known port unless overridden.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// `http` or `https`. Default: `http`.
    pub scheme: String,

    /// Host shared by every service. Default: `localhost`.
    pub host: String,

    /// Deadline for establishing a TCP connection and for the first
    /// response bytes. Default: 15 seconds.
    pub request_timeout: Duration,

    /// Deadline for a whole request, body included. Health probes are
    /// bounded by this too, so one dead service can't stall an aggregate
    /// health report. Default: 30 seconds.
    pub resource_timeout: Duration,

    /// Per-service port overrides.
    pub port_overrides: HashMap<Service, u16>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            request_timeout: Duration::from_secs(15),
            resource_timeout: Duration::from_secs(30),
            port_overrides: HashMap::new(),
        }
    }
}

impl RegistryConfig {
    /// Defaults, with `host` and `scheme` taken from
    /// `MERIDIAN_SERVICE_HOST` / `MERIDIAN_SERVICE_SCHEME` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(host) = std::env::var(HOST_ENV) {
            if !host.trim().is_empty() {
                config.host = host.trim().to_string();
            }
        }
        if let Ok(scheme) = std::env::var(SCHEME_ENV) {
            if !scheme.trim().is_empty() {
                config.scheme = scheme.trim().to_string();
            }
        }
        config
    }

    /// Sets the host shared by every service.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Points one service at a non-default port.
    pub fn with_port(mut self, service: Service, port: u16) -> Self {
        self.port_overrides.insert(service, port);
        self
    }

    /// Sets both deadlines at once.
    pub fn with_timeouts(mut self, request: Duration, resource: Duration) -> Self {
        self.request_timeout = request;
        self.resource_timeout = resource;
        self
    }

    /// The port `service` is reached on.
    pub fn port(&self, service: Service) -> u16 {
        self.port_overrides
            .get(&service)
            .copied()
            .unwrap_or_else(|| service.port())
    }

    /// `<scheme>://<host>:<port>` for `service`, without a trailing slash.
    pub fn base_url(&self, service: Service) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port(service))
    }
}
