//! A live connection to one service.

use std::time::Instant;

use meridian_protocol::{HealthReport, Service};
use reqwest::Url;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::{Endpoint, ServiceError};

/// Binds a [`Service`] to the HTTP client used to reach it, plus what we
/// learned when connecting.
///
/// Owned exclusively by the registry: it is created by a successful
/// `connect_to_service` and dropped on disconnect. Callers never hold one
/// directly; they go through [`ServiceRegistry::request`](crate::ServiceRegistry::request).
#[derive(Debug)]
pub struct ServiceConnection {
    service: Service,
    base_url: Url,
    http: reqwest::Client,
    connected_at: Instant,
    health: HealthReport,
}

impl ServiceConnection {
    pub(crate) fn new(
        service: Service,
        base_url: Url,
        http: reqwest::Client,
        health: HealthReport,
    ) -> Self {
        Self {
            service,
            base_url,
            http,
            connected_at: Instant::now(),
            health,
        }
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// When the connect-time health check succeeded.
    pub fn connected_at(&self) -> Instant {
        self.connected_at
    }

    /// The health report returned at connect time.
    pub fn health(&self) -> &HealthReport {
        &self.health
    }

    /// Sends `endpoint` and returns the raw response body.
    ///
    /// Decoding is left to the caller so this stays independent of the
    /// response type.
    pub(crate) async fn send(&self, endpoint: &Endpoint) -> Result<Vec<u8>, ServiceError> {
        send(&self.http, self.service, &self.base_url, endpoint).await
    }
}

/// Shared by live connections and connect-time probes.
pub(crate) async fn send(
    http: &reqwest::Client,
    service: Service,
    base_url: &Url,
    endpoint: &Endpoint,
) -> Result<Vec<u8>, ServiceError> {
    let url = endpoint_url(service, base_url, endpoint)?;

    let mut request = http
        .request(endpoint.method().clone(), url)
        .header(ACCEPT, "application/json");
    if let Some(body) = endpoint.body() {
        request = request
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_vec());
    }

    tracing::trace!(%service, method = %endpoint.method(), path = %endpoint.path(), "sending request");

    let response = request
        .send()
        .await
        .map_err(|e| ServiceError::from_transport(service, &e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ServiceError::RequestFailed {
            service,
            reason: format!("unexpected status {status}"),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| ServiceError::from_transport(service, &e))?;
    Ok(body.to_vec())
}

fn endpoint_url(
    service: Service,
    base_url: &Url,
    endpoint: &Endpoint,
) -> Result<Url, ServiceError> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|()| ServiceError::RequestFailed {
            service,
            reason: format!("base URL {base_url} cannot carry a path"),
        })?
        .clear()
        .extend(endpoint.segments());
    Ok(url)
}
