//! The service registry: one logical connection per backend service.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::join_all;
use meridian_protocol::{
    AssetManifest, Codec, HarmonyField, HealthReport, JsonCodec, NearbyAgent,
    Position, ProtocolError, Service, SongweaveResponse, WorldCoord, WorldData,
};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tokio::sync::watch;

use crate::connection::{self, ServiceConnection};
use crate::{ConnectionStatus, Endpoint, RegistryConfig, ServiceError};

/// Snapshot of every service's status.
pub type StatusMap = HashMap<Service, ConnectionStatus>;

/// Tracks and multiplexes connections to every [`Service`].
///
/// ## Lifecycle of one service
///
/// ```text
/// connect_to_service() ──→ [Connecting] ──health ok──→ [Connected] ──→ request()
///                                │                          │
///                                └──health fail──→ [Error]  │
///                                                           ▼
///                                    disconnect_from_service() ──→ [Disconnected]
/// ```
///
/// ## State ownership
///
/// Two pieces of state, both only written here:
/// - `connections`: the live connections. A plain `HashMap` behind a
///   `std::sync::Mutex`, locked only for map operations, never across
///   an `.await`.
/// - `status`: a `watch` channel holding the [`StatusMap`]. Reading is
///   synchronous (`borrow`), and anyone interested in changes can
///   [`subscribe`](Self::subscribe).
///
/// Every status write that goes with a map change happens under the
/// connections lock, and a (re)connect removes the old entry when it sets
/// `Connecting`. A registered connection therefore always shows
/// `Connected`.
pub struct ServiceRegistry {
    config: RegistryConfig,
    http: reqwest::Client,
    codec: JsonCodec,
    connections: Mutex<HashMap<Service, Arc<ServiceConnection>>>,
    status: watch::Sender<StatusMap>,
}

impl ServiceRegistry {
    /// Creates a registry with every service `Disconnected`.
    ///
    /// No network I/O happens until a connect or health call.
    ///
    /// # Errors
    /// [`ServiceError::ClientInit`] if the HTTP client can't be built.
    pub fn new(config: RegistryConfig) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.request_timeout)
            .read_timeout(config.request_timeout)
            .timeout(config.resource_timeout)
            .build()
            .map_err(|e| ServiceError::ClientInit(e.to_string()))?;

        let initial: StatusMap = Service::ALL
            .iter()
            .map(|&s| (s, ConnectionStatus::Disconnected))
            .collect();
        let (status, _) = watch::channel(initial);

        Ok(Self {
            config,
            http,
            codec: JsonCodec,
            connections: Mutex::new(HashMap::new()),
            status,
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // -----------------------------------------------------------------
    // Connect / disconnect
    // -----------------------------------------------------------------

    /// Connects to `service` by health-checking it.
    ///
    /// Drops any existing connection and sets `Connecting` under one lock,
    /// then `GET /health`. While a reconnect is in flight, requests fail
    /// with [`ServiceError::Unavailable`]. On a 2xx with a valid
    /// [`HealthReport`] the connection is registered and the status becomes
    /// `Connected`. On anything else the status becomes `Error(reason)`,
    /// and [`ServiceError::ConnectionFailed`] is returned.
    pub async fn connect_to_service(&self, service: Service) -> Result<(), ServiceError> {
        let replaced = {
            let mut connections = self.lock_connections();
            let replaced = connections.remove(&service).is_some();
            self.set_status(service, ConnectionStatus::Connecting);
            replaced
        };
        tracing::debug!(%service, replaced, "connecting");

        let outcome = match self.base_url(service) {
            Ok(base_url) => self
                .probe(service, &base_url)
                .await
                .map(|health| (base_url, health)),
            Err(e) => Err(e),
        };

        match outcome {
            Ok((base_url, health)) => {
                let version = health.version.clone();
                let conn = ServiceConnection::new(service, base_url, self.http.clone(), health);
                {
                    let mut connections = self.lock_connections();
                    connections.insert(service, Arc::new(conn));
                    self.set_status(service, ConnectionStatus::Connected);
                }
                tracing::info!(%service, %version, "service connected");
                Ok(())
            }
            Err(e) => {
                let reason = failure_reason(&e);
                {
                    let mut connections = self.lock_connections();
                    connections.remove(&service);
                    self.set_status(service, ConnectionStatus::Error(reason.clone()));
                }
                tracing::warn!(%service, %reason, "service connection failed");
                Err(ServiceError::ConnectionFailed { service, reason })
            }
        }
    }

    /// Drops the connection to `service`, if any, and marks it
    /// `Disconnected`. Calling it again is harmless.
    pub fn disconnect_from_service(&self, service: Service) {
        let removed = {
            let mut connections = self.lock_connections();
            let removed = connections.remove(&service).is_some();
            self.set_status(service, ConnectionStatus::Disconnected);
            removed
        };
        if removed {
            tracing::info!(%service, "service disconnected");
        }
    }

    /// Connects to every service concurrently.
    ///
    /// A failure on one service never aborts or delays the others: each
    /// outcome lands in that service's status and in the returned map.
    /// Total time is roughly the slowest single connect, not the sum.
    pub async fn connect_to_all_services(&self) -> HashMap<Service, Result<(), ServiceError>> {
        let attempts = Service::ALL.iter().map(|&service| async move {
            (service, self.connect_to_service(service).await)
        });
        let results = join_all(attempts).await;

        let connected = results.iter().filter(|(_, r)| r.is_ok()).count();
        tracing::info!(
            connected,
            total = results.len(),
            "connect-all finished"
        );
        results.into_iter().collect()
    }

    /// Disconnects every service.
    pub fn disconnect_all(&self) {
        for service in Service::ALL {
            self.disconnect_from_service(service);
        }
    }

    // -----------------------------------------------------------------
    // Health
    // -----------------------------------------------------------------

    /// Probes `service`'s health endpoint. Read-only: the registry's
    /// connections and statuses are left as they are.
    pub async fn check_service_health(&self, service: Service) -> bool {
        let healthy = match self.base_url(service) {
            Ok(base_url) => self.probe(service, &base_url).await.is_ok(),
            Err(_) => false,
        };
        tracing::debug!(%service, healthy, "health check");
        healthy
    }

    /// Probes every service concurrently, each bounded by the resource
    /// deadline.
    pub async fn check_all_services_health(&self) -> HashMap<Service, bool> {
        let probes = Service::ALL.iter().map(|&service| async move {
            (service, self.check_service_health(service).await)
        });
        join_all(probes).await.into_iter().collect()
    }

    // -----------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------

    /// Sends `endpoint` to `service` and decodes the JSON reply as `T`.
    ///
    /// # Errors
    /// - [`ServiceError::Unavailable`] if `service` isn't connected. No
    ///   network I/O happens in that case.
    /// - [`ServiceError::RequestFailed`] / [`ServiceError::Timeout`] for
    ///   transport failures and non-2xx replies.
    /// - [`ServiceError::DecodingFailed`] if the body isn't a `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        service: Service,
    ) -> Result<T, ServiceError> {
        let conn = self
            .connection(service)
            .ok_or(ServiceError::Unavailable(service))?;

        let body = conn.send(endpoint).await?;
        self.codec.decode(&body).map_err(|e| {
            tracing::debug!(%service, path = %endpoint.path(), error = %e, "undecodable response");
            ServiceError::DecodingFailed(service)
        })
    }

    /// Terrain and objects for one world cell.
    pub async fn world_data(&self, coord: WorldCoord) -> Result<WorldData, ServiceError> {
        self.request(&Endpoint::world_data(coord), Service::WorldEngine)
            .await
    }

    /// Asks the song engine to weave `song_id` at `position`.
    pub async fn songweave(
        &self,
        song_id: &str,
        position: Position,
    ) -> Result<SongweaveResponse, ServiceError> {
        let service = Service::SongEngine;
        let endpoint =
            Endpoint::songweave(song_id, position).map_err(|e| encode_failed(service, e))?;
        self.request(&endpoint, service).await
    }

    /// Samples the harmonic field at `position`.
    pub async fn harmony_field(&self, position: Position) -> Result<HarmonyField, ServiceError> {
        let service = Service::HarmonyService;
        let endpoint = Endpoint::harmony_field(position).map_err(|e| encode_failed(service, e))?;
        self.request(&endpoint, service).await
    }

    /// Agents within `radius` of `position`.
    pub async fn presence_nearby(
        &self,
        position: Position,
        radius: f32,
    ) -> Result<Vec<NearbyAgent>, ServiceError> {
        let service = Service::PresenceService;
        let endpoint = Endpoint::presence_nearby(position, radius)
            .map_err(|e| encode_failed(service, e))?;
        self.request(&endpoint, service).await
    }

    /// Metadata for one asset.
    pub async fn asset_manifest(&self, asset_id: &str) -> Result<AssetManifest, ServiceError> {
        self.request(&Endpoint::asset_manifest(asset_id), Service::AssetService)
            .await
    }

    // -----------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------

    /// The current status of `service`.
    pub fn status(&self, service: Service) -> ConnectionStatus {
        self.status
            .borrow()
            .get(&service)
            .cloned()
            .unwrap_or_default()
    }

    /// A snapshot of every service's status.
    pub fn statuses(&self) -> StatusMap {
        self.status.borrow().clone()
    }

    /// Subscribes to status changes. The receiver sees the current map
    /// immediately and every change after that.
    pub fn subscribe(&self) -> watch::Receiver<StatusMap> {
        self.status.subscribe()
    }

    pub fn is_connected(&self, service: Service) -> bool {
        self.lock_connections().contains_key(&service)
    }

    /// Services with a live connection, in [`Service::ALL`] order.
    pub fn connected_services(&self) -> Vec<Service> {
        let connections = self.lock_connections();
        Service::ALL
            .into_iter()
            .filter(|s| connections.contains_key(s))
            .collect()
    }

    /// The health report `service` returned when it connected.
    pub fn connection_health(&self, service: Service) -> Option<HealthReport> {
        self.connection(service).map(|c| c.health().clone())
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn connection(&self, service: Service) -> Option<Arc<ServiceConnection>> {
        self.lock_connections().get(&service).cloned()
    }

    /// The map holds no invariants a panic could break halfway, so a
    /// poisoned lock is still safe to use.
    fn lock_connections(&self) -> MutexGuard<'_, HashMap<Service, Arc<ServiceConnection>>> {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn set_status(&self, service: Service, status: ConnectionStatus) {
        self.status.send_modify(|map| {
            map.insert(service, status);
        });
    }

    fn base_url(&self, service: Service) -> Result<Url, ServiceError> {
        let raw = self.config.base_url(service);
        Url::parse(&raw).map_err(|e| ServiceError::RequestFailed {
            service,
            reason: format!("invalid service URL {raw}: {e}"),
        })
    }

    /// `GET /health`, bounded by the resource deadline.
    async fn probe(&self, service: Service, base_url: &Url) -> Result<HealthReport, ServiceError> {
        let endpoint = Endpoint::health();
        let send = connection::send(&self.http, service, base_url, &endpoint);
        let body = tokio::time::timeout(self.config.resource_timeout, send)
            .await
            .map_err(|_| ServiceError::Timeout(service))??;
        self.codec
            .decode(&body)
            .map_err(|_| ServiceError::DecodingFailed(service))
    }
}

/// The reason string stored in `ConnectionStatus::Error`.
fn failure_reason(err: &ServiceError) -> String {
    match err {
        ServiceError::RequestFailed { reason, .. } | ServiceError::ConnectionFailed { reason, .. } => {
            reason.clone()
        }
        ServiceError::Timeout(_) => "health check timed out".to_string(),
        ServiceError::DecodingFailed(_) => "health check returned an invalid body".to_string(),
        other => other.to_string(),
    }
}

fn encode_failed(service: Service, err: ProtocolError) -> ServiceError {
    ServiceError::RequestFailed {
        service,
        reason: err.to_string(),
    }
}
