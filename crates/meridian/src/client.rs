//! `MeridianClient` builder and handle.
//!
//! This ties the layers together: service registry, grid directory and
//! session manager, with credentials stored in the encrypted file store.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use meridian_grid::{GridDirectory, default_catalog_path};
use meridian_protocol::{GridInfo, Service};
use meridian_services::{RegistryConfig, ServiceError, ServiceRegistry};
use meridian_session::{LoginProtocol, Session, SessionConfig, SessionManager};
use meridian_vault::{EncryptedFileStore, LoginCredentials, VaultKey};
use tokio::sync::Mutex;

use crate::MeridianError;

/// The session manager as the client holds it.
pub type ClientSessions<P> = SessionManager<P, EncryptedFileStore>;

enum KeySource {
    Key(VaultKey),
    File(PathBuf),
}

/// Where the grid catalog comes from.
enum CatalogSource {
    Default,
    File(PathBuf),
    InMemory,
}

/// Builder for configuring a [`MeridianClient`].
///
/// Every setting has a default; the only thing you must supply is the
/// login protocol implementation.
///
/// # Example
///
/// ```rust,ignore
/// use meridian::prelude::*;
///
/// let client = MeridianClient::builder(my_protocol)
///     .service_host("10.0.0.5")
///     .credential_dir("/var/lib/myclient/credentials")
///     .build()
///     .await?;
/// ```
pub struct MeridianClientBuilder<P> {
    protocol: P,
    registry_config: RegistryConfig,
    session_config: SessionConfig,
    catalog: CatalogSource,
    credential_dir: Option<PathBuf>,
    vault_key: Option<KeySource>,
}

impl<P: LoginProtocol> MeridianClientBuilder<P> {
    /// Creates a builder with default settings around `protocol`.
    pub fn new(protocol: P) -> Self {
        Self {
            protocol,
            registry_config: RegistryConfig::default(),
            session_config: SessionConfig::default(),
            catalog: CatalogSource::Default,
            credential_dir: None,
            vault_key: None,
        }
    }

    /// Host every backend service is reached on.
    pub fn service_host(mut self, host: impl Into<String>) -> Self {
        self.registry_config = self.registry_config.with_host(host);
        self
    }

    /// Replaces the whole registry configuration.
    pub fn registry_config(mut self, config: RegistryConfig) -> Self {
        self.registry_config = config;
        self
    }

    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Persist the grid catalog at `path` instead of the platform default.
    pub fn grid_catalog(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog = CatalogSource::File(path.into());
        self
    }

    /// Keep the grid catalog in memory only (defaults, nothing saved).
    pub fn in_memory_grids(mut self) -> Self {
        self.catalog = CatalogSource::InMemory;
        self
    }

    /// Store sealed credentials in `dir` instead of the platform default.
    pub fn credential_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.credential_dir = Some(dir.into());
        self
    }

    /// Seal credentials with this key instead of a key file.
    pub fn vault_key(mut self, key: VaultKey) -> Self {
        self.vault_key = Some(KeySource::Key(key));
        self
    }

    /// Load (or create) the vault key at `path`.
    pub fn vault_key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.vault_key = Some(KeySource::File(path.into()));
        self
    }

    /// Loads the grid catalog and vault key, and assembles the client.
    ///
    /// Nothing connects yet: call
    /// [`connect_services`](MeridianClient::connect_services) and
    /// [`login`](MeridianClient::login) when ready.
    ///
    /// # Errors
    /// - [`MeridianError::Config`] if a default path is needed and the
    ///   platform has no data directory
    /// - [`MeridianError::Grid`] / [`MeridianError::Vault`] if the catalog
    ///   or key file can't be loaded
    /// - [`MeridianError::Service`] if the HTTP client can't be built
    pub async fn build(self) -> Result<MeridianClient<P>, MeridianError> {
        let registry = ServiceRegistry::new(self.registry_config)?;

        let grids = match self.catalog {
            CatalogSource::InMemory => GridDirectory::in_memory(),
            CatalogSource::File(path) => GridDirectory::load(path).await?,
            CatalogSource::Default => match default_catalog_path() {
                Some(path) => GridDirectory::load(path).await?,
                None => {
                    tracing::warn!("no config directory, grid catalog will not be saved");
                    GridDirectory::in_memory()
                }
            },
        };

        let key = match self.vault_key {
            Some(KeySource::Key(key)) => key,
            Some(KeySource::File(path)) => VaultKey::load_or_create(&path).await?,
            None => {
                let path = VaultKey::default_path().ok_or_else(|| {
                    MeridianError::Config("no data directory for the vault key".into())
                })?;
                VaultKey::load_or_create(&path).await?
            }
        };

        let credential_dir = self
            .credential_dir
            .or_else(EncryptedFileStore::default_dir)
            .ok_or_else(|| MeridianError::Config("no data directory for credentials".into()))?;
        let store = EncryptedFileStore::new(credential_dir, key);

        let sessions = SessionManager::new(self.protocol, store, self.session_config);
        tracing::info!(grids = grids.len(), "meridian client ready");

        Ok(MeridianClient {
            registry: Arc::new(registry),
            grids: Mutex::new(grids),
            sessions: Mutex::new(sessions),
        })
    }
}

/// A configured Meridian client.
///
/// Shareable across tasks behind an `Arc`: the registry is internally
/// synchronized, and the grid directory and session manager sit behind
/// async mutexes because their methods take `&mut self`.
pub struct MeridianClient<P> {
    registry: Arc<ServiceRegistry>,
    grids: Mutex<GridDirectory>,
    sessions: Mutex<ClientSessions<P>>,
}

impl<P: LoginProtocol> MeridianClient<P> {
    /// Creates a new builder around `protocol`.
    pub fn builder(protocol: P) -> MeridianClientBuilder<P> {
        MeridianClientBuilder::new(protocol)
    }

    /// The service registry. Clone the `Arc` to hand it to other tasks.
    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    pub fn grids(&self) -> &Mutex<GridDirectory> {
        &self.grids
    }

    pub fn sessions(&self) -> &Mutex<ClientSessions<P>> {
        &self.sessions
    }

    /// Connects every backend service concurrently.
    pub async fn connect_services(&self) -> HashMap<Service, Result<(), ServiceError>> {
        self.registry.connect_to_all_services().await
    }

    /// Looks a grid up by short id.
    ///
    /// # Errors
    /// [`MeridianError::UnknownGrid`] if the directory has no such grid.
    pub async fn find_grid(&self, short_id: &str) -> Result<GridInfo, MeridianError> {
        self.grids
            .lock()
            .await
            .find_by_id(short_id)
            .cloned()
            .ok_or_else(|| MeridianError::UnknownGrid(short_id.to_string()))
    }

    /// Logs in to the grid with `short_id` and returns a snapshot of the
    /// new session.
    pub async fn login(
        &self,
        short_id: &str,
        credentials: LoginCredentials,
        remember: bool,
    ) -> Result<Session, MeridianError> {
        let grid = self.find_grid(short_id).await?;
        let mut sessions = self.sessions.lock().await;
        let session = sessions.login(&grid, credentials, remember).await?;
        Ok(session.clone())
    }

    /// Logs in to the grid with `short_id` using remembered credentials.
    pub async fn login_with_stored(&self, short_id: &str) -> Result<Session, MeridianError> {
        let grid = self.find_grid(short_id).await?;
        let mut sessions = self.sessions.lock().await;
        let session = sessions.login_with_stored(&grid).await?;
        Ok(session.clone())
    }

    pub async fn logout(&self) {
        self.sessions.lock().await.logout().await;
    }

    /// Logs out and disconnects every service.
    pub async fn shutdown(&self) {
        self.logout().await;
        self.registry.disconnect_all();
        tracing::info!("meridian client shut down");
    }
}
