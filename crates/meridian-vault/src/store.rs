//! The storage trait and the in-memory implementation.

use std::collections::HashMap;

use meridian_protocol::GridInfo;
use tokio::sync::Mutex;

use crate::{LoginCredentials, VaultError, VaultKey, credential_key};
use crate::credentials::check_owner;

/// Persists credentials per grid.
///
/// Implementations must keep the secret opaque to whatever they write to:
/// a store that puts plaintext passwords in a file is wrong, not just
/// untidy.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` so the store can live inside the session
/// manager and be driven from any Tokio worker.
pub trait CredentialStore: Send + Sync + 'static {
    /// Stores `credentials` for `grid`, replacing anything stored before.
    ///
    /// # Errors
    /// [`VaultError::Storage`] when the backing store rejects the write.
    fn store(
        &self,
        credentials: &LoginCredentials,
        grid: &GridInfo,
    ) -> impl std::future::Future<Output = Result<(), VaultError>> + Send;

    /// Returns the credentials stored for `grid`, if any.
    fn retrieve(
        &self,
        grid: &GridInfo,
    ) -> impl std::future::Future<Output = Result<Option<LoginCredentials>, VaultError>> + Send;

    /// Forgets the credentials for `grid`. Removing nothing is not an error.
    fn remove(
        &self,
        grid: &GridInfo,
    ) -> impl std::future::Future<Output = Result<(), VaultError>> + Send;
}

/// A [`CredentialStore`] that lives in process memory.
///
/// Blobs are still sealed (under a random per-instance key), so a heap
/// dump shows ciphertext, not passwords. Everything is lost on drop.
pub struct MemoryStore {
    key: VaultKey,
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            key: VaultKey::generate(),
            blobs: Mutex::new(HashMap::new()),
        }
    }

    /// Number of grids with stored credentials.
    pub async fn len(&self) -> usize {
        self.blobs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.lock().await.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for MemoryStore {
    async fn store(
        &self,
        credentials: &LoginCredentials,
        grid: &GridInfo,
    ) -> Result<(), VaultError> {
        let key = credential_key(grid);
        let plaintext = serde_json::to_vec(credentials).map_err(|e| {
            VaultError::Storage {
                key: key.clone(),
                reason: e.to_string(),
            }
        })?;
        let blob = self.key.seal(&key, &plaintext)?;
        self.blobs.lock().await.insert(key, blob);
        Ok(())
    }

    async fn retrieve(
        &self,
        grid: &GridInfo,
    ) -> Result<Option<LoginCredentials>, VaultError> {
        let key = credential_key(grid);
        let blobs = self.blobs.lock().await;
        let Some(blob) = blobs.get(&key) else {
            return Ok(None);
        };
        let plaintext = self.key.open(&key, blob)?;
        let credentials: LoginCredentials = serde_json::from_slice(&plaintext)
            .map_err(|_| VaultError::Corrupt(key.clone()))?;
        check_owner(&key, credentials, grid).map(Some)
    }

    async fn remove(&self, grid: &GridInfo) -> Result<(), VaultError> {
        self.blobs.lock().await.remove(&credential_key(grid));
        Ok(())
    }
}
