//! Encrypted on-disk credential store.

use std::path::{Path, PathBuf};

use meridian_protocol::GridInfo;

use crate::{CredentialStore, LoginCredentials, VaultError, VaultKey, credential_key};
use crate::credentials::check_owner;

/// File extension for sealed credential blobs.
const BLOB_EXTENSION: &str = "cred";

/// A [`CredentialStore`] that keeps one sealed blob per grid in a
/// directory.
///
/// ```text
/// <dir>/
///   grid-osgrid.cred     nonce || AES-256-GCM(ciphertext)
///   grid-kitely.cred
/// ```
///
/// File names come from [`credential_key`], so they reveal which grids
/// have saved logins but nothing about the accounts themselves.
pub struct EncryptedFileStore {
    dir: PathBuf,
    key: VaultKey,
}

impl EncryptedFileStore {
    /// Creates a store rooted at `dir`. The directory is created lazily on
    /// the first write.
    pub fn new(dir: impl Into<PathBuf>, key: VaultKey) -> Self {
        Self {
            dir: dir.into(),
            key,
        }
    }

    /// The platform data directory for credentials, e.g.
    /// `~/.local/share/meridian/credentials` on Linux.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("meridian").join("credentials"))
    }

    /// Where the blob for `grid` lives.
    pub fn path_for(&self, grid: &GridInfo) -> PathBuf {
        self.dir
            .join(credential_key(grid))
            .with_extension(BLOB_EXTENSION)
    }

    /// The directory this store writes to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl CredentialStore for EncryptedFileStore {
    async fn store(
        &self,
        credentials: &LoginCredentials,
        grid: &GridInfo,
    ) -> Result<(), VaultError> {
        let key = credential_key(grid);
        let rejected = |reason: String| VaultError::Storage {
            key: key.clone(),
            reason,
        };

        let plaintext =
            serde_json::to_vec(credentials).map_err(|e| rejected(e.to_string()))?;
        let blob = self.key.seal(&key, &plaintext)?;

        crate::fs::write_private(&self.path_for(grid), &blob)
            .await
            .map_err(|e| rejected(e.to_string()))?;

        tracing::debug!(grid = %grid.short_id, "stored credentials");
        Ok(())
    }

    async fn retrieve(
        &self,
        grid: &GridInfo,
    ) -> Result<Option<LoginCredentials>, VaultError> {
        let key = credential_key(grid);
        let blob = match tokio::fs::read(self.path_for(grid)).await {
            Ok(blob) => blob,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(None);
            }
            Err(e) => return Err(VaultError::Io(e)),
        };

        let plaintext = self.key.open(&key, &blob)?;
        let credentials: LoginCredentials = serde_json::from_slice(&plaintext)
            .map_err(|_| VaultError::Corrupt(key.clone()))?;
        check_owner(&key, credentials, grid).map(Some)
    }

    async fn remove(&self, grid: &GridInfo) -> Result<(), VaultError> {
        match tokio::fs::remove_file(self.path_for(grid)).await {
            Ok(()) => {
                tracing::debug!(grid = %grid.short_id, "removed credentials");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VaultError::Io(e)),
        }
    }
}
