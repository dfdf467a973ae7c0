//! The vault key and the seal/open primitives built on it.
//!
//! Blobs are laid out as `nonce (12 bytes) || ciphertext+tag`. The storage
//! key is passed as associated data, so a blob copied from one grid's slot
//! into another's fails to open instead of silently logging into the
//! wrong account.

use std::fmt;
use std::path::{Path, PathBuf};

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::Rng;

use crate::VaultError;

/// Length of an AES-256 key.
pub(crate) const KEY_LEN: usize = 32;

/// Length of an AES-GCM nonce (96 bits).
const NONCE_LEN: usize = 12;

/// A 256-bit symmetric key that seals stored credentials.
///
/// Like [`LoginCredentials`](crate::LoginCredentials), its `Debug` output
/// hides the actual bytes.
#[derive(Clone)]
pub struct VaultKey {
    bytes: [u8; KEY_LEN],
}

impl VaultKey {
    /// Generates a fresh random key.
    pub fn generate() -> Self {
        Self {
            bytes: rand::rng().random(),
        }
    }

    /// Wraps existing key material.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// The platform location for the key file, e.g.
    /// `~/.local/share/meridian/vault.key` on Linux. It sits beside, not
    /// inside, the default credential directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("meridian").join("vault.key"))
    }

    /// Loads the key stored at `path`, creating one if the file doesn't
    /// exist yet.
    ///
    /// New key files are written with owner-only permissions on Unix.
    /// Keep the key file somewhere other than the credential directory.
    ///
    /// # Errors
    /// - [`VaultError::Corrupt`] if the file exists but isn't exactly
    ///   32 bytes.
    /// - [`VaultError::Storage`] if a new key can't be written.
    pub async fn load_or_create(path: &Path) -> Result<Self, VaultError> {
        match tokio::fs::read(path).await {
            Ok(data) => {
                let bytes: [u8; KEY_LEN] = data
                    .as_slice()
                    .try_into()
                    .map_err(|_| VaultError::Corrupt(path.display().to_string()))?;
                tracing::debug!(path = %path.display(), "loaded vault key");
                Ok(Self { bytes })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let key = Self::generate();
                crate::fs::write_private(path, &key.bytes).await.map_err(|e| {
                    VaultError::Storage {
                        key: path.display().to_string(),
                        reason: e.to_string(),
                    }
                })?;
                tracing::info!(path = %path.display(), "created new vault key");
                Ok(key)
            }
            Err(e) => Err(VaultError::Io(e)),
        }
    }

    /// Encrypts `plaintext`, binding it to `label`.
    pub(crate) fn seal(
        &self,
        label: &str,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, VaultError> {
        let nonce_bytes: [u8; NONCE_LEN] = rand::rng().random();
        let ciphertext = self
            .cipher()
            .encrypt(
                Nonce::from_slice(&nonce_bytes),
                Payload {
                    msg: plaintext,
                    aad: label.as_bytes(),
                },
            )
            .map_err(|_| VaultError::Crypto(label.to_string()))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }

    /// Decrypts a blob produced by [`seal`](Self::seal) with the same label.
    pub(crate) fn open(
        &self,
        label: &str,
        blob: &[u8],
    ) -> Result<Vec<u8>, VaultError> {
        if blob.len() <= NONCE_LEN {
            return Err(VaultError::Corrupt(label.to_string()));
        }
        let (nonce, ciphertext) = blob.split_at(NONCE_LEN);
        self.cipher()
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: label.as_bytes(),
                },
            )
            .map_err(|_| VaultError::Crypto(label.to_string()))
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.bytes))
    }
}

impl fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VaultKey(<redacted>)")
    }
}
