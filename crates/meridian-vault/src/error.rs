//! Error types for the vault.

/// Errors that can occur while storing or reading credentials.
///
/// A vault never swallows a failure: if a secret can't be written or
/// read back intact, the caller hears about it.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// The backing store refused the write (disk full, permission
    /// denied, read-only filesystem, ...).
    #[error("credential storage rejected write for {key}: {reason}")]
    Storage { key: String, reason: String },

    /// Reading or removing a stored blob failed.
    #[error("credential store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The blob failed authentication. Either the vault key changed or
    /// the file was tampered with.
    #[error("credential blob {0} could not be decrypted")]
    Crypto(String),

    /// The blob is structurally broken (truncated, or decrypts to
    /// something that isn't a credential).
    #[error("credential blob {0} is corrupt")]
    Corrupt(String),

    /// The blob opened, but the record inside was saved for another grid.
    #[error("credential blob {key} belongs to grid {found:?}")]
    WrongGrid { key: String, found: String },
}
