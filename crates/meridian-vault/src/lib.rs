//! Secure credential storage for Meridian.
//!
//! Login credentials are the only secret the client keeps on disk. This
//! crate makes sure the filesystem never sees them in the clear:
//!
//! 1. **What is stored**: [`LoginCredentials`], keyed per grid by
//!    [`credential_key`].
//! 2. **How it is sealed**: [`VaultKey`], AES-256-GCM with a fresh nonce
//!    per write.
//! 3. **Where it lives**: any [`CredentialStore`], such as [`EncryptedFileStore`]
//!    for real clients, [`MemoryStore`] for tests and guest sessions.
//!
//! # How it fits in the stack
//!
//! ```text
//! Session Layer (above)  ← remembers credentials on "remember me"
//!     ↕
//! Vault (this crate)     ← seals, persists, opens
//!     ↕
//! Protocol (below)       ← provides GridInfo
//! ```

#![allow(async_fn_in_trait)]

mod credentials;
mod error;
mod file;
mod fs;
mod key;
mod store;

pub use credentials::{LoginCredentials, credential_key};
pub use error::VaultError;
pub use file::EncryptedFileStore;
pub use key::VaultKey;
pub use store::{CredentialStore, MemoryStore};
