//! The credential record and its storage key.

use std::fmt;

use meridian_protocol::GridInfo;
use serde::{Deserialize, Serialize};

use crate::VaultError;

/// A username/password pair for one grid.
///
/// `Debug` is implemented by hand so the secret can never leak into a
/// log line through `{:?}`. There is deliberately no `Display`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    /// Account name, e.g. `"Ada Lovelace"` or `"ada.lovelace"`.
    pub identifier: String,
    /// Password or token.
    pub secret: String,
    /// Short id of the grid these credentials belong to.
    pub grid: String,
}

impl LoginCredentials {
    pub fn new(
        identifier: impl Into<String>,
        secret: impl Into<String>,
        grid: &GridInfo,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
            grid: grid.short_id.clone(),
        }
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .field("grid", &self.grid)
            .finish()
    }
}

/// Derives the storage key for a grid's credentials.
///
/// The key depends only on the grid's short id, so storing twice for the
/// same grid overwrites instead of duplicating. Lowercase ASCII letters,
/// digits and `-` pass through; every other byte becomes `_xx` (lowercase
/// hex). The result is safe as a file name and distinct ids never share a
/// key, so `my.grid`, `my_grid` and `MY.GRID` each get their own slot. A
/// grid with a blank short id is keyed on its login URI under a separate
/// `uri-` prefix.
pub fn credential_key(grid: &GridInfo) -> String {
    if grid.short_id.trim().is_empty() {
        format!("uri-{}", escape_key(&grid.login_uri))
    } else {
        format!("grid-{}", escape_key(&grid.short_id))
    }
}

fn escape_key(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for byte in source.bytes() {
        match byte {
            b'a'..=b'z' | b'0'..=b'9' | b'-' => out.push(char::from(byte)),
            _ => out.push_str(&format!("_{byte:02x}")),
        }
    }
    out
}

/// Checks that a decrypted record belongs to `grid`.
pub(crate) fn check_owner(
    key: &str,
    credentials: LoginCredentials,
    grid: &GridInfo,
) -> Result<LoginCredentials, VaultError> {
    if credentials.grid != grid.short_id {
        return Err(VaultError::WrongGrid {
            key: key.to_string(),
            found: credentials.grid,
        });
    }
    Ok(credentials)
}
