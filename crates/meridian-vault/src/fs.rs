//! Private-file helpers shared by the key loader and the file store.

use std::io;
use std::path::Path;

use tokio::io::AsyncWriteExt;

/// Atomically writes `data` to `path` with owner-only permissions.
///
/// The bytes go to a sibling temp file first and are renamed into place,
/// so a crash mid-write never leaves a half-written blob behind.
pub(crate) async fn write_private(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = path.with_extension("tmp");
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(&tmp).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await
}
