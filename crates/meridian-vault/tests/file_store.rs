//! Integration tests for the encrypted file store.
//!
//! Each test gets its own temp directory, so they can run in parallel
//! without stepping on each other's blobs.

use meridian_protocol::GridInfo;
use meridian_vault::{
    CredentialStore, EncryptedFileStore, LoginCredentials, VaultError, VaultKey,
};

// =========================================================================
// Helpers
// =========================================================================

fn osgrid() -> GridInfo {
    GridInfo::new("OSGrid", "http://login.osgrid.org/", "osgrid")
}

fn kitely() -> GridInfo {
    GridInfo::new("Kitely", "https://grid.kitely.com:8002/", "kitely")
}

fn store_in(dir: &tempfile::TempDir, key: VaultKey) -> EncryptedFileStore {
    EncryptedFileStore::new(dir.path().join("credentials"), key)
}

// =========================================================================
// store / retrieve
// =========================================================================

#[tokio::test]
async fn test_store_then_retrieve_returns_same_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir, VaultKey::generate());
    let creds = LoginCredentials::new("Ada Lovelace", "analytical-engine", &osgrid());

    store.store(&creds, &osgrid()).await.unwrap();

    let loaded = store.retrieve(&osgrid()).await.unwrap();
    assert_eq!(loaded, Some(creds));
}

#[tokio::test]
async fn test_stored_file_does_not_contain_secret_or_identifier() {
    // The filesystem is the "general persistence layer", so it must only
    // ever see ciphertext.
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir, VaultKey::generate());
    let creds = LoginCredentials::new("Ada Lovelace", "analytical-engine", &osgrid());

    store.store(&creds, &osgrid()).await.unwrap();

    let raw = std::fs::read(store.path_for(&osgrid())).unwrap();
    let text = String::from_utf8_lossy(&raw);
    assert!(!text.contains("analytical-engine"));
    assert!(!text.contains("Ada Lovelace"));
}

#[tokio::test]
async fn test_store_same_grid_twice_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir, VaultKey::generate());

    store
        .store(&LoginCredentials::new("ada", "first", &osgrid()), &osgrid())
        .await
        .unwrap();
    store
        .store(&LoginCredentials::new("ada", "second", &osgrid()), &osgrid())
        .await
        .unwrap();

    let files: Vec<_> = std::fs::read_dir(store.dir()).unwrap().collect();
    assert_eq!(files.len(), 1, "one blob per grid");
    let loaded = store.retrieve(&osgrid()).await.unwrap().unwrap();
    assert_eq!(loaded.secret, "second");
}

#[tokio::test]
async fn test_retrieve_unknown_grid_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir, VaultKey::generate());
    assert!(store.retrieve(&kitely()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_retrieve_survives_new_store_instance_with_same_key() {
    let dir = tempfile::tempdir().unwrap();
    let key = VaultKey::generate();
    let creds = LoginCredentials::new("ada", "pw", &osgrid());

    store_in(&dir, key.clone()).store(&creds, &osgrid()).await.unwrap();

    let reopened = store_in(&dir, key);
    assert_eq!(reopened.retrieve(&osgrid()).await.unwrap(), Some(creds));
}

#[tokio::test]
async fn test_retrieve_with_different_key_returns_crypto_error() {
    let dir = tempfile::tempdir().unwrap();
    let creds = LoginCredentials::new("ada", "pw", &osgrid());
    store_in(&dir, VaultKey::generate())
        .store(&creds, &osgrid())
        .await
        .unwrap();

    let result = store_in(&dir, VaultKey::generate()).retrieve(&osgrid()).await;
    assert!(matches!(result, Err(VaultError::Crypto(_))));
}

#[tokio::test]
async fn test_blob_moved_to_other_grid_fails_to_open() {
    // Copying OSGrid's blob into Kitely's slot must not yield OSGrid's
    // password when logging into Kitely.
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir, VaultKey::generate());
    store
        .store(&LoginCredentials::new("ada", "pw", &osgrid()), &osgrid())
        .await
        .unwrap();

    std::fs::copy(store.path_for(&osgrid()), store.path_for(&kitely())).unwrap();

    let result = store.retrieve(&kitely()).await;
    assert!(matches!(result, Err(VaultError::Crypto(_))));
}

#[tokio::test]
async fn test_retrieve_similar_short_id_does_not_return_other_grids_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir, VaultKey::generate());
    let dotted = GridInfo::new("Grid A", "https://a.example/", "my.grid");
    let underscored = GridInfo::new("Grid B", "https://b.example/", "my_grid");
    store
        .store(&LoginCredentials::new("alice", "a-secret", &dotted), &dotted)
        .await
        .unwrap();

    assert_ne!(store.path_for(&dotted), store.path_for(&underscored));
    assert!(store.retrieve(&underscored).await.unwrap().is_none());

    store
        .store(&LoginCredentials::new("bob", "b-secret", &underscored), &underscored)
        .await
        .unwrap();
    let a = store.retrieve(&dotted).await.unwrap().unwrap();
    let b = store.retrieve(&underscored).await.unwrap().unwrap();
    assert_eq!((a.identifier.as_str(), a.secret.as_str()), ("alice", "a-secret"));
    assert_eq!((b.identifier.as_str(), b.secret.as_str()), ("bob", "b-secret"));
}

#[tokio::test]
async fn test_retrieve_record_saved_for_other_grid_returns_wrong_grid() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir, VaultKey::generate());
    store
        .store(&LoginCredentials::new("ada", "pw", &osgrid()), &kitely())
        .await
        .unwrap();

    let result = store.retrieve(&kitely()).await;

    assert!(
        matches!(result, Err(VaultError::WrongGrid { ref found, .. }) if found == "osgrid"),
        "expected WrongGrid, got {result:?}"
    );
}

// =========================================================================
// remove
// =========================================================================

#[tokio::test]
async fn test_remove_deletes_blob() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir, VaultKey::generate());
    store
        .store(&LoginCredentials::new("ada", "pw", &osgrid()), &osgrid())
        .await
        .unwrap();

    store.remove(&osgrid()).await.unwrap();

    assert!(!store.path_for(&osgrid()).exists());
    assert!(store.retrieve(&osgrid()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_remove_missing_grid_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir, VaultKey::generate());
    store.remove(&kitely()).await.expect("removing nothing is fine");
}

// =========================================================================
// Failure signalling
// =========================================================================

#[cfg(unix)]
#[tokio::test]
async fn test_store_into_read_only_dir_returns_storage_error() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let cred_dir = dir.path().join("credentials");
    std::fs::create_dir(&cred_dir).unwrap();
    std::fs::set_permissions(&cred_dir, std::fs::Permissions::from_mode(0o500)).unwrap();

    // Root ignores directory permissions; nothing to assert in that case.
    if std::fs::write(cred_dir.join("canary"), b"x").is_ok() {
        return;
    }

    let store = EncryptedFileStore::new(&cred_dir, VaultKey::generate());
    let result = store
        .store(&LoginCredentials::new("ada", "pw", &osgrid()), &osgrid())
        .await;

    assert!(
        matches!(result, Err(VaultError::Storage { ref key, .. }) if key == "grid-osgrid"),
        "expected Storage error, got {result:?}"
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_blob_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir, VaultKey::generate());
    store
        .store(&LoginCredentials::new("ada", "pw", &osgrid()), &osgrid())
        .await
        .unwrap();

    let mode = std::fs::metadata(store.path_for(&osgrid()))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}
