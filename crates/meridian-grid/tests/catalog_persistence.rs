//! Integration tests for persisting the grid catalog across restarts.
//!
//! Each test loads a directory, mutates it, then loads a SECOND directory
//! from the same file, the way the client sees it after a restart.

use meridian_grid::{GridDirectory, GridError, GridInfo, default_grids};

fn dream() -> GridInfo {
    GridInfo::new("Dream Grid", "https://dream.example:8002/", "dream")
}

fn catalog_path(dir: &tempfile::TempDir) -> std::path::PathBuf {
    dir.path().join("meridian").join("grids.json")
}

#[tokio::test]
async fn test_load_missing_file_seeds_defaults_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let path = catalog_path(&dir);

    let grids = GridDirectory::load(&path).await.unwrap();

    assert_eq!(grids.list_grids(), default_grids().as_slice());
    assert!(!path.exists(), "nothing is written until the first mutation");
}

#[tokio::test]
async fn test_added_grid_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = catalog_path(&dir);

    let mut grids = GridDirectory::load(&path).await.unwrap();
    grids.add_grid(dream()).await.unwrap();

    let reloaded = GridDirectory::load(&path).await.unwrap();
    assert!(reloaded.contains(&dream()));
    assert_eq!(reloaded.len(), default_grids().len() + 1);
}

#[tokio::test]
async fn test_removed_default_does_not_reappear_after_reload() {
    // The key invariant: defaults are merged back in on load, but a
    // default the user deleted stays deleted.
    let dir = tempfile::tempdir().unwrap();
    let path = catalog_path(&dir);

    let mut grids = GridDirectory::load(&path).await.unwrap();
    let kitely = grids.find_by_id("kitely").cloned().unwrap();
    assert!(grids.remove_grid(&kitely).await.unwrap());

    let reloaded = GridDirectory::load(&path).await.unwrap();
    assert!(reloaded.find_by_id("kitely").is_none());
    assert_eq!(reloaded.len(), default_grids().len() - 1);
}

#[tokio::test]
async fn test_readded_default_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = catalog_path(&dir);

    let mut grids = GridDirectory::load(&path).await.unwrap();
    let kitely = grids.find_by_id("kitely").cloned().unwrap();
    grids.remove_grid(&kitely).await.unwrap();
    grids.add_grid(kitely.clone()).await.unwrap();

    let reloaded = GridDirectory::load(&path).await.unwrap();
    assert!(reloaded.contains(&kitely));
    // Exactly once, even though it's both stored and a default.
    let count = reloaded
        .list_grids()
        .iter()
        .filter(|g| **g == kitely)
        .count();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_reload_does_not_duplicate_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = catalog_path(&dir);

    let mut grids = GridDirectory::load(&path).await.unwrap();
    grids.add_grid(dream()).await.unwrap();

    // Load → save → load several times; the defaults must stay unique.
    for _ in 0..3 {
        let mut again = GridDirectory::load(&path).await.unwrap();
        assert!(!again.add_grid(dream()).await.unwrap());
    }

    let reloaded = GridDirectory::load(&path).await.unwrap();
    assert_eq!(reloaded.len(), default_grids().len() + 1);
}

#[tokio::test]
async fn test_stored_order_is_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let path = catalog_path(&dir);

    let mut grids = GridDirectory::load(&path).await.unwrap();
    grids.add_grid(dream()).await.unwrap();
    let before: Vec<_> = grids.list_grids().to_vec();

    let reloaded = GridDirectory::load(&path).await.unwrap();
    assert_eq!(reloaded.list_grids(), before.as_slice());
}

#[tokio::test]
async fn test_new_default_is_merged_into_old_catalog() {
    // A catalog written by an older build that didn't know every default
    // still picks the missing ones up.
    let dir = tempfile::tempdir().unwrap();
    let path = catalog_path(&dir);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        r#"{ "grids": [ { "name": "Dream Grid", "login_uri": "https://dream.example:8002/", "short_id": "dream" } ] }"#,
    )
    .unwrap();

    let grids = GridDirectory::load(&path).await.unwrap();

    assert_eq!(grids.list_grids()[0], dream());
    assert_eq!(grids.len(), default_grids().len() + 1);
}

#[tokio::test]
async fn test_load_corrupt_file_returns_serialize_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = catalog_path(&dir);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"{ not json").unwrap();

    let result = GridDirectory::load(&path).await;
    assert!(matches!(result, Err(GridError::Serialize(_))));
}
