//! The grid directory: in-memory catalog with optional JSON persistence.

use std::path::{Path, PathBuf};

use meridian_protocol::GridInfo;
use serde::{Deserialize, Serialize};

use crate::{GridError, default_grids};

/// On-disk shape of the catalog.
///
/// `removed_defaults` holds the login URIs of built-in grids the user
/// deleted. Without it, merging defaults back in on load would resurrect
/// every grid the user ever removed.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    grids: Vec<GridInfo>,
    #[serde(default)]
    removed_defaults: Vec<String>,
}

/// The ordered list of grids the user can log into.
///
/// Uniqueness is by login URI (see [`GridInfo`]'s `PartialEq`). Every
/// mutation is written through to disk when the directory was created
/// with [`load`](Self::load).
#[derive(Debug)]
pub struct GridDirectory {
    grids: Vec<GridInfo>,
    removed_defaults: Vec<String>,
    path: Option<PathBuf>,
}

impl GridDirectory {
    /// A directory seeded with [`default_grids`] that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            grids: default_grids(),
            removed_defaults: Vec::new(),
            path: None,
        }
    }

    /// Loads the catalog stored at `path`, merging in the defaults.
    ///
    /// A missing file means first use: the directory starts with just the
    /// defaults, and the file is created on the first mutation.
    ///
    /// # Errors
    /// [`GridError::Io`] if the file exists but can't be read, and
    /// [`GridError::Serialize`] if it isn't a valid catalog.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, GridError> {
        let path = path.into();
        let file = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<CatalogFile>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no grid catalog yet, using defaults");
                CatalogFile::default()
            }
            Err(e) => return Err(GridError::Io(e)),
        };

        let directory = Self::merge(file, Some(path));
        tracing::info!(grids = directory.grids.len(), "grid catalog loaded");
        Ok(directory)
    }

    /// Stored grids first (deduplicated, in stored order), then any default
    /// that is neither stored nor tombstoned. The first grid to claim a
    /// short id keeps it; later claimants are dropped.
    fn merge(file: CatalogFile, path: Option<PathBuf>) -> Self {
        let mut grids: Vec<GridInfo> = Vec::with_capacity(file.grids.len());
        for grid in file.grids {
            if grids.contains(&grid) {
                continue;
            }
            if id_taken(&grids, &grid) {
                tracing::warn!(grid = %grid, short_id = %grid.short_id, "dropping stored grid with duplicate short id");
                continue;
            }
            grids.push(grid);
        }

        for default in default_grids() {
            let tombstoned = file.removed_defaults.contains(&default.login_uri);
            if !tombstoned && !grids.contains(&default) && !id_taken(&grids, &default) {
                grids.push(default);
            }
        }

        Self {
            grids,
            removed_defaults: file.removed_defaults,
            path,
        }
    }

    /// All known grids, in display order.
    pub fn list_grids(&self) -> &[GridInfo] {
        &self.grids
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// Looks a grid up by its short identifier.
    pub fn find_by_id(&self, short_id: &str) -> Option<&GridInfo> {
        self.grids.iter().find(|g| g.short_id == short_id)
    }

    /// Looks a grid up by its login URI.
    pub fn find_by_uri(&self, login_uri: &str) -> Option<&GridInfo> {
        self.grids.iter().find(|g| g.login_uri == login_uri)
    }

    pub fn contains(&self, grid: &GridInfo) -> bool {
        self.grids.contains(grid)
    }

    /// The file this directory writes through to, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Adds a grid to the end of the catalog.
    ///
    /// Returns `Ok(false)` without touching anything if a grid with the
    /// same login URI is already listed. Re-adding a removed default
    /// clears its tombstone.
    ///
    /// # Errors
    /// - [`GridError::InvalidGrid`] for an empty name, a non-HTTP URI, or
    ///   a short id already used by a grid with a different URI.
    /// - I/O or JSON errors from persisting; the in-memory catalog is
    ///   rolled back so it keeps matching the file.
    pub async fn add_grid(&mut self, grid: GridInfo) -> Result<bool, GridError> {
        validate(&grid)?;
        if self.grids.contains(&grid) {
            tracing::debug!(grid = %grid, "grid already listed");
            return Ok(false);
        }
        if id_taken(&self.grids, &grid) {
            return Err(GridError::InvalidGrid(format!(
                "short id {:?} is already used by another grid",
                grid.short_id
            )));
        }

        let tombstone = self
            .removed_defaults
            .iter()
            .position(|uri| *uri == grid.login_uri)
            .map(|i| self.removed_defaults.remove(i));
        self.grids.push(grid);

        if let Err(e) = self.save().await {
            let grid = self.grids.pop();
            if let Some(uri) = tombstone {
                self.removed_defaults.push(uri);
            }
            tracing::warn!(grid = ?grid.map(|g| g.short_id), error = %e, "failed to persist added grid");
            return Err(e);
        }

        if let Some(grid) = self.grids.last() {
            tracing::info!(grid = %grid, "grid added");
        }
        Ok(true)
    }

    /// Removes the grid with the same login URI as `grid`.
    ///
    /// Returns `Ok(false)` if no such grid is listed (a no-op).
    pub async fn remove_grid(&mut self, grid: &GridInfo) -> Result<bool, GridError> {
        let Some(index) = self.grids.iter().position(|g| g == grid) else {
            return Ok(false);
        };

        let removed = self.grids.remove(index);
        let is_default = default_grids().contains(&removed);
        if is_default {
            self.removed_defaults.push(removed.login_uri.clone());
        }

        if let Err(e) = self.save().await {
            if is_default {
                self.removed_defaults.pop();
            }
            self.grids.insert(index, removed);
            tracing::warn!(grid = %grid, error = %e, "failed to persist grid removal");
            return Err(e);
        }

        tracing::info!(grid = %removed, "grid removed");
        Ok(true)
    }

    /// Writes the catalog through to disk (atomically) if persistent.
    async fn save(&self) -> Result<(), GridError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let file = CatalogFile {
            grids: self.grids.clone(),
            removed_defaults: self.removed_defaults.clone(),
        };
        let json = serde_json::to_vec_pretty(&file)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

impl Default for GridDirectory {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// Default catalog location, e.g. `~/.config/meridian/grids.json`.
pub fn default_catalog_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("meridian").join("grids.json"))
}

/// Whether another grid in `grids` already answers to `grid`'s short id.
/// Blank ids never conflict.
fn id_taken(grids: &[GridInfo], grid: &GridInfo) -> bool {
    !grid.short_id.trim().is_empty() && grids.iter().any(|g| g.short_id == grid.short_id)
}

fn validate(grid: &GridInfo) -> Result<(), GridError> {
    if grid.name.trim().is_empty() {
        return Err(GridError::InvalidGrid("grid name is empty".into()));
    }
    let uri = grid.login_uri.trim();
    if !(uri.starts_with("http://") || uri.starts_with("https://")) {
        return Err(GridError::InvalidGrid(format!(
            "login URI must be http or https: {:?}",
            grid.login_uri
        )));
    }
    Ok(())
}
