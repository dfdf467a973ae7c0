//! Error types for the grid directory.

/// Errors that can occur while editing or persisting the grid catalog.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Reading or writing the catalog file failed.
    #[error("grid catalog I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog file couldn't be parsed or written as JSON.
    #[error("grid catalog is not valid JSON: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The grid being added is unusable.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),
}
