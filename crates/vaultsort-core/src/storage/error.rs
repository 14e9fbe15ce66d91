use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during vault storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File already exists at destination: {}", path.display())]
    DestinationExists { path: PathBuf },

    #[error("Failed to walk vault: {0}")]
    Walk(#[from] ignore::Error),

    #[error("Not a file: {}", .0.display())]
    NotAFile(PathBuf),
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is a destination conflict, which callers treat as
    /// a skip rather than a failure.
    pub fn is_destination_conflict(&self) -> bool {
        matches!(self, StorageError::DestinationExists { .. })
    }
}
