mod error;
mod file;

pub use error::StorageError;
pub use file::FileStorage;

use std::path::{Path, PathBuf};

/// Trait for vault storage backends.
///
/// The organizer performs every filesystem access through this trait, so the
/// classification pass never touches `std::fs` directly.
pub trait VaultStorage {
    /// Recursively lists note files (by extension) under `root`, skipping any
    /// directory whose path relative to `root` ends with `excluded_dir`. A
    /// single-name `excluded_dir` is therefore skipped at any depth.
    fn list_notes(
        &self,
        root: &Path,
        extension: &str,
        excluded_dir: &Path,
    ) -> Result<Vec<PathBuf>, StorageError>;

    /// Lists files (by extension) directly inside `dir`. Missing directories
    /// list as empty.
    fn list_files(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>, StorageError>;

    /// Reads a file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> Result<String, StorageError>;

    /// Overwrites a file with `content`.
    fn write(&self, path: &Path, content: &str) -> Result<(), StorageError>;

    /// Moves a file into `dest_dir`, keeping its file name and creating the
    /// directory if needed. Fails with [`StorageError::DestinationExists`]
    /// when a file of the same name is already there.
    fn move_file(&self, path: &Path, dest_dir: &Path) -> Result<PathBuf, StorageError>;

    /// Creates a directory and its parents if absent.
    fn create_dir_all(&self, path: &Path) -> Result<(), StorageError>;

    /// Removes a file.
    fn remove_file(&self, path: &Path) -> Result<(), StorageError>;

    /// Whether a path exists.
    fn exists(&self, path: &Path) -> bool;
}
