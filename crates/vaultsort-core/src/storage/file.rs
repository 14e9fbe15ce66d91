use std::fs;
use std::path::{Component, Path, PathBuf};

use ignore::WalkBuilder;

use super::error::StorageError;
use super::VaultStorage;

/// Local filesystem storage.
///
/// The note walk visits hidden files and directories unless
/// [`FileStorage::skip_hidden`] is set (to leave `.obsidian/` or `.trash/`
/// alone). Ignore files are never consulted: a vault is not a git checkout.
#[derive(Debug, Clone, Default)]
pub struct FileStorage {
    skip_hidden: bool,
}

impl FileStorage {
    /// Creates a new FileStorage that walks every entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip dot-files and dot-directories during the note walk.
    pub fn skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }
}

/// Keeps only the normal components of a relative path (`./a//b` -> `a/b`).
fn normal_components(path: &Path) -> PathBuf {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s),
            _ => None,
        })
        .collect()
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == extension)
        .unwrap_or(false)
}

impl VaultStorage for FileStorage {
    fn list_notes(
        &self,
        root: &Path,
        extension: &str,
        excluded_dir: &Path,
    ) -> Result<Vec<PathBuf>, StorageError> {
        let excluded = normal_components(excluded_dir);
        let walk_root = root.to_path_buf();

        let walker = WalkBuilder::new(root)
            .hidden(self.skip_hidden)
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                if !is_dir || entry.depth() == 0 || excluded.as_os_str().is_empty() {
                    return true;
                }
                let relative = entry.path().strip_prefix(&walk_root).unwrap_or(entry.path());
                !relative.ends_with(&excluded)
            })
            .build();

        let mut notes = Vec::new();
        for entry in walker {
            let entry = entry?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if is_file && has_extension(entry.path(), extension) {
                notes.push(entry.into_path());
            }
        }

        Ok(notes)
    }

    fn list_files(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>, StorageError> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let entries = fs::read_dir(dir).map_err(|e| StorageError::io(dir, e))?;

        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(dir, e))?;
            let path = entry.path();
            if path.is_file() && has_extension(&path, extension) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    fn read_to_string(&self, path: &Path) -> Result<String, StorageError> {
        fs::read_to_string(path).map_err(|e| StorageError::io(path, e))
    }

    fn write(&self, path: &Path, content: &str) -> Result<(), StorageError> {
        fs::write(path, content).map_err(|e| StorageError::io(path, e))
    }

    fn move_file(&self, path: &Path, dest_dir: &Path) -> Result<PathBuf, StorageError> {
        let file_name = path
            .file_name()
            .ok_or_else(|| StorageError::NotAFile(path.to_path_buf()))?;

        self.create_dir_all(dest_dir)?;

        let dest = dest_dir.join(file_name);
        if dest.exists() {
            return Err(StorageError::DestinationExists { path: dest });
        }

        fs::rename(path, &dest).map_err(|e| StorageError::io(path, e))?;

        Ok(dest)
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), StorageError> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(|e| StorageError::io(path, e))?;
        }
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<(), StorageError> {
        fs::remove_file(path).map_err(|e| StorageError::io(path, e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
