//! Per-tag index files.
//!
//! Every run rebuilds the index directory from scratch: one `_<tag>.md` per
//! tag listing the notes that carry it, and stale index files removed.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::INDEX_FILE_PREFIX;
use crate::note::note_title;
use crate::storage::{StorageError, VaultStorage};

/// Tag to the note paths carrying it, accumulated over a run.
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    entries: BTreeMap<String, Vec<PathBuf>>,
}

/// What an index rebuild changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub written: usize,
    pub removed: usize,
    /// Tags whose index file name was already taken by another tag.
    pub collisions: Vec<IndexCollision>,
}

/// Two tags flattening to the same index file (`a/b` and `a-b`). The tag
/// sorting first keeps the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexCollision {
    pub file: String,
    pub kept: String,
    pub skipped: String,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `path` under each of `tags`.
    pub fn record(&mut self, path: &Path, tags: &[String]) {
        for tag in tags {
            let files = self.entries.entry(tag.to_lowercase()).or_default();
            if !files.iter().any(|f| f == path) {
                files.push(path.to_path_buf());
            }
        }
    }

    /// Notes recorded under a tag, in recording order.
    pub fn files(&self, tag: &str) -> Option<&[PathBuf]> {
        self.entries.get(tag).map(Vec::as_slice)
    }

    /// All tags, sorted.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrites the index directory.
    ///
    /// Index files for tags no longer present are deleted first; then one
    /// file per tag is (re)written. When two tags share a file name only the
    /// first is written and the clash is reported in [`IndexStats::collisions`].
    pub fn rebuild<S: VaultStorage>(
        &self,
        storage: &S,
        index_dir: &Path,
        extension: &str,
    ) -> Result<IndexStats, StorageError> {
        storage.create_dir_all(index_dir)?;

        let expected: BTreeSet<String> = self
            .entries
            .keys()
            .map(|tag| index_file_name(tag, extension))
            .collect();

        let mut stats = IndexStats::default();

        for existing in storage.list_files(index_dir, extension)? {
            let name = existing
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if !expected.contains(&name) {
                storage.remove_file(&existing)?;
                debug!(file = %name, "removed obsolete index");
                stats.removed += 1;
            }
        }

        let mut owners: HashMap<String, &str> = HashMap::new();
        for (tag, files) in &self.entries {
            let name = index_file_name(tag, extension);
            if let Some(kept) = owners.get(&name) {
                warn!(file = %name, kept = %kept, skipped = %tag, "tags share an index file");
                stats.collisions.push(IndexCollision {
                    file: name,
                    kept: kept.to_string(),
                    skipped: tag.clone(),
                });
                continue;
            }

            let path = index_dir.join(&name);
            storage.write(&path, &render_index(tag, files))?;
            owners.insert(name, tag);
            debug!(tag = %tag, notes = files.len(), "updated index");
            stats.written += 1;
        }

        Ok(stats)
    }
}

/// File name of a tag's index. Path separators inside nested tags
/// (`lore/npc`) are flattened so every index stays directly in the index dir.
pub fn index_file_name(tag: &str, extension: &str) -> String {
    let flat: String = tag
        .chars()
        .map(|c| if c == '/' || c == '\\' { '-' } else { c })
        .collect();
    format!("{}{}.{}", INDEX_FILE_PREFIX, flat, extension)
}

/// Renders an index: a title line and one wikilink per note, sorted by path.
pub fn render_index(tag: &str, files: &[PathBuf]) -> String {
    let mut sorted: Vec<&PathBuf> = files.iter().collect();
    sorted.sort_by_key(|p| p.to_string_lossy().to_string());

    let mut lines = vec![format!("# Index for #{}", tag)];
    lines.extend(sorted.into_iter().map(|p| format!("- [[{}]]", note_title(p))));
    lines.join("\n")
}
