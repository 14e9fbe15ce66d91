use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::classify::{classify, Classification};
use crate::config::{Config, ConfigError};
use crate::index::{IndexCollision, TagIndex};
use crate::note::{self, Note, NoteError};
use crate::rules::RuleSet;
use crate::storage::{StorageError, VaultStorage};
use crate::tags::normalize_tags;

/// Walks a vault and puts every note where its tags say it belongs.
///
/// Per note the organizer performs two independent steps: rewrite the tags
/// when they changed, then move the file when it sits in the wrong folder.
/// Either step is a no-op on a note that is already in order, so a run can be
/// repeated safely after a partial failure.
pub struct VaultOrganizer<'c, S: VaultStorage> {
    config: &'c Config,
    rules: RuleSet,
    storage: S,
}

impl<'c, S: VaultStorage> VaultOrganizer<'c, S> {
    /// Creates an organizer, compiling the configured rules once.
    pub fn new(config: &'c Config, storage: S) -> Self {
        Self {
            config,
            rules: RuleSet::compile(config),
            storage,
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Reads a note. Unreadable files and malformed frontmatter degrade to a
    /// note without frontmatter; the returned flag tells whether that happened.
    pub fn read_note(&self, path: &Path) -> (Note, bool) {
        let content = match self.storage.read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read note");
                return (Note::new(path, String::new(), None), true);
            }
        };

        match note::parse_frontmatter(&content) {
            Ok(frontmatter) => (Note::new(path, content, frontmatter), false),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "frontmatter parse error");
                (Note::new(path, content, None), true)
            }
        }
    }

    /// Classifies a single note without changing anything on disk.
    pub fn classify_note(&self, path: &Path) -> Result<Classification, OrganizeError> {
        if !self.storage.exists(path) {
            return Err(OrganizeError::NoteNotFound(path.to_path_buf()));
        }
        let (note, _) = self.read_note(path);
        Ok(classify(note.frontmatter.as_ref(), &self.rules))
    }

    /// Runs a full pass over the vault and rebuilds the tag indexes.
    pub fn organize(&self) -> Result<OrganizeReport, OrganizeError> {
        let root = &self.config.vault_root;

        for warning in self.config.validate()? {
            warn!("config: {}", warning);
        }

        if !self.storage.exists(root) {
            return Err(OrganizeError::VaultNotFound(root.clone()));
        }

        info!(vault = %root.display(), "scanning vault");

        let notes = self.storage.list_notes(
            root,
            &self.config.note_extension,
            Path::new(&self.config.index_dir),
        )?;

        let mut index = TagIndex::new();
        let mut report = OrganizeReport::default();

        for path in notes {
            self.process_note(&path, &mut index, &mut report)?;
        }

        let stats = index.rebuild(
            &self.storage,
            &self.config.index_path(),
            &self.config.note_extension,
        )?;
        report.indexes_written = stats.written;
        report.indexes_removed = stats.removed;
        report.index_collisions = stats.collisions;

        info!(
            scanned = report.scanned,
            retagged = report.retagged,
            moved = report.moved,
            conflicts = report.conflicts.len(),
            indexes = report.indexes_written,
            "vault organization complete"
        );

        Ok(report)
    }

    fn process_note(
        &self,
        path: &Path,
        index: &mut TagIndex,
        report: &mut OrganizeReport,
    ) -> Result<(), OrganizeError> {
        report.scanned += 1;

        let (note, degraded) = self.read_note(path);
        if degraded {
            report.unreadable += 1;
        }

        let classification = classify(note.frontmatter.as_ref(), &self.rules);

        let original: HashSet<String> = normalize_tags(note.raw_tags()).into_iter().collect();
        let updated: HashSet<String> = classification.tags.iter().cloned().collect();
        if original != updated {
            let rendered = note::render_with_tags(
                &note.content,
                note.frontmatter.as_ref(),
                &classification.tags,
            )?;
            self.storage.write(path, &rendered)?;
            debug!(path = %path.display(), tags = ?classification.tags, "updated tags");
            report.retagged += 1;
        }

        // Recorded before the move: a skipped move still indexes the new tags.
        index.record(path, &classification.tags);

        let target = normalize_folder(classification.target_folder());
        let current = self.current_folder(path);
        if current.to_lowercase() == target.to_lowercase() {
            return Ok(());
        }

        let dest_dir = self.config.vault_root.join(&target);
        match self.storage.move_file(path, &dest_dir) {
            Ok(dest) => {
                debug!(note = %note.title(), destination = %dest.display(), "moved note");
                report.moved += 1;
            }
            Err(StorageError::DestinationExists { path: dest }) => {
                info!(
                    source = %path.display(),
                    destination = %dest.display(),
                    "skipped moving due to existing file"
                );
                report.conflicts.push(MoveConflict {
                    source: path.to_path_buf(),
                    destination: dest,
                });
            }
            Err(e) => return Err(e.into()),
        }

        Ok(())
    }

    /// Folder of `path` relative to the vault root, `/`-joined.
    fn current_folder(&self, path: &Path) -> String {
        let parent = path.parent().unwrap_or(Path::new(""));
        let relative = parent
            .strip_prefix(&self.config.vault_root)
            .unwrap_or(parent);
        relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().to_string()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Normalizes a configured folder: no empty or `.` segments, `/` separators.
fn normalize_folder(folder: &str) -> String {
    folder
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// A move skipped because the destination already held a same-named file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveConflict {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Summary of one organizer run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizeReport {
    /// Note files visited.
    pub scanned: usize,
    /// Notes whose tags were rewritten.
    pub retagged: usize,
    /// Notes moved to a new folder.
    pub moved: usize,
    /// Notes that could not be read or whose frontmatter was malformed.
    pub unreadable: usize,
    /// Moves skipped because of an existing destination file.
    pub conflicts: Vec<MoveConflict>,
    pub indexes_written: usize,
    pub indexes_removed: usize,
    /// Tags left without an index because another tag took the file name.
    pub index_collisions: Vec<IndexCollision>,
}

impl OrganizeReport {
    /// Whether the run changed any note.
    pub fn changed_notes(&self) -> bool {
        self.retagged > 0 || self.moved > 0
    }
}

impl fmt::Display for OrganizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scanned:   {} notes", self.scanned)?;
        writeln!(f, "Retagged:  {}", self.retagged)?;
        writeln!(f, "Moved:     {}", self.moved)?;
        if self.unreadable > 0 {
            writeln!(f, "Unreadable: {}", self.unreadable)?;
        }
        writeln!(f, "Conflicts: {}", self.conflicts.len())?;
        for conflict in &self.conflicts {
            writeln!(
                f,
                "  {} -> {} (already exists)",
                conflict.source.display(),
                conflict.destination.display()
            )?;
        }
        write!(
            f,
            "Indexes:   {} written, {} removed",
            self.indexes_written, self.indexes_removed
        )?;
        for collision in &self.index_collisions {
            write!(
                f,
                "\n  #{} shares {} with #{} (not written)",
                collision.skipped, collision.file, collision.kept
            )?;
        }
        Ok(())
    }
}

/// Errors that can occur in VaultOrganizer operations.
#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Note error: {0}")]
    Note(#[from] NoteError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Vault root not found: {}", .0.display())]
    VaultNotFound(PathBuf),

    #[error("Note not found: {}", .0.display())]
    NoteNotFound(PathBuf),
}
