//! Tag-driven organization of Obsidian vaults.
//!
//! A run compiles the configured rules once, then for every note: normalizes
//! and consolidates its tags, adds implied ancestor tags, picks a destination
//! folder, rewrites the frontmatter if the tags changed and moves the file if
//! it is in the wrong place. Per-tag index files are rebuilt at the end.

pub mod classify;
pub mod config;
pub mod index;
pub mod note;
pub mod organizer;
pub mod rules;
pub mod storage;
pub mod tags;

pub use classify::{classify, classify_tags, Classification};
pub use config::{Config, ConfigError, ConfigWarning, RuleNode};
pub use index::{IndexCollision, IndexStats, TagIndex};
pub use note::{Note, NoteError};
pub use organizer::{MoveConflict, OrganizeError, OrganizeReport, VaultOrganizer};
pub use rules::RuleSet;
pub use storage::{FileStorage, StorageError, VaultStorage};
