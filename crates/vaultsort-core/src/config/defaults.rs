//! Default values for vaultsort configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Vault Defaults
// ============================================================================

/// Vault root used when no configuration file sets one.
pub const DEFAULT_VAULT_ROOT: &str = ".";

/// Folder receiving notes that match no category.
pub const DEFAULT_FOLDER: &str = "0_Inbox";

/// Reserved directory (at the vault root) holding generated tag indexes.
pub const DEFAULT_INDEX_DIR: &str = "_indexes";

/// Extension (without leading dot) identifying note files.
pub const DEFAULT_NOTE_EXTENSION: &str = "md";

// ============================================================================
// Frontmatter
// ============================================================================

/// Delimiter line opening and closing a note's metadata block.
pub const FRONTMATTER_DELIMITER: &str = "---";

/// Metadata field holding a note's tags.
pub const TAGS_FIELD: &str = "tags";

// ============================================================================
// Index Files
// ============================================================================

/// Prefix prepended to the tag when naming an index file (`_lore.md`).
pub const INDEX_FILE_PREFIX: &str = "_";

// ============================================================================
// Config File Locations
// ============================================================================

/// Project-local config file names, searched in order. `config.yaml` is the
/// name older vault setups keep next to the vault.
pub const LOCAL_CONFIG_FILES: &[&str] = &[
    "vaultsort.toml",
    "vaultsort.yaml",
    "vaultsort.yml",
    "config.yaml",
];

/// Directory name under the user config dir.
pub const USER_CONFIG_DIR: &str = "vaultsort";

/// File name inside the user config directory.
pub const USER_CONFIG_FILE: &str = "config.toml";

// ============================================================================
// Environment Overrides
// ============================================================================

pub const ENV_VAULT_ROOT: &str = "VAULTSORT_VAULT_ROOT";
pub const ENV_DEFAULT_FOLDER: &str = "VAULTSORT_DEFAULT_FOLDER";
pub const ENV_INDEX_DIR: &str = "VAULTSORT_INDEX_DIR";
