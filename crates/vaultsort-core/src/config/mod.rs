//! Configuration management for vaultsort.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `vaultsort.toml` / `vaultsort.yaml` / `config.yaml` file
//! 3. User config `~/.config/vaultsort/config.toml`
//! 4. Built-in defaults (lowest priority)
//!
//! The loaded [`Config`] is immutable for the rest of the run and is handed by
//! reference to the rule compiler and the organizer.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

mod defaults;
mod rules;

pub use defaults::*;
pub use rules::{CategoryRules, OrderedMap, RuleNode, SubcategoryRules};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to parse YAML config file: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
///
/// Scalar fields come first so the TOML rendering stays valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory of the vault.
    pub vault_root: PathBuf,

    /// Folder (relative to the vault root) for notes matching no category.
    pub default_folder: String,

    /// Reserved directory for generated tag indexes. Excluded from the walk.
    pub index_dir: String,

    /// Extension (without leading dot) of note files.
    pub note_extension: String,

    /// Leave dot-files and dot-directories out of the walk.
    pub skip_hidden: bool,

    /// Category tag to main folder. Declaration order decides which category
    /// wins when a note carries several.
    pub category_rules: CategoryRules,

    /// Category tag to its nested subcategory labels.
    pub subcategory_rules: SubcategoryRules,

    /// Alias tag to canonical tag. Applied once, never chained.
    pub tag_consolidation: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vault_root: PathBuf::from(DEFAULT_VAULT_ROOT),
            default_folder: DEFAULT_FOLDER.to_string(),
            index_dir: DEFAULT_INDEX_DIR.to_string(),
            note_extension: DEFAULT_NOTE_EXTENSION.to_string(),
            skip_hidden: false,
            category_rules: CategoryRules::new(),
            subcategory_rules: SubcategoryRules::new(),
            tag_consolidation: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./vaultsort.toml`, `./vaultsort.yaml`, `./vaultsort.yml`, `./config.yaml`
    /// 2. `~/.config/vaultsort/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(local) = Self::find_local_config(Path::new(".")) {
            return Self::from_file(local);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE);
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// First project-local config file present in `dir`.
    pub fn find_local_config(dir: &Path) -> Option<PathBuf> {
        LOCAL_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Load configuration from a specific file.
    ///
    /// `.yaml` and `.yml` files are parsed as YAML, everything else as TOML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = if is_yaml(path) {
            Self::from_yaml_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(root) = std::env::var(ENV_VAULT_ROOT) {
            self.vault_root = PathBuf::from(root);
        }
        if let Ok(folder) = std::env::var(ENV_DEFAULT_FOLDER) {
            self.default_folder = folder;
        }
        if let Ok(dir) = std::env::var(ENV_INDEX_DIR) {
            self.index_dir = dir;
        }
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> Result<String, ConfigError> {
        let config = Config::default();
        Ok(toml::to_string_pretty(&config)?)
    }

    /// Full path to the index directory.
    pub fn index_path(&self) -> PathBuf {
        self.vault_root.join(&self.index_dir)
    }

    /// Checks the configuration for hard errors and returns soft warnings.
    ///
    /// Warnings describe rules that load fine but probably do not do what
    /// the author meant.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        if self.vault_root.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("vault_root must not be empty".to_string()));
        }
        if self.index_dir.trim().is_empty() {
            return Err(ConfigError::Invalid("index_dir must not be empty".to_string()));
        }
        let index_dir = Path::new(&self.index_dir);
        if index_dir
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(ConfigError::Invalid(format!(
                "index_dir '{}' must be a relative path inside the vault",
                self.index_dir
            )));
        }
        if !index_dir.components().any(|c| matches!(c, Component::Normal(_))) {
            return Err(ConfigError::Invalid(
                "index_dir must name a directory below the vault root".to_string(),
            ));
        }
        if self.note_extension.trim().is_empty() {
            return Err(ConfigError::Invalid("note_extension must not be empty".to_string()));
        }

        let mut warnings = Vec::new();

        let category_keys: Vec<String> =
            self.category_rules.keys().map(|k| k.to_lowercase()).collect();
        for category in self.subcategory_rules.keys() {
            if !category_keys.contains(&category.to_lowercase()) {
                warnings.push(ConfigWarning::UnmappedCategory(category.to_string()));
            }
        }

        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut order = Vec::new();
        for (_, tree) in self.subcategory_rules.iter() {
            tree.walk(&mut Vec::new(), &mut |_, label, _| {
                let key = label.to_lowercase();
                let count = seen.entry(key.clone()).or_insert(0);
                *count += 1;
                if *count == 2 {
                    order.push(key);
                }
            });
        }
        for label in order {
            let occurrences = seen[&label];
            warnings.push(ConfigWarning::DuplicateLabel { label, occurrences });
        }

        let aliases: BTreeMap<String, String> = self
            .tag_consolidation
            .iter()
            .map(|(k, v)| (k.to_lowercase(), v.to_lowercase()))
            .collect();
        for (alias, canonical) in &aliases {
            if alias != canonical && aliases.contains_key(canonical) {
                warnings.push(ConfigWarning::ChainedConsolidation {
                    alias: alias.clone(),
                    canonical: canonical.clone(),
                });
            }
        }

        Ok(warnings)
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// A configuration smell reported by [`Config::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A label appears more than once in the subcategory tree. Only the last
    /// occurrence determines its folder.
    DuplicateLabel { label: String, occurrences: usize },

    /// A subcategory tree root has no entry in `category_rules`; its folder
    /// falls back to the capitalized tag.
    UnmappedCategory(String),

    /// A consolidation target is itself an alias. Substitution is single-step,
    /// so notes converge only over several runs.
    ChainedConsolidation { alias: String, canonical: String },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::DuplicateLabel { label, occurrences } => write!(
                f,
                "subcategory label '{}' appears {} times; the last occurrence decides its folder",
                label, occurrences
            ),
            ConfigWarning::UnmappedCategory(category) => write!(
                f,
                "subcategory root '{}' has no category rule; using folder '{}'",
                category,
                crate::rules::capitalize(category)
            ),
            ConfigWarning::ChainedConsolidation { alias, canonical } => write!(
                f,
                "consolidation '{}' -> '{}' targets another alias; chains are not followed",
                alias, canonical
            ),
        }
    }
}
