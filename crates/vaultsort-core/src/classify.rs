//! Folder classification for a single note.

use std::cmp::Reverse;

use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::config::TAGS_FIELD;
use crate::rules::RuleSet;
use crate::tags::{add_parent_tags, consolidate_tags, normalize_tags};

/// Where a note belongs and which tags it should carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Folder of the first matching category, or the default folder.
    pub main_folder: String,
    /// Most specific subcategory folder under `main_folder`, if any.
    pub subfolder: Option<String>,
    /// Normalized, consolidated and expanded tags.
    pub tags: Vec<String>,
}

impl Classification {
    /// Folder the note should live in, relative to the vault root.
    pub fn target_folder(&self) -> &str {
        self.subfolder.as_deref().unwrap_or(&self.main_folder)
    }
}

/// Classifies a note from its parsed frontmatter. Missing frontmatter or a
/// missing `tags` field classifies as untagged.
pub fn classify(frontmatter: Option<&Mapping>, rules: &RuleSet) -> Classification {
    let raw = frontmatter
        .and_then(|fm| fm.get(TAGS_FIELD))
        .unwrap_or(&Value::Null);
    classify_tags(raw, rules)
}

/// Classifies a raw `tags` value.
pub fn classify_tags(raw: &Value, rules: &RuleSet) -> Classification {
    let normalized = normalize_tags(raw);
    let mut tags = consolidate_tags(&normalized, rules);
    add_parent_tags(&mut tags, rules);

    let main_folder = rules
        .categories()
        .find(|(category, _)| tags.iter().any(|t| t == category))
        .map(|(_, folder)| folder.to_string())
        .unwrap_or_else(|| rules.default_folder().to_string());

    let subfolder = best_subfolder(&tags, &main_folder, rules);

    Classification {
        main_folder,
        subfolder,
        tags,
    }
}

/// Deepest subcategory path nested under `main_folder`; ties go to the label
/// declared first in the rule tree, then to tag order.
fn best_subfolder(tags: &[String], main_folder: &str, rules: &RuleSet) -> Option<String> {
    tags.iter()
        .filter_map(|tag| {
            let path = rules.subcategory_path(tag)?;
            if !is_nested_under(path, main_folder) {
                return None;
            }
            let depth = path.matches('/').count();
            let priority = rules.priority(tag).unwrap_or(usize::MAX);
            Some((depth, priority, path))
        })
        .min_by_key(|&(depth, priority, _)| (Reverse(depth), priority))
        .map(|(_, _, path)| path.to_string())
}

fn is_nested_under(path: &str, folder: &str) -> bool {
    if folder.is_empty() {
        return true;
    }
    let path = path.to_lowercase();
    let folder = folder.trim_end_matches('/').to_lowercase();
    path.strip_prefix(&folder)
        .map(|rest| rest.starts_with('/'))
        .unwrap_or(false)
}
