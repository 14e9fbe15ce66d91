//! Tag normalization, consolidation and ancestor expansion.

use std::collections::HashSet;

use serde_yaml::Value;

use crate::rules::RuleSet;

/// Keeps string entries only, lower-cased, in order.
///
/// A bare string (`tags: lore`) counts as a one-element list.
pub fn normalize_tags(raw: &Value) -> Vec<String> {
    match raw {
        Value::Sequence(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_lowercase)
            .collect(),
        Value::String(tag) => vec![tag.to_lowercase()],
        _ => Vec::new(),
    }
}

/// Applies the consolidation map once and deduplicates.
///
/// Any tag that was itself replaced is dropped from the result, even when it
/// also appears verbatim elsewhere in the list.
pub fn consolidate_tags(tags: &[String], rules: &RuleSet) -> Vec<String> {
    let mut consolidated: Vec<String> = Vec::with_capacity(tags.len());
    let mut replaced: HashSet<&str> = HashSet::new();

    for tag in tags {
        let tag = tag.as_str();
        let replacement = rules.consolidate(tag).unwrap_or(tag);
        if !consolidated.iter().any(|t| t == replacement) {
            consolidated.push(replacement.to_string());
        }
        if replacement != tag {
            replaced.insert(tag);
        }
    }

    consolidated.retain(|t| !replaced.contains(t.as_str()));
    consolidated
}

/// Appends ancestor tags implied by subcategory paths.
///
/// The first path segment is the category folder; every later segment is an
/// ancestor label, except a final segment naming the tag itself. For `npc`
/// filed at `6_Lore/Characters`, `characters` is appended first, then the
/// category owning `6_Lore` (`lore`). The loop runs over the growing list, so
/// ancestors of appended tags are covered in the same pass. Returns whether
/// anything was added.
pub fn add_parent_tags(tags: &mut Vec<String>, rules: &RuleSet) -> bool {
    let mut present: HashSet<String> = tags.iter().cloned().collect();
    let mut added = false;

    let mut i = 0;
    while i < tags.len() {
        let Some(path) = rules.subcategory_path(&tags[i]) else {
            i += 1;
            continue;
        };

        let parts: Vec<&str> = path.split('/').collect();
        let mut implied: Vec<String> = parts
            .iter()
            .skip(1)
            .map(|p| p.to_lowercase())
            .collect();
        if implied.last() == Some(&tags[i]) {
            implied.pop();
        }
        if let Some(category) = parts.first().and_then(|top| rules.category_for_folder(top)) {
            implied.push(category.to_string());
        }

        for tag in implied {
            if present.insert(tag.clone()) {
                tags.push(tag);
                added = true;
            }
        }

        i += 1;
    }

    added
}
