//! Rule compiler.
//!
//! Flattens the category map and the subcategory tree into the lookup tables
//! the classifier consults for every note:
//!
//! - subcategory paths: `characters` -> `6_Lore/Characters`
//! - priority order: every label in pre-order, earlier wins ties
//! - folder to category: `6_lore` -> `lore`, used to re-derive category tags
//!
//! Compilation happens once per run; a [`RuleSet`] is immutable afterwards.

use std::collections::HashMap;

use crate::config::{CategoryRules, Config, SubcategoryRules};

/// Compiled, immutable classification rules.
#[derive(Debug, Clone)]
pub struct RuleSet {
    /// `(category tag, main folder)` in declaration order, tags lower-cased.
    categories: Vec<(String, String)>,
    /// Lower-cased main folder to lower-cased category tag. Last declaration wins.
    folder_to_category: HashMap<String, String>,
    subcategory_paths: HashMap<String, String>,
    priority_order: Vec<String>,
    priority_index: HashMap<String, usize>,
    consolidation: HashMap<String, String>,
    default_folder: String,
}

impl RuleSet {
    /// Compiles the rules held by a configuration.
    pub fn compile(config: &Config) -> Self {
        let categories: Vec<(String, String)> = config
            .category_rules
            .iter()
            .map(|(tag, folder)| (tag.to_lowercase(), folder.clone()))
            .collect();

        let folder_to_category = categories
            .iter()
            .map(|(tag, folder)| (folder.to_lowercase(), tag.clone()))
            .collect();

        let subcategory_paths =
            flatten_subcategory_paths(&config.subcategory_rules, &config.category_rules);

        let priority_order = flatten_subcategory_order(&config.subcategory_rules);
        let priority_index = priority_order
            .iter()
            .enumerate()
            .map(|(i, tag)| (tag.clone(), i))
            .collect();

        let consolidation = config
            .tag_consolidation
            .iter()
            .map(|(alias, canonical)| (alias.to_lowercase(), canonical.to_lowercase()))
            .collect();

        Self {
            categories,
            folder_to_category,
            subcategory_paths,
            priority_order,
            priority_index,
            consolidation,
            default_folder: config.default_folder.clone(),
        }
    }

    /// Folder path for a subcategory tag, if the tree mentions it.
    pub fn subcategory_path(&self, tag: &str) -> Option<&str> {
        self.subcategory_paths.get(tag).map(String::as_str)
    }

    /// Position of a tag in the priority order. Lower is stronger.
    pub fn priority(&self, tag: &str) -> Option<usize> {
        self.priority_index.get(tag).copied()
    }

    pub fn priority_order(&self) -> &[String] {
        &self.priority_order
    }

    /// Category tag owning a main folder (case-insensitive).
    pub fn category_for_folder(&self, folder: &str) -> Option<&str> {
        self.folder_to_category
            .get(&folder.to_lowercase())
            .map(String::as_str)
    }

    /// `(category tag, main folder)` pairs in declaration order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &str)> {
        self.categories
            .iter()
            .map(|(tag, folder)| (tag.as_str(), folder.as_str()))
    }

    /// Canonical replacement for an alias tag.
    pub fn consolidate(&self, tag: &str) -> Option<&str> {
        self.consolidation.get(tag).map(String::as_str)
    }

    pub fn default_folder(&self) -> &str {
        &self.default_folder
    }
}

/// Upper-cases the first character and lower-cases the rest.
pub fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn join_segment(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}/{}", parent, segment)
    }
}

/// Main folder a subcategory tree hangs from. Trees whose root has no
/// category rule hang from the capitalized root tag.
fn main_folder_for(category: &str, category_rules: &CategoryRules) -> String {
    let category = category.to_lowercase();
    category_rules
        .iter()
        .find(|(tag, _)| tag.to_lowercase() == category)
        .map(|(_, folder)| folder.clone())
        .unwrap_or_else(|| capitalize(&category))
}

/// Maps every label in the tree to its `/`-joined folder path.
///
/// Branch labels get a folder of their own (`6_Lore/Characters` for
/// `characters`); bare leaves are filed in the folder of the branch they sit
/// in (`6_Lore/Characters` for `npc`). A label appearing more than once keeps
/// the path of its last occurrence.
pub fn flatten_subcategory_paths(
    subcategory_rules: &SubcategoryRules,
    category_rules: &CategoryRules,
) -> HashMap<String, String> {
    let mut paths = HashMap::new();

    for (category, tree) in subcategory_rules.iter() {
        let main_folder = main_folder_for(category, category_rules);
        tree.walk(&mut Vec::new(), &mut |ancestors, label, leaf| {
            let parent = ancestors
                .iter()
                .fold(main_folder.clone(), |path, a| join_segment(&path, &capitalize(a)));
            let path = if leaf {
                parent
            } else {
                join_segment(&parent, &capitalize(label))
            };
            paths.insert(label.to_lowercase(), path);
        });
    }

    paths
}

/// Every label in pre-order across all trees, lower-cased, first occurrence only.
pub fn flatten_subcategory_order(subcategory_rules: &SubcategoryRules) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();

    for (_, tree) in subcategory_rules.iter() {
        tree.walk(&mut Vec::new(), &mut |_, label, _| {
            let key = label.to_lowercase();
            if !order.contains(&key) {
                order.push(key);
            }
        });
    }

    order
}
