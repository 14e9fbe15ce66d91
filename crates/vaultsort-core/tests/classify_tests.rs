use serde_yaml::{Mapping, Value};
use vaultsort_core::{classify, classify_tags, Config, RuleSet};

const CAMPAIGN_RULES: &str = r#"
default_folder: 0_Inbox
category_rules:
  session: 2_Sessions
  lore: 6_Lore
  rules: 5_Rules
subcategory_rules:
  lore:
    characters:
      - npc
      - factions:
          - guild
    locations:
      - city
      - dungeon
  rules:
    - combat
tag_consolidation:
  old-tag: new-tag
  person: npc
"#;

fn campaign_rules() -> RuleSet {
    let config = Config::from_yaml_str(CAMPAIGN_RULES).unwrap();
    RuleSet::compile(&config)
}

fn tags(yaml: &str) -> Value {
    serde_yaml::from_str(yaml).unwrap()
}

fn strings(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|t| t.to_string()).collect()
}

#[test]
fn test_category_without_subcategories() {
    let config = Config::from_yaml_str("category_rules:\n  lore: 6_Lore\n").unwrap();
    let rules = RuleSet::compile(&config);

    let result = classify_tags(&tags("[lore]"), &rules);
    assert_eq!(result.main_folder, "6_Lore");
    assert_eq!(result.subfolder, None);
    assert_eq!(result.tags, strings(&["lore"]));
    assert_eq!(result.target_folder(), "6_Lore");
}

#[test]
fn test_consolidation_to_default_folder() {
    let rules = campaign_rules();
    let result = classify_tags(&tags("[old-tag]"), &rules);
    assert_eq!(result.tags, strings(&["new-tag"]));
    assert_eq!(result.main_folder, "0_Inbox");
    assert_eq!(result.subfolder, None);
}

#[test]
fn test_leaf_tag_expands_and_files_under_branch() {
    let rules = campaign_rules();
    let result = classify_tags(&tags("[npc]"), &rules);
    assert_eq!(result.tags, strings(&["npc", "characters", "lore"]));
    assert_eq!(result.main_folder, "6_Lore");
    assert_eq!(result.subfolder.as_deref(), Some("6_Lore/Characters"));
}

#[test]
fn test_alias_resolves_before_expansion() {
    let rules = campaign_rules();
    let result = classify_tags(&tags("[Person]"), &rules);
    assert_eq!(result.tags, strings(&["npc", "characters", "lore"]));
    assert_eq!(result.target_folder(), "6_Lore/Characters");
}

#[test]
fn test_unknown_tags_go_to_default_folder() {
    let rules = campaign_rules();
    let result = classify_tags(&tags("[misc, Todo]"), &rules);
    assert_eq!(result.main_folder, "0_Inbox");
    assert_eq!(result.subfolder, None);
    assert_eq!(result.tags, strings(&["misc", "todo"]));
}

#[test]
fn test_first_declared_category_wins() {
    let rules = campaign_rules();
    let result = classify_tags(&tags("[lore, session]"), &rules);
    assert_eq!(result.main_folder, "2_Sessions");
    assert_eq!(result.subfolder, None);
}

#[test]
fn test_subfolder_must_sit_under_main_folder() {
    let rules = campaign_rules();
    // `session` outranks `lore`, so the lore subfolder does not apply.
    let result = classify_tags(&tags("[session, city]"), &rules);
    assert_eq!(result.main_folder, "2_Sessions");
    assert_eq!(result.subfolder, None);
    assert_eq!(result.tags, strings(&["session", "city", "locations", "lore"]));
}

#[test]
fn test_deepest_subfolder_wins() {
    let rules = campaign_rules();
    let result = classify_tags(&tags("[city, guild]"), &rules);
    assert_eq!(
        result.subfolder.as_deref(),
        Some("6_Lore/Characters/Factions")
    );
}

#[test]
fn test_equal_depth_tie_goes_to_earlier_label() {
    let rules = campaign_rules();
    // Both sit one level deep; `characters` precedes `locations` in the tree.
    let result = classify_tags(&tags("[city, npc]"), &rules);
    assert_eq!(result.subfolder.as_deref(), Some("6_Lore/Characters"));

    let reversed = classify_tags(&tags("[npc, city]"), &rules);
    assert_eq!(reversed.subfolder, result.subfolder);
}

#[test]
fn test_leaf_directly_under_category_uses_main_folder() {
    let rules = campaign_rules();
    let result = classify_tags(&tags("[combat]"), &rules);
    assert_eq!(result.tags, strings(&["combat", "rules"]));
    assert_eq!(result.main_folder, "5_Rules");
    assert_eq!(result.subfolder, None);
}

#[test]
fn test_non_string_tags_are_ignored() {
    let rules = campaign_rules();
    let result = classify_tags(&tags("[42, {a: b}, Lore]"), &rules);
    assert_eq!(result.tags, strings(&["lore"]));
    assert_eq!(result.main_folder, "6_Lore");
}

#[test]
fn test_missing_frontmatter_is_untagged() {
    let rules = campaign_rules();
    let result = classify(None, &rules);
    assert!(result.tags.is_empty());
    assert_eq!(result.target_folder(), "0_Inbox");

    let mut frontmatter = Mapping::new();
    frontmatter.insert(Value::from("title"), Value::from("Mira"));
    let result = classify(Some(&frontmatter), &rules);
    assert!(result.tags.is_empty());
}

#[test]
fn test_classification_is_deterministic() {
    let rules = campaign_rules();
    let raw = tags("[dungeon, guild, old-tag, session]");
    let first = classify_tags(&raw, &rules);
    for _ in 0..10 {
        assert_eq!(classify_tags(&raw, &rules), first);
    }

    let recompiled = RuleSet::compile(&Config::from_yaml_str(CAMPAIGN_RULES).unwrap());
    assert_eq!(recompiled.priority_order(), rules.priority_order());
}

#[test]
fn test_expanded_tags_cover_every_path_segment() {
    let rules = campaign_rules();
    for label in rules.priority_order() {
        let result = classify_tags(&Value::Sequence(vec![Value::from(label.as_str())]), &rules);
        let path = rules.subcategory_path(label).unwrap();
        for segment in path.split('/').skip(1) {
            assert!(
                result.tags.contains(&segment.to_lowercase()),
                "{} missing ancestor {}",
                label,
                segment
            );
        }
        let category = rules
            .category_for_folder(path.split('/').next().unwrap())
            .unwrap();
        assert!(result.tags.iter().any(|t| t == category));
    }
}
