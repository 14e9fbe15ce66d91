//! Note frontmatter parsing and rewriting.
//!
//! A note may open with a YAML block delimited by `---` lines:
//!
//! ```text
//! ---
//! title: Mira
//! tags: [npc]
//! ---
//! Body text...
//! ```
//!
//! Rewriting only touches the `tags` field. Every other field keeps its
//! value and position, and everything after the block is preserved byte for
//! byte.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::config::{FRONTMATTER_DELIMITER, TAGS_FIELD};

/// Errors raised while reading or rendering frontmatter.
#[derive(Debug, Error)]
pub enum NoteError {
    #[error("Malformed frontmatter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Frontmatter is not a key/value mapping")]
    NotAMapping,
}

fn frontmatter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\A---\n(.*?)\n---\n").expect("frontmatter pattern is valid"))
}

/// A note file read from the vault.
#[derive(Debug, Clone)]
pub struct Note {
    /// Absolute path of the note.
    pub path: PathBuf,
    /// Full file content as read.
    pub content: String,
    /// Parsed frontmatter. `None` when the note has no block or the block
    /// could not be parsed.
    pub frontmatter: Option<Mapping>,
}

impl Note {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>, frontmatter: Option<Mapping>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            frontmatter,
        }
    }

    /// Note title as used in wikilinks: the file name without extension.
    pub fn title(&self) -> String {
        note_title(&self.path)
    }

    /// Raw `tags` value, `Null` when absent.
    pub fn raw_tags(&self) -> &Value {
        self.frontmatter
            .as_ref()
            .and_then(|fm| fm.get(TAGS_FIELD))
            .unwrap_or(&Value::Null)
    }
}

/// File name without extension.
pub fn note_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Returns the YAML text of the leading frontmatter block, if present.
pub fn frontmatter_block(content: &str) -> Option<&str> {
    frontmatter_regex()
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parses the leading frontmatter block.
///
/// Returns `Ok(None)` when there is no block. An empty block parses to an
/// empty mapping.
pub fn parse_frontmatter(content: &str) -> Result<Option<Mapping>, NoteError> {
    let Some(yaml) = frontmatter_block(content) else {
        return Ok(None);
    };

    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(map) => Ok(Some(map)),
        Value::Null => Ok(Some(Mapping::new())),
        _ => Err(NoteError::NotAMapping),
    }
}

/// Renders `content` with its `tags` field replaced by `tags`.
///
/// `frontmatter` is the already-parsed block of `content` (if any); all its
/// other fields are kept in order. When `content` has no block, a new one is
/// prepended followed by a blank line.
pub fn render_with_tags(
    content: &str,
    frontmatter: Option<&Mapping>,
    tags: &[String],
) -> Result<String, NoteError> {
    let mut data = frontmatter.cloned().unwrap_or_default();
    let tag_values = tags.iter().cloned().map(Value::String).collect();
    data.insert(Value::String(TAGS_FIELD.to_string()), Value::Sequence(tag_values));

    let yaml = serde_yaml::to_string(&Value::Mapping(data))?;
    let block = format!(
        "{delim}\n{}\n{delim}\n",
        yaml.trim(),
        delim = FRONTMATTER_DELIMITER
    );

    let rendered = match frontmatter_regex().find(content) {
        Some(existing) => format!("{}{}", block, &content[existing.end()..]),
        None => format!("{}\n{}", block, content),
    };

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frontmatter() {
        let content = "---\ntitle: Mira\ntags: [npc, Lore]\n---\nBody";
        let fm = parse_frontmatter(content).unwrap().unwrap();
        assert_eq!(fm.get("title").and_then(Value::as_str), Some("Mira"));
        assert_eq!(fm.get("tags").and_then(Value::as_sequence).map(Vec::len), Some(2));
    }

    #[test]
    fn test_no_frontmatter() {
        assert!(parse_frontmatter("# Heading\n\nBody").unwrap().is_none());
        // Block must start at the very first byte.
        assert!(parse_frontmatter("\n---\ntags: [a]\n---\n").unwrap().is_none());
    }

    #[test]
    fn test_malformed_frontmatter() {
        let content = "---\ntags: [unclosed\n---\nBody";
        assert!(matches!(parse_frontmatter(content), Err(NoteError::Yaml(_))));
    }

    #[test]
    fn test_scalar_frontmatter_is_rejected() {
        let content = "---\njust text\n---\nBody";
        assert!(matches!(parse_frontmatter(content), Err(NoteError::NotAMapping)));
    }

    #[test]
    fn test_render_replaces_tags_and_keeps_fields() {
        let content = "---\ntitle: Mira\ntags: [NPC]\nstatus: draft\n---\n# Mira\n\nText.\n";
        let fm = parse_frontmatter(content).unwrap();
        let tags = vec!["npc".to_string(), "lore".to_string()];

        let rendered = render_with_tags(content, fm.as_ref(), &tags).unwrap();

        assert!(rendered.starts_with("---\ntitle: Mira\ntags:\n- npc\n- lore\nstatus: draft\n---\n"));
        assert!(rendered.ends_with("---\n# Mira\n\nText.\n"));

        let reparsed = parse_frontmatter(&rendered).unwrap().unwrap();
        assert_eq!(reparsed.get("status").and_then(Value::as_str), Some("draft"));
    }

    #[test]
    fn test_render_prepends_block() {
        let content = "Plain body";
        let rendered = render_with_tags(content, None, &["lore".to_string()]).unwrap();
        assert_eq!(rendered, "---\ntags:\n- lore\n---\n\nPlain body");
    }

    #[test]
    fn test_note_title() {
        assert_eq!(note_title(Path::new("/vault/6_Lore/Mira Vel.md")), "Mira Vel");
    }
}
