//! Frontmatter parsing and rewriting for markdown notes.

use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Frontmatter must be a mapping of keys to values")]
    NotAMapping,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

static FRONTMATTER_REGEX: OnceLock<Regex> = OnceLock::new();

fn frontmatter_regex() -> &'static Regex {
    FRONTMATTER_REGEX.get_or_init(|| {
        Regex::new(r"(?s)\A---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)(.*)\z").unwrap()
    })
}

/// Split raw file content into the YAML block (if any) and the markdown body.
pub fn split(content: &str) -> (Option<&str>, &str) {
    match frontmatter_regex().captures(content) {
        Some(captures) => {
            let yaml = captures.get(1).map(|m| m.as_str()).unwrap_or("");
            let body = captures.get(2).map(|m| m.as_str()).unwrap_or("");
            (Some(yaml), body)
        }
        None => (None, content),
    }
}

/// Parse frontmatter from markdown content
///
/// Returns the frontmatter mapping and the markdown body. Content without a
/// frontmatter block yields an empty mapping and the full content as body.
///
/// # Example
///
/// ```
/// use quire_core::frontmatter::parse;
///
/// let content = "---\nid: 3\ntitle: My Note\n---\n# Hello World\n";
///
/// let (meta, body) = parse(content).unwrap();
/// assert_eq!(meta.get("title").and_then(|v| v.as_str()), Some("My Note"));
/// assert!(body.starts_with("# Hello World"));
/// ```
pub fn parse(content: &str) -> Result<(Mapping, String), FrontmatterError> {
    let (yaml, body) = split(content);

    let mapping = match yaml {
        Some(yaml) if !yaml.trim().is_empty() => match serde_yaml::from_str::<Value>(yaml)? {
            Value::Mapping(mapping) => mapping,
            Value::Null => Mapping::new(),
            _ => return Err(FrontmatterError::NotAMapping),
        },
        _ => Mapping::new(),
    };

    Ok((mapping, body.to_string()))
}

/// Serialize a frontmatter mapping and body back into file content.
pub fn render(mapping: &Mapping, body: &str) -> Result<String, FrontmatterError> {
    let yaml = if mapping.is_empty() {
        String::new()
    } else {
        serde_yaml::to_string(mapping)?
    };
    Ok(format!("---\n{}---\n{}", yaml, body))
}

/// Set a boolean frontmatter key in a note file, keeping every other key and the body.
pub fn set_flag(path: &Path, key: &str, value: bool) -> Result<(), FrontmatterError> {
    let content = fs::read_to_string(path)?;
    let (mut mapping, body) = parse(&content)?;
    mapping.insert(Value::from(key), Value::from(value));
    fs::write(path, render(&mapping, &body)?)?;

    tracing::debug!("Set {}={} in {:?}", key, value, path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_frontmatter() {
        let content = r#"---
id: 12
title: Test Note
type: note
---

# Hello World

This is the content."#;

        let (meta, body) = parse(content).unwrap();
        assert_eq!(meta.get("title").and_then(|v| v.as_str()), Some("Test Note"));
        assert_eq!(meta.get("id").and_then(|v| v.as_i64()), Some(12));
        assert!(body.contains("# Hello World"));
        assert!(body.contains("This is the content."));
    }

    #[test]
    fn test_parse_no_frontmatter() {
        let content = "# Just Content\n\nNo frontmatter here.";
        let (meta, body) = parse(content).unwrap();
        assert!(meta.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_parse_empty_frontmatter() {
        let (meta, body) = parse("---\n---\nBody").unwrap();
        assert!(meta.is_empty());
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_parse_frontmatter_without_trailing_body() {
        let (meta, body) = parse("---\ntitle: Only meta\n---").unwrap();
        assert_eq!(meta.get("title").and_then(|v| v.as_str()), Some("Only meta"));
        assert_eq!(body, "");
    }

    #[test]
    fn test_parse_frontmatter_with_omit() {
        let content = "---\ntitle: Hidden\nomit: true\n---\nContent.";
        let (meta, _) = parse(content).unwrap();
        assert_eq!(meta.get("omit").and_then(|v| v.as_bool()), Some(true));
    }

    #[test]
    fn test_invalid_yaml() {
        let content = r#"---
title: Test
invalid yaml: [unclosed
---

Content."#;

        assert!(parse(content).is_err());
    }

    #[test]
    fn test_scalar_frontmatter_rejected() {
        let result = parse("---\njust a string\n---\nbody");
        assert!(matches!(result, Err(FrontmatterError::NotAMapping)));
    }

    #[test]
    fn test_set_flag_preserves_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.md");
        fs::write(&path, "---\nid: 4\ntitle: Keep me\ntags:\n- a\n---\nBody text\n").unwrap();

        set_flag(&path, "omit", true).unwrap();

        let (meta, body) = parse(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(meta.get("omit").and_then(|v| v.as_bool()), Some(true));
        assert_eq!(meta.get("title").and_then(|v| v.as_str()), Some("Keep me"));
        assert_eq!(meta.get("id").and_then(|v| v.as_i64()), Some(4));
        assert_eq!(body, "Body text\n");

        set_flag(&path, "omit", false).unwrap();
        let (meta, _) = parse(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(meta.get("omit").and_then(|v| v.as_bool()), Some(false));
    }

    #[test]
    fn test_set_flag_adds_frontmatter_block() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.md");
        fs::write(&path, "# Plain\n").unwrap();

        set_flag(&path, "omit", true).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("---\nomit: true\n---\n"));
        assert!(content.ends_with("# Plain\n"));
    }
}
