//! Content model: notes, folders and note identifiers.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Stable note identifier, taken from the `id` frontmatter key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoteId {
    Int(i64),
    Text(String),
}

impl NoteId {
    /// Read an identifier out of a YAML value, if it has a usable shape.
    pub fn from_yaml(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(NoteId::Int),
            Value::String(s) if !s.trim().is_empty() => Some(NoteId::Text(s.trim().to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteId::Int(n) => write!(f, "{}", n),
            NoteId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for NoteId {
    fn from(value: i64) -> Self {
        NoteId::Int(value)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        NoteId::Text(value.to_string())
    }
}

/// A single note in the collection
#[derive(Debug, Clone, Serialize)]
pub struct Note {
    /// Unique identifier across the whole collection
    pub id: NoteId,

    /// Display title
    pub title: String,

    /// Markdown body (without frontmatter)
    pub body: String,

    /// Path relative to the data directory, `/`-separated
    pub fullpath: String,

    /// Every frontmatter key, including `omit` when present
    #[serde(skip)]
    pub metadata: Mapping,
}

impl Note {
    pub fn new(id: impl Into<NoteId>, title: impl Into<String>, body: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            fullpath: format!("{}.md", id),
            id,
            title: title.into(),
            body: body.into(),
            metadata: Mapping::new(),
        }
    }

    /// Builder-style helper for setting a metadata key
    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(Value::from(key), value.into());
        self
    }

    /// Look up a metadata value by key
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Whether the author asked for this note to stay out of the published site
    pub fn is_omitted(&self) -> bool {
        self.meta("omit").map(is_truthy).unwrap_or(false)
    }
}

/// Truthiness of a frontmatter value, as an author would read it.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => {
            let s = s.trim();
            !(s.is_empty() || s.eq_ignore_ascii_case("false") || s == "0")
        }
        Value::Sequence(seq) => !seq.is_empty(),
        Value::Mapping(map) => !map.is_empty(),
        Value::Tagged(tagged) => is_truthy(&tagged.value),
    }
}

/// A node in the content hierarchy
#[derive(Debug, Clone, Default, Serialize)]
pub struct Folder {
    /// Folder name; empty for the root
    pub name: String,

    /// Notes directly inside this folder
    pub notes: Vec<Note>,

    /// Child folders keyed by name
    pub children: BTreeMap<String, Folder>,
}

impl Folder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            notes: Vec::new(),
            children: BTreeMap::new(),
        }
    }

    pub fn root() -> Self {
        Self::new("")
    }

    pub fn with_note(mut self, note: Note) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_child(mut self, child: Folder) -> Self {
        self.children.insert(child.name.clone(), child);
        self
    }

    /// True when the folder holds neither notes nor child folders
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty() && self.children.is_empty()
    }

    /// Get (or create) the descendant folder at the given path segments
    pub fn folder_mut(&mut self, segments: &[&str]) -> &mut Folder {
        let mut current = self;
        for segment in segments {
            current = current
                .children
                .entry(segment.to_string())
                .or_insert_with(|| Folder::new(*segment));
        }
        current
    }

    /// Every note in this subtree, folders visited in name order
    pub fn flatten(&self) -> Vec<&Note> {
        let mut notes = Vec::new();
        let mut stack = vec![self];
        while let Some(folder) = stack.pop() {
            notes.extend(folder.notes.iter());
            // Reverse so the smallest name is popped first
            stack.extend(folder.children.values().rev());
        }
        notes
    }

    /// Every note independent of hierarchy, sorted by `fullpath`
    pub fn flat_notes(&self) -> Vec<&Note> {
        let mut notes = self.flatten();
        notes.sort_by(|a, b| a.fullpath.cmp(&b.fullpath));
        notes
    }

    /// Total number of notes in this subtree
    pub fn note_count(&self) -> usize {
        self.flatten().len()
    }

    /// Every descendant folder paired with its `/`-joined path from this folder.
    ///
    /// The folder itself is not included. Parents come before their children.
    pub fn walk(&self) -> Vec<(String, &Folder)> {
        let mut out = Vec::new();
        let mut stack: Vec<(String, &Folder)> = self
            .children
            .values()
            .rev()
            .map(|f| (f.name.clone(), f))
            .collect();

        while let Some((path, folder)) = stack.pop() {
            for child in folder.children.values().rev() {
                stack.push((format!("{}/{}", path, child.name), child));
            }
            out.push((path, folder));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: i64, title: &str) -> Note {
        Note::new(id, title, "")
    }

    fn sample_tree() -> Folder {
        Folder::root()
            .with_note(note(1, "Root note"))
            .with_child(
                Folder::new("b")
                    .with_note(note(2, "B note"))
                    .with_child(Folder::new("deep").with_note(note(3, "Deep"))),
            )
            .with_child(Folder::new("a").with_note(note(4, "A note")))
    }

    #[test]
    fn test_note_id_display() {
        assert_eq!(NoteId::Int(42).to_string(), "42");
        assert_eq!(NoteId::from("intro").to_string(), "intro");
    }

    #[test]
    fn test_note_id_from_yaml() {
        assert_eq!(NoteId::from_yaml(&Value::from(7)), Some(NoteId::Int(7)));
        assert_eq!(
            NoteId::from_yaml(&Value::from(" abc ")),
            Some(NoteId::Text("abc".into()))
        );
        assert_eq!(NoteId::from_yaml(&Value::from("")), None);
        assert_eq!(NoteId::from_yaml(&Value::Null), None);
    }

    #[test]
    fn test_omit_truthiness() {
        assert!(!note(1, "t").is_omitted());
        assert!(note(1, "t").with_meta("omit", true).is_omitted());
        assert!(!note(1, "t").with_meta("omit", false).is_omitted());
        assert!(!note(1, "t").with_meta("omit", Value::Null).is_omitted());
        assert!(!note(1, "t").with_meta("omit", 0).is_omitted());
        assert!(note(1, "t").with_meta("omit", "yes").is_omitted());
        assert!(!note(1, "t").with_meta("omit", "false").is_omitted());
        assert!(!note(1, "t").with_meta("omit", " FALSE ").is_omitted());
        assert!(!note(1, "t").with_meta("omit", "0").is_omitted());
        assert!(note(1, "t").with_meta("omit", "no").is_omitted());
    }

    #[test]
    fn test_flatten_visits_every_note() {
        let tree = sample_tree();
        let titles: Vec<_> = tree.flatten().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Root note", "A note", "B note", "Deep"]);
        assert_eq!(tree.note_count(), 4);
    }

    #[test]
    fn test_flat_notes_sorted_by_fullpath() {
        let mut root = Folder::root();
        let mut top = note(1, "Top");
        top.fullpath = String::from("z.md");
        root.notes.push(top);
        let mut nested = note(2, "Nested");
        nested.fullpath = String::from("a/b.md");
        root.folder_mut(&["a"]).notes.push(nested);

        let pre_order: Vec<_> = root.flatten().iter().map(|n| n.fullpath.as_str()).collect();
        assert_eq!(pre_order, vec!["z.md", "a/b.md"]);
        let flat: Vec<_> = root.flat_notes().iter().map(|n| n.fullpath.as_str()).collect();
        assert_eq!(flat, vec!["a/b.md", "z.md"]);
    }

    #[test]
    fn test_walk_paths() {
        let tree = sample_tree();
        let paths: Vec<_> = tree.walk().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["a", "b", "b/deep"]);
    }

    #[test]
    fn test_folder_mut_creates_path() {
        let mut root = Folder::root();
        root.folder_mut(&["x", "y"]).notes.push(note(1, "n"));
        assert_eq!(root.children["x"].children["y"].notes.len(), 1);
        assert_eq!(root.children["x"].name, "x");
    }
}
