//! Note storage: reads a directory of markdown files into a folder tree.

use crate::frontmatter::{self, FrontmatterError};
use crate::models::{Folder, Note, NoteId};
use crate::slug::slugify;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to walk data directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid frontmatter in {path:?}: {source}")]
    Frontmatter {
        path: PathBuf,
        source: FrontmatterError,
    },

    #[error("Note id {id:?} in {path:?} cannot be used as a directory name")]
    InvalidId { id: String, path: PathBuf },

    #[error("Duplicate note id {id}: {first:?} and {second:?}")]
    DuplicateId {
        id: NoteId,
        first: PathBuf,
        second: PathBuf,
    },
}

/// A data directory of markdown notes
pub struct Vault {
    root: PathBuf,
}

impl Vault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read every note into a folder hierarchy mirroring the directories.
    ///
    /// A missing data directory yields an empty tree.
    pub fn load_tree(&self) -> Result<Folder, LoadError> {
        let mut root = Folder::root();
        if !self.root.is_dir() {
            tracing::warn!("Data directory {:?} does not exist", self.root);
            return Ok(root);
        }

        // Keyed by the rendered id, which names the output directory and search ref
        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        let mut count = 0;

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() || !is_markdown(entry.path()) {
                continue;
            }

            let note = self.read_note(entry.path())?;
            if let Some(first) = seen.insert(note.id.to_string(), entry.path().to_path_buf()) {
                return Err(LoadError::DuplicateId {
                    id: note.id,
                    first,
                    second: entry.path().to_path_buf(),
                });
            }

            let segments: Vec<&str> = note.fullpath.split('/').collect();
            let dirs = &segments[..segments.len().saturating_sub(1)];
            root.folder_mut(dirs).notes.push(note);
            count += 1;
        }

        tracing::info!("Loaded {} notes from {:?}", count, self.root);
        Ok(root)
    }

    /// Whether `path` names a note file inside this data directory.
    ///
    /// Both sides are canonicalized, so the file must exist.
    pub fn contains(&self, path: &Path) -> bool {
        match (fs::canonicalize(&self.root), fs::canonicalize(path)) {
            (Ok(root), Ok(path)) => path.starts_with(root),
            _ => false,
        }
    }

    fn read_note(&self, path: &Path) -> Result<Note, LoadError> {
        let content = fs::read_to_string(path)?;
        let (metadata, body) =
            frontmatter::parse(&content).map_err(|source| LoadError::Frontmatter {
                path: path.to_path_buf(),
                source,
            })?;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled");

        let id = metadata
            .get("id")
            .and_then(NoteId::from_yaml)
            .unwrap_or_else(|| NoteId::Text(slugify(stem)));

        // Ids name the note's output directory
        let id_text = id.to_string();
        if id_text.is_empty()
            || id_text == "."
            || id_text == ".."
            || id_text.contains(['/', '\\'])
        {
            return Err(LoadError::InvalidId {
                id: id_text,
                path: path.to_path_buf(),
            });
        }

        // Fall back to filename when the title is missing
        let title = metadata
            .get("title")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(stem)
            .to_string();

        let fullpath = path
            .strip_prefix(&self.root)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        Ok(Note {
            id,
            title,
            body,
            fullpath,
            metadata,
        })
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn is_markdown(path: &Path) -> bool {
    path.extension().map(|ext| ext == "md").unwrap_or(false)
}
