//! # quire-core
//!
//! Core library for the quire static wiki generator.
//!
//! This crate loads a directory of markdown notes into a folder tree, prunes
//! the notes authors opted out of publishing, and builds the full-text search
//! index shipped with the generated site.

pub mod config;
pub mod filter;
pub mod frontmatter;
pub mod markdown;
pub mod models;
pub mod search;
pub mod slug;
pub mod vault;

pub use config::Config;
pub use filter::{is_publishable, prune};
pub use markdown::MarkdownProcessor;
pub use models::{Folder, Note, NoteId};
pub use search::{build_index, SearchArtifacts, SearchIndex, SearchSettings};
pub use slug::slugify;
pub use vault::{LoadError, Vault};
