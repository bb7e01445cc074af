//! Page renderer: turns notes and folders into complete HTML pages.

use crate::rewrite::rewrite_folder_links;
use crate::templates::{
    encode_path, encode_segment, html_escape, render_nav_tree, FolderTemplate, ListingEntry,
    NoteTemplate, PageChrome,
};
use askama::Template;
use quire_core::{Folder, MarkdownProcessor, Note, NoteId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Rendered page has no element with id=\"files\" to insert before")]
    MissingListing,
}

/// Whether pages carry the controls of the live application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Edit, delete and new-folder controls are shown
    Interactive,
    /// Read-only pages for a static file tree
    #[default]
    Static,
}

impl RenderMode {
    pub fn is_interactive(self) -> bool {
        self == RenderMode::Interactive
    }
}

/// Identity the templates render as the logged-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub name: String,
    pub is_authenticated: bool,
}

impl Viewer {
    /// The fixed identity used for generated sites
    pub fn site_viewer() -> Self {
        Self {
            name: String::from("viewer"),
            is_authenticated: true,
        }
    }
}

/// Navigation markup for one pruned tree, rendered once per build
#[derive(Debug, Clone)]
pub struct NavTree {
    html: String,
}

impl NavTree {
    pub fn as_html(&self) -> &str {
        &self.html
    }
}

/// Renders every page of a site with shared layout settings
pub struct PageRenderer {
    site_name: String,
    base_url: String,
    mode: RenderMode,
    viewer: Viewer,
    year: i32,
    markdown: MarkdownProcessor,
}

impl PageRenderer {
    /// `base_url` must already be normalized to a leading and trailing slash.
    pub fn new(site_name: impl Into<String>, base_url: impl Into<String>, mode: RenderMode) -> Self {
        Self {
            site_name: site_name.into(),
            base_url: base_url.into(),
            mode,
            viewer: Viewer::site_viewer(),
            year: 1970,
            markdown: MarkdownProcessor::new(),
        }
    }

    /// Year shown in the page footer
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    /// Link to a note page; the id is percent-encoded
    pub fn note_href(&self, id: &NoteId) -> String {
        format!("{}dataobj/{}/", self.base_url, encode_segment(&id.to_string()))
    }

    /// Link to a folder page, in the convention of the current mode
    pub fn folder_href(&self, path: &str) -> String {
        if path.is_empty() {
            return self.base_url.clone();
        }
        let path = encode_path(path);
        match self.mode {
            RenderMode::Interactive => format!("{}?path={}/", self.base_url, path),
            RenderMode::Static => format!("{}dirs/{}/", self.base_url, path),
        }
    }

    pub fn nav_tree(&self, root: &Folder) -> NavTree {
        NavTree {
            html: render_nav_tree(
                root,
                |note| self.note_href(&note.id),
                |path| self.folder_href(path),
            ),
        }
    }

    fn chrome<'a>(&'a self, nav: &'a NavTree) -> PageChrome<'a> {
        let viewer_name = if self.viewer.is_authenticated {
            self.viewer.name.as_str()
        } else {
            ""
        };

        PageChrome {
            site_name: &self.site_name,
            base_url: &self.base_url,
            interactive: self.mode.is_interactive(),
            viewer_name,
            nav_html: nav.as_html(),
            year: self.year,
        }
    }

    /// Render the page of a single note
    pub fn render_note(&self, note: &Note, nav: &NavTree) -> Result<String, RenderError> {
        let note_url = self.note_href(&note.id);
        let template = NoteTemplate {
            page: self.chrome(nav),
            title: &note.title,
            fullpath: &note.fullpath,
            content: self.markdown.to_html(&note.body),
            edit_href: html_escape(&format!("{}edit", note_url)),
            delete_href: html_escape(&format!("{}delete", note_url)),
        };

        let html = template.render()?;
        tracing::debug!("Rendered note {}", note.id);
        Ok(rewrite_folder_links(&html))
    }

    /// Render the listing page of the folder at `path` (`/`-joined, empty for the root)
    pub fn render_folder(
        &self,
        folder: &Folder,
        path: &str,
        nav: &NavTree,
    ) -> Result<String, RenderError> {
        let title = if path.is_empty() {
            String::from("Home")
        } else {
            path.to_string()
        };
        self.render_listing(folder, path, title, nav)
    }

    /// Render the home page, inserting `splice` before the listing when given
    pub fn render_home(
        &self,
        root: &Folder,
        nav: &NavTree,
        splice: Option<&str>,
    ) -> Result<String, RenderError> {
        let html = self.render_folder(root, "", nav)?;
        match splice {
            Some(fragment) => crate::home::splice_before_listing(&html, fragment),
            None => Ok(html),
        }
    }

    fn render_listing(
        &self,
        folder: &Folder,
        path: &str,
        title: String,
        nav: &NavTree,
    ) -> Result<String, RenderError> {
        let parent_href = if path.is_empty() {
            None
        } else {
            let parent = path.rsplit_once('/').map(|(p, _)| p).unwrap_or("");
            Some(html_escape(&self.folder_href(parent)))
        };

        let folders = folder
            .children
            .values()
            .map(|child| {
                let child_path = if path.is_empty() {
                    child.name.clone()
                } else {
                    format!("{}/{}", path, child.name)
                };
                ListingEntry::new(&self.folder_href(&child_path), child.name.clone())
            })
            .collect();

        let notes = folder
            .notes
            .iter()
            .map(|note| ListingEntry::new(&self.note_href(&note.id), note.title.clone()))
            .collect();

        let template = FolderTemplate {
            page: self.chrome(nav),
            title,
            current_path: path,
            parent_href,
            folders,
            notes,
        };

        let html = template.render()?;
        tracing::debug!("Rendered folder {:?}", path);
        Ok(rewrite_folder_links(&html))
    }
}
