//! Askama template definitions.

use askama::Template;
use quire_core::{Folder, Note};

/// Layout values shared by every page of a build
#[derive(Debug, Clone)]
pub struct PageChrome<'a> {
    pub site_name: &'a str,
    pub base_url: &'a str,
    /// Show edit/delete/new-folder controls
    pub interactive: bool,
    pub viewer_name: &'a str,
    pub nav_html: &'a str,
    pub year: i32,
}

/// One link in a folder listing
#[derive(Debug, Clone)]
pub struct ListingEntry {
    /// Already HTML-escaped
    pub href: String,
    pub label: String,
}

impl ListingEntry {
    pub fn new(href: &str, label: impl Into<String>) -> Self {
        Self {
            href: html_escape(href),
            label: label.into(),
        }
    }
}

/// Note page template
#[derive(Template)]
#[template(path = "note.html")]
pub struct NoteTemplate<'a> {
    pub page: PageChrome<'a>,
    pub title: &'a str,
    pub fullpath: &'a str,
    pub content: String,
    pub edit_href: String,
    pub delete_href: String,
}

/// Folder listing template, also used for the home page
#[derive(Template)]
#[template(path = "folder.html")]
pub struct FolderTemplate<'a> {
    pub page: PageChrome<'a>,
    pub title: String,
    pub current_path: &'a str,
    pub parent_href: Option<String>,
    pub folders: Vec<ListingEntry>,
    pub notes: Vec<ListingEntry>,
}

/// Client-side search box
#[derive(Template)]
#[template(path = "search_widget.html")]
pub struct SearchWidgetTemplate {
    /// Base URL as a JSON string literal
    pub base_url_json: String,
    pub min_score: f64,
    pub max_results: usize,
}

enum NavStep<'a> {
    Open(String, &'a Folder),
    Close,
}

/// Render the navigation tree for a whole collection.
///
/// Walks the tree with an explicit stack; each folder lists its notes before
/// its subfolders.
pub fn render_nav_tree(
    root: &Folder,
    note_href: impl Fn(&Note) -> String,
    folder_href: impl Fn(&str) -> String,
) -> String {
    let mut html = String::from("<nav class=\"nav-tree\">\n<ul>\n");
    for note in &root.notes {
        render_note_item(&mut html, note, &note_href);
    }

    let mut stack: Vec<NavStep> = root
        .children
        .values()
        .rev()
        .map(|child| NavStep::Open(child.name.clone(), child))
        .collect();

    while let Some(step) = stack.pop() {
        match step {
            NavStep::Open(path, folder) => {
                html.push_str("<li class=\"nav-folder\">\n<details open>\n");
                html.push_str(&format!(
                    "<summary><a href=\"{}\">{}</a></summary>\n<ul>\n",
                    html_escape(&folder_href(&path)),
                    html_escape(&folder.name)
                ));
                for note in &folder.notes {
                    render_note_item(&mut html, note, &note_href);
                }

                stack.push(NavStep::Close);
                for child in folder.children.values().rev() {
                    stack.push(NavStep::Open(format!("{}/{}", path, child.name), child));
                }
            }
            NavStep::Close => html.push_str("</ul>\n</details>\n</li>\n"),
        }
    }

    html.push_str("</ul>\n</nav>\n");
    html
}

fn render_note_item(html: &mut String, note: &Note, note_href: &impl Fn(&Note) -> String) {
    html.push_str(&format!(
        "<li class=\"nav-note\"><a href=\"{}\">{}</a></li>\n",
        html_escape(&note_href(note)),
        html_escape(&note.title)
    ));
}

/// HTML escape function to prevent XSS
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Percent-encode one URL path segment.
///
/// Leaves the same characters alone as JavaScript's `encodeURIComponent`, so
/// links built here match the ones the search widget builds.
pub(crate) fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Percent-encode every segment of a `/`-joined path
pub(crate) fn encode_path(path: &str) -> String {
    path.split('/').map(encode_segment).collect::<Vec<_>>().join("/")
}
