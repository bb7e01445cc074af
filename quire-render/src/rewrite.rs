//! Link rewriting for pages served as plain files.

use regex::Regex;
use std::sync::OnceLock;

static QUERY_FOLDER_LINK: OnceLock<Regex> = OnceLock::new();

fn query_folder_link() -> &'static Regex {
    QUERY_FOLDER_LINK.get_or_init(|| Regex::new(r#"href="([^"?]*)\?path="#).unwrap())
}

/// Rewrite `?path=<folder>` links into `dirs/<folder>` paths.
///
/// Only `href` attribute values are touched, so text that merely mentions
/// `?path=` survives. Pages without such links come back unchanged.
pub fn rewrite_folder_links(html: &str) -> String {
    query_folder_link()
        .replace_all(html, r#"href="${1}dirs/"#)
        .into_owned()
}
