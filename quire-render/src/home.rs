//! Home page extras: the description and search box placed above the listing.

use crate::renderer::RenderError;
use crate::templates::SearchWidgetTemplate;
use askama::Template;
use quire_core::SearchSettings;
use regex::Regex;
use std::sync::OnceLock;

static LISTING_TAG: OnceLock<Regex> = OnceLock::new();

fn listing_tag() -> &'static Regex {
    LISTING_TAG.get_or_init(|| {
        Regex::new(r#"<[A-Za-z][A-Za-z0-9]*\b[^>]*\bid\s*=\s*["']files["']"#).unwrap()
    })
}

const POWERED_BY: &str =
    "<p><small>Powered by <a href=\"https://github.com/quire-wiki/quire\" target=\"_blank\">quire</a>.</small></p>\n";

/// Insert `fragment` immediately before the element with `id="files"`.
pub fn splice_before_listing(html: &str, fragment: &str) -> Result<String, RenderError> {
    let start = listing_tag()
        .find(html)
        .map(|m| m.start())
        .ok_or(RenderError::MissingListing)?;

    let mut out = String::with_capacity(html.len() + fragment.len());
    out.push_str(&html[..start]);
    out.push_str(fragment);
    out.push_str(&html[start..]);
    Ok(out)
}

/// The client-side search box, loading `search-index.json` and `titles.json` from `base_url`
pub fn search_widget(base_url: &str, settings: &SearchSettings) -> Result<String, RenderError> {
    let template = SearchWidgetTemplate {
        base_url_json: serde_json::to_string(base_url)?,
        min_score: settings.min_score,
        max_results: settings.max_results,
    };
    Ok(template.render()?)
}

/// Everything spliced into the home page: optional description, credit line, search box
pub fn home_fragment(
    description: Option<&str>,
    base_url: &str,
    settings: &SearchSettings,
) -> Result<String, RenderError> {
    let mut fragment = String::new();
    if let Some(description) = description {
        fragment.push_str(description);
        fragment.push('\n');
    }
    fragment.push_str(POWERED_BY);
    fragment.push_str(&search_widget(base_url, settings)?);
    Ok(fragment)
}
