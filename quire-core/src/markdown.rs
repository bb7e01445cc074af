//! Markdown conversion: HTML for note pages, plain text for the search index.

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::sync::OnceLock;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME: OnceLock<Theme> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme() -> &'static Theme {
    THEME.get_or_init(|| {
        let mut theme_set = ThemeSet::load_defaults();
        theme_set
            .themes
            .remove("InspiredGitHub")
            .or_else(|| theme_set.themes.remove("base16-ocean.light"))
            .unwrap_or_default()
    })
}

/// Markdown processor shared by every note of a build
pub struct MarkdownProcessor {
    options: Options,
}

impl MarkdownProcessor {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        Self { options }
    }

    /// Convert markdown to HTML, highlighting fenced code blocks
    pub fn to_html(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);

        let mut events = Vec::new();
        let mut fence: Option<String> = None;
        let mut code = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))) if !lang.is_empty() => {
                    fence = Some(lang.to_string());
                    code.clear();
                }
                Event::Text(text) if fence.is_some() => code.push_str(&text),
                Event::End(TagEnd::CodeBlock) if fence.is_some() => {
                    let lang = fence.take().unwrap_or_default();
                    events.push(Event::Html(CowStr::from(highlight_code(&code, &lang))));
                }
                other => events.push(other),
            }
        }

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        out
    }

    /// Extract the readable text of a markdown document.
    ///
    /// Markup, link targets and raw HTML are dropped; block boundaries become
    /// whitespace so words from adjacent blocks never merge.
    pub fn to_plain_text(&self, markdown: &str) -> String {
        let mut out = String::with_capacity(markdown.len());

        for event in Parser::new_ext(markdown, self.options) {
            match event {
                Event::Text(text) | Event::Code(text) => out.push_str(&text),
                Event::SoftBreak | Event::HardBreak | Event::Rule => out.push(' '),
                Event::End(tag) if ends_block(&tag) => out.push(' '),
                _ => {}
            }
        }

        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

impl Default for MarkdownProcessor {
    fn default() -> Self {
        Self::new()
    }
}

fn ends_block(tag: &TagEnd) -> bool {
    matches!(
        tag,
        TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::BlockQuote(_)
            | TagEnd::CodeBlock
            | TagEnd::List(_)
            | TagEnd::Item
            | TagEnd::TableHead
            | TagEnd::TableRow
            | TagEnd::TableCell
            | TagEnd::FootnoteDefinition
            | TagEnd::HtmlBlock
    )
}

fn highlight_code(code: &str, lang: &str) -> String {
    let ss = syntax_set();
    let syntax = ss
        .find_syntax_by_token(lang)
        .or_else(|| ss.find_syntax_by_extension(lang))
        .unwrap_or_else(|| ss.find_syntax_plain_text());

    match highlighted_html_for_string(code, ss, syntax, theme()) {
        Ok(html) => html,
        Err(err) => {
            tracing::debug!("Highlighting failed for {}: {}", lang, err);
            format!("<pre><code>{}</code></pre>", html_escape(code))
        }
    }
}

pub(crate) fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_html() {
        let html = MarkdownProcessor::new().to_html("# Title\n\nSome *emphasis*.");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>emphasis</em>"));
    }

    #[test]
    fn test_fenced_code_is_highlighted() {
        let html = MarkdownProcessor::new().to_html("```rust\nfn main() {}\n```\n");
        assert!(html.contains("<pre"));
        assert!(html.contains("main"));
        assert!(!html.contains("<code class=\"language-rust\">"));
    }

    #[test]
    fn test_unlabelled_fence_stays_plain() {
        let html = MarkdownProcessor::new().to_html("```\na < b\n```\n");
        assert!(html.contains("<pre><code>a &lt; b"));
    }

    #[test]
    fn test_tables_enabled() {
        let html = MarkdownProcessor::new().to_html("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_plain_text_strips_markup() {
        let text = MarkdownProcessor::new()
            .to_plain_text("# Heading\n\nA [link](http://x.y) and `code`.\n\n- one\n- two");
        assert_eq!(text, "Heading A link and code. one two");

        let text = MarkdownProcessor::new().to_plain_text("*em*phasis");
        assert_eq!(text, "emphasis");
    }
}
