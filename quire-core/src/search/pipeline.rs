//! Text pipeline applied to every indexed field: tokenize, trim, drop stop
//! words, stem.

use super::stemmer;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Name of every pipeline function the browser must run over query terms
pub const SEARCH_PIPELINE: &[&str] = &["stemmer"];

const STOP_WORDS: &[&str] = &[
    "a", "able", "about", "across", "after", "all", "almost", "also", "am", "among", "an", "and",
    "any", "are", "as", "at", "be", "because", "been", "but", "by", "can", "cannot", "could",
    "dear", "did", "do", "does", "either", "else", "ever", "every", "for", "from", "get", "got",
    "had", "has", "have", "he", "her", "hers", "him", "his", "how", "however", "i", "if", "in",
    "into", "is", "it", "its", "just", "least", "let", "like", "likely", "may", "me", "might",
    "most", "must", "my", "neither", "no", "nor", "not", "of", "off", "often", "on", "only", "or",
    "other", "our", "own", "rather", "said", "say", "says", "she", "should", "since", "so",
    "some", "than", "that", "the", "their", "them", "then", "there", "these", "they", "this",
    "tis", "to", "too", "twas", "us", "wants", "was", "we", "were", "what", "when", "where",
    "which", "while", "who", "whom", "why", "will", "with", "would", "yet", "you", "your",
];

static STOP_WORD_SET: OnceLock<HashSet<&'static str>> = OnceLock::new();

/// A term together with where its source token sits in the field text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub term: String,
    /// `[start, length]` in UTF-16 code units of the lowercased text
    pub position: [usize; 2],
}

fn is_separator(c: char) -> bool {
    // JavaScript's `\s`: Unicode White_Space minus U+0085, plus the BOM
    c == '-' || c == '\u{feff}' || (c.is_whitespace() && c != '\u{85}')
}

/// Lowercase `text` and split it on whitespace and hyphens.
pub fn tokenize(text: &str) -> Vec<Token> {
    let lowered = text.to_lowercase();
    let mut tokens = Vec::new();

    let mut current = String::new();
    let mut start = 0;
    let mut offset = 0;

    for c in lowered.chars() {
        if is_separator(c) {
            if !current.is_empty() {
                let length = offset - start;
                tokens.push(Token {
                    term: std::mem::take(&mut current),
                    position: [start, length],
                });
            }
            offset += c.len_utf16();
            start = offset;
        } else {
            current.push(c);
            offset += c.len_utf16();
        }
    }

    if !current.is_empty() {
        tokens.push(Token {
            term: current,
            position: [start, offset - start],
        });
    }

    tokens
}

/// Strip leading and trailing characters outside `[A-Za-z0-9_]`.
pub fn trim(term: &str) -> &str {
    term.trim_matches(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
}

pub fn is_stop_word(term: &str) -> bool {
    STOP_WORD_SET
        .get_or_init(|| STOP_WORDS.iter().copied().collect())
        .contains(term)
}

/// Run the full indexing pipeline over one field's text.
///
/// Terms that trim down to nothing are dropped.
pub fn run(text: &str) -> Vec<Token> {
    tokenize(text)
        .into_iter()
        .filter_map(|token| {
            let trimmed = trim(&token.term);
            if trimmed.is_empty() || is_stop_word(trimmed) {
                return None;
            }
            Some(Token {
                term: stemmer::stem(trimmed),
                position: token.position,
            })
        })
        .collect()
}
