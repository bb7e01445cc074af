//! Full-text search index, serialized in the format `lunr.Index.load` reads.
//!
//! The site ships the index as `search-index.json` next to an id → title
//! table (`titles.json`); the browser queries it without any server.

mod pipeline;
mod stemmer;

pub use pipeline::{tokenize, Token, SEARCH_PIPELINE};
pub use stemmer::stem;

use crate::markdown::MarkdownProcessor;
use crate::models::Note;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// lunr release whose serialization format is produced
pub const LUNR_VERSION: &str = "2.3.8";

pub const TITLE_BOOST: f64 = 10.0;

const K1: f64 = 1.2;
const B: f64 = 0.75;

/// Client-side result filtering applied by the search widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Matches scoring at or below this are discarded as noise
    #[serde(default = "default_min_score")]
    pub min_score: f64,

    /// Maximum number of matches displayed
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_min_score() -> f64 {
    2.5
}

fn default_max_results() -> usize {
    5
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            max_results: default_max_results(),
        }
    }
}

/// Term metadata kept per field and document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TermMetadata {
    pub position: Vec<[usize; 2]>,
}

/// Every occurrence of one term, grouped by field then by document ref.
#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    pub index: usize,
    pub fields: Vec<(String, BTreeMap<String, TermMetadata>)>,
}

impl Posting {
    fn new(index: usize, field_names: &[String]) -> Self {
        Self {
            index,
            fields: field_names
                .iter()
                .map(|name| (name.clone(), BTreeMap::new()))
                .collect(),
        }
    }

    /// Number of (field, document) pairs containing the term
    fn document_count(&self) -> usize {
        self.fields.iter().map(|(_, docs)| docs.len()).sum()
    }

    /// Every document ref holding the term in any field
    pub fn refs(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .flat_map(|(_, docs)| docs.keys().map(String::as_str))
    }
}

impl Serialize for Posting {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("_index", &self.index)?;
        for (name, docs) in &self.fields {
            map.serialize_entry(name, docs)?;
        }
        map.end()
    }
}

/// Sparse vector of `(term index, score)` pairs, sorted by term index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldVector(pub Vec<(usize, f64)>);

impl Serialize for FieldVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // lunr stores vectors flattened: [index, score, index, score, ...]
        let mut seq = serializer.serialize_seq(Some(self.0.len() * 2))?;
        for (index, score) in &self.0 {
            seq.serialize_element(index)?;
            seq.serialize_element(score)?;
        }
        seq.end()
    }
}

/// A built index, ready to be written as JSON
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIndex {
    pub version: &'static str,
    pub fields: Vec<String>,
    pub field_vectors: Vec<(String, FieldVector)>,
    pub inverted_index: Vec<(String, Posting)>,
    pub pipeline: Vec<&'static str>,
}

impl SearchIndex {
    /// Every document ref appearing in any posting
    pub fn refs(&self) -> std::collections::BTreeSet<&str> {
        self.inverted_index
            .iter()
            .flat_map(|(_, posting)| posting.refs())
            .collect()
    }

    pub fn posting(&self, term: &str) -> Option<&Posting> {
        self.inverted_index
            .iter()
            .find(|(t, _)| t == term)
            .map(|(_, posting)| posting)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

struct FieldDef {
    name: String,
    boost: f64,
}

/// Term frequencies and length of one field of one document
struct FieldEntry {
    field: usize,
    doc_ref: String,
    length: usize,
    frequencies: Vec<(String, usize)>,
}

/// Incremental index builder, one document at a time.
pub struct IndexBuilder {
    fields: Vec<FieldDef>,
    entries: Vec<FieldEntry>,
    inverted: HashMap<String, Posting>,
    document_count: usize,
    term_index: usize,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            entries: Vec::new(),
            inverted: HashMap::new(),
            document_count: 0,
            term_index: 0,
        }
    }

    /// Register a field; must happen before the first document is added
    pub fn field(mut self, name: impl Into<String>, boost: f64) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            boost,
        });
        self
    }

    fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Add a document. `values` holds the text of each field, in registration order.
    pub fn add(&mut self, doc_ref: &str, values: &[&str]) {
        self.document_count += 1;
        let field_names = self.field_names();

        for (field, name) in field_names.iter().enumerate() {
            let text = values.get(field).copied().unwrap_or("");
            let tokens = pipeline::run(text);

            let mut frequencies: Vec<(String, usize)> = Vec::new();
            for token in &tokens {
                match frequencies.iter_mut().find(|(term, _)| *term == token.term) {
                    Some((_, count)) => *count += 1,
                    None => frequencies.push((token.term.clone(), 1)),
                }

                let next_index = self.term_index;
                let posting = self.inverted.entry(token.term.clone()).or_insert_with(|| {
                    Posting::new(next_index, &field_names)
                });
                if posting.index == next_index {
                    self.term_index += 1;
                }

                posting.fields[field]
                    .1
                    .entry(doc_ref.to_string())
                    .or_default()
                    .position
                    .push(token.position);
            }

            tracing::trace!("Indexed {}/{}: {} terms", name, doc_ref, tokens.len());
            self.entries.push(FieldEntry {
                field,
                doc_ref: doc_ref.to_string(),
                length: tokens.len(),
                frequencies,
            });
        }
    }

    fn average_field_lengths(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.fields.len()];
        let mut counts = vec![0.0; self.fields.len()];
        for entry in &self.entries {
            totals[entry.field] += entry.length as f64;
            counts[entry.field] += 1.0;
        }
        totals
            .into_iter()
            .zip(counts)
            .map(|(total, count)| if count > 0.0 { total / count } else { 0.0 })
            .collect()
    }

    fn idf(&self, posting: &Posting) -> f64 {
        let with_term = posting.document_count() as f64;
        let n = self.document_count as f64;
        let x = (n - with_term + 0.5) / (with_term + 0.5);
        (1.0 + x.abs()).ln()
    }

    pub fn build(self) -> SearchIndex {
        let averages = self.average_field_lengths();
        let mut idf_cache: HashMap<&str, f64> = HashMap::new();

        let field_vectors = self
            .entries
            .iter()
            .map(|entry| {
                let field = &self.fields[entry.field];
                let average = averages[entry.field];

                let mut vector: Vec<(usize, f64)> = entry
                    .frequencies
                    .iter()
                    .filter_map(|(term, tf)| {
                        let posting = self.inverted.get(term)?;
                        let idf = *idf_cache
                            .entry(term.as_str())
                            .or_insert_with(|| self.idf(posting));
                        let tf = *tf as f64;
                        let norm = 1.0 - B + B * (entry.length as f64 / average);
                        let score = idf * ((K1 + 1.0) * tf) / (K1 * norm + tf) * field.boost;
                        Some((posting.index, (score * 1000.0).round() / 1000.0))
                    })
                    .collect();
                vector.sort_by_key(|(index, _)| *index);

                (
                    format!("{}/{}", field.name, entry.doc_ref),
                    FieldVector(vector),
                )
            })
            .collect();

        let fields = self.field_names();
        let mut inverted_index: Vec<(String, Posting)> = self.inverted.into_iter().collect();
        // Browsers compare strings by UTF-16 code units; the index loader expects that order.
        inverted_index.sort_by(|(a, _), (b, _)| a.encode_utf16().cmp(b.encode_utf16()));

        SearchIndex {
            version: LUNR_VERSION,
            fields,
            field_vectors,
            inverted_index,
            pipeline: SEARCH_PIPELINE.to_vec(),
        }
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The two files the site's search widget loads
#[derive(Debug, Clone)]
pub struct SearchArtifacts {
    pub index: SearchIndex,
    pub titles: BTreeMap<String, String>,
}

/// Index the title and plain-text body of every note.
///
/// Notes are indexed regardless of length; an empty note still gets a ref
/// and a titles entry.
pub fn build_index(notes: &[&Note]) -> SearchArtifacts {
    let markdown = MarkdownProcessor::new();
    let mut builder = IndexBuilder::new()
        .field("title", TITLE_BOOST)
        .field("body", 1.0);
    let mut titles = BTreeMap::new();

    for note in notes {
        let doc_ref = note.id.to_string();
        let body = markdown.to_plain_text(&note.body);
        builder.add(&doc_ref, &[&note.title, &body]);
        titles.insert(doc_ref, note.title.clone());
    }

    tracing::debug!("Built search index over {} notes", titles.len());
    SearchArtifacts {
        index: builder.build(),
        titles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn note(id: i64, title: &str, body: &str) -> Note {
        Note::new(id, title, body)
    }

    fn vector<'a>(index: &'a SearchIndex, key: &str) -> &'a FieldVector {
        &index
            .field_vectors
            .iter()
            .find(|(k, _)| k == key)
            .unwrap()
            .1
    }

    #[test]
    fn test_titles_match_index_refs() {
        let notes = [
            note(1, "Rust ownership", "Borrowing rules explained."),
            note(2, "Gardening", "Tomatoes need sun."),
            note(3, "", ""),
        ];
        let refs: Vec<&Note> = notes.iter().collect();
        let artifacts = build_index(&refs);

        let titles: BTreeSet<&str> = artifacts.titles.keys().map(String::as_str).collect();
        let field_refs: BTreeSet<&str> = artifacts
            .index
            .field_vectors
            .iter()
            .filter_map(|(key, _)| key.split_once('/').map(|(_, r)| r))
            .collect();

        assert_eq!(titles, field_refs);
        assert_eq!(titles, BTreeSet::from(["1", "2", "3"]));
        // Note 3 has no terms, so only the others can show up in postings.
        assert_eq!(artifacts.index.refs(), BTreeSet::from(["1", "2"]));
        assert_eq!(artifacts.titles["2"], "Gardening");
    }

    #[test]
    fn test_empty_note_is_still_indexed() {
        let notes = [note(7, "", "")];
        let refs: Vec<&Note> = notes.iter().collect();
        let artifacts = build_index(&refs);

        assert_eq!(artifacts.titles.get("7").map(String::as_str), Some(""));
        assert_eq!(artifacts.index.field_vectors.len(), 2);
        assert_eq!(artifacts.index.field_vectors[0].0, "title/7");
        assert_eq!(artifacts.index.field_vectors[1].0, "body/7");
    }

    #[test]
    fn test_serialized_shape() {
        let notes = [note(1, "Hello", "hello world")];
        let refs: Vec<&Note> = notes.iter().collect();
        let json: serde_json::Value =
            serde_json::from_str(&build_index(&refs).index.to_json().unwrap()).unwrap();

        assert_eq!(json["version"], "2.3.8");
        assert_eq!(json["fields"], serde_json::json!(["title", "body"]));
        assert_eq!(json["pipeline"], serde_json::json!(["stemmer"]));

        let inverted = json["invertedIndex"].as_array().unwrap();
        assert_eq!(inverted[0][0], "hello");
        assert_eq!(inverted[0][1]["_index"], 0);
        assert_eq!(
            inverted[0][1]["title"]["1"]["position"],
            serde_json::json!([[0, 5]])
        );
        assert_eq!(
            inverted[0][1]["body"]["1"]["position"],
            serde_json::json!([[0, 5]])
        );
        assert_eq!(inverted[1][0], "world");

        let title_vector = &json["fieldVectors"][0];
        assert_eq!(title_vector[0], "title/1");
        assert_eq!(title_vector[1].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_terms_sorted_and_stemmed() {
        let notes = [note(1, "Zebra", "apples running")];
        let refs: Vec<&Note> = notes.iter().collect();
        let index = build_index(&refs).index;

        let terms: Vec<&str> = index.inverted_index.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(terms, vec!["appl", "run", "zebra"]);
        // Term indices follow first appearance, not sort order.
        assert_eq!(index.posting("zebra").unwrap().index, 0);
        assert_eq!(index.posting("appl").unwrap().index, 1);
    }

    #[test]
    fn test_title_matches_outscore_body_matches() {
        let notes = [
            note(1, "Compilers", "Notes about parsing."),
            note(2, "Parsing", "Notes about compilers."),
        ];
        let refs: Vec<&Note> = notes.iter().collect();
        let index = build_index(&refs).index;

        let term = index.posting("pars").unwrap().index;
        let score = |key: &str| {
            vector(&index, key)
                .0
                .iter()
                .find(|(i, _)| *i == term)
                .map(|(_, s)| *s)
                .unwrap()
        };
        assert!(score("title/2") > score("body/1"));
    }

    #[test]
    fn test_bm25_score_value() {
        // One document: idf = ln(1 + 0.5 / 1.5); tf = 1 and length equals the average.
        let mut builder = IndexBuilder::new().field("body", 1.0);
        builder.add("a", &["word"]);
        let index = builder.build();

        let expected = ((1.0f64 + 0.5 / 1.5).ln() * 2.2 / 2.2 * 1000.0).round() / 1000.0;
        assert_eq!(index.field_vectors[0].1 .0, vec![(0, expected)]);
        assert_eq!(expected, 0.288);
    }

    #[test]
    fn test_order_does_not_change_scores() {
        let a = note(1, "Alpha", "shared words here");
        let b = note(2, "Beta", "other shared words");

        let forward = build_index(&[&a, &b]).index;
        let backward = build_index(&[&b, &a]).index;

        let scores = |index: &SearchIndex, key: &str, term: &str| {
            let term_index = index.posting(term).unwrap().index;
            vector(index, key)
                .0
                .iter()
                .find(|(i, _)| *i == term_index)
                .map(|(_, s)| *s)
        };

        for key in ["title/1", "body/1", "title/2", "body/2"] {
            for term in ["share", "word", "alpha", "beta"] {
                assert_eq!(scores(&forward, key, term), scores(&backward, key, term));
            }
        }
        assert_eq!(forward.refs(), backward.refs());
    }

    #[test]
    fn test_settings_defaults() {
        let settings = SearchSettings::default();
        assert_eq!(settings.min_score, 2.5);
        assert_eq!(settings.max_results, 5);
    }
}
