//! Domain types shared by the corpus, the vector index and the answer pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub type VerseId = String;

/// Number of verses the semantic path retrieves for every question.
pub const TOP_K: usize = 3;

/// One verse of the corpus.
///
/// - `id`: `"chapter.verse"`, derived from the coordinates and globally unique
/// - `original_text`: source-language (Sanskrit) text
/// - `translation`: text used for embedding and display
/// - `transliteration`/`annotations`: optional extras, empty when absent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: VerseId,
    pub chapter: u32,
    pub verse: u32,
    pub original_text: String,
    pub translation: String,
    pub transliteration: String,
    pub annotations: String,
}

impl Record {
    pub fn new(
        chapter: u32,
        verse: u32,
        original_text: impl Into<String>,
        translation: Option<String>,
    ) -> Self {
        let original_text = original_text.into();
        let translation = translation
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| original_text.clone());
        Self {
            id: Self::make_id(chapter, verse),
            chapter,
            verse,
            original_text,
            translation,
            transliteration: String::new(),
            annotations: String::new(),
        }
    }

    pub fn with_transliteration(mut self, transliteration: impl Into<String>) -> Self {
        self.transliteration = transliteration.into();
        self
    }

    pub fn with_annotations(mut self, annotations: impl Into<String>) -> Self {
        self.annotations = annotations.into();
        self
    }

    pub fn make_id(chapter: u32, verse: u32) -> VerseId {
        format!("{chapter}.{verse}")
    }

    /// The text shown to a user: the translation, or the original when the
    /// translation is blank.
    pub fn display_text(&self) -> &str {
        if self.translation.trim().is_empty() {
            &self.original_text
        } else {
            &self.translation
        }
    }
}

/// A question as received, stamped on arrival. Never persisted.
#[derive(Debug, Clone)]
pub struct Query {
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), timestamp: Utc::now() }
    }
}

/// Up to `k` records ranked by descending similarity, without duplicate ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrievalResult {
    records: Vec<Record>,
}

impl RetrievalResult {
    /// Keeps the first occurrence of every id, in rank order, and stops at `k`.
    pub fn from_ranked<I>(ranked: I, k: usize) -> Self
    where
        I: IntoIterator<Item = Record>,
    {
        let mut seen = HashSet::new();
        let records = ranked
            .into_iter()
            .filter(|r| seen.insert(r.id.clone()))
            .take(k)
            .collect();
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The uniform payload returned for every question, whichever path answered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
    #[serde(rename = "usedVerses")]
    pub used_verses: bool,
}

impl AnswerResponse {
    pub fn from_verses(answer: impl Into<String>) -> Self {
        Self { answer: answer.into(), used_verses: true }
    }

    pub fn without_verses(answer: impl Into<String>) -> Self {
        Self { answer: answer.into(), used_verses: false }
    }
}
