//! Loads the shipped verse dataset into an ordered, read-only [`Corpus`].
//!
//! Two numbering schemes exist in the wild: `chapter_number`/`verse_number`
//! and the older `chapter_id`/`verse_order`. Each coordinate takes the
//! primary field when it holds a positive number and falls back to the
//! alternate field otherwise. Entries that end up without both coordinates,
//! without text, or with an id already seen are skipped.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::types::Record;

/// One dataset entry as shipped, before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVerse {
    #[serde(flatten)]
    pub primary: PrimaryNumbering,
    #[serde(flatten)]
    pub alternate: AlternateNumbering,
    pub text: Option<String>,
    pub translation: Option<String>,
    pub transliteration: Option<String>,
    pub word_meanings: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PrimaryNumbering {
    pub chapter_number: Option<i64>,
    pub verse_number: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AlternateNumbering {
    pub chapter_id: Option<i64>,
    pub verse_order: Option<i64>,
}

fn coordinate(primary: Option<i64>, alternate: Option<i64>) -> Option<u32> {
    let positive = |n: i64| u32::try_from(n).ok().filter(|&n| n >= 1);
    primary.and_then(positive).or_else(|| alternate.and_then(positive))
}

impl RawVerse {
    /// `(chapter, verse)` after applying the primary-then-alternate precedence.
    pub fn coordinates(&self) -> Option<(u32, u32)> {
        let chapter = coordinate(self.primary.chapter_number, self.alternate.chapter_id)?;
        let verse = coordinate(self.primary.verse_number, self.alternate.verse_order)?;
        Some((chapter, verse))
    }

    pub fn into_record(self) -> Option<Record> {
        let (chapter, verse) = self.coordinates()?;
        let text = self.text.filter(|t| !t.trim().is_empty())?;
        Some(
            Record::new(chapter, verse, text, self.translation)
                .with_transliteration(self.transliteration.unwrap_or_default())
                .with_annotations(self.word_meanings.unwrap_or_default()),
        )
    }
}

#[derive(Debug, Clone)]
pub struct Corpus {
    records: Vec<Record>,
    by_coordinates: HashMap<(u32, u32), usize>,
}

impl Corpus {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::CorpusLoad(format!("cannot read {}: {}", path.display(), e)))?;
        let corpus = Self::from_json_str(&content)?;
        info!(path = %path.display(), records = corpus.len(), "corpus loaded");
        Ok(corpus)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: Vec<RawVerse> = serde_json::from_str(content)
            .map_err(|e| Error::CorpusLoad(format!("invalid verse JSON: {e}")))?;
        Self::from_raw(raw)
    }

    pub fn from_raw(raw: Vec<RawVerse>) -> Result<Self> {
        let total = raw.len();
        let mut records = Vec::with_capacity(total);
        for (position, entry) in raw.into_iter().enumerate() {
            match entry.into_record() {
                Some(record) => records.push(record),
                None => warn!(position, "skipping verse without usable numbering or text"),
            }
        }
        debug!(total, kept = records.len(), "normalized raw verses");
        Self::from_records(records)
    }

    pub fn from_records(records: Vec<Record>) -> Result<Self> {
        let mut kept = Vec::with_capacity(records.len());
        let mut by_coordinates = HashMap::with_capacity(records.len());
        for record in records {
            let key = (record.chapter, record.verse);
            if by_coordinates.contains_key(&key) {
                warn!(id = %record.id, "skipping duplicate verse id");
                continue;
            }
            by_coordinates.insert(key, kept.len());
            kept.push(record);
        }
        if kept.is_empty() {
            return Err(Error::CorpusLoad("dataset contains no usable verses".into()));
        }
        Ok(Self { records: kept, by_coordinates })
    }

    /// Exact `(chapter, verse)` lookup.
    pub fn get(&self, chapter: u32, verse: u32) -> Option<&Record> {
        self.by_coordinates.get(&(chapter, verse)).map(|&i| &self.records[i])
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Content hash over every record in order; changes whenever the shipped
    /// dataset changes.
    pub fn fingerprint(&self) -> String {
        fingerprint_records(&self.records)
    }

    /// Rotates through the corpus by day of year (1 January is day 1).
    pub fn verse_of_the_day(&self, date: NaiveDate) -> &Record {
        let index = date.ordinal() as usize % self.records.len();
        &self.records[index]
    }
}

/// blake3 over every field of every record, in order.
pub fn fingerprint_records(records: &[Record]) -> String {
    let mut hasher = blake3::Hasher::new();
    for r in records {
        for field in [&r.id, &r.original_text, &r.translation, &r.transliteration, &r.annotations] {
            hasher.update(field.as_bytes());
            hasher.update(&[0]);
        }
    }
    hasher.finalize().to_hex().to_string()
}
