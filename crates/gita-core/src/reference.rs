//! Citation lookup for questions shaped like "chapter 2 verse 47".
//!
//! Any question containing the pattern is answered here, found or not; it is
//! never handed to semantic search.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::corpus::Corpus;
use crate::types::{AnswerResponse, Record};

pub const VERSE_NOT_FOUND_ANSWER: &str = "Sorry, I couldn't find that verse in the Gita.";

static REFERENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"chapter\s+([0-9]+)\s+verse\s+([0-9]+)").expect("reference pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceMatch<'a> {
    Found(&'a Record),
    /// The question cites a verse the corpus does not contain. `citation` is
    /// `None` when the cited numbers do not fit a `u32`.
    NotFound { citation: Option<(u32, u32)> },
    NotAVerseRequest,
}

impl ReferenceMatch<'_> {
    /// `None` means the question has to go through semantic retrieval.
    pub fn into_response(self) -> Option<AnswerResponse> {
        match self {
            Self::Found(record) => Some(AnswerResponse::from_verses(record.display_text())),
            Self::NotFound { .. } => Some(AnswerResponse::from_verses(VERSE_NOT_FOUND_ANSWER)),
            Self::NotAVerseRequest => None,
        }
    }
}

/// Extracts the raw chapter and verse digits if the question cites a verse.
/// Only ASCII digits count; other numerals leave the question to semantic search.
pub fn parse_reference(question: &str) -> Option<(String, String)> {
    let lower = question.to_lowercase();
    let caps = REFERENCE_PATTERN.captures(&lower)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

pub fn try_match<'a>(corpus: &'a Corpus, question: &str) -> ReferenceMatch<'a> {
    let Some((chapter, verse)) = parse_reference(question) else {
        return ReferenceMatch::NotAVerseRequest;
    };
    // Numbers beyond u32 cannot name a verse.
    let citation = chapter.parse::<u32>().ok().zip(verse.parse::<u32>().ok());
    match citation.and_then(|(c, v)| corpus.get(c, v)) {
        Some(record) => ReferenceMatch::Found(record),
        None => ReferenceMatch::NotFound { citation },
    }
}
