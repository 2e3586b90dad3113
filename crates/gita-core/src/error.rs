use thiserror::Error;

use crate::types::AnswerResponse;

/// Answer text sent whenever the semantic path cannot produce a completion.
pub const GENERATION_ERROR_ANSWER: &str = "Error generating response";

/// Answer text sent for an empty or missing question.
pub const EMPTY_QUESTION_ANSWER: &str = "Please enter a question.";

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Corpus load failed: {0}")]
    CorpusLoad(String),

    #[error("Index build failed: {0}")]
    IndexBuild(String),

    #[error("Vector index error: {0}")]
    Index(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Generation service error: {0}")]
    Generation(String),

    #[error("Malformed question: {0}")]
    MalformedQuestion(String),
}

impl Error {
    /// True when the caller sent something unusable, as opposed to a server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MalformedQuestion(_))
    }

    /// The user-facing payload for this failure. Internal details stay in the logs.
    pub fn to_response(&self) -> AnswerResponse {
        match self {
            Self::MalformedQuestion(_) => AnswerResponse::without_verses(EMPTY_QUESTION_ANSWER),
            _ => AnswerResponse::from_verses(GENERATION_ERROR_ANSWER),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
