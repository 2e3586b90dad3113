//! Request orchestration.
//!
//! A question is validated, then routed: a chapter/verse citation is answered
//! straight from the corpus, anything else goes through retrieval and
//! synthesis. The index is opened (or built) at most once per process and
//! shared by every request.

use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use gita_core::config::IndexSettings;
use gita_core::corpus::Corpus;
use gita_core::error::{Error, Result};
use gita_core::reference::{try_match, ReferenceMatch};
use gita_core::traits::Embedder;
use gita_core::types::{AnswerResponse, Query, RetrievalResult, TOP_K};
use gita_vector::{ensure_index, VerseIndex};

use crate::synthesizer::Synthesizer;

pub struct Pipeline {
    corpus: Arc<Corpus>,
    embedder: Arc<dyn Embedder>,
    index_settings: IndexSettings,
    index: OnceCell<VerseIndex>,
    synthesizer: Synthesizer,
}

impl Pipeline {
    pub fn new(corpus: Arc<Corpus>, embedder: Arc<dyn Embedder>, index_settings: IndexSettings, synthesizer: Synthesizer) -> Self {
        Self { corpus, embedder, index_settings, index: OnceCell::new(), synthesizer }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn index_ready(&self) -> bool {
        self.index.initialized()
    }

    /// The shared index. Concurrent callers await one initialization; a failed
    /// attempt leaves the cell empty for the next caller.
    pub async fn index(&self) -> Result<&VerseIndex> {
        self.index
            .get_or_try_init(|| async {
                ensure_index(&self.index_settings.db_dir, &self.index_settings.table, self.corpus.records(), self.embedder.clone()).await
            })
            .await
    }

    /// Background warm-up so the first question does not pay for the build.
    pub async fn warm(&self) {
        match self.index().await {
            Ok(index) => info!(table = index.name(), "verse index ready"),
            Err(e) => warn!(error = %e, "index warm-up failed; will retry on first question"),
        }
    }

    pub async fn retrieve(&self, question: &str, k: usize) -> Result<RetrievalResult> {
        self.index().await?.search(question, k).await
    }

    pub async fn answer(&self, question: &str) -> Result<AnswerResponse> {
        let query = Query::new(question.trim());
        if query.text.is_empty() {
            return Err(Error::MalformedQuestion("question is empty".into()));
        }
        debug!(question = %query.text, at = %query.timestamp, "routing question");

        let matched = try_match(&self.corpus, &query.text);
        if let ReferenceMatch::NotFound { citation } = &matched {
            info!(?citation, "cited verse not in corpus");
        }
        if let Some(response) = matched.into_response() {
            return Ok(response);
        }

        let retrieval = self.retrieve(&query.text, TOP_K).await?;
        if retrieval.is_empty() {
            warn!("semantic search returned no verses; prompting without context");
        }
        let answer = self.synthesizer.synthesize(&query.text, &retrieval).await?;
        info!(verses = ?retrieval.ids(), chars = answer.len(), "answered from retrieved verses");
        Ok(AnswerResponse::from_verses(answer))
    }
}
