use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::DistanceType;
use tracing::debug;

use gita_core::error::{Error, Result};
use gita_core::types::RetrievalResult;

use crate::{distances, records_from_batch, VerseIndex};

impl VerseIndex {
    /// Embed `question` with the index's embedder and return the `k` nearest verses by cosine distance.
    /// An empty table yields an empty result.
    pub async fn search(&self, question: &str, k: usize) -> Result<RetrievalResult> {
        if k == 0 { return Ok(RetrievalResult::default()); }
        let rows = self.table.count_rows(None).await.map_err(|e| Error::Index(e.to_string()))?;
        if rows == 0 { return Ok(RetrievalResult::default()); }

        let embedder = self.embedder.clone(); let text = question.to_string();
        let query_vec = tokio::task::spawn_blocking(move || embedder.embed_one(&text)).await
            .map_err(|e| Error::Embedding(e.to_string()))?
            .map_err(|e| Error::Embedding(format!("{e:#}")))?;

        let index_err = |e: lancedb::Error| Error::Index(e.to_string());
        let mut stream = self.table.vector_search(query_vec).map_err(index_err)?.distance_type(DistanceType::Cosine).limit(k).execute().await.map_err(index_err)?;
        let mut ranked = Vec::new();
        while let Some(batch) = stream.try_next().await.map_err(index_err)? {
            let dist = distances(&batch);
            for (row, record) in records_from_batch(&batch).map_err(|e| Error::Index(format!("{e:#}")))? {
                let d = dist.map_or(f32::MAX, |col| col.value(row));
                ranked.push((d, record));
            }
        }
        ranked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        let result = RetrievalResult::from_ranked(ranked.into_iter().map(|(_, r)| r), k);
        debug!(k, hits = result.len(), ids = ?result.ids(), "semantic search");
        Ok(result)
    }
}
