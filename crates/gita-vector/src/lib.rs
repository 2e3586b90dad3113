//! Persistent verse index on LanceDB.
//!
//! [`VerseIndex::ensure`] opens the named table or builds it exactly once;
//! [`VerseIndex::search`] answers top-k similarity queries against it.

use anyhow::{anyhow, Result};
use arrow_array::cast::AsArray;
use arrow_array::{Array, FixedSizeListArray, Float32Array, Int32Array, RecordBatch, StringArray};
use futures::TryStreamExt;
use lancedb::query::ExecutableQuery;
use lancedb::{Connection, Table};
use serde::Serialize;
use std::sync::Arc;

use gita_core::traits::Embedder;
use gita_core::types::Record;

pub mod index_build;
pub mod schema;
pub mod search;
pub mod table;

pub use index_build::ensure_index;

/// A stored row: the verse id, the embedded document and its metadata.
#[derive(Debug, Clone, Serialize)]
pub struct IndexEntry {
    pub id: String,
    pub document: String,
    pub metadata: Record,
    #[serde(skip)]
    pub vector: Vec<f32>,
}

#[derive(Clone)]
pub struct VerseIndex {
    pub(crate) conn: Connection,
    pub(crate) table: Table,
    pub(crate) name: String,
    pub(crate) embedder: Arc<dyn Embedder>,
}

impl VerseIndex {
    pub fn name(&self) -> &str { &self.name }

    pub fn connection(&self) -> &Connection { &self.conn }

    pub fn embedder(&self) -> &Arc<dyn Embedder> { &self.embedder }

    pub async fn count(&self) -> Result<usize> {
        Ok(self.table.count_rows(None).await?)
    }

    /// Full scan of the stored entries, in storage order.
    pub async fn entries(&self) -> Result<Vec<IndexEntry>> {
        let mut stream = self.table.query().execute().await?;
        let mut out = Vec::new();
        while let Some(batch) = stream.try_next().await? {
            let vectors = batch.column_by_name("vector").and_then(|c| c.as_any().downcast_ref::<FixedSizeListArray>());
            for (row, record) in records_from_batch(&batch)? {
                let vector = match vectors {
                    Some(fsl) if fsl.is_valid(row) => fsl.value(row).as_primitive::<arrow_array::types::Float32Type>().values().to_vec(),
                    _ => Vec::new(),
                };
                out.push(IndexEntry { id: record.id.clone(), document: record.translation.clone(), metadata: record, vector });
            }
        }
        Ok(out)
    }
}

fn string_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch.column_by_name(name).and_then(|c| c.as_any().downcast_ref::<StringArray>()).ok_or_else(|| anyhow!("missing {name} column"))
}

fn int_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Int32Array> {
    batch.column_by_name(name).and_then(|c| c.as_any().downcast_ref::<Int32Array>()).ok_or_else(|| anyhow!("missing {name} column"))
}

/// Rebuilds the metadata of every row, skipping rows whose id or coordinates are null.
pub(crate) fn records_from_batch(batch: &RecordBatch) -> Result<Vec<(usize, Record)>> {
    let ids = string_col(batch, "id")?;
    let chapters = int_col(batch, "chapter")?;
    let verses = int_col(batch, "verse")?;
    let texts = string_col(batch, "text")?;
    let translations = string_col(batch, "translation")?;
    let transliterations = string_col(batch, "transliteration")?;
    let annotations = string_col(batch, "annotations")?;
    let text_at = |col: &StringArray, i: usize| if col.is_valid(i) { col.value(i).to_string() } else { String::new() };

    let mut out = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        if ids.is_null(i) || chapters.is_null(i) || verses.is_null(i) || ids.value(i).is_empty() { continue; }
        let (Ok(chapter), Ok(verse)) = (u32::try_from(chapters.value(i)), u32::try_from(verses.value(i))) else { continue };
        out.push((i, Record {
            id: ids.value(i).to_string(),
            chapter,
            verse,
            original_text: text_at(texts, i),
            translation: text_at(translations, i),
            transliteration: text_at(transliterations, i),
            annotations: text_at(annotations, i),
        }));
    }
    Ok(out)
}

pub(crate) fn distances(batch: &RecordBatch) -> Option<&Float32Array> {
    batch.column_by_name("_distance").and_then(|c| c.as_any().downcast_ref::<Float32Array>())
}
