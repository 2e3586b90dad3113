//! One-time construction of the verse index.
//!
//! The table is created empty first, then every translation is embedded in a
//! single batch and appended in a single write. An existing table is never
//! touched. A failure after creation leaves a partial table that later opens
//! reuse as-is; deleting the database directory is the only way to rebuild.

use anyhow::anyhow;
use arrow_array::{FixedSizeListArray, Int32Array, RecordBatch, RecordBatchIterator, StringArray};
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::Connection;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use gita_core::corpus::fingerprint_records;
use gita_core::error::{Error, Result};
use gita_core::traits::Embedder;
use gita_core::types::Record;

use crate::schema::build_verse_schema;
use crate::table::{embedder_key, ensure_table, fingerprint_key, get_meta, open_db, set_meta, table_exists, META_TABLE};
use crate::VerseIndex;

fn index_err(e: impl std::fmt::Display) -> Error { Error::Index(format!("{e:#}")) }

/// Open the index named `name` under `db_uri`, building it from `records` only if it does not exist yet.
pub async fn ensure_index(db_uri: &str, name: &str, records: &[Record], embedder: Arc<dyn Embedder>) -> Result<VerseIndex> {
    if name == META_TABLE {
        return Err(Error::InvalidConfig(format!("index table name '{META_TABLE}' is reserved")));
    }
    let conn = open_db(db_uri).await.map_err(index_err)?;
    let fingerprint = fingerprint_records(records);

    if table_exists(&conn, name).await.map_err(index_err)? {
        let table = conn.open_table(name).execute().await.map_err(index_err)?;
        check_provenance(&conn, name, &fingerprint, embedder.id()).await?;
        let index = VerseIndex { conn, table, name: name.to_string(), embedder };
        info!(table = name, rows = index.count().await.unwrap_or(0), "reusing existing verse index");
        return Ok(index);
    }

    info!(table = name, records = records.len(), embedder = embedder.id(), "building verse index");
    let dim = i32::try_from(embedder.dim()).map_err(|_| Error::InvalidConfig(format!("embedding dim {} too large", embedder.dim())))?;
    ensure_table(&conn, name, build_verse_schema(dim)).await.map_err(index_err)?;

    // From here on the table exists; any failure leaves it partially built.
    match build(conn, name, records, embedder, dim, &fingerprint).await {
        Ok(index) => {
            info!(table = name, rows = records.len(), "verse index built");
            Ok(index)
        }
        Err(e) => {
            error!(table = name, error = %format!("{e:#}"), "verse index build failed; table left partially populated");
            Err(Error::IndexBuild(format!("{e:#}")))
        }
    }
}

async fn build(conn: Connection, name: &str, records: &[Record], embedder: Arc<dyn Embedder>, dim: i32, fingerprint: &str) -> anyhow::Result<VerseIndex> {
    let table = conn.open_table(name).execute().await?;
    set_meta(&conn, &embedder_key(name), embedder.id()).await?;
    let index = VerseIndex { conn, table, name: name.to_string(), embedder };

    let pb = ProgressBar::new_spinner();
    let populated = populate(&index, records, dim, &pb).await;
    pb.finish_and_clear();
    populated?;

    set_meta(&index.conn, &fingerprint_key(name), fingerprint).await?;
    Ok(index)
}

async fn check_provenance(conn: &Connection, name: &str, fingerprint: &str, embedder_id: &str) -> Result<()> {
    match get_meta(conn, &embedder_key(name)).await.map_err(index_err)? {
        Some(stored) if stored != embedder_id => {
            return Err(Error::InvalidConfig(format!(
                "index '{name}' was built with embedder {stored}, but {embedder_id} is configured; delete the index to rebuild"
            )));
        }
        _ => {}
    }
    match get_meta(conn, &fingerprint_key(name)).await.map_err(index_err)? {
        Some(stored) if stored != fingerprint => warn!(table = name, "corpus changed since the index was built; delete the index to rebuild"),
        None => warn!(table = name, "index build never completed; semantic search may miss verses"),
        Some(_) => {}
    }
    Ok(())
}

async fn populate(index: &VerseIndex, records: &[Record], dim: i32, pb: &ProgressBar) -> anyhow::Result<()> {
    if records.is_empty() { return Ok(()); }
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(format!("embedding {} verses", records.len()));
    pb.enable_steady_tick(Duration::from_millis(120));

    let texts: Vec<String> = records.iter().map(|r| r.translation.clone()).collect();
    let embedder = index.embedder.clone();
    let embeddings = tokio::task::spawn_blocking(move || embedder.embed_batch(&texts)).await??;
    if embeddings.len() != records.len() { return Err(anyhow!("embedder returned {} vectors for {} verses", embeddings.len(), records.len())); }
    if let Some(v) = embeddings.iter().find(|v| v.len() != dim as usize) { return Err(anyhow!("dim mismatch: got {} expected {}", v.len(), dim)); }

    pb.set_message(format!("writing {} rows", records.len()));
    let batch = records_to_batch(records, &embeddings, dim)?;
    let schema = batch.schema();
    let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
    index.table.add(reader).execute().await?;
    Ok(())
}

fn records_to_batch(records: &[Record], embeddings: &[Vec<f32>], dim: i32) -> anyhow::Result<RecordBatch> {
    let mut ids = Vec::new(); let mut chapters = Vec::new(); let mut verses = Vec::new(); let mut texts = Vec::new(); let mut translations = Vec::new(); let mut transliterations = Vec::new(); let mut annotations = Vec::new(); let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::new();
    for (r, v) in records.iter().zip(embeddings) {
        ids.push(r.id.clone()); chapters.push(i32::try_from(r.chapter)?); verses.push(i32::try_from(r.verse)?);
        texts.push(r.original_text.clone()); translations.push(r.translation.clone()); transliterations.push(r.transliteration.clone()); annotations.push(r.annotations.clone());
        vectors.push(Some(v.iter().map(|&x| Some(x)).collect()));
    }
    Ok(RecordBatch::try_new(build_verse_schema(dim), vec![
        Arc::new(StringArray::from(ids)),
        Arc::new(Int32Array::from(chapters)),
        Arc::new(Int32Array::from(verses)),
        Arc::new(StringArray::from(texts)),
        Arc::new(StringArray::from(translations)),
        Arc::new(StringArray::from(transliterations)),
        Arc::new(StringArray::from(annotations)),
        Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors.into_iter(), dim)),
    ])?)
}
