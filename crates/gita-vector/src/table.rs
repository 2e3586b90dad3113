//! LanceDB connection and housekeeping helpers.
//!
//! Provides database open functions, an ensure-table helper, and a simple
//! key/value `meta` table that remembers which corpus and embedder an index
//! was built from.

use anyhow::Result;
use lancedb::{connect, Connection};

use arrow_array::{RecordBatch, RecordBatchIterator, StringArray, TimestampMillisecondArray};
use std::sync::Arc;
use chrono::Utc;
use lancedb::query::{QueryBase, ExecutableQuery};

use crate::schema::build_meta_schema;

pub const META_TABLE: &str = "meta";

pub async fn open_db(uri: &str) -> Result<Connection> {
    Ok(connect(uri).execute().await?)
}

pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let names = conn.table_names().execute().await?;
    Ok(names.iter().any(|n| n == name))
}

pub async fn ensure_table(conn: &Connection, name: &str, schema: Arc<arrow_schema::Schema>) -> Result<()> {
    if table_exists(conn, name).await? {
        return Ok(());
    }
    let iter = RecordBatchIterator::new(vec![].into_iter(), schema.clone());
    conn.create_table(name, Box::new(iter)).execute().await?;
    Ok(())
}

pub async fn ensure_meta_table(conn: &Connection) -> Result<()> {
    ensure_table(conn, META_TABLE, build_meta_schema()).await
}

fn meta_batch(entries: &[(&str, &str)]) -> Result<RecordBatch> {
    let now = Utc::now().timestamp_millis();
    Ok(RecordBatch::try_new(
        build_meta_schema(),
        vec![
            Arc::new(StringArray::from_iter_values(entries.iter().map(|(k, _)| *k))),
            Arc::new(StringArray::from_iter_values(entries.iter().map(|(_, v)| *v))),
            Arc::new(TimestampMillisecondArray::from(vec![now; entries.len()])),
        ],
    )?)
}

/// Upserts `key = value`; `key` is unique within the meta table.
pub async fn set_meta(conn: &Connection, key: &str, value: &str) -> Result<()> {
    ensure_meta_table(conn).await?;
    let meta = conn.open_table(META_TABLE).execute().await?;
    let batch = meta_batch(&[(key, value)])?;
    let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), build_meta_schema()));
    let mut upsert = meta.merge_insert(&["key"]);
    upsert.when_matched_update_all(None).when_not_matched_insert_all();
    upsert.execute(reader).await?;
    Ok(())
}

pub async fn get_meta(conn: &Connection, key: &str) -> Result<Option<String>> {
    if !table_exists(conn, META_TABLE).await? { return Ok(None); }
    let t = conn.open_table(META_TABLE).execute().await?;
    let mut stream = t.query().only_if(format!("key = '{}'", key.replace('\'', "''"))).execute().await?;
    while let Some(batch) = futures::TryStreamExt::try_next(&mut stream).await? {
        if batch.num_rows() == 0 { continue; }
        let val = batch.column_by_name("value").and_then(|c| c.as_any().downcast_ref::<StringArray>()).ok_or_else(|| anyhow::anyhow!("meta.value column missing"))?;
        return Ok(Some(val.value(0).to_string()));
    }
    Ok(None)
}

pub fn fingerprint_key(table: &str) -> String { format!("corpus_fingerprint:{table}") }

pub fn embedder_key(table: &str) -> String { format!("embedder_id:{table}") }
