use std::{env, fs, path::Path};

use gita_core::config::Config;
use gita_core::corpus::Corpus;
use gita_embed::load_embedder;
use gita_vector::ensure_index;

fn main() -> anyhow::Result<()> {
    gita_server::init_tracing();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    let rebuild = env::args().skip(1).any(|a| a == "--rebuild" || a == "-r");

    println!("Gita Verse Indexer\n==================");
    println!("Corpus: {}", settings.corpus.path);
    let corpus = Corpus::load(Path::new(&settings.corpus.path))?;

    let db_dir = Path::new(&settings.index.db_dir);
    if rebuild && db_dir.exists() {
        println!("⚠️  Removing existing index at {} (--rebuild)", db_dir.display());
        fs::remove_dir_all(db_dir)?;
    }
    fs::create_dir_all(db_dir)?;

    let embedder = load_embedder(&settings.embedding)?;
    let index = tokio::runtime::Runtime::new()?.block_on(async {
        let index = ensure_index(&settings.index.db_dir, &settings.index.table, corpus.records(), embedder).await?;
        let rows = index.count().await?;
        anyhow::Ok((index.name().to_string(), rows))
    })?;

    println!("\n✅ Index '{}' ready at {}", index.0, db_dir.display());
    println!("📊 {} verses in corpus, {} rows indexed", corpus.len(), index.1);
    println!("\n💡 Start the service with: cargo run --bin gita-server");
    Ok(())
}
