use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use gita_core::config::Config;
use gita_core::corpus::Corpus;
use gita_embed::load_embedder;
use gita_rag::{Pipeline, Synthesizer};
use gita_server::{init_tracing, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;

    let corpus = Arc::new(Corpus::load(Path::new(&settings.corpus.path))?);
    let embedder = load_embedder(&settings.embedding)?;
    if settings.generation.api_token.is_none() {
        warn!("no generation API token configured (HF_API_TOKEN); open questions will fail");
    }
    if let Some(base) = &settings.server.api_base {
        info!(api_base = %base, "public API base");
    }
    let synthesizer = Synthesizer::new(settings.generation.clone())?;
    let pipeline = Arc::new(Pipeline::new(corpus, embedder, settings.index.clone(), synthesizer));

    let warm = pipeline.clone();
    tokio::spawn(async move { warm.warm().await });

    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("gita-server listening on {}", bind_addr);
    info!("  POST /query");
    info!("  GET /debug");
    info!("  GET /daily-verse");
    info!("  GET /health");
    axum::serve(listener, router(pipeline)).await?;
    Ok(())
}
