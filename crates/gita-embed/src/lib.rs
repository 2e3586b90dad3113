use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use gita_core::config::{EmbeddingBackend, EmbeddingSettings};
use gita_core::traits::Embedder;

mod device;
mod pool;
mod tokenize;

pub use device::select_device;
pub use pool::masked_mean_l2;
pub use tokenize::tokenize_batch;

/// Sentence embedder for `all-MiniLM-L6-v2` (BERT encoder, mean pooling, L2 norm).
pub struct MiniLmEmbedder { model: BertModel, tokenizer: Tokenizer, device: Device, pad_id: u32, dim: usize, max_len: usize, batch_size: usize, id: String }

impl MiniLmEmbedder {
    pub fn new(settings: &EmbeddingSettings) -> Result<Self> {
        let device = select_device();
        let model_dir = resolve_model_dir(Path::new(&settings.model_dir))?;
        info!(model_dir = %model_dir.display(), "loading sentence embedding model");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let config_path = model_dir.join("config.json");
        let config: BertConfig = serde_json::from_str(&std::fs::read_to_string(&config_path).with_context(|| format!("reading {}", config_path.display()))?)?;
        let weights = load_weights(&model_dir, &device)?;
        let vb = VarBuilder::from_tensors(weights, DTYPE, &device);
        let model = BertModel::load(vb, &config)?;
        let pad_id = tokenizer.token_to_id("[PAD]").unwrap_or(0);
        let model_name = model_dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "minilm".to_string());
        let id = format!("minilm:{}:d{}", model_name, settings.dim);
        info!(%id, "embedding model loaded");
        Ok(Self { model, tokenizer, device, pad_id, dim: settings.dim, max_len: settings.max_len, batch_size: settings.batch_size, id })
    }

    fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let (input_ids, attention_mask) = tokenize_batch(&self.tokenizer, texts, self.max_len, self.pad_id, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let vectors: Vec<Vec<f32>> = pooled.to_device(&Device::Cpu)?.to_vec2()?;
        if let Some(v) = vectors.iter().find(|v| v.len() != self.dim) {
            return Err(anyhow!("dim mismatch: model produced {} expected {}", v.len(), self.dim));
        }
        Ok(vectors)
    }
}

impl Embedder for MiniLmEmbedder {
    fn id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { self.max_len }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let start = Instant::now();
        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            out.extend(self.embed_chunk(chunk)?);
        }
        debug!(count = texts.len(), elapsed_ms = start.elapsed().as_millis() as u64, "embedded batch");
        Ok(out)
    }
}

/// Deterministic token-hashing embedder for tests and development without model weights.
pub struct FakeEmbedder { dim: usize, id: String }

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim, id: format!("fake:xxhash64:d{dim}") } }
}

impl Embedder for FakeEmbedder {
    fn id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { usize::MAX }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

impl FakeEmbedder {
    fn embed_text(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher}; use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.to_lowercase().split_whitespace().enumerate() {
            let token = token.trim_matches(|c: char| !c.is_alphanumeric());
            if token.is_empty() { continue; }
            let mut hasher = XxHash64::with_seed(0); token.hash(&mut hasher); let h = hasher.finish();
            let idx = (h as usize) % self.dim; let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6); for x in &mut v { *x /= norm; } v
    }
}

/// Build the configured embedder. `APP_USE_FAKE_EMBEDDINGS=1` forces the fake one.
pub fn load_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false);
    if use_fake || settings.backend == EmbeddingBackend::Fake {
        warn!(dim = settings.dim, "using FakeEmbedder; semantic search quality is not representative");
        return Ok(Arc::new(FakeEmbedder::new(settings.dim)));
    }
    Ok(Arc::new(MiniLmEmbedder::new(settings)?))
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        return Ok(candle_core::safetensors::load(&safetensors, device)?);
    }
    let pickle = model_dir.join("pytorch_model.bin");
    let weights = candle_core::pickle::read_all(&pickle).with_context(|| format!("no model.safetensors or readable {}", pickle.display()))?;
    let mut map = HashMap::with_capacity(weights.len());
    for (name, tensor) in weights { map.insert(name, tensor.to_device(device)?); }
    Ok(map)
}

fn resolve_model_dir(configured: &Path) -> Result<PathBuf> {
    if configured.exists() { return Ok(configured.to_path_buf()); }
    if let Ok(dir) = std::env::var("MODEL_DIR") { let p = PathBuf::from(&dir); if p.exists() { info!(dir = %p.display(), "using MODEL_DIR"); return Ok(p); } }
    Err(anyhow!("Could not locate embedding model directory {} (download sentence-transformers/all-MiniLM-L6-v2 there or set MODEL_DIR)", configured.display()))
}
