pub trait Embedder: Send + Sync {
    /// Stable identifier for the model and its dimensionality (e.g. `minilm:all-MiniLM-L6-v2:d384`).
    fn id(&self) -> &str;
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    /// Embeds every text in one call; vectors are L2-normalized and `dim()` long.
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn embed_one(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector"))
    }
}
