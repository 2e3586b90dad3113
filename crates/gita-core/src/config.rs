//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (`__` separates nested keys, e.g. `APP_GENERATION__ENDPOINT`). The bearer
//! token and public API base also honour `HF_API_TOKEN` and
//! `NEXT_PUBLIC_API_BASE`. Relative paths resolve against the directory the
//! config was loaded from.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Error;

pub const TOKEN_ENV: &str = "HF_API_TOKEN";
pub const API_BASE_ENV: &str = "NEXT_PUBLIC_API_BASE";

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("."))
    }

    pub fn load_from(base_dir: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file(base_dir.join("config.toml")));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(base_dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base_dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base_dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        Ok(Self { figment, base_dir: base_dir.to_path_buf() })
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Extract the typed settings, apply the legacy env fallbacks, resolve
    /// paths and validate.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract settings: {}", e))?;

        if settings.generation.api_token.as_deref().map_or(true, str::is_empty) {
            settings.generation.api_token = non_empty_env(TOKEN_ENV);
        }
        if settings.server.api_base.is_none() {
            settings.server.api_base = non_empty_env(API_BASE_ENV);
        }

        settings.corpus.path = resolve_string(&self.base_dir, &settings.corpus.path);
        settings.index.db_dir = resolve_string(&self.base_dir, &settings.index.db_dir);
        settings.embedding.model_dir = resolve_string(&self.base_dir, &settings.embedding.model_dir);

        settings.validate()?;
        Ok(settings)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn resolve_string(base: &Path, p: &str) -> String {
    resolve_with_base(base, p).to_string_lossy().into_owned()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub corpus: CorpusSettings,
    pub index: IndexSettings,
    pub embedding: EmbeddingSettings,
    pub generation: GenerationSettings,
    pub server: ServerSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<(), Error> {
        if self.corpus.path.trim().is_empty() {
            return Err(Error::InvalidConfig("corpus.path must not be empty".into()));
        }
        if self.index.table.trim().is_empty() {
            return Err(Error::InvalidConfig("index.table must not be empty".into()));
        }
        if self.embedding.dim == 0 || self.embedding.batch_size == 0 || self.embedding.max_len == 0 {
            return Err(Error::InvalidConfig(
                "embedding.dim, embedding.max_len and embedding.batch_size must be positive".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(Error::InvalidConfig(format!(
                "generation.temperature must be within 0..=2, got {}",
                self.generation.temperature
            )));
        }
        if self.generation.max_new_tokens == 0 {
            return Err(Error::InvalidConfig("generation.max_new_tokens must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusSettings {
    pub path: String,
}

impl Default for CorpusSettings {
    fn default() -> Self {
        Self { path: "data/verse.json".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub db_dir: String,
    pub table: String,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self { db_dir: "data/index/lancedb".to_string(), table: "gita".to_string() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    MiniLm,
    Fake,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub backend: EmbeddingBackend,
    pub model_dir: String,
    pub dim: usize,
    pub max_len: usize,
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::MiniLm,
            model_dir: "models/all-MiniLM-L6-v2".to_string(),
            dim: 384,
            max_len: 256,
            batch_size: 32,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub endpoint: String,
    pub api_token: Option<String>,
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models/mistralai/Mistral-7B-Instruct-v0.3"
                .to_string(),
            api_token: None,
            max_new_tokens: 200,
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

impl fmt::Debug for GenerationSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationSettings")
            .field("endpoint", &self.endpoint)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("max_new_tokens", &self.max_new_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Base URL the chat UI uses to reach this service.
    pub api_base: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8000, api_base: None }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
