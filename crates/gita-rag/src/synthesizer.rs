//! Grounded answer generation through a Hugging Face style inference endpoint.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use gita_core::config::GenerationSettings;
use gita_core::error::{Error, Result};
use gita_core::types::{Record, RetrievalResult};

const PROMPT_PREAMBLE: &str = "Below are three relevant Bhagavad Gita verses:\n\n";

/// Verses one per line as `<id>: <translation>`, followed by the question and the instruction.
pub fn build_prompt(question: &str, records: &[Record]) -> String {
    let verses = records.iter().map(|r| format!("{}: {}", r.id, r.translation)).collect::<Vec<_>>().join("\n");
    format!("{PROMPT_PREAMBLE}{verses}\n\nQuestion: {question}\nAnswer concisely, using only the above verses as reference:")
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct Completion {
    generated_text: String,
}

pub struct Synthesizer {
    client: reqwest::Client,
    settings: GenerationSettings,
}

impl Synthesizer {
    pub fn new(settings: GenerationSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client, settings })
    }

    pub fn endpoint(&self) -> &str {
        &self.settings.endpoint
    }

    /// One completion request, no retries. The trimmed first completion is returned as-is.
    pub async fn synthesize(&self, question: &str, retrieval: &RetrievalResult) -> Result<String> {
        let token = self
            .settings
            .api_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Generation("no API token configured".into()))?;

        let prompt = build_prompt(question, retrieval.records());
        let body = InferenceRequest {
            inputs: &prompt,
            parameters: InferenceParameters {
                max_new_tokens: self.settings.max_new_tokens,
                temperature: self.settings.temperature,
            },
        };
        debug!(endpoint = %self.settings.endpoint, verses = ?retrieval.ids(), "requesting completion");

        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Generation(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, "generation service rejected the request");
            return Err(Error::Generation(format!("status {status}: {}", detail.chars().take(200).collect::<String>())));
        }

        let completions: Vec<Completion> = response
            .json()
            .await
            .map_err(|e| Error::Generation(format!("malformed completion payload: {e}")))?;
        let first = completions
            .into_iter()
            .next()
            .ok_or_else(|| Error::Generation("empty completion list".into()))?;
        Ok(first.generated_text.trim().to_string())
    }
}
