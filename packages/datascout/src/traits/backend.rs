//! Generation backend trait and the llama.cpp server implementation.
//!
//! The pipeline treats text generation as an external service with one
//! operation: complete a prompt under explicit sampling parameters. The
//! backend is a single shared resource with no concurrent-call guarantee;
//! all inference calls are made sequentially from the orchestrating task.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{BackendError, BackendResult};

/// Default llama.cpp server endpoint.
pub const DEFAULT_LLAMA_SERVER_URL: &str = "http://127.0.0.1:8080";

/// Sampling parameters for one inference call.
#[derive(Debug, Clone)]
pub struct SamplingParams {
    /// Maximum tokens to generate.
    pub max_tokens: u32,

    /// Sampling temperature. Low values for deterministic analysis output.
    pub temperature: f32,

    /// Stop sequences; generation is truncated before the first match.
    pub stop: Vec<String>,
}

impl SamplingParams {
    /// Create params with no stop sequences.
    pub fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
            stop: Vec::new(),
        }
    }

    /// Set stop sequences.
    pub fn with_stop(mut self, stop: &[&str]) -> Self {
        self.stop = stop.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// Text-generation backend.
///
/// Implementations must support deterministic low-temperature sampling
/// and stop-sequence truncation.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Complete `prompt` and return the generated text.
    async fn infer(&self, prompt: &str, params: &SamplingParams) -> BackendResult<String>;

    /// Probe the backend. Callers treat a failure here as fatal, before
    /// any work starts.
    async fn health(&self) -> BackendResult<()>;
}

/// Client for a llama.cpp server's native completion API.
///
/// Runs a local GGUF model behind `POST /completion` and `GET /health`.
///
/// # Example
///
/// ```rust,ignore
/// let backend = LlamaServerBackend::from_env();
/// backend.health().await?;
/// let text = backend.infer("Hello", &SamplingParams::new(32, 0.2)).await?;
/// ```
pub struct LlamaServerBackend {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    n_predict: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    content: String,
}

impl LlamaServerBackend {
    /// Create a client for the given server URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create from the `LLAMA_SERVER_URL` environment variable, falling
    /// back to the default local endpoint.
    pub fn from_env() -> Self {
        let url = std::env::var("LLAMA_SERVER_URL")
            .unwrap_or_else(|_| DEFAULT_LLAMA_SERVER_URL.to_string());
        Self::new(url)
    }

    /// The configured server URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl GenerationBackend for LlamaServerBackend {
    async fn infer(&self, prompt: &str, params: &SamplingParams) -> BackendResult<String> {
        let request = CompletionRequest {
            prompt,
            n_predict: params.max_tokens,
            temperature: params.temperature,
            stop: params.stop.clone(),
            stream: false,
        };

        tracing::debug!(
            prompt_length = prompt.len(),
            max_tokens = params.max_tokens,
            temperature = params.temperature,
            "Calling generation backend"
        );

        let response = self
            .client
            .post(format!("{}/completion", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::Http(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        Ok(completion.content)
    }

    async fn health(&self) -> BackendResult<()> {
        let endpoint = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&endpoint)
            .send()
            .await
            .map_err(|e| BackendError::Unavailable {
                endpoint: self.base_url.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(BackendError::Unavailable {
                endpoint: self.base_url.clone(),
                reason: format!("health returned {}", response.status()),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash() {
        let backend = LlamaServerBackend::new("http://localhost:8080/");
        assert_eq!(backend.base_url(), "http://localhost:8080");
    }

    #[test]
    fn sampling_params_builder() {
        let params = SamplingParams::new(100, 0.3).with_stop(&["```", "User:"]);
        assert_eq!(params.max_tokens, 100);
        assert_eq!(params.stop, vec!["```".to_string(), "User:".to_string()]);
    }
}
