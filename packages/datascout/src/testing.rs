//! Testing utilities including mock implementations.
//!
//! Deterministic, configurable stand-ins for the trait seams so pipeline
//! logic can be exercised without a model server or network access.
//! `MockWebSearcher` lives next to its trait in
//! [`crate::traits::searcher`].

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::{BackendError, BackendResult, FetchError, FetchResult};
use crate::traits::backend::{GenerationBackend, SamplingParams};
use crate::traits::retriever::PageRetriever;

/// A mock generation backend scripted by prompt substring.
///
/// The first configured `(needle, response)` pair whose needle occurs in
/// the prompt wins; otherwise the default response (empty when unset, so
/// structured callers see absence). Records every call for assertions.
#[derive(Default, Clone)]
pub struct MockGenerationBackend {
    responses: Arc<RwLock<Vec<(String, String)>>>,
    default_response: Arc<RwLock<String>>,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    fail: Arc<RwLock<bool>>,
    failing_prompts: Arc<RwLock<Vec<String>>>,
}

/// Record of one inference call made against the mock.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stop: Vec<String>,
}

impl MockGenerationBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond with `response` whenever the prompt contains `needle`.
    pub fn with_response(self, needle: impl Into<String>, response: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .push((needle.into(), response.into()));
        self
    }

    /// Response used when no needle matches.
    pub fn with_default_response(self, response: impl Into<String>) -> Self {
        *self.default_response.write().unwrap() = response.into();
        self
    }

    /// Make every call fail with a transport error.
    pub fn with_failure(self) -> Self {
        *self.fail.write().unwrap() = true;
        self
    }

    /// Fail only calls whose prompt contains `needle`.
    pub fn with_failing_prompt(self, needle: impl Into<String>) -> Self {
        self.failing_prompts.write().unwrap().push(needle.into());
        self
    }

    /// Number of inference calls made.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Prompts seen, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .map(|c| c.prompt.clone())
            .collect()
    }

    /// Stop sequences of the most recent call.
    pub fn last_stop_sequences(&self) -> Vec<String> {
        self.calls
            .read()
            .unwrap()
            .last()
            .map(|c| c.stop.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn infer(&self, prompt: &str, params: &SamplingParams) -> BackendResult<String> {
        self.calls.write().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            stop: params.stop.clone(),
        });

        if *self.fail.read().unwrap() {
            return Err(BackendError::Http("mock backend failure".into()));
        }

        if self
            .failing_prompts
            .read()
            .unwrap()
            .iter()
            .any(|needle| prompt.contains(needle.as_str()))
        {
            return Err(BackendError::Http("mock backend failure".into()));
        }

        let responses = self.responses.read().unwrap();
        for (needle, response) in responses.iter() {
            if prompt.contains(needle.as_str()) {
                return Ok(response.clone());
            }
        }

        Ok(self.default_response.read().unwrap().clone())
    }

    async fn health(&self) -> BackendResult<()> {
        if *self.fail.read().unwrap() {
            return Err(BackendError::Unavailable {
                endpoint: "mock".to_string(),
                reason: "configured to fail".to_string(),
            });
        }
        Ok(())
    }
}

/// A mock page retriever serving canned content.
#[derive(Default)]
pub struct MockPageRetriever {
    pages: Arc<RwLock<HashMap<String, String>>>,
    failures: Arc<RwLock<HashSet<String>>>,
}

impl MockPageRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `content` for `url`.
    pub fn with_page(self, url: impl Into<String>, content: impl Into<String>) -> Self {
        self.pages.write().unwrap().insert(url.into(), content.into());
        self
    }

    /// Fail retrieval of `url` with a transport error.
    pub fn with_failure(self, url: impl Into<String>) -> Self {
        self.failures.write().unwrap().insert(url.into());
        self
    }
}

#[async_trait]
impl PageRetriever for MockPageRetriever {
    async fn retrieve(&self, url: &str) -> FetchResult<Option<String>> {
        if self.failures.read().unwrap().contains(url) {
            return Err(FetchError::Http("mock retrieval failure".into()));
        }
        Ok(self.pages.read().unwrap().get(url).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_backend_matches_by_substring() {
        let backend = MockGenerationBackend::new()
            .with_response("search queries", "{\"queries\": [\"a\"]}")
            .with_default_response("fallback");

        let params = SamplingParams::new(10, 0.3);
        let hit = backend
            .infer("Generate exactly 5 search queries about x", &params)
            .await
            .unwrap();
        assert_eq!(hit, "{\"queries\": [\"a\"]}");

        let miss = backend.infer("something else", &params).await.unwrap();
        assert_eq!(miss, "fallback");
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn mock_retriever_absence_and_failure() {
        let retriever = MockPageRetriever::new()
            .with_page("https://a.com", "<p>hi</p>")
            .with_failure("https://bad.com");

        assert!(retriever.retrieve("https://a.com").await.unwrap().is_some());
        assert!(retriever.retrieve("https://unknown.com").await.unwrap().is_none());
        assert!(retriever.retrieve("https://bad.com").await.is_err());
    }
}
