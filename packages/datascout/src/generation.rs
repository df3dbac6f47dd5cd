//! Generation service: the two inference modes the pipeline uses.
//!
//! Wraps a [`GenerationBackend`] with a fixed sampling policy. Structured
//! generation runs slightly warmer but stop-bounded so output terminates
//! at a fence close, a turn marker, or a blank line instead of running on;
//! free-text generation runs colder for deterministic analysis output.
//!
//! "The model produced nothing parseable" is a normal outcome here, not a
//! fault: structured results come back as `Ok(None)` and every call site
//! treats that as "no data". No caching, no retries.

use serde_json::Value;

use crate::error::BackendResult;
use crate::json::extract_json;
use crate::text::truncate_chars;
use crate::traits::backend::{GenerationBackend, SamplingParams};

/// Temperature for free-text analysis generation.
pub const TEXT_TEMPERATURE: f32 = 0.2;

/// Temperature for JSON-constrained generation.
pub const STRUCTURED_TEMPERATURE: f32 = 0.3;

/// Stop sequences for structured generation: fence close, turn marker,
/// blank line.
pub const STRUCTURED_STOPS: [&str; 3] = ["```", "User:", "\n\n"];

/// Generation service over a pluggable backend.
pub struct GenerationService<B> {
    backend: B,
}

impl<B: GenerationBackend> GenerationService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Free-text generation.
    pub async fn generate_text(&self, prompt: &str, max_tokens: u32) -> BackendResult<String> {
        let params = SamplingParams::new(max_tokens, TEXT_TEMPERATURE);
        let output = self.backend.infer(prompt, &params).await?;
        Ok(output.trim().to_string())
    }

    /// JSON-constrained generation.
    ///
    /// Composes raw generation with the scavenging parser; absence of a
    /// parseable value is `Ok(None)`, never an error. Transport faults
    /// still propagate as `Err`.
    pub async fn generate_structured(
        &self,
        prompt: &str,
        max_tokens: u32,
    ) -> BackendResult<Option<Value>> {
        let params =
            SamplingParams::new(max_tokens, STRUCTURED_TEMPERATURE).with_stop(&STRUCTURED_STOPS);
        let output = self.backend.infer(prompt, &params).await?;

        let parsed = extract_json(&output);
        if parsed.is_none() {
            tracing::debug!(
                raw = %truncate_chars(&output, 200),
                "generation output contained no structured data"
            );
        }

        Ok(parsed)
    }
}
