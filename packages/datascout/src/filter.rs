//! Relevance filtering of fetched documents.
//!
//! Asks the generation service for a structured verdict on a short text
//! prefix. The policy is fail-closed: an inconclusive classification —
//! absent output, wrong shape, missing field — counts as not relevant,
//! because a false positive costs the expensive extraction step.

use serde_json::Value;

use crate::error::BackendResult;
use crate::generation::GenerationService;
use crate::prompts::format_relevance_prompt;
use crate::traits::backend::GenerationBackend;

/// Token budget for a relevance verdict.
pub const RELEVANCE_MAX_TOKENS: u32 = 100;

/// Judge whether `text` is relevant to `query`.
///
/// Returns `Ok(false)` whenever the structured result is absent or lacks a
/// boolean `relevant` field. Transport faults propagate; the orchestrator
/// isolates them per document.
pub async fn is_relevant<B: GenerationBackend>(
    generation: &GenerationService<B>,
    query: &str,
    text: &str,
) -> BackendResult<bool> {
    if text.trim().is_empty() {
        return Ok(false);
    }

    let prompt = format_relevance_prompt(query, text);
    let verdict = generation
        .generate_structured(&prompt, RELEVANCE_MAX_TOKENS)
        .await?;

    let relevant = verdict
        .as_ref()
        .and_then(|v| v.get("relevant"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if relevant {
        let reason = verdict
            .as_ref()
            .and_then(|v| v.get("reason"))
            .and_then(Value::as_str)
            .unwrap_or("unspecified");
        tracing::debug!(query = %query, reason = %reason, "document judged relevant");
    }

    Ok(relevant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockGenerationBackend;

    fn service(response: &str) -> GenerationService<MockGenerationBackend> {
        GenerationService::new(MockGenerationBackend::new().with_default_response(response))
    }

    #[tokio::test]
    async fn positive_verdict() {
        let service = service(r#"{"relevant": true, "reason": "found csv link"}"#);
        assert!(is_relevant(&service, "solar", "solar csv data").await.unwrap());
    }

    #[tokio::test]
    async fn negative_verdict() {
        let service = service(r#"{"relevant": false, "reason": "opinion piece"}"#);
        assert!(!is_relevant(&service, "solar", "an op-ed").await.unwrap());
    }

    #[tokio::test]
    async fn fail_closed_on_absent_output() {
        let service = service("no json here");
        assert!(!is_relevant(&service, "solar", "text").await.unwrap());
    }

    #[tokio::test]
    async fn fail_closed_on_missing_field() {
        let service = service(r#"{"reason": "no verdict given"}"#);
        assert!(!is_relevant(&service, "solar", "text").await.unwrap());
    }

    #[tokio::test]
    async fn fail_closed_on_non_boolean_field() {
        let service = service(r#"{"relevant": "yes"}"#);
        assert!(!is_relevant(&service, "solar", "text").await.unwrap());
    }

    #[tokio::test]
    async fn empty_text_short_circuits_without_a_call() {
        let backend = MockGenerationBackend::new();
        let service = GenerationService::new(backend.clone());
        assert!(!is_relevant(&service, "solar", "   ").await.unwrap());
        assert_eq!(backend.call_count(), 0);
    }
}
