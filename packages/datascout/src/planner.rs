//! Query planning: expand one topic into many search queries.
//!
//! One large structured-output request tends to truncate or degrade, so
//! the total is split across several smaller generation calls and the
//! results are pooled. A batch that yields nothing usable contributes
//! zero queries; it is logged and skipped, never retried and never fatal.

use indexmap::IndexSet;
use serde_json::Value;

use crate::generation::GenerationService;
use crate::prompts::format_query_plan_prompt;
use crate::traits::backend::GenerationBackend;

/// Token budget for one query-planning batch.
pub const QUERY_PLAN_MAX_TOKENS: u32 = 400;

/// Plan search queries for `topic`.
///
/// Issues exactly `batches` generation calls, each requesting
/// `total_queries / batches` queries, and deduplicates the pooled strings
/// by exact value. Insertion order is preserved, so the execution order of
/// queries is stable across a session.
pub async fn plan_queries<B: GenerationBackend>(
    generation: &GenerationService<B>,
    topic: &str,
    total_queries: usize,
    batches: usize,
) -> IndexSet<String> {
    let batches = batches.max(1);
    let per_batch = (total_queries / batches).max(1);
    let mut queries: IndexSet<String> = IndexSet::new();

    for batch in 0..batches {
        let prompt = format_query_plan_prompt(topic, per_batch);

        match generation
            .generate_structured(&prompt, QUERY_PLAN_MAX_TOKENS)
            .await
        {
            Ok(Some(value)) => match value.get("queries").and_then(Value::as_array) {
                Some(items) => {
                    let before = queries.len();
                    for query in items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::trim)
                        .filter(|q| !q.is_empty())
                        .take(per_batch)
                    {
                        queries.insert(query.to_string());
                    }
                    tracing::debug!(
                        batch,
                        new_queries = queries.len() - before,
                        "query batch complete"
                    );
                }
                None => {
                    tracing::warn!(batch, "query batch output missing 'queries' field");
                }
            },
            Ok(None) => {
                tracing::warn!(batch, "query batch produced no structured output");
            }
            Err(e) => {
                tracing::warn!(batch, error = %e, "query batch generation failed");
            }
        }
    }

    tracing::info!(
        topic = %topic,
        planned = queries.len(),
        requested = total_queries,
        "query planning complete"
    );

    queries
}
