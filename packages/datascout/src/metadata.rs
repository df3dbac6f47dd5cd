//! Structured dataset metadata extraction and the persisted record type.
//!
//! The extractor returns whatever object the model produced, unvalidated.
//! Schema discipline lives in [`DatasetRecord::from_extraction`]: every
//! field access is an explicit optional lookup with a stated default, so a
//! model that omits or mistypes fields degrades to defaults instead of
//! breaking the pipeline.

use serde_json::Value;

use crate::error::BackendResult;
use crate::generation::GenerationService;
use crate::prompts::format_extract_prompt;
use crate::traits::backend::GenerationBackend;

/// Token budget for metadata extraction.
pub const EXTRACT_MAX_TOKENS: u32 = 600;

/// Extract dataset metadata from page text.
///
/// Returns the raw parsed object, or `None` when the model produced
/// nothing parseable. No field validation happens here.
pub async fn extract_metadata<B: GenerationBackend>(
    generation: &GenerationService<B>,
    text: &str,
    query: &str,
) -> BackendResult<Option<Value>> {
    let prompt = format_extract_prompt(query, text);
    generation.generate_structured(&prompt, EXTRACT_MAX_TOKENS).await
}

/// One discovered dataset, ready for persistence.
#[derive(Debug, Clone)]
pub struct DatasetRecord {
    pub url: String,
    pub query: String,
    pub dataset_name: String,
    pub description: String,
    pub formats: Vec<String>,
    pub download_links: Vec<String>,
    pub license: String,
    /// 0-10, 10 meaning a direct download link was found.
    pub relevance_score: u8,
    /// Full extracted page text.
    pub text: String,
}

impl DatasetRecord {
    /// Merge a fetched document with (possibly absent, possibly partial)
    /// extraction output.
    ///
    /// Missing or mistyped fields default deterministically: names and
    /// descriptions to "N/A", license to "Unknown", lists to empty, score
    /// to 0.
    pub fn from_extraction(
        url: impl Into<String>,
        query: impl Into<String>,
        text: impl Into<String>,
        metadata: Option<&Value>,
    ) -> Self {
        Self {
            url: url.into(),
            query: query.into(),
            dataset_name: string_field(metadata, "dataset_name", "N/A"),
            description: string_field(metadata, "description", "N/A"),
            formats: list_field(metadata, "formats"),
            download_links: list_field(metadata, "download_links"),
            license: string_field(metadata, "license", "Unknown"),
            relevance_score: score_field(metadata, "relevance_score"),
            text: text.into(),
        }
    }
}

fn string_field(metadata: Option<&Value>, key: &str, default: &str) -> String {
    metadata
        .and_then(|m| m.get(key))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Lenient list lookup: accepts an array of strings, or a single string
/// treated as a one-element list. Non-string array items are skipped.
fn list_field(metadata: Option<&Value>, key: &str) -> Vec<String> {
    match metadata.and_then(|m| m.get(key)) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

/// Score lookup, clamped to 0-10. Accepts integers or floats.
fn score_field(metadata: Option<&Value>, key: &str) -> u8 {
    let value = metadata.and_then(|m| m.get(key));
    let score = match value {
        Some(v) => v
            .as_u64()
            .map(|n| n as f64)
            .or_else(|| v.as_f64())
            .unwrap_or(0.0),
        None => 0.0,
    };
    score.clamp(0.0, 10.0).round() as u8
}
