//! Scavenging JSON parser for model output.
//!
//! Generation backends wrap JSON inconsistently: fenced code blocks,
//! surrounding prose, truncated tails. Rather than demanding a grammar,
//! this module tries progressively looser extractions and reports total
//! failure as an absence the caller can treat as "no data".

use regex::Regex;
use serde_json::Value;

/// Extract a JSON value from raw generated text.
///
/// Attempts, in order, first success wins:
/// 1. a fenced ```` ```json {...} ``` ```` block;
/// 2. the first `{` through the *last* `}` in the text;
/// 3. the entire text as JSON.
///
/// A parse failure at any step falls through to the next. Returns `None`
/// when nothing parses; never errors.
pub fn extract_json(text: &str) -> Option<Value> {
    if let Some(block) = fenced_json_block(text) {
        if let Ok(value) = serde_json::from_str(block) {
            return Some(value);
        }
    }

    if let Some(span) = brace_span(text) {
        if let Ok(value) = serde_json::from_str(span) {
            return Some(value);
        }
    }

    serde_json::from_str(text.trim()).ok()
}

/// Find the contents of a ```` ```json ```` fenced block, if any.
fn fenced_json_block(text: &str) -> Option<&str> {
    let fence = Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").unwrap();
    fence.captures(text).and_then(|cap| cap.get(1)).map(|m| m.as_str())
}

/// Greedy brace-delimited span: first `{` to the last `}`.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
