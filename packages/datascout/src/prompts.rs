//! Prompt templates for the discovery pipeline.
//!
//! Templates use `{placeholder}` markers filled by the `format_*`
//! functions. Snippet lengths are chosen per task: relevance checks read a
//! short prefix (the verdict rarely changes after the first screenful),
//! extraction gets a larger one for accuracy.

use crate::text::truncate_chars;

/// Characters of page text shown to the relevance filter.
pub const RELEVANCE_SNIPPET_CHARS: usize = 1000;

/// Characters of page text shown to the metadata extractor.
pub const EXTRACT_SNIPPET_CHARS: usize = 3000;

/// Prompt for generating one batch of search queries.
pub const QUERY_PLAN_PROMPT: &str = r#"Generate exactly {count} search queries about: {topic} for finding relevant downloadable datasets.
Format as VALID JSON: {"queries": ["query1", "query2", ...]}
Include keywords like 'kaggle', 'papers with code', and 'hugging face' where appropriate."#;

/// Prompt for the relevance verdict on one fetched page.
pub const RELEVANCE_PROMPT: &str = r#"Snippet: "{snippet}..."

Task: Does this page likely contain a DOWNLOADABLE DATASET, RAW DATA TABLES, or API DOCUMENTATION relevant to the query "{query}"?
Ignore general news or opinion articles unless they contain data tables.
Answer only with JSON: {"relevant": true/false, "reason": "found csv link / found data table / etc"}"#;

/// Prompt for structured dataset metadata extraction.
pub const EXTRACT_PROMPT: &str = r#"You are a Dataset Scraper Agent.
Context: User is looking for datasets about "{query}".
Content: "{snippet}..."

Task: Extract dataset details in JSON format.
1. "dataset_name": Title of the dataset or page.
2. "description": Brief description of what data is contained (rows, columns, subject).
3. "formats": List of available formats (e.g., CSV, JSON, API, ZIP, HTML_TABLE).
4. "download_links": List of direct download URLs or access APIs.
5. "license": Any license information mentioned (e.g., MIT, CC-BY, Unknown).
6. "relevance_score": 0-10 (10 = direct CSV/JSON link found, 0 = irrelevant blog).

Return ONLY the JSON."#;

/// Fill the query-planning template.
pub fn format_query_plan_prompt(topic: &str, count: usize) -> String {
    QUERY_PLAN_PROMPT
        .replace("{count}", &count.to_string())
        .replace("{topic}", topic)
}

/// Fill the relevance template, truncating the page text.
pub fn format_relevance_prompt(query: &str, text: &str) -> String {
    RELEVANCE_PROMPT
        .replace("{snippet}", truncate_chars(text, RELEVANCE_SNIPPET_CHARS))
        .replace("{query}", query)
}

/// Fill the extraction template, truncating the page text.
pub fn format_extract_prompt(query: &str, text: &str) -> String {
    EXTRACT_PROMPT
        .replace("{snippet}", truncate_chars(text, EXTRACT_SNIPPET_CHARS))
        .replace("{query}", query)
}
