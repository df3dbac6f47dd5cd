//! Readable-text extraction from raw HTML.
//!
//! A lightweight regex pipeline, not a full DOM parse: good enough to give
//! the language model readable prose and tables, and dependency-light.

use regex::Regex;

/// Extract cleaned, readable text from raw page content.
///
/// Returns `None` when nothing readable survives the cleanup; such pages
/// never reach relevance filtering.
pub fn extract_text(html: &str) -> Option<String> {
    let mut text = html.to_string();

    // Remove scripts and styles
    let script_pattern = Regex::new(r"(?s)<script[^>]*>.*?</script>").unwrap();
    let style_pattern = Regex::new(r"(?s)<style[^>]*>.*?</style>").unwrap();
    text = script_pattern.replace_all(&text, "").to_string();
    text = style_pattern.replace_all(&text, "").to_string();

    // Convert headers
    let h1_pattern = Regex::new(r"(?s)<h1[^>]*>(.*?)</h1>").unwrap();
    let h2_pattern = Regex::new(r"(?s)<h2[^>]*>(.*?)</h2>").unwrap();
    let h3_pattern = Regex::new(r"(?s)<h3[^>]*>(.*?)</h3>").unwrap();
    text = h1_pattern.replace_all(&text, "# $1\n").to_string();
    text = h2_pattern.replace_all(&text, "## $1\n").to_string();
    text = h3_pattern.replace_all(&text, "### $1\n").to_string();

    // Convert paragraphs and line breaks
    let p_pattern = Regex::new(r"(?s)<p[^>]*>(.*?)</p>").unwrap();
    let br_pattern = Regex::new(r"<br\s*/?>").unwrap();
    text = p_pattern.replace_all(&text, "$1\n\n").to_string();
    text = br_pattern.replace_all(&text, "\n").to_string();

    // Keep link targets; download URLs matter for this domain
    let link_pattern = Regex::new(r#"(?s)<a[^>]*href=["']([^"']+)["'][^>]*>(.*?)</a>"#).unwrap();
    text = link_pattern.replace_all(&text, "[$2]($1)").to_string();

    // Convert list items and table cells to line-oriented text
    let li_pattern = Regex::new(r"(?s)<li[^>]*>(.*?)</li>").unwrap();
    text = li_pattern.replace_all(&text, "- $1\n").to_string();
    let cell_pattern = Regex::new(r"(?s)<t[dh][^>]*>(.*?)</t[dh]>").unwrap();
    text = cell_pattern.replace_all(&text, "$1 | ").to_string();
    let row_pattern = Regex::new(r"</tr>").unwrap();
    text = row_pattern.replace_all(&text, "\n").to_string();

    // Remove remaining tags
    let tag_pattern = Regex::new(r"(?s)<[^>]+>").unwrap();
    text = tag_pattern.replace_all(&text, "").to_string();

    // Clean up whitespace
    let multi_newline = Regex::new(r"\n{3,}").unwrap();
    text = multi_newline.replace_all(&text, "\n\n").to_string();

    // Decode HTML entities
    text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    let text = text.trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Truncate to at most `max` characters on a char boundary.
///
/// Prompt snippets are budgeted in characters; byte slicing would panic
/// on multi-byte content.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
