//! Typed errors for the datascout library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Per-item failures
//! (a URL that fails to fetch, a generation that produces no JSON)
//! are represented as absent values at their boundaries, not as
//! errors; these enums cover true faults.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while running the discovery pipeline.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// Generation backend fault (transport or API level)
    #[error("generation backend error: {0}")]
    Backend(#[from] BackendError),

    /// Web search provider fault
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    /// Filesystem operation failed while persisting a record
    #[error("storage error at {}: {}", .path.display(), .source)]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the cumulative session table failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors from the text-generation backend.
///
/// Only `Unavailable` (surfaced by the startup health probe) is treated
/// as fatal by callers; mid-run faults are isolated per document.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Backend could not be reached at all
    #[error("generation backend unavailable at {endpoint}: {reason}")]
    Unavailable { endpoint: String, reason: String },

    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Backend returned a non-success status
    #[error("backend API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Backend response did not match the expected shape
    #[error("malformed backend response: {0}")]
    InvalidResponse(String),
}

/// Errors from the web-search provider.
#[derive(Debug, Error)]
pub enum SearchError {
    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Provider returned a non-success status (rate limits included)
    #[error("search API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Provider requires a credential that was not configured
    #[error("search provider not configured: {0}")]
    Config(String),
}

/// Errors from retrieving one page.
///
/// These never escape the fetch stage; the fetcher converts each one
/// into an absent result for that URL.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Non-success HTTP status
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for generation-backend operations.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Result type alias for page-retrieval operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
