//! LLM-driven dataset discovery.
//!
//! Turns one research topic into a ranked, deduplicated corpus of
//! structured dataset records: a local text-generation model plans search
//! queries, a search provider returns candidate links, pages are fetched
//! concurrently and reduced to readable text, and the model filters for
//! relevance and extracts dataset metadata that a session persists to
//! disk.
//!
//! # Design
//!
//! - Model inference is the bottleneck and the backend is a single shared
//!   resource, so every generation call is serialized on the driving task.
//!   Only page fetching fans out, behind a bounded task group.
//! - Model output is never trusted to conform to a schema: structured
//!   generation returns a tagged presence/absence, and every consumer
//!   reads fields through explicit optional lookups with stated defaults.
//! - Per-item failures (one URL, one document, one query, one generation
//!   batch) are isolated at their boundary; only backend initialization
//!   failure is fatal.
//!
//! # Usage
//!
//! ```rust,ignore
//! use datascout::{
//!     LlamaServerBackend, HttpRetriever, TavilyWebSearcher,
//!     Pipeline, ScoutConfig, Session,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! let backend = LlamaServerBackend::from_env();
//! backend.health().await?;
//!
//! let config = ScoutConfig::default();
//! let mut session = Session::create(&config.data_dir, None)?;
//! let pipeline = Pipeline::new(
//!     backend,
//!     TavilyWebSearcher::from_env()?,
//!     HttpRetriever::new(),
//!     config,
//! );
//!
//! let report = pipeline.run("solar power output", &mut session, &CancellationToken::new()).await?;
//! session.close()?;
//! println!("saved {} records", report.records_saved);
//! ```

pub mod config;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod generation;
pub mod json;
pub mod metadata;
pub mod pipeline;
pub mod planner;
pub mod prompts;
pub mod session;
pub mod testing;
pub mod text;
pub mod traits;

// Re-export core types at crate root
pub use config::{ScoutConfig, SEARCH_BACKOFF};
pub use error::{BackendError, FetchError, ScoutError, SearchError};
pub use fetch::{FetchedDocument, Fetcher, DEFAULT_FETCH_CONCURRENCY};
pub use filter::is_relevant;
pub use generation::GenerationService;
pub use json::extract_json;
pub use metadata::{extract_metadata, DatasetRecord};
pub use pipeline::{Pipeline, RunReport};
pub use planner::plan_queries;
pub use session::{Session, CSV_FLUSH_THRESHOLD};
pub use text::{extract_text, truncate_chars};
pub use traits::{
    backend::{GenerationBackend, LlamaServerBackend, SamplingParams},
    retriever::{HttpRetriever, PageRetriever},
    searcher::{MockWebSearcher, SearchResult, TavilyWebSearcher, WebSearcher},
};
