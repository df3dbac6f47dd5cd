//! Process configuration for a discovery run.

use std::path::PathBuf;
use std::time::Duration;

use crate::fetch::DEFAULT_FETCH_CONCURRENCY;

/// Default backoff after a failed search, before the next query.
pub const SEARCH_BACKOFF: Duration = Duration::from_secs(10);

/// Tunables for one discovery run.
#[derive(Debug, Clone)]
pub struct ScoutConfig {
    /// Total search queries to plan for the topic.
    pub max_queries: usize,

    /// Generation batches the query total is split across.
    pub query_batches: usize,

    /// Search results requested per query.
    pub results_per_query: usize,

    /// Politeness delay between consecutive searches.
    pub search_delay: Duration,

    /// Backoff applied after a failed search.
    pub search_backoff: Duration,

    /// Concurrency cap for the fetch stage.
    pub fetch_concurrency: usize,

    /// Root directory for session output.
    pub data_dir: PathBuf,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            max_queries: 20,
            query_batches: 4,
            results_per_query: 10,
            search_delay: Duration::from_secs(2),
            search_backoff: SEARCH_BACKOFF,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl ScoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_queries(mut self, max_queries: usize) -> Self {
        self.max_queries = max_queries;
        self
    }

    pub fn with_query_batches(mut self, batches: usize) -> Self {
        self.query_batches = batches.max(1);
        self
    }

    pub fn with_results_per_query(mut self, results: usize) -> Self {
        self.results_per_query = results;
        self
    }

    pub fn with_search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = delay;
        self
    }

    pub fn with_search_backoff(mut self, backoff: Duration) -> Self {
        self.search_backoff = backoff;
        self
    }

    pub fn with_fetch_concurrency(mut self, concurrency: usize) -> Self {
        self.fetch_concurrency = concurrency.max(1);
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }
}
