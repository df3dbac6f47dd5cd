//! Web searcher trait for candidate-link discovery.
//!
//! Each planned query is handed to a search provider that returns candidate
//! URLs. Providers may rate-limit or fail per query; the orchestrator treats
//! that as zero results for the query and backs off, never as a session
//! fault.

use async_trait::async_trait;
use url::Url;

use crate::error::SearchError;

/// A discovered URL from web search with provider metadata.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The discovered URL.
    pub url: Url,

    /// Title of the page (if available from search results).
    pub title: Option<String>,

    /// Snippet/description from search results.
    pub snippet: Option<String>,

    /// Relevance score (0.0-1.0, if provided by the search API).
    pub score: Option<f32>,
}

impl SearchResult {
    /// Create a new search result from a URL.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            title: None,
            snippet: None,
            score: None,
        }
    }

    /// Create from a URL string.
    pub fn from_url(url: &str) -> Option<Self> {
        Url::parse(url).ok().map(Self::new)
    }

    /// Add a title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a snippet.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    /// Add a relevance score.
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }
}

/// Web search for open-world URL discovery.
#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Search the web for URLs relevant to the query.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError>;

    /// Search with a specific result limit.
    async fn search_with_limit(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let mut results = self.search(query).await?;
        results.truncate(limit);
        Ok(results)
    }
}

/// Mock web searcher for testing.
#[derive(Default)]
pub struct MockWebSearcher {
    results: std::sync::RwLock<std::collections::HashMap<String, Vec<SearchResult>>>,
    failing: std::sync::RwLock<std::collections::HashSet<String>>,
}

impl MockWebSearcher {
    /// Create a new mock searcher. Queries without configured results
    /// return an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add results for a query.
    pub fn with_results(self, query: &str, results: Vec<SearchResult>) -> Self {
        self.results
            .write()
            .unwrap()
            .insert(query.to_string(), results);
        self
    }

    /// Add URL strings as results.
    pub fn with_urls(self, query: &str, urls: &[&str]) -> Self {
        let results: Vec<_> = urls
            .iter()
            .filter_map(|u| SearchResult::from_url(u))
            .collect();
        self.with_results(query, results)
    }

    /// Fail searches for `query` with a rate-limit style error.
    pub fn with_search_error(self, query: &str) -> Self {
        self.failing.write().unwrap().insert(query.to_string());
        self
    }
}

#[async_trait]
impl WebSearcher for MockWebSearcher {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        if self.failing.read().unwrap().contains(query) {
            return Err(SearchError::Api {
                status: 429,
                message: "rate limited".to_string(),
            });
        }
        Ok(self
            .results
            .read()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default())
    }
}

/// Tavily-backed web searcher.
pub struct TavilyWebSearcher {
    api_key: String,
    client: reqwest::Client,
    /// Default number of results to return.
    pub default_limit: usize,
}

impl TavilyWebSearcher {
    /// Create a new Tavily web searcher.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            default_limit: 10,
        }
    }

    /// Create from the `TAVILY_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, SearchError> {
        let api_key = std::env::var("TAVILY_API_KEY")
            .map_err(|_| SearchError::Config("TAVILY_API_KEY not set".to_string()))?;
        Ok(Self::new(api_key))
    }

    /// Set the default result limit.
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }
}

#[async_trait]
impl WebSearcher for TavilyWebSearcher {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        self.search_with_limit(query, self.default_limit).await
    }

    async fn search_with_limit(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        #[derive(serde::Serialize)]
        struct Request {
            query: String,
            search_depth: String,
            max_results: usize,
        }

        #[derive(serde::Deserialize)]
        struct Response {
            results: Vec<TavilyResult>,
        }

        #[derive(serde::Deserialize)]
        struct TavilyResult {
            url: String,
            title: Option<String>,
            content: Option<String>,
            score: Option<f32>,
        }

        let request = Request {
            query: query.to_string(),
            search_depth: "basic".to_string(),
            max_results: limit,
        };

        let response = self
            .client
            .post("https://api.tavily.com/search")
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| SearchError::Http(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let tavily_response: Response = response
            .json()
            .await
            .map_err(|e| SearchError::Http(Box::new(e)))?;

        let results = tavily_response
            .results
            .into_iter()
            .filter_map(|r| {
                let url = Url::parse(&r.url).ok()?;
                let mut result = SearchResult::new(url);
                if let Some(title) = r.title {
                    result = result.with_title(title);
                }
                if let Some(content) = r.content {
                    result = result.with_snippet(content);
                }
                if let Some(score) = r.score {
                    result = result.with_score(score);
                }
                Some(result)
            })
            .collect();

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_searcher_returns_configured_urls() {
        let searcher = MockWebSearcher::new().with_urls(
            "solar power output dataset",
            &[
                "https://example.com/solar.csv",
                "https://data.example.org/power",
            ],
        );

        let results = searcher.search("solar power output dataset").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].url.as_str(), "https://example.com/solar.csv");
    }

    #[tokio::test]
    async fn mock_searcher_empty_for_unknown_query() {
        let searcher = MockWebSearcher::new();
        assert!(searcher.search("anything").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_with_limit_truncates() {
        let searcher = MockWebSearcher::new().with_urls(
            "query",
            &["https://a.com", "https://b.com", "https://c.com"],
        );

        let results = searcher.search_with_limit("query", 2).await.unwrap();
        assert_eq!(results.len(), 2);
    }
}
