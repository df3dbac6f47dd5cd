//! Page retrieval trait.
//!
//! Retrieval returns raw content or a well-formed absence; it never drives
//! control flow through exceptions. Text cleanup happens separately (see
//! [`crate::text::extract_text`]) so retrieval implementations stay thin.

use async_trait::async_trait;

use crate::error::{FetchError, FetchResult};

/// Browser-like User-Agent; some dataset hosts reject obvious bots.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Retrieves raw page content for a URL.
#[async_trait]
pub trait PageRetriever: Send + Sync {
    /// Retrieve the raw content of `url`.
    ///
    /// `Ok(None)` means the page yielded no usable content; `Err` means a
    /// transport-level fault. The fetcher treats both as "no result" for
    /// the URL.
    async fn retrieve(&self, url: &str) -> FetchResult<Option<String>>;
}

/// HTTP page retriever.
pub struct HttpRetriever {
    client: reqwest::Client,
}

impl HttpRetriever {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

impl Default for HttpRetriever {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageRetriever for HttpRetriever {
    async fn retrieve(&self, url: &str) -> FetchResult<Option<String>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        if body.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(body))
    }
}
