//! Concurrent page fetching.
//!
//! The only parallel stage in the pipeline: network fetches are
//! latency-bound and independent, so they run as a bounded task group
//! while everything model-bound stays sequential on the driving task.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

use crate::text::extract_text;
use crate::traits::retriever::PageRetriever;

/// Maximum concurrent in-flight fetches.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 5;

/// A fetched page with its cleaned text.
///
/// Only pages whose cleanup produced non-empty text become documents;
/// everything else is dropped before filtering.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub url: String,
    pub text: String,
    pub raw_content: String,
}

/// Fetches batches of URLs with bounded parallelism.
pub struct Fetcher<R> {
    retriever: Arc<R>,
    concurrency: usize,
}

impl<R: PageRetriever + 'static> Fetcher<R> {
    pub fn new(retriever: R) -> Self {
        Self {
            retriever: Arc::new(retriever),
            concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }

    /// Set the concurrency cap (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Fetch every URL and return the documents that yielded text.
    ///
    /// Results are collected in completion order; no ordering guarantee.
    /// Every per-URL failure — transport error, absent content, empty
    /// extraction — converts to "no result" for that URL. This method
    /// never fails as a whole: one bad URL must not abort the batch.
    pub async fn fetch_all(&self, urls: &[String]) -> Vec<FetchedDocument> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<Option<FetchedDocument>> = JoinSet::new();

        for url in urls.iter().cloned() {
            let retriever = Arc::clone(&self.retriever);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = semaphore.acquire().await.ok()?;

                let raw = match retriever.retrieve(&url).await {
                    Ok(Some(raw)) => raw,
                    Ok(None) => {
                        debug!(url = %url, "no content retrieved");
                        return None;
                    }
                    Err(e) => {
                        debug!(url = %url, error = %e, "fetch failed");
                        return None;
                    }
                };

                let text = match extract_text(&raw) {
                    Some(text) => text,
                    None => {
                        debug!(url = %url, "no readable text extracted");
                        return None;
                    }
                };

                Some(FetchedDocument {
                    url,
                    text,
                    raw_content: raw,
                })
            });
        }

        let mut documents = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            if let Ok(Some(document)) = joined {
                documents.push(document);
            }
        }

        debug!(
            requested = urls.len(),
            fetched = documents.len(),
            "fetch batch complete"
        );

        documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPageRetriever;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn fetches_pages_with_text() {
        let retriever = MockPageRetriever::new()
            .with_page("https://a.com", "<p>solar output data</p>")
            .with_page("https://b.com", "<p>wind data</p>");
        let fetcher = Fetcher::new(retriever);

        let docs = fetcher.fetch_all(&urls(&["https://a.com", "https://b.com"])).await;
        assert_eq!(docs.len(), 2);
        let texts: Vec<_> = docs.iter().map(|d| d.text.as_str()).collect();
        assert!(texts.contains(&"solar output data"));
    }

    #[tokio::test]
    async fn one_failing_url_never_aborts_the_batch() {
        let retriever = MockPageRetriever::new()
            .with_page("https://good.com", "<p>fine</p>")
            .with_failure("https://bad.com");
        let fetcher = Fetcher::new(retriever);

        let docs = fetcher
            .fetch_all(&urls(&["https://bad.com", "https://good.com", "https://missing.com"]))
            .await;

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].url, "https://good.com");
    }

    #[tokio::test]
    async fn pages_without_readable_text_are_dropped() {
        let retriever = MockPageRetriever::new()
            .with_page("https://empty.com", "<script>nothing()</script>");
        let fetcher = Fetcher::new(retriever);

        let docs = fetcher.fetch_all(&urls(&["https://empty.com"])).await;
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn empty_url_list_yields_empty_result() {
        let fetcher = Fetcher::new(MockPageRetriever::new());
        assert!(fetcher.fetch_all(&[]).await.is_empty());
    }

    #[tokio::test]
    async fn result_length_never_exceeds_input() {
        let retriever = MockPageRetriever::new().with_page("https://a.com", "<p>a</p>");
        let fetcher = Fetcher::new(retriever).with_concurrency(2);

        let input = urls(&["https://a.com", "https://a.com", "https://x.com"]);
        let docs = fetcher.fetch_all(&input).await;
        assert!(docs.len() <= input.len());
    }
}
