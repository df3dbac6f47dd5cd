//! The per-query driving loop: search → fetch → filter → extract → persist.
//!
//! Everything model-bound runs sequentially on this task — the backend is
//! a single shared resource and inference is the true bottleneck. Only the
//! fetch stage fans out, and it never touches the backend. Failures are
//! isolated at the smallest sensible scope: a failed search costs one
//! query, a failed analysis costs one document, and the session always
//! runs to completion.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ScoutConfig;
use crate::error::Result;
use crate::fetch::{FetchedDocument, Fetcher};
use crate::filter::is_relevant;
use crate::generation::GenerationService;
use crate::metadata::{extract_metadata, DatasetRecord};
use crate::planner::plan_queries;
use crate::session::Session;
use crate::traits::backend::GenerationBackend;
use crate::traits::retriever::PageRetriever;
use crate::traits::searcher::WebSearcher;

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Queries produced by the planner.
    pub queries_planned: usize,

    /// Candidate links returned by search across all queries.
    pub links_seen: usize,

    /// Documents that survived fetch and text extraction.
    pub documents_fetched: usize,

    /// Records persisted to the session.
    pub records_saved: usize,

    /// Queries whose search call failed outright.
    pub failed_queries: usize,
}

/// The discovery pipeline, generic over its three external services.
pub struct Pipeline<B, S, R> {
    generation: GenerationService<B>,
    searcher: S,
    fetcher: Fetcher<R>,
    config: ScoutConfig,
}

impl<B, S, R> Pipeline<B, S, R>
where
    B: GenerationBackend,
    S: WebSearcher,
    R: PageRetriever + 'static,
{
    pub fn new(backend: B, searcher: S, retriever: R, config: ScoutConfig) -> Self {
        let fetcher = Fetcher::new(retriever).with_concurrency(config.fetch_concurrency);
        Self {
            generation: GenerationService::new(backend),
            searcher,
            fetcher,
            config,
        }
    }

    /// Run a full discovery session for `topic`, persisting into `session`.
    ///
    /// Cancellation is observed at query and document boundaries: the run
    /// stops cleanly with the counts accumulated so far, leaving persisted
    /// state intact. Callers close the session to flush the tail batch.
    pub async fn run(
        &self,
        topic: &str,
        session: &mut Session,
        cancel: &CancellationToken,
    ) -> Result<RunReport> {
        let queries = plan_queries(
            &self.generation,
            topic,
            self.config.max_queries,
            self.config.query_batches,
        )
        .await;

        let mut report = RunReport {
            queries_planned: queries.len(),
            ..RunReport::default()
        };

        for (index, query) in queries.iter().enumerate() {
            if cancel.is_cancelled() {
                info!("run cancelled, stopping before next query");
                break;
            }

            if index > 0 {
                tokio::time::sleep(self.config.search_delay).await;
            }

            info!(query = %query, progress = format!("{}/{}", index + 1, queries.len()), "processing query");

            let links: Vec<String> = match self
                .searcher
                .search_with_limit(query, self.config.results_per_query)
                .await
            {
                Ok(results) => results.into_iter().map(|r| r.url.to_string()).collect(),
                Err(e) => {
                    warn!(query = %query, error = %e, "search failed, backing off");
                    report.failed_queries += 1;
                    tokio::time::sleep(self.config.search_backoff).await;
                    continue;
                }
            };

            report.links_seen += links.len();
            if links.is_empty() {
                debug!(query = %query, "search returned no links");
                continue;
            }

            // Dropping the fetch future on cancellation aborts its task
            // group, abandoning in-flight fetches.
            let documents = tokio::select! {
                documents = self.fetcher.fetch_all(&links) => documents,
                _ = cancel.cancelled() => {
                    info!("run cancelled, abandoning in-flight fetches");
                    break;
                }
            };
            report.documents_fetched += documents.len();

            for document in &documents {
                if cancel.is_cancelled() {
                    break;
                }

                match self.analyze_document(query, document).await {
                    Ok(Some(record)) => {
                        let path = session.save_record(&record)?;
                        report.records_saved += 1;
                        info!(url = %record.url, path = %path.display(), "record saved");
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!(url = %document.url, error = %e, "analysis failed, skipping document");
                    }
                }
            }
        }

        info!(
            queries = report.queries_planned,
            links = report.links_seen,
            fetched = report.documents_fetched,
            saved = report.records_saved,
            failed_queries = report.failed_queries,
            "run complete"
        );

        Ok(report)
    }

    /// Filter one document and, if it passes, extract its metadata.
    ///
    /// Backend faults bubble up from here and are caught per document by
    /// the caller.
    async fn analyze_document(
        &self,
        query: &str,
        document: &FetchedDocument,
    ) -> crate::error::BackendResult<Option<DatasetRecord>> {
        debug!(url = %document.url, "analyzing content");

        if !is_relevant(&self.generation, query, &document.text).await? {
            return Ok(None);
        }

        info!(url = %document.url, "relevant page found");

        let metadata = extract_metadata(&self.generation, &document.text, query).await?;

        Ok(Some(DatasetRecord::from_extraction(
            document.url.clone(),
            query,
            document.text.clone(),
            metadata.as_ref(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockGenerationBackend, MockPageRetriever};
    use crate::traits::searcher::MockWebSearcher;
    use std::time::Duration;

    fn fast_config(dir: &std::path::Path) -> ScoutConfig {
        ScoutConfig::new()
            .with_max_queries(2)
            .with_query_batches(1)
            .with_search_delay(Duration::from_millis(0))
            .with_search_backoff(Duration::from_millis(0))
            .with_data_dir(dir)
    }

    #[tokio::test]
    async fn failed_search_degrades_to_zero_links_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let backend = MockGenerationBackend::new()
            .with_response("search queries", r#"{"queries": ["rate limited query", "fine query"]}"#)
            .with_default_response("");
        let searcher = MockWebSearcher::new()
            .with_search_error("rate limited query")
            .with_urls("fine query", &["https://a.com/page"]);
        let retriever =
            MockPageRetriever::new().with_page("https://a.com/page", "<p>plain page</p>");

        let pipeline = Pipeline::new(backend, searcher, retriever, fast_config(dir.path()));

        let mut session = Session::create(dir.path(), Some("s")).unwrap();
        let report = pipeline
            .run("topic", &mut session, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.queries_planned, 2);
        assert_eq!(report.failed_queries, 1);
        // The second query still ran and fetched its page.
        assert_eq!(report.links_seen, 1);
        assert_eq!(report.documents_fetched, 1);
        session.close().unwrap();
    }

    #[tokio::test]
    async fn cancellation_stops_before_next_query() {
        let dir = tempfile::tempdir().unwrap();
        let backend = MockGenerationBackend::new()
            .with_response("search queries", r#"{"queries": ["q1", "q2"]}"#);
        let pipeline = Pipeline::new(
            backend,
            MockWebSearcher::new(),
            MockPageRetriever::new(),
            fast_config(dir.path()),
        );

        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut session = Session::create(dir.path(), Some("s")).unwrap();
        let report = pipeline.run("topic", &mut session, &cancel).await.unwrap();

        assert_eq!(report.queries_planned, 2);
        assert_eq!(report.links_seen, 0);
    }

    #[tokio::test]
    async fn analysis_failure_skips_document_not_batch() {
        let dir = tempfile::tempdir().unwrap();
        // Planning succeeds, but every relevance call fails at the
        // transport level. The document is skipped; the run completes.
        let backend = MockGenerationBackend::new()
            .with_response("search queries", r#"{"queries": ["q1"]}"#)
            .with_failing_prompt("DOWNLOADABLE DATASET");
        let searcher = MockWebSearcher::new().with_urls("q1", &["https://a.com/page"]);
        let retriever =
            MockPageRetriever::new().with_page("https://a.com/page", "<p>some data table</p>");

        let pipeline = Pipeline::new(backend, searcher, retriever, fast_config(dir.path()));

        let mut session = Session::create(dir.path(), Some("s")).unwrap();
        let report = pipeline
            .run("topic", &mut session, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.documents_fetched, 1);
        assert_eq!(report.records_saved, 0);
    }
}
