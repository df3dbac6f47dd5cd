//! End-to-end pipeline test over mock services.
//!
//! Scenario: one batch of two planned queries; search finds three links
//! for the first query and none for the second; two of three pages fetch
//! successfully; one is judged relevant; its metadata is extracted and
//! persisted. The session must end with exactly one query subfolder, one
//! saved text file, and one CSV row.

use std::fs;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use datascout::testing::{MockGenerationBackend, MockPageRetriever};
use datascout::{MockWebSearcher, Pipeline, ScoutConfig, Session};

const RELEVANT_PAGE: &str = r#"<h1>Solar Output 2020</h1>
<p>Hourly solar power output for 2020, one row per plant.</p>
<a href="https://datahost.example/solar_2020.csv">Download CSV</a>"#;

const IRRELEVANT_PAGE: &str =
    "<p>An opinion column about the future of energy markets. No data here.</p>";

#[tokio::test]
async fn full_run_produces_one_record() {
    let dir = tempfile::tempdir().unwrap();

    // Needle order matters: the extraction prompt embeds the page text, so
    // its needle must be registered before the page-content needles used
    // for relevance verdicts.
    let backend = MockGenerationBackend::new()
        // Metadata extraction for the relevant page.
        .with_response(
            "Dataset Scraper Agent",
            r#"```json
{"dataset_name": "Solar Output 2020", "description": "Hourly output per plant", "formats": ["CSV"], "download_links": ["https://datahost.example/solar_2020.csv"], "license": "CC-BY", "relevance_score": 9}
```"#,
        )
        // Query planning: one batch of two queries.
        .with_response(
            "search queries",
            r#"{"queries": ["solar power output dataset filetype:csv", "solar power output kaggle"]}"#,
        )
        // Relevance: only the page mentioning hourly output passes.
        .with_response("Hourly solar power output", r#"{"relevant": true, "reason": "found csv link"}"#)
        .with_response("opinion column", r#"{"relevant": false, "reason": "no data"}"#);

    let searcher = MockWebSearcher::new()
        .with_urls(
            "solar power output dataset filetype:csv",
            &[
                "https://a.example/solar",
                "https://b.example/column",
                "https://c.example/gone",
            ],
        )
        .with_urls("solar power output kaggle", &[]);

    let retriever = MockPageRetriever::new()
        .with_page("https://a.example/solar", RELEVANT_PAGE)
        .with_page("https://b.example/column", IRRELEVANT_PAGE)
        .with_failure("https://c.example/gone");

    let config = ScoutConfig::new()
        .with_max_queries(2)
        .with_query_batches(1)
        .with_search_delay(Duration::from_millis(0))
        .with_data_dir(dir.path());

    let pipeline = Pipeline::new(backend, searcher, retriever, config);
    let mut session = Session::create(dir.path(), Some("itest")).unwrap();
    let session_dir = session.session_dir().to_path_buf();
    let csv_path = session.csv_path().to_path_buf();

    let report = pipeline
        .run("solar power output", &mut session, &CancellationToken::new())
        .await
        .unwrap();
    session.close().unwrap();

    assert_eq!(report.queries_planned, 2);
    assert_eq!(report.links_seen, 3);
    assert_eq!(report.documents_fetched, 2);
    assert_eq!(report.records_saved, 1);

    // Exactly one query subfolder in the session directory.
    let subdirs: Vec<_> = fs::read_dir(&session_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .collect();
    assert_eq!(subdirs.len(), 1);
    assert_eq!(
        subdirs[0].file_name().to_str().unwrap(),
        "solar_power_output_dataset_filetype_csv"
    );

    // Exactly one saved text file inside it, carrying header and text.
    let files: Vec<_> = fs::read_dir(subdirs[0].path())
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(files.len(), 1);
    let contents = fs::read_to_string(files[0].path()).unwrap();
    assert!(contents.starts_with("URL: https://a.example/solar\n"));
    assert!(contents.contains("Dataset Name: Solar Output 2020\n"));
    assert!(contents.contains("Formats: ['CSV']\n"));
    assert!(contents.contains("# Solar Output 2020"));

    // Cumulative table: header plus exactly one row, with the list-styled
    // formats column.
    let csv = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("query,url,dataset_name"));
    assert!(lines[1].contains("['CSV']"));
    assert!(lines[1].contains("https://a.example/solar"));
    assert!(lines[1].contains("Solar Output 2020"));
}

#[tokio::test]
async fn session_with_no_results_still_completes() {
    let dir = tempfile::tempdir().unwrap();

    // Planner output is unusable; no queries, no searches, no records.
    let backend = MockGenerationBackend::new().with_default_response("cannot comply");
    let config = ScoutConfig::new()
        .with_query_batches(2)
        .with_search_delay(Duration::from_millis(0))
        .with_data_dir(dir.path());

    let pipeline = Pipeline::new(
        backend,
        MockWebSearcher::new(),
        MockPageRetriever::new(),
        config,
    );
    let mut session = Session::create(dir.path(), Some("empty")).unwrap();
    let csv_path = session.csv_path().to_path_buf();

    let report = pipeline
        .run("anything", &mut session, &CancellationToken::new())
        .await
        .unwrap();
    session.close().unwrap();

    assert_eq!(report.queries_planned, 0);
    assert_eq!(report.records_saved, 0);
    // Empty buffer: close must not create the CSV.
    assert!(!csv_path.exists());
}
