//! Interactive entry point for dataset discovery runs.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use datascout::{
    GenerationBackend, HttpRetriever, LlamaServerBackend, Pipeline, ScoutConfig, Session,
    TavilyWebSearcher,
};

#[derive(Parser)]
#[command(name = "datascout", about = "Discover downloadable datasets on a research topic")]
struct Cli {
    /// Research topic; prompted interactively when omitted
    #[arg(long)]
    topic: Option<String>,

    /// Total search queries to plan
    #[arg(long, default_value_t = 20)]
    max_queries: usize,

    /// Generation batches to split query planning across
    #[arg(long, default_value_t = 4)]
    batches: usize,

    /// Search results requested per query
    #[arg(long, default_value_t = 10)]
    results_per_query: usize,

    /// Delay between searches, in seconds
    #[arg(long, default_value_t = 2)]
    search_delay: u64,

    /// Root directory for session output
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Session identifier; timestamp-derived when omitted
    #[arg(long)]
    session_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("datascout=info")),
        )
        .init();

    let cli = Cli::parse();

    println!("{}", "datascout".bold().cyan());
    println!("{}", "LLM-driven dataset discovery".dimmed());
    println!();

    let topic = match cli.topic {
        Some(topic) => topic,
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Research topic")
            .interact_text()
            .context("Failed to read topic")?,
    };

    let backend = LlamaServerBackend::from_env();
    backend.health().await.with_context(|| {
        format!(
            "generation backend is not reachable at {}; start a llama.cpp server or set LLAMA_SERVER_URL",
            backend.base_url()
        )
    })?;

    let searcher = TavilyWebSearcher::from_env()
        .context("search provider not configured")?
        .with_default_limit(cli.results_per_query);

    let config = ScoutConfig::new()
        .with_max_queries(cli.max_queries)
        .with_query_batches(cli.batches)
        .with_results_per_query(cli.results_per_query)
        .with_search_delay(Duration::from_secs(cli.search_delay))
        .with_data_dir(&cli.data_dir);

    let mut session = Session::create(&config.data_dir, cli.session_id.as_deref())
        .context("Failed to create session directory")?;
    println!(
        "Session directory: {}",
        session.session_dir().display().to_string().bold()
    );

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\n{}", "Interrupted; finishing current step...".yellow());
                cancel.cancel();
            }
        });
    }

    let pipeline = Pipeline::new(backend, searcher, HttpRetriever::new(), config);
    let report = pipeline.run(&topic, &mut session, &cancel).await?;
    session.close().context("Failed to flush session output")?;

    println!();
    println!("{}", "Run complete".bold().green());
    println!("  queries planned:   {}", report.queries_planned);
    println!("  links seen:        {}", report.links_seen);
    println!("  documents fetched: {}", report.documents_fetched);
    println!("  records saved:     {}", report.records_saved);
    if report.failed_queries > 0 {
        println!(
            "  {}",
            format!("failed queries:    {}", report.failed_queries).yellow()
        );
    }

    Ok(())
}
