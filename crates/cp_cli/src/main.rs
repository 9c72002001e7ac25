use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use cp_core::{ArticleStorage, InferenceModel};
use cp_progress::NotificationHub;
use cp_scrapers::{ArticleScraper, EnrichmentConfig, HtmlExtractor, HttpFetcher, ScraperManager, SourceConfig};
use cp_web::AppState;
use tracing::{error, info};

use cp_cli::{init_logging, HumanDuration};

#[derive(Parser, Debug)]
#[command(name = "contentpulse", author, version, about, long_about = None)]
pub struct Cli {
    /// Storage backend: memory or sqlite
    #[arg(long, env = "CONTENTPULSE_STORAGE", default_value = "memory")]
    storage: String,
    /// SQLite database path
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
    #[arg(long, env = "OLLAMA_BASE_URL", default_value = cp_inference::DEFAULT_BASE_URL)]
    model_url: String,
    /// Generation backend: ollama or dummy
    #[arg(long, env = "CONTENTPULSE_BACKEND", default_value = "ollama")]
    backend: String,
    #[arg(long, env = "CONTENTPULSE_MODEL", default_value = cp_inference::DEFAULT_MODEL)]
    model: String,
    #[arg(long, env = "CONTENTPULSE_SOURCE_URL", default_value = "https://blockworks.co")]
    source_url: String,
    #[arg(long, env = "CONTENTPULSE_LISTING_PATH", default_value = "/news")]
    listing_path: String,
    #[arg(long, env = "CONTENTPULSE_FETCH_CONCURRENCY", default_value_t = 4)]
    fetch_concurrency: usize,
    #[arg(long, env = "CONTENTPULSE_SUMMARY_CONCURRENCY", default_value_t = 2)]
    summary_concurrency: usize,
    /// Articles newer than this count as already known
    #[arg(long, env = "CONTENTPULSE_WINDOW_HOURS", default_value_t = 24)]
    window_hours: i64,
    /// Timeout for page fetches and for each generation request
    #[arg(long, env = "CONTENTPULSE_TIMEOUT_SECS", default_value_t = 60)]
    timeout_secs: u64,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API and progress websocket
    Serve {
        #[arg(long, env = "CONTENTPULSE_ADDR", default_value = "0.0.0.0:8000")]
        addr: SocketAddr,
    },
    /// Scrape the source once, or periodically with --interval
    Scrape {
        #[arg(long, default_value_t = 5)]
        limit: usize,
        /// Model override for the summaries
        #[arg(long)]
        model: Option<String>,
        /// Repeat every interval (e.g. 1h, 30m, 1d, 1h15m30s)
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// Ask a question about recently scraped articles
    Query {
        question: String,
        #[arg(long)]
        model: Option<String>,
    },
    /// List the models the backend can serve
    Models,
}

struct Pipeline {
    manager: Arc<ScraperManager>,
    hub: Arc<NotificationHub>,
}

async fn build_pipeline(cli: &Cli) -> anyhow::Result<Pipeline> {
    let storage: Arc<dyn ArticleStorage> =
        cp_storage::create_storage(&cli.storage, cli.database_url.as_deref()).await?;

    let timeout = Duration::from_secs(cli.timeout_secs);
    let inference: Arc<dyn InferenceModel> = cp_inference::create_model(&cp_inference::Config {
        backend: cli.backend.clone(),
        base_url: cli.model_url.clone(),
        default_model: cli.model.clone(),
        timeout,
        ..Default::default()
    })?;
    info!("🧠 Inference model initialized successfully (using {})", inference.name());

    let source = SourceConfig {
        base_url: cli.source_url.clone(),
        listing_path: cli.listing_path.clone(),
        max_concurrent_fetches: cli.fetch_concurrency,
        ..Default::default()
    };
    let scraper = ArticleScraper::new(
        source,
        Arc::new(HttpFetcher::new(timeout)?),
        Arc::new(HtmlExtractor::new()),
    )?;
    info!("🦗 Scraper initialized for {}{}", cli.source_url, cli.listing_path);

    let hub = Arc::new(NotificationHub::new());
    let manager = ScraperManager::new(
        storage,
        inference,
        hub.clone(),
        scraper,
        &EnrichmentConfig {
            max_concurrent: cli.summary_concurrency,
        },
    )
    .with_dedup_window(chrono::Duration::hours(cli.window_hours));

    Ok(Pipeline {
        manager: Arc::new(manager),
        hub,
    })
}

/// One scrape cycle; waits for the summaries and prints them.
async fn scrape_once(manager: &ScraperManager, limit: usize, model: Option<String>) -> anyhow::Result<()> {
    let outcome = manager.scrape(limit, model).await?;
    let report = outcome.enrichment.wait().await?;
    info!(
        stored = outcome.stored.len(),
        skipped = outcome.skipped,
        summarized = report.succeeded,
        failed = report.failed,
        "Scrape cycle complete"
    );

    for stored in &outcome.stored {
        let article = manager.article(stored.id).await?;
        println!("[{}] {}\n    {}", article.id, article.title, article.url);
        if let Some(summary) = article.summary {
            println!("    {}\n", summary);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let pipeline = build_pipeline(&cli).await?;
    let manager = pipeline.manager.clone();

    match cli.command {
        Commands::Serve { addr } => {
            cp_web::serve(addr, AppState::new(pipeline.manager, pipeline.hub)).await?;
        }
        Commands::Scrape { limit, model, interval } => match interval {
            Some(interval) => {
                info!("Running in periodic mode with {} interval", interval);
                loop {
                    info!("Starting scrape cycle");
                    if let Err(e) = scrape_once(&manager, limit, model.clone()).await {
                        error!(error = %e, "Error during scrape");
                    }
                    info!("Waiting {} before next scrape", interval);
                    tokio::time::sleep(interval.0).await;
                }
            }
            None => scrape_once(&manager, limit, model).await?,
        },
        Commands::Query { question, model } => {
            let answer = manager.query(&question, model.as_deref()).await?;
            println!("{}", answer);
        }
        Commands::Models => {
            for name in manager.list_models().await? {
                println!("{}", name);
            }
        }
    }

    manager.enricher().shutdown().await;
    Ok(())
}
