/*
newswire - main.rs
Single-pass batch run: load config, fetch every source, annotate, write data/news.json
and data/feed.xml, then exit.
*/

use anyhow::Result;
use clap::Parser;
use common::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use newswire::ingestion::build_http_client;
use newswire::llm::remote::RemoteLlmProvider;
use newswire::llm::LlmProvider;
use newswire::output::OutputPaths;
use newswire::Pipeline;

#[derive(Parser, Debug)]
#[command(name = "newswire", about = "Aggregate keyword-annotated news into JSON and RSS")]
struct Args {
    /// Path to config.json (defaults to $IS_CONFIG, then ./config.json)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config_path = common::resolve_config_path(args.config);
    let config = match Config::from_file(&config_path).await {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("failed to load configuration: {:#}", e);
            return Err(e);
        }
    };
    info!(
        path = %config_path.display(),
        keywords = config.keywords.len(),
        rss_sources = config.rss_sources.len(),
        html_scraping = config.enable_html_scraping,
        "configuration loaded"
    );

    let summarizer = create_summarizer(&config);
    let client = build_http_client()?;
    let pipeline = Pipeline::new(config, client, summarizer);

    let paths = OutputPaths::default();
    let payload = pipeline.run(&paths).await?;

    println!("[OK] Wrote {} with {} items", paths.json.display(), payload.count);
    Ok(())
}

/// Build the summarization provider once; `None` means the service is unavailable.
fn create_summarizer(config: &Config) -> Option<Arc<dyn LlmProvider>> {
    let llm_config = config.llm.as_ref()?;
    if llm_config.adapter.as_deref() == Some("none") {
        debug!("summarization disabled by configuration");
        return None;
    }
    match RemoteLlmProvider::from_config(llm_config) {
        Ok(provider) => {
            info!(model = provider.model(), "summarization provider initialized");
            Some(Arc::new(provider))
        }
        Err(e) => {
            warn!("summarization provider not available, continuing without it: {:#}", e);
            None
        }
    }
}
