use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

use cardata::{
    CatalogConfig, HttpSource, JsonLinesSink, Pipeline, PipelineSettings, RecordSink, SourceConfig,
};

#[derive(Parser)]
#[command(
    name = "cardata",
    about = "Crawl a vehicle catalog and write one JSON record per engine variant",
    version
)]
struct Cli {
    /// Catalog definition (JSON). Defaults to the built-in autocentrum.pl catalog
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start from this URL instead of the catalog root
    #[arg(long)]
    root: Option<Url>,

    /// Write records here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Pages fetched at once per stage
    #[arg(long, short, default_value = "8")]
    concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// User-Agent header sent with every request
    #[arg(long)]
    user_agent: Option<String>,

    /// Stop after this many leaves
    #[arg(long)]
    limit: Option<usize>,

    /// Print the catalog definition as JSON and exit
    #[arg(long)]
    dump_config: bool,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(verbose: bool, json: bool) {
    let default = if verbose { "cardata=debug" } else { "cardata=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    let mut catalog = match &cli.config {
        Some(path) => CatalogConfig::from_path(path)
            .with_context(|| format!("failed to load catalog {}", path.display()))?,
        None => CatalogConfig::autocentrum().context("built-in catalog is invalid")?,
    };
    if let Some(root) = cli.root {
        catalog.root = root;
    }

    if cli.dump_config {
        println!("{}", catalog.to_json_pretty()?);
        return Ok(());
    }

    let mut source_config = SourceConfig {
        timeout_secs: cli.timeout_secs,
        ..SourceConfig::default()
    };
    if let Some(user_agent) = cli.user_agent {
        source_config.user_agent = user_agent;
    }
    let source = HttpSource::new(&source_config).context("failed to create HTTP client")?;

    let sink: Box<dyn RecordSink> = match &cli.output {
        Some(path) => Box::new(
            JsonLinesSink::to_path(path)
                .with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(JsonLinesSink::stdout()),
    };

    let settings = PipelineSettings {
        concurrency: cli.concurrency,
        max_leaves: cli.limit,
    };
    let pipeline = Pipeline::new(source, catalog, settings);

    let cancel = pipeline.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, finishing in-flight pages");
            cancel.cancel();
        }
    });

    let report = pipeline.run(sink.as_ref()).await.context("failed to write records")?;

    info!(
        records = report.records,
        failures = report.failures.len(),
        "done"
    );
    Ok(())
}
