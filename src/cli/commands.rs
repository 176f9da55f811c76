//! CLI command definitions for seo-forge.
//!
//! `run` drives the full pipeline over a sitemap list; `classify` fetches a
//! single sitemap and prints its keywords and phrases without writing files
//! or calling the generation service.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use crate::classify::Classifier;
use crate::input::{
    load_exclusions, load_sitemap_urls, DEFAULT_EXCLUSIONS_FILE, DEFAULT_SITEMAPS_FILE,
};
use crate::llm::{ArticleGenerator, ChatClient, DEFAULT_API_BASE};
use crate::pipeline::{
    ConfigError, KeywordSelector, PipelineConfig, ResultAggregator, SeededSelector, TaskContext,
    UniformSelector,
};
use crate::scheduler::Scheduler;
use crate::sitemap::{parse_sitemap, HttpSitemapFetcher, SitemapSource};

/// Mine location keywords from sitemaps and draft one article per site.
#[derive(Parser, Debug)]
#[command(name = "seo-forge")]
#[command(about = "Mine location keywords from sitemaps and draft one article per site")]
#[command(version)]
#[command(
    long_about = "seo-forge reads a list of sitemap URLs, turns page paths into keyword and phrase lists, \
and asks a chat-completion model for one promotional article per site.\n\n\
Example usage:\n  seo-forge run --sitemaps sitemaps.txt --output-dir ./output\n  \
seo-forge classify https://example.com/sitemap.xml --abbreviations NJ,NY"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Process every sitemap in the list and generate articles.
    Run(RunArgs),

    /// Fetch one sitemap and print its classification.
    Classify(ClassifyArgs),
}

/// Arguments for `seo-forge run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// File with one sitemap URL per line.
    #[arg(long, default_value = DEFAULT_SITEMAPS_FILE)]
    pub sitemaps: PathBuf,

    /// File with one excluded phrase per line (optional).
    #[arg(long, default_value = DEFAULT_EXCLUSIONS_FILE)]
    pub exclusions: PathBuf,

    /// YAML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base directory for per-site output folders.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Maximum number of sites processed at once.
    #[arg(short = 'w', long)]
    pub max_workers: Option<usize>,

    /// Rate-limit delay in milliseconds.
    #[arg(long)]
    pub rate_limit_ms: Option<u64>,

    /// Total generation attempts per article.
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Chat model used for articles.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Timeout in seconds for each sitemap fetch and chat request.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Seconds between progress log lines.
    #[arg(long)]
    pub progress_interval_secs: Option<u64>,

    /// API key for the chat-completions endpoint.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the chat-completions API.
    #[arg(long, env = "OPENAI_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Seed for keyword selection, for reproducible runs.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the run summary as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `seo-forge classify`.
#[derive(Parser, Debug)]
pub struct ClassifyArgs {
    /// Sitemap URL to fetch.
    pub sitemap_url: String,

    /// File with one excluded phrase per line.
    #[arg(long)]
    pub exclusions: Option<PathBuf>,

    /// Comma-separated locale abbreviations (e.g. NJ,NY,CA).
    #[arg(short, long)]
    pub abbreviations: Option<String>,

    /// YAML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the classification as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Parse CLI arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => run_pipeline_command(args).await,
        Commands::Classify(args) => run_classify_command(args).await,
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Layer defaults, the optional YAML file, environment variables read through
/// `lookup`, and CLI overrides, then validate.
fn build_config<F>(args: &RunArgs, lookup: F) -> Result<PipelineConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let base = match &args.config {
        Some(path) => PipelineConfig::from_yaml_file(path)?,
        None => PipelineConfig::default(),
    };
    let mut config = base.apply_env_with(lookup)?;

    if let Some(dir) = &args.output_dir {
        config = config.with_output_dir(dir);
    }
    if let Some(workers) = args.max_workers {
        config = config.with_max_workers(workers);
    }
    if let Some(ms) = args.rate_limit_ms {
        config = config.with_rate_limit_delay(Duration::from_millis(ms));
    }
    if let Some(retries) = args.max_retries {
        config = config.with_max_retries(retries);
    }
    if let Some(model) = &args.model {
        config = config.with_model(model.clone());
    }
    if let Some(secs) = args.timeout_secs {
        config = config.with_request_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = args.progress_interval_secs {
        config = config.with_progress_interval(Duration::from_secs(secs));
    }

    config.validate()?;
    Ok(config)
}

fn build_classify_config<F>(args: &ClassifyArgs, lookup: F) -> Result<PipelineConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let base = match &args.config {
        Some(path) => PipelineConfig::from_yaml_file(path)?,
        None => PipelineConfig::default(),
    };
    let mut config = base.apply_env_with(lookup)?;
    if let Some(raw) = &args.abbreviations {
        config = config.with_locale_abbreviations(raw.split(','));
    }
    config.validate()?;
    Ok(config)
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn run_pipeline_command(args: RunArgs) -> anyhow::Result<()> {
    // --- Everything fatal is checked before the first dispatch ---
    let config = build_config(&args, |key| std::env::var(key).ok())?;

    let api_key = match args.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => anyhow::bail!(
            "OPENAI_API_KEY is required but not set.\n\
             Provide it via --api-key <KEY> or set the OPENAI_API_KEY environment variable."
        ),
    };

    let sitemap_urls = load_sitemap_urls(&args.sitemaps).await?;
    let exclusions = Arc::new(load_exclusions(&args.exclusions).await);

    let client = ChatClient::new(&args.api_base, api_key, config.request_timeout)?;
    info!(
        model = %config.model,
        api_base = %client.api_base(),
        api_key = %client.api_key_masked(),
        "Using chat-completions endpoint"
    );

    let fetcher = HttpSitemapFetcher::with_timeout(config.request_timeout)?;
    let selector: Arc<dyn KeywordSelector> = match args.seed {
        Some(seed) => Arc::new(SeededSelector::new(seed)),
        None => Arc::new(UniformSelector),
    };

    let ctx = Arc::new(TaskContext::new(
        &config,
        Arc::new(fetcher),
        Classifier::from_config(&config, exclusions),
        ArticleGenerator::new(Arc::new(client), &config),
        selector,
    ));

    let scheduler = Scheduler::new(ctx, &config);
    let outcomes = scheduler.run(&sitemap_urls).await;
    let summary = ResultAggregator::new().aggregate(&outcomes).await;

    if args.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| anyhow::anyhow!("Failed to serialize JSON output: {}", e))?;
        println!("{}", json);
    } else {
        println!("{}", summary.completion_message());
    }
    Ok(())
}

async fn run_classify_command(args: ClassifyArgs) -> anyhow::Result<()> {
    let config = build_classify_config(&args, |key| std::env::var(key).ok())?;

    let exclusions = match &args.exclusions {
        Some(path) => load_exclusions(path).await,
        None => Default::default(),
    };

    let fetcher = HttpSitemapFetcher::with_timeout(config.request_timeout)?;
    let xml = fetcher.fetch(&args.sitemap_url).await?;
    let urls = parse_sitemap(&xml)?;
    let result = Classifier::from_config(&config, Arc::new(exclusions)).classify(&urls);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| anyhow::anyhow!("Failed to serialize JSON output: {}", e))?;
        println!("{}", json);
        return Ok(());
    }

    println!("Keywords ({}):", result.keywords.len());
    for keyword in &result.keywords {
        println!("  {}", keyword);
    }
    println!("Phrases ({}):", result.phrases.len());
    for phrase in &result.phrases {
        println!("  {}", phrase);
    }
    Ok(())
}
