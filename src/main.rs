//! Tag-Harvest main entry point
//!
//! This is the command-line interface for the Tag-Harvest news harvester.

use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tag_harvest::config::{load_config_with_hash, Config};
use tag_harvest::output::{print_statistics, JsonFileSink};
use tag_harvest::{harvest, listing_url, validate_category};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Tag-Harvest: an incremental news harvester
///
/// Tag-Harvest walks the paginated tag listing of a news site, fetches every
/// new article it finds, and writes the collected articles to a JSON file
/// when the listing runs out or the run is interrupted.
#[derive(Parser, Debug)]
#[command(name = "tag-harvest")]
#[command(version = "1.0.0")]
#[command(about = "An incremental news tag harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Topic (tag) to harvest; prompted for when omitted
    #[arg(short, long)]
    category: Option<String>,

    /// Override the configured output directory
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Override the configured listing page cap (0 = unbounded)
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.display().to_string();
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }

    let category = match &cli.category {
        Some(category) => category.clone(),
        None => prompt_category()?,
    };
    let category = validate_category(&category)?;

    if cli.dry_run {
        return handle_dry_run(&config, &category);
    }

    handle_harvest(&config, &config_hash, &category, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` takes precedence when set.
fn setup_logging(verbose: u8, quiet: bool) {
    let default_filter = if quiet {
        // Only show errors
        "error"
    } else {
        match verbose {
            0 => "tag_harvest=info,warn",
            1 => "tag_harvest=debug,info",
            2 => "tag_harvest=trace,debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Asks for the topic on stdin
fn prompt_category() -> anyhow::Result<String> {
    print!("Enter the topic you want to crawl: ");
    io::stdout().flush()?;

    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        bail!("No topic given (stdin closed)");
    }
    Ok(line.trim().to_string())
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, category: &str) -> anyhow::Result<()> {
    println!("=== Tag-Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Name: {}", config.site.name);
    println!("  Base URL: {}", config.site.base_url);
    println!("  First listing page: {}", listing_url(&config.site, category, 1)?);
    println!("  List selector: {}", config.site.list_selector);
    println!("  Content selector: {}", config.site.content_selector);
    println!("  Date selector: {}", config.site.date_selector);
    if let Some(title_selector) = &config.site.title_selector {
        println!("  Title selector: {}", title_selector);
    }

    println!("\nCrawler Configuration:");
    println!(
        "  Max concurrent articles: {}",
        config.crawler.max_concurrent_articles
    );
    println!("  Page delay: {}ms", config.crawler.page_delay);
    println!("  Dispatch delay: {}ms", config.crawler.dispatch_delay);
    println!(
        "  Retries: {} ({}ms apart)",
        config.crawler.max_retries, config.crawler.retry_delay
    );
    if config.crawler.max_pages == 0 {
        println!("  Max pages: unbounded");
    } else {
        println!("  Max pages: {}", config.crawler.max_pages);
    }
    println!("  Stop policy: {:?}", config.crawler.stop_policy);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);

    println!("\n✓ Configuration is valid");
    println!("✓ Would start harvesting '{}'", category);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: &Config,
    config_hash: &str,
    category: &str,
    quiet: bool,
) -> anyhow::Result<()> {
    let sink = JsonFileSink::for_run(&config.output.directory, category, Utc::now());
    tracing::info!("Results will be written to {}", sink.path().display());

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight articles before saving");
            interrupt.cancel();
        }
    });

    let report = harvest(config, Some(config_hash), category, &sink, cancel)
        .await
        .context("Harvest could not start")?;

    if !quiet {
        println!();
        print_statistics(
            &report.stats,
            report.document.total_articles,
            report.document.stop_reason,
        );
    }

    if let Some(e) = report.write_error {
        return Err(anyhow::Error::new(e).context(format!(
            "Failed to save {} articles to {}",
            report.document.total_articles,
            sink.path().display()
        )));
    }

    println!(
        "\n✓ Saved {} articles to {}",
        report.document.total_articles,
        sink.path().display()
    );
    Ok(())
}
