//! Crawler module for tag-listing harvests
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `PageFetcher` trait
//! - Listing link extraction and article content extraction
//! - Run-wide URL deduplication
//! - Bounded concurrent dispatch of article fetches
//! - The pagination state machine and the terminal flush

mod content;
mod dedup;
mod fetcher;
mod links;
mod orchestrator;
mod scheduler;
mod selectors;
mod text;

pub use content::{extract_article, extract_content, ArticleContent, ExtractedArticle};
pub use dedup::DedupRegistry;
pub use fetcher::{build_http_client, FetchError, FetchErrorKind, HttpFetcher, PageFetcher};
pub use links::{extract_links, CandidateLink, ListingPage};
pub use orchestrator::{fetch_with_retry, ArticleResult, CrawlOutcome, Orchestrator, RetryPolicy};
pub use scheduler::Dispatcher;
pub use selectors::SelectorSet;
pub use text::{collapse_whitespace, is_meaningful, MIN_MEANINGFUL_CHARS};

use crate::config::Config;
use crate::output::{ArticleDocument, CrawlStatistics, OutputError, ResultSink};
use crate::url::validate_category;
use crate::HarvestError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// What a finished harvest produced
#[derive(Debug)]
pub struct CrawlReport {
    /// The document handed to the sink
    pub document: ArticleDocument,

    pub stats: CrawlStatistics,

    /// Set when the sink failed; `document` still holds every record
    pub write_error: Option<OutputError>,
}

impl CrawlReport {
    /// Returns true if the results were persisted
    pub fn is_written(&self) -> bool {
        self.write_error.is_none()
    }
}

/// Runs a complete harvest of one category over HTTP
///
/// This is the main entry point for a crawl. It will:
/// 1. Validate the category
/// 2. Check that the sink can be written
/// 3. Build the HTTP client
/// 4. Page through the listing, fetching new articles concurrently
/// 5. Flush the collected records to the sink exactly once
///
/// # Arguments
///
/// * `config` - The harvest configuration
/// * `config_hash` - Fingerprint of the configuration file, recorded in the output
/// * `category` - Tag to harvest
/// * `sink` - Where the results are written
/// * `cancel` - Token observed before each page fetch and each dispatch
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The crawl reached its terminal phase and the sink was
///   invoked; check `write_error` for the outcome of the write
/// * `Err(HarvestError)` - Setup failed before any record existed
pub async fn harvest(
    config: &Config,
    config_hash: Option<&str>,
    category: &str,
    sink: &dyn ResultSink,
    cancel: CancellationToken,
) -> Result<CrawlReport, HarvestError> {
    let fetcher = HttpFetcher::new(&config.http)?;
    harvest_with(config, config_hash, category, Arc::new(fetcher), sink, cancel).await
}

/// Runs a complete harvest with a caller-supplied fetcher
pub async fn harvest_with(
    config: &Config,
    config_hash: Option<&str>,
    category: &str,
    fetcher: Arc<dyn PageFetcher>,
    sink: &dyn ResultSink,
    cancel: CancellationToken,
) -> Result<CrawlReport, HarvestError> {
    let category = validate_category(category)?;
    let mut orchestrator = Orchestrator::new(config, fetcher)?;
    sink.prepare()?;

    let outcome = orchestrator.run(&category, cancel).await;
    let document = ArticleDocument::new(
        outcome.category,
        config.site.name.clone(),
        outcome.started_at,
        config_hash.map(str::to_string),
        outcome.stop_reason,
        outcome.records,
    );

    let write_error = match sink.flush(&document) {
        Ok(()) => None,
        Err(e) => {
            tracing::error!(
                "Failed to write {} collected articles: {}",
                document.total_articles,
                e
            );
            Some(e)
        }
    };

    Ok(CrawlReport {
        document,
        stats: outcome.stats,
        write_error,
    })
}
