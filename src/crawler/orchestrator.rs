//! Crawl orchestrator - the pagination state machine
//!
//! This module contains the loop that drives one category harvest:
//! - Fetching listing pages strictly in page order
//! - Claiming candidate links through the run-wide registry
//! - Fanning out article fetches through the bounded dispatcher
//! - Aggregating every result, failures included, into the session
//! - Deciding when pagination is exhausted
//! - Observing cancellation before each page and each dispatch

use crate::config::{Config, CrawlerConfig, SiteConfig, StopPolicy};
use crate::crawler::content::extract_article;
use crate::crawler::fetcher::{FetchError, PageFetcher};
use crate::crawler::links::{CandidateLink, ListingPage};
use crate::crawler::scheduler::Dispatcher;
use crate::crawler::selectors::SelectorSet;
use crate::output::CrawlStatistics;
use crate::state::{ArticleRecord, CrawlPhase, CrawlSession, StopReason};
use crate::url::listing_url;
use crate::ConfigError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// How often, and how patiently, a failed fetch is repeated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first
    pub max_retries: u32,

    /// Pause between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            delay: Duration::from_millis(config.retry_delay),
        }
    }

    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            delay: Duration::ZERO,
        }
    }
}

/// Fetches `url`, repeating transient failures according to `policy`
///
/// Permanent failures (for example HTTP 404) are returned immediately. No
/// new attempt is started once `cancel` has fired; the last error is
/// returned instead.
pub async fn fetch_with_retry(
    fetcher: &dyn PageFetcher,
    url: &str,
    policy: RetryPolicy,
    cancel: &CancellationToken,
) -> Result<String, FetchError> {
    let mut attempt = 0;
    loop {
        let error = match fetcher.fetch(url).await {
            Ok(body) => return Ok(body),
            Err(e) => e,
        };

        if !error.is_transient() || attempt >= policy.max_retries || cancel.is_cancelled() {
            return Err(error);
        }

        attempt += 1;
        tracing::debug!(
            "Retrying {} ({}/{}) after: {}",
            url,
            attempt,
            policy.max_retries,
            error.kind
        );

        tokio::select! {
            _ = cancel.cancelled() => return Err(error),
            _ = tokio::time::sleep(policy.delay) => {}
        }
    }
}

/// What one article task produced
#[derive(Debug, Clone)]
pub struct ArticleResult {
    pub record: ArticleRecord,

    /// True if the article page could not be fetched at all
    pub fetch_failed: bool,
}

/// Everything a finished crawl hands back to its caller
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub category: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Collected records in aggregation order
    pub records: Vec<ArticleRecord>,

    pub stop_reason: StopReason,
    pub stats: CrawlStatistics,
}

/// Drives the paginate, dispatch, aggregate loop for one site
pub struct Orchestrator {
    fetcher: Arc<dyn PageFetcher>,
    selectors: Arc<SelectorSet>,
    site: SiteConfig,
    crawler: CrawlerConfig,
    retry: RetryPolicy,
    phase: CrawlPhase,
    stats: CrawlStatistics,
}

impl Orchestrator {
    /// Creates a new orchestrator
    ///
    /// # Arguments
    ///
    /// * `config` - The harvest configuration
    /// * `fetcher` - Shared fetcher used for listing and article pages
    ///
    /// # Returns
    ///
    /// * `Ok(Orchestrator)` - Ready to run
    /// * `Err(ConfigError)` - A selector failed to compile
    pub fn new(config: &Config, fetcher: Arc<dyn PageFetcher>) -> Result<Self, ConfigError> {
        Ok(Self {
            fetcher,
            selectors: Arc::new(SelectorSet::compile(&config.site)?),
            site: config.site.clone(),
            crawler: config.crawler.clone(),
            retry: RetryPolicy::from_config(&config.crawler),
            phase: CrawlPhase::Idle,
            stats: CrawlStatistics::default(),
        })
    }

    /// Returns the current phase
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    fn transition(&mut self, next: CrawlPhase) {
        debug_assert!(
            self.phase.can_transition_to(&next),
            "illegal phase transition {} -> {}",
            self.phase,
            next
        );
        tracing::trace!("Phase {} -> {}", self.phase, next);
        self.phase = next;
    }

    /// Harvests `category` until the listing is exhausted or `cancel` fires
    ///
    /// Never fails: listing failures and cancellation are terminal phases
    /// with their own stop reason, and article failures become degraded
    /// records. Whatever was aggregated before the terminal phase is
    /// returned in the outcome.
    pub async fn run(&mut self, category: &str, cancel: CancellationToken) -> CrawlOutcome {
        self.phase = CrawlPhase::Idle;
        self.stats = CrawlStatistics::default();

        let clock = Instant::now();
        let mut session = CrawlSession::new(category, cancel);
        let mut dispatcher: Dispatcher<ArticleResult> = Dispatcher::new(
            self.crawler.max_concurrent_articles as usize,
            Duration::from_millis(self.crawler.dispatch_delay),
        );

        tracing::info!("Starting harvest of '{}' from {}", category, self.site.name);

        let mut page = 1;
        self.transition(CrawlPhase::Paging { page });

        let stop_reason = loop {
            match self.crawl_page(&mut session, &mut dispatcher, page).await {
                Some(reason) => break reason,
                None => {
                    self.politeness_delay(session.cancel_token()).await;
                    page += 1;
                    self.transition(CrawlPhase::Paging { page });
                }
            }
        };

        self.transition(CrawlPhase::Stopped(stop_reason));
        self.stats.duration = clock.elapsed();

        tracing::info!(
            "Harvest of '{}' stopped ({}) after {} listing pages with {} articles",
            category,
            stop_reason,
            self.stats.pages_fetched,
            session.collected().len()
        );

        CrawlOutcome {
            category: session.category().to_string(),
            started_at: session.started_at(),
            finished_at: Utc::now(),
            records: session.into_records(),
            stop_reason,
            stats: self.stats.clone(),
        }
    }

    /// Runs one Paging, Dispatching, Aggregating round
    ///
    /// Returns the stop reason if the crawl should end after this page.
    async fn crawl_page(
        &mut self,
        session: &mut CrawlSession,
        dispatcher: &mut Dispatcher<ArticleResult>,
        page: u32,
    ) -> Option<StopReason> {
        if !session.is_running() {
            tracing::info!("Cancellation observed before listing page {}", page);
            return Some(StopReason::Cancelled);
        }

        let url = match listing_url(&self.site, session.category(), page) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Cannot build listing URL for page {}: {}", page, e);
                return Some(StopReason::ListingFailed);
            }
        };

        tracing::info!("Fetching listing page {}: {}", page, url);
        let html = match fetch_with_retry(
            self.fetcher.as_ref(),
            url.as_str(),
            self.retry,
            session.cancel_token(),
        )
        .await
        {
            Ok(html) => html,
            Err(e) if !session.is_running() => {
                tracing::info!("Listing page {} abandoned on cancellation: {}", page, e);
                return Some(StopReason::Cancelled);
            }
            Err(e) => {
                tracing::warn!("Listing page {} failed, stopping: {}", page, e);
                return Some(StopReason::ListingFailed);
            }
        };
        self.stats.pages_fetched += 1;

        self.transition(CrawlPhase::Dispatching { page });
        let listing = ListingPage::extract(page, &html, &self.selectors.list);
        let (novel, halted) = self.dispatch_listing(session, dispatcher, listing.candidates).await;

        self.transition(CrawlPhase::Aggregating { page });
        let results = dispatcher.drain().await;
        for result in &results {
            if result.fetch_failed {
                self.stats.fetch_failures += 1;
            }
            if result.record.is_degraded() {
                self.stats.degraded_records += 1;
            }
        }
        let aggregated = results.len();
        session.append(results.into_iter().map(|result| result.record));

        tracing::info!(
            "Listing page {}: {} matched, {} new, {} aggregated, {} collected so far",
            page,
            listing.matched,
            novel,
            aggregated,
            session.collected().len()
        );

        // A page cut short by cancellation says nothing about the listing
        if halted {
            return Some(StopReason::Cancelled);
        }

        let exhausted = match self.crawler.stop_policy {
            StopPolicy::NoNovelLinks => novel == 0,
            StopPolicy::NoMatches => listing.matched == 0,
        };
        if exhausted {
            return Some(StopReason::Exhausted);
        }

        if self.crawler.max_pages != 0 && page >= self.crawler.max_pages {
            return Some(StopReason::PageLimit);
        }

        None
    }

    /// Claims each candidate and dispatches the ones granted
    ///
    /// Returns the number of claims granted, and whether cancellation
    /// halted dispatching before every candidate was looked at. A URL
    /// claimed but never dispatched yields no record.
    async fn dispatch_listing(
        &mut self,
        session: &CrawlSession,
        dispatcher: &mut Dispatcher<ArticleResult>,
        candidates: Vec<CandidateLink>,
    ) -> (usize, bool) {
        self.stats.candidates_seen += candidates.len() as u64;

        let mut novel = 0;
        for (index, candidate) in candidates.into_iter().enumerate() {
            if !session.is_running() {
                tracing::info!("Cancellation observed, skipping remaining candidates");
                return (novel, true);
            }

            if !session.registry().try_claim(&candidate.url) {
                tracing::debug!("Skipping duplicate {}", candidate.url);
                self.stats.duplicates_skipped += 1;
                continue;
            }
            novel += 1;

            let task = harvest_article(
                Arc::clone(&self.fetcher),
                Arc::clone(&self.selectors),
                self.retry,
                session.cancel_token().clone(),
                candidate,
                session.category().to_string(),
            );

            if !dispatcher.dispatch(index, session.cancel_token(), task).await {
                tracing::info!("Cancellation observed, dispatch halted");
                return (novel, true);
            }
            self.stats.articles_dispatched += 1;
        }

        (novel, false)
    }

    async fn politeness_delay(&self, cancel: &CancellationToken) {
        if self.crawler.page_delay == 0 {
            return;
        }
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(Duration::from_millis(self.crawler.page_delay)) => {}
        }
    }
}

/// Fetches and extracts one article
///
/// Always yields a record: a fetch failure keeps the listing title with
/// empty content and date.
async fn harvest_article(
    fetcher: Arc<dyn PageFetcher>,
    selectors: Arc<SelectorSet>,
    retry: RetryPolicy,
    cancel: CancellationToken,
    candidate: CandidateLink,
    category: String,
) -> ArticleResult {
    let html = match fetch_with_retry(fetcher.as_ref(), &candidate.url, retry, &cancel).await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!("Keeping degraded record for {}: {}", candidate.url, e);
            return ArticleResult {
                record: ArticleRecord::degraded(candidate.url, candidate.inline_title, category),
                fetch_failed: true,
            };
        }
    };

    let extracted = extract_article(&html, &selectors);
    let record = ArticleRecord {
        title: extracted.title.unwrap_or(candidate.inline_title),
        content: extracted.content,
        date: extracted.date,
        url: candidate.url,
        category,
    };

    if record.is_degraded() {
        tracing::warn!(
            "Selectors missed on {} (content: {}, date: {})",
            record.url,
            if record.content.is_empty() { "missing" } else { "ok" },
            if record.date.is_empty() { "missing" } else { "ok" }
        );
    } else {
        tracing::debug!("Harvested {}", record.url);
    }

    ArticleResult {
        record,
        fetch_failed: false,
    }
}
