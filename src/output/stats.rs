//! Run statistics
//!
//! Counters collected by the orchestrator while it crawls, and a plain-text
//! rendering printed by the binary when the run ends.

use crate::state::StopReason;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Listing pages fetched successfully
    pub pages_fetched: u64,

    /// Candidate links extracted across all listing pages
    pub candidates_seen: u64,

    /// Candidates skipped because their URL was already claimed
    pub duplicates_skipped: u64,

    /// Article fetch tasks launched
    pub articles_dispatched: u64,

    /// Article pages that could not be fetched
    pub fetch_failures: u64,

    /// Records with an empty content or date field
    pub degraded_records: u64,

    /// Wall-clock time from the first listing fetch to the terminal phase
    pub duration: Duration,
}

impl CrawlStatistics {
    /// Returns the share of records with every field extracted, as a percentage
    pub fn completeness_rate(&self, total_articles: usize) -> f64 {
        if total_articles == 0 {
            return 0.0;
        }
        let complete = (total_articles as u64).saturating_sub(self.degraded_records);
        (complete as f64 / total_articles as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
/// * `total_articles` - Number of records in the written document
/// * `stop_reason` - Why the crawl ended
pub fn print_statistics(stats: &CrawlStatistics, total_articles: usize, stop_reason: StopReason) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Listing pages fetched: {}", stats.pages_fetched);
    println!("  Articles collected: {}", total_articles);
    println!("  Stop reason: {}", stop_reason);
    println!("  Elapsed: {:.1}s", stats.duration.as_secs_f64());
    println!();

    println!("Links:");
    println!("  Candidates seen: {}", stats.candidates_seen);
    println!("  Duplicates skipped: {}", stats.duplicates_skipped);
    println!("  Articles dispatched: {}", stats.articles_dispatched);
    println!();

    if stats.fetch_failures > 0 || stats.degraded_records > 0 {
        println!("Degraded:");
        println!("  Article fetch failures: {}", stats.fetch_failures);
        println!("  Records with missing fields: {}", stats.degraded_records);
        println!();
    }

    println!(
        "Completeness: {:.1}% ({} / {} records fully extracted)",
        stats.completeness_rate(total_articles),
        (total_articles as u64).saturating_sub(stats.degraded_records),
        total_articles
    );
}
